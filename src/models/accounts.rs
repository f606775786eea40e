// ============================================================================
// MODÈLE : ACCOUNTS (comptes tiers)
// ============================================================================
//
// Colonnes de la table accounts:
//   - id (UUID, PRIMARY KEY)
//   - code_compte (VARCHAR, UNIQUE, NOT NULL)
//   - nom_compte (VARCHAR, NOT NULL)
//   - type_compte (VARCHAR) - 'client', 'fournisseur', 'interne'
//   - solde_initial (NUMERIC) - solde d'ouverture
//   - actif (BOOLEAN)
//   - address, n_carte_identite, nif, nis, rc, ai (identifiants légaux, optionnels)
//   - created_at / updated_at (TIMESTAMP)
//
// Points d'attention:
//   - Le solde courant n'est PAS stocké : voir services::ledger
//   - Un compte référencé par une opération/paiement/charge ne peut pas être
//     supprimé (FK 23503 côté PostgreSQL)
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TypeCompte {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "fournisseur")]
    Fournisseur,
    #[sea_orm(string_value = "interne")]
    Interne,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code_compte: String,
    pub nom_compte: String,
    pub type_compte: TypeCompte,
    pub solde_initial: Decimal,
    pub actif: bool,
    pub address: Option<String>,
    pub n_carte_identite: Option<String>,
    pub nif: Option<String>,
    pub nis: Option<String>,
    pub rc: Option<String>,
    pub ai: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::operations::Entity")]
    Operations,

    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,

    #[sea_orm(has_many = "super::charges::Entity")]
    Charges,
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::charges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
