// ============================================================================
// MODÈLE : RECEPTIONS / LIVRAISONS
// ============================================================================
//
// Une seule table pour les deux sens du stock:
//   - reception : achat d'un véhicule auprès d'un fournisseur (entrée en parc)
//   - livraison : vente d'un véhicule à un client (sortie du parc)
//
// Le rapprochement reception <-> livraison se fait par numero_chassis (VIN).
//
// Prix:
//   - prix_unitaire : prix total payé (reception) ou prix de vente (livraison)
//   - prix_achat    : prix d'achat de base = prix_unitaire - commission
//   - commission    : marge ; si absente, prix_unitaire - prix_achat
//   - montant       : quantite * prix_unitaire (recalculé à chaque écriture)
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TypeOperation {
    #[sea_orm(string_value = "reception")]
    Reception,
    #[sea_orm(string_value = "livraison")]
    Livraison,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receptions_livraisons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTime,
    pub date_operation: Date,
    pub type_operation: TypeOperation,
    pub account_id: Uuid,
    pub montant: Decimal,
    pub quantite: i32,

    // Détails véhicule
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub numero_chassis: Option<String>,
    pub prix_achat: Option<Decimal>,
    pub prix_vente: Option<Decimal>,
    pub prix_unitaire: Option<Decimal>,
    pub commission: Option<Decimal>,
}

impl Model {
    pub fn is_reception(&self) -> bool {
        self.type_operation == TypeOperation::Reception
    }

    pub fn is_livraison(&self) -> bool {
        self.type_operation == TypeOperation::Livraison
    }

    /// Numéro de châssis non vide, sans espaces autour
    pub fn chassis(&self) -> Option<&str> {
        self.numero_chassis
            .as_deref()
            .map(str::trim)
            .filter(|vin| !vin.is_empty())
    }

    /// Libellé "marque modele" utilisé pour regrouper le stock
    pub fn model_label(&self) -> String {
        format!(
            "{} {}",
            self.marque.as_deref().unwrap_or_default(),
            self.modele.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
