use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TypePaiement {
    #[sea_orm(string_value = "encaissement")]
    Encaissement, // entrée d'argent
    #[sea_orm(string_value = "decaissement")]
    Decaissement, // sortie d'argent
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ModePaiement {
    #[sea_orm(string_value = "virement")]
    Virement,
    #[sea_orm(string_value = "cheque")]
    Cheque,
    #[sea_orm(string_value = "especes")]
    Especes,
    #[sea_orm(string_value = "carte")]
    Carte,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub date_paiement: Date,
    pub montant: Decimal,
    pub type_paiement: TypePaiement,
    pub mode_paiement: ModePaiement,
    pub reference: String,
    pub description: String,
    pub operation_id: Option<Uuid>, // paiement rattaché à une livraison/réception (optionnel)
    pub created_at: DateTime,
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
