use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Une seule ligne : coordonnées légales de la société (entêtes BL / relevés)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub capital: String,
    pub rc: String,
    pub nif: String,
    pub nis: String,
    pub ai: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
