use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Catalogue des modèles (marque/modèle + prix d'achat proposé par défaut)
// Pas de FK vers receptions_livraisons : le lien se fait par marque/modele
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicules_ref")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub marque: String,
    pub modele: String,
    pub reference: Option<String>,
    pub prix_achat_defaut: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
