use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Rôles applicatifs, du plus large au plus restreint :
/// admin ⊃ manager ⊃ operateur ⊃ viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "operateur")]
    Operateur,
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

impl Role {
    /// Rôles qu'un administrateur peut attribuer (viewer = rôle par défaut uniquement)
    pub const ASSIGNABLE: [Role; 3] = [Role::Admin, Role::Manager, Role::Operateur];

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_manager(self) -> bool {
        self == Role::Manager || self.is_admin()
    }

    pub fn is_operator(self) -> bool {
        self == Role::Operateur || self.is_manager()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Operateur => "operateur",
            Role::Viewer => "viewer",
        }
    }

    /// Rôle inconnu ou absent => viewer
    pub fn from_claim(raw: &str) -> Role {
        match raw {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "operateur" => Role::Operateur,
            _ => Role::Viewer,
        }
    }

    /// Validation stricte pour la création / mise à jour d'un utilisateur
    pub fn parse_assignable(raw: &str) -> Option<Role> {
        Self::ASSIGNABLE.into_iter().find(|role| role.as_str() == raw)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)] // Format: pbkdf2:sha256:iterations$salt$hash
    pub password_hash: String,
    pub role: Role,
    pub last_sign_in: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
