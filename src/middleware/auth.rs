use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::users::Role;
use crate::utils::jwt::{self, JwtSettings};

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Créer / modifier des opérations, paiements, charges, comptes
    pub fn require_operator(&self) -> AppResult<()> {
        if self.role.is_operator() {
            Ok(())
        } else {
            Err(AppError::forbidden("Accès en lecture seule"))
        }
    }

    /// Suppressions et données sensibles (prix d'achat, commissions)
    pub fn require_manager(&self) -> AppResult<()> {
        if self.role.is_manager() {
            Ok(())
        } else {
            Err(AppError::forbidden("Action réservée aux managers"))
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Action réservée aux administrateurs"))
        }
    }
}

fn authenticate(req: &HttpRequest) -> AppResult<AuthUser> {
    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    // 2. Convertir le header en string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid Authorization format (expected: Bearer <token>)".to_string())
    })?;

    // 4. Vérifier le token JWT avec la clé partagée par l'application
    let settings = req
        .app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| AppError::Internal("JWT settings not configured".to_string()))?;

    let claims = jwt::verify_token(settings, token).map_err(AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        role: Role::from_claim(&claims.role),
    })
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
