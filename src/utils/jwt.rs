use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::users::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user_id
    pub email: String,
    pub role: String,    // lu avec Role::from_claim (inconnu => viewer)
    pub exp: i64,        // expiration timestamp
}

/// Clé secrète + durée de vie, partagées via web::Data
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub ttl_hours: i64,
}

impl From<&AppConfig> for JwtSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            ttl_hours: config.jwt_ttl_hours,
        }
    }
}

/// Génère un JWT token pour un utilisateur
pub fn generate_token(settings: &JwtSettings, user_id: Uuid, email: &str, role: Role) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(settings.ttl_hours))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role: role.as_str().to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_ref()),
    )
        .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un JWT token
pub fn verify_token(settings: &JwtSettings, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> JwtSettings {
        JwtSettings { secret: secret.to_string(), ttl_hours: 24 }
    }

    #[test]
    fn test_generate_and_verify_token() {
        let user_id = Uuid::new_v4();
        let email = "gerant@vms.dz";

        let token = generate_token(&settings("test-secret"), user_id, email, Role::Manager).unwrap();
        let claims = verify_token(&settings("test-secret"), &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, email);
        assert_eq!(Role::from_claim(&claims.role), Role::Manager);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token(&settings("test-secret"), "invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(&settings("secret-a"), Uuid::new_v4(), "a@vms.dz", Role::Admin).unwrap();
        assert!(verify_token(&settings("secret-b"), &token).is_err());
    }
}
