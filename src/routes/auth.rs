use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::{AuthResponse, LoginRequest};
use crate::models::users::{self, Entity as Users};
use crate::utils::jwt::{self, JwtSettings};
use crate::utils::password;

const INVALID_CREDENTIALS: &str = "Email ou mot de passe incorrect";

/// Emails comparés sans casse ni espaces
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<JwtSettings>,
) -> AppResult<HttpResponse> {
    // 1. Trouver l'utilisateur
    let email = normalize_email(&body.email);
    let user = Users::find()
        .filter(users::Column::Email.eq(&email))
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    // 2. Vérifier le mot de passe
    let is_valid = password::verify_password(&body.password, &user.password_hash).map_err(AppError::Internal)?;
    if !is_valid {
        tracing::warn!(email = %email, "failed login attempt");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    // 3. Dernière connexion
    let (user_id, role) = (user.id, user.role);
    let mut active: users::ActiveModel = user.into();
    active.last_sign_in = Set(Some(Utc::now().naive_utc()));
    active.update(db.get_ref()).await?;

    // 4. Générer le JWT
    let token = jwt::generate_token(&settings, user_id, &email, role).map_err(AppError::Internal)?;

    tracing::info!(user_id = %user_id, role = role.as_str(), "user logged in");
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id,
        email,
        role,
    }))
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth_user)
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(me),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::Role;
    use actix_web::{test, App};
    use uuid::Uuid;

    fn settings() -> JwtSettings {
        JwtSettings { secret: "test-secret".to_string(), ttl_hours: 1 }
    }

    #[actix_web::test]
    async fn test_normalize_email() {
        assert_eq!(normalize_email("  Gerant@VMS.dz "), "gerant@vms.dz");
    }

    #[actix_web::test]
    async fn test_me_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(settings()))
                .configure(auth_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_me_returns_claims() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(settings()))
                .configure(auth_routes),
        )
        .await;

        let id = Uuid::new_v4();
        let token = jwt::generate_token(&settings(), id, "admin@vms.dz", Role::Admin).unwrap();
        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user_id"], id.to_string());
        assert_eq!(body["email"], "admin@vms.dz");
        assert_eq!(body["role"], "admin");
    }
}
