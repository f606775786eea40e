use actix_web::{get, put, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::company_settings::{self, Entity as CompanySettings};
use crate::models::dto::CompanySettingsRequest;

/// GET /api/settings - coordonnées de la société (ligne unique)
#[get("")]
pub async fn get_settings(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let settings = CompanySettings::find()
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Paramètres de la société non configurés"))?;

    Ok(HttpResponse::Ok().json(settings))
}

/// PUT /api/settings - crée la ligne si elle n'existe pas encore (admin)
#[put("")]
pub async fn update_settings(
    auth: AuthUser,
    body: web::Json<CompanySettingsRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    body.validate()?;
    let body = body.into_inner();

    let existing = CompanySettings::find().one(db.get_ref()).await?;
    let is_new = existing.is_none();
    let mut active: company_settings::ActiveModel = match existing {
        Some(current) => current.into(),
        None => company_settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            ..Default::default()
        },
    };

    active.name = Set(body.name.trim().to_string());
    active.address = Set(body.address);
    active.city = Set(body.city);
    active.country = Set(body.country);
    active.phone = Set(body.phone);
    active.email = Set(body.email.trim().to_string());
    active.website = Set(body.website.filter(|w| !w.trim().is_empty()));
    active.capital = Set(body.capital);
    active.rc = Set(body.rc);
    active.nif = Set(body.nif);
    active.nis = Set(body.nis);
    active.ai = Set(body.ai);

    let saved = if is_new {
        active.insert(db.get_ref()).await?
    } else {
        active.update(db.get_ref()).await?
    };

    tracing::info!(by = %auth.email, "company settings saved");
    Ok(HttpResponse::Ok().json(saved))
}

pub fn settings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .service(get_settings)
            .service(update_settings),
    );
}
