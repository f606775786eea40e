use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::accounts::Entity as Accounts;
use crate::models::charges::{self, Entity as Charges};
use crate::models::dto::ChargeRequest;
use crate::utils::format::format_currency;

#[get("")]
pub async fn list_charges(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let charges = Charges::find()
        .order_by_desc(charges::Column::DateCharge)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(charges))
}

#[post("")]
pub async fn create_charge(
    auth: AuthUser,
    body: web::Json<ChargeRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    body.validate()?;
    if body.montant <= Decimal::ZERO {
        return Err(AppError::validation("Le montant doit être supérieur à 0"));
    }
    Accounts::find_by_id(body.account_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Compte introuvable"))?;

    let now = Utc::now().naive_utc();
    let charge = charges::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(body.account_id),
        date_charge: Set(body.date_charge),
        description: Set(body.description.trim().to_string()),
        montant: Set(body.montant),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(charge_id = %charge.id, montant = %format_currency(charge.montant), by = %auth.email, "charge recorded");
    Ok(HttpResponse::Created().json(charge))
}

#[delete("/{id}")]
pub async fn delete_charge(
    auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_manager()?;
    let id = path.into_inner();

    let result = Charges::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Charge introuvable"));
    }

    tracing::info!(charge_id = %id, by = %auth.email, "charge deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn charges_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/charges")
            .service(list_charges)
            .service(create_charge)
            .service(delete_charge),
    );
}
