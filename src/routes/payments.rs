use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::accounts::Entity as Accounts;
use crate::models::dto::{PaymentQuery, PaymentRequest};
use crate::models::operations::Entity as Operations;
use crate::models::payments::{self, Entity as Payments};
use crate::services::filters;
use crate::utils::format::format_currency;

/// GET /api/payments?search=&date_from=&date_to=&type=
#[get("")]
pub async fn list_payments(
    _auth: AuthUser,
    query: web::Query<PaymentQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let (payments, accounts) = futures::try_join!(
        Payments::find()
            .order_by_desc(payments::Column::DatePaiement)
            .order_by_desc(payments::Column::CreatedAt)
            .all(db.get_ref()),
        Accounts::find().all(db.get_ref()),
    )?;

    Ok(HttpResponse::Ok().json(filters::filter_payments(payments, &accounts, &query)?))
}

#[post("")]
pub async fn create_payment(
    auth: AuthUser,
    body: web::Json<PaymentRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    let body = body.into_inner();

    if body.montant <= Decimal::ZERO {
        return Err(AppError::validation("Le montant doit être supérieur à 0"));
    }
    Accounts::find_by_id(body.account_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Compte introuvable"))?;
    if let Some(operation_id) = body.operation_id {
        Operations::find_by_id(operation_id)
            .one(db.get_ref())
            .await?
            .ok_or_else(|| AppError::not_found("Opération introuvable"))?;
    }

    let payment = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(body.account_id),
        date_paiement: Set(body.date_paiement),
        montant: Set(body.montant),
        type_paiement: Set(body.type_paiement),
        mode_paiement: Set(body.mode_paiement),
        reference: Set(body.reference.trim().to_string()),
        description: Set(body.description.trim().to_string()),
        operation_id: Set(body.operation_id),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(
        payment_id = %payment.id,
        account_id = %payment.account_id,
        type_paiement = ?payment.type_paiement,
        montant = %format_currency(payment.montant),
        by = %auth.email,
        "payment recorded"
    );
    Ok(HttpResponse::Created().json(payment))
}

#[delete("/{id}")]
pub async fn delete_payment(
    auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_manager()?;
    let id = path.into_inner();

    let result = Payments::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Paiement introuvable"));
    }

    tracing::info!(payment_id = %id, by = %auth.email, "payment deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn payments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .service(list_payments)
            .service(create_payment)
            .service(delete_payment),
    );
}
