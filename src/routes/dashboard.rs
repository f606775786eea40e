use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::ledger_service::LedgerService;

/// GET /api/dashboard - indicateurs globaux
#[get("/dashboard")]
pub async fn get_dashboard(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(LedgerService::dashboard(db.get_ref()).await?))
}
