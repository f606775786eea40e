use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::JournalQuery;
use crate::services::filters;
use crate::services::ledger_service::LedgerService;

/// GET /api/journal?search=&date_from=&date_to=&account_id=&type=
#[get("")]
pub async fn get_journal(
    _auth: AuthUser,
    query: web::Query<JournalQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let entries = LedgerService::journal(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(filters::filter_journal(entries, &query)?))
}

pub fn journal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/journal").service(get_journal));
}
