use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::StatementQuery;
use crate::services::ledger_service::LedgerService;

/// GET /api/statements/{account_id}?date_from=&date_to=
#[get("/{account_id}")]
pub async fn get_statement(
    _auth: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<StatementQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let statement = LedgerService::statement(db.get_ref(), path.into_inner(), query.date_from, query.date_to).await?;
    Ok(HttpResponse::Ok().json(statement))
}

pub fn statements_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/statements").service(get_statement));
}
