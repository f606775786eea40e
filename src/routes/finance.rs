use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::ledger_service::LedgerService;

/// GET /api/finance/overview - créances clients, dettes fournisseurs, soldes
#[get("/overview")]
pub async fn get_overview(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(LedgerService::finance_overview(db.get_ref()).await?))
}

/// GET /api/finance/settlement/{account_id} - paiement proposé pour solder le compte
#[get("/settlement/{account_id}")]
pub async fn get_settlement(
    _auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let draft = LedgerService::settlement(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(draft))
}

pub fn finance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/finance")
            .service(get_overview)
            .service(get_settlement),
    );
}
