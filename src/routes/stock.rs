use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::{SearchQuery, StockItem, StockResponse};
use crate::models::operations;
use crate::services::operation_service::OperationService;
use crate::services::stock;

/// Les prix d'achat et commissions ne sortent que pour manager/admin
pub fn stock_item(reception: &operations::Model, show_costs: bool) -> StockItem {
    StockItem {
        reception_id: reception.id,
        date_operation: reception.date_operation,
        marque: reception.marque.clone(),
        modele: reception.modele.clone(),
        numero_chassis: reception.numero_chassis.clone(),
        montant: reception.montant,
        prix_achat: reception.prix_achat.filter(|_| show_costs),
        commission: show_costs.then(|| stock::effective_commission(reception)),
    }
}

/// GET /api/stock?search= - véhicules reçus non livrés
#[get("")]
pub async fn get_stock(
    auth: AuthUser,
    query: web::Query<SearchQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let operations = OperationService::all(db.get_ref()).await?;
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let available: Vec<&operations::Model> = stock::available_stock(&operations)
        .into_iter()
        .filter(|op| needle.is_none_or(|n| stock::matches_vehicle(op, n)))
        .collect();
    let stats = stock::stock_stats(&available);
    let show_costs = auth.role.is_manager();

    Ok(HttpResponse::Ok().json(StockResponse {
        count: stats.count,
        total_value: stats.total_value,
        items: available.iter().map(|op| stock_item(op, show_costs)).collect(),
    }))
}

/// GET /api/stock/models - "marque modele" disponibles
#[get("/models")]
pub async fn get_stock_models(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let operations = OperationService::all(db.get_ref()).await?;
    let models = stock::available_models(&stock::available_stock(&operations));
    Ok(HttpResponse::Ok().json(models))
}

pub fn stock_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stock")
            .service(get_stock_models)
            .service(get_stock),
    );
}
