use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::{LivraisonRequest, OperationQuery};
use crate::models::operations::TypeOperation;
use crate::routes::receptions::list_by_kind;
use crate::services::operation_service::OperationService;

/// GET /api/livraisons?search=&date_from=&date_to=
#[get("")]
pub async fn list_livraisons(
    _auth: AuthUser,
    query: web::Query<OperationQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let livraisons = list_by_kind(db.get_ref(), TypeOperation::Livraison, &query).await?;
    Ok(HttpResponse::Ok().json(livraisons))
}

/// POST /api/livraisons - vente d'un véhicule en stock
#[post("")]
pub async fn create_livraison(
    auth: AuthUser,
    body: web::Json<LivraisonRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;

    let created = OperationService::create_livraison(db.get_ref(), body.into_inner()).await?;
    tracing::info!(livraison_id = %created.id, by = %auth.email, "livraison saved");
    Ok(HttpResponse::Created().json(created))
}

#[put("/{id}")]
pub async fn update_livraison(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<LivraisonRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;

    let updated = OperationService::update_livraison(db.get_ref(), path.into_inner(), body.into_inner()).await?;
    tracing::info!(livraison_id = %updated.id, by = %auth.email, "livraison updated");
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{id}")]
pub async fn delete_livraison(
    auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_manager()?;
    OperationService::delete_operation(db.get_ref(), path.into_inner(), TypeOperation::Livraison).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn livraisons_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/livraisons")
            .service(list_livraisons)
            .service(create_livraison)
            .service(update_livraison)
            .service(delete_livraison),
    );
}
