use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::accounts::{self, Entity as Accounts};
use crate::models::dto::{OperationQuery, OperationResponse, ReceptionRequest, ReceptionUpdateRequest};
use crate::models::operations::{self, TypeOperation};
use crate::services::filters;
use crate::services::operation_service::OperationService;
use crate::services::stock::effective_commission;

/// Ajoute le nom du compte et la commission effective à chaque opération
pub fn to_responses(operations: Vec<operations::Model>, accounts: &[accounts::Model]) -> Vec<OperationResponse> {
    let names: HashMap<Uuid, &str> = accounts.iter().map(|a| (a.id, a.nom_compte.as_str())).collect();

    operations
        .into_iter()
        .map(|operation| OperationResponse {
            account_name: names.get(&operation.account_id).copied().unwrap_or("Inconnu").to_string(),
            commission_effective: effective_commission(&operation),
            operation,
        })
        .collect()
}

/// Liste filtrée (recherche + période) d'un type d'opération
pub async fn list_by_kind(
    db: &DatabaseConnection,
    kind: TypeOperation,
    query: &OperationQuery,
) -> AppResult<Vec<OperationResponse>> {
    let (operations, accounts) = futures::try_join!(
        OperationService::list(db, kind),
        Accounts::find().all(db),
    )?;

    let filtered = filters::filter_operations(operations, &accounts, query)?;
    Ok(to_responses(filtered, &accounts))
}

/// GET /api/receptions?search=&date_from=&date_to=
#[get("")]
pub async fn list_receptions(
    _auth: AuthUser,
    query: web::Query<OperationQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let receptions = list_by_kind(db.get_ref(), TypeOperation::Reception, &query).await?;
    Ok(HttpResponse::Ok().json(receptions))
}

/// POST /api/receptions - une ligne par numéro de châssis
#[post("")]
pub async fn create_receptions(
    auth: AuthUser,
    body: web::Json<ReceptionRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    body.validate()?;

    let created = OperationService::create_receptions(db.get_ref(), body.into_inner()).await?;
    tracing::info!(count = created.len(), by = %auth.email, "receptions saved");
    Ok(HttpResponse::Created().json(created))
}

#[put("/{id}")]
pub async fn update_reception(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<ReceptionUpdateRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    body.validate()?;

    let updated = OperationService::update_reception(db.get_ref(), path.into_inner(), body.into_inner()).await?;
    tracing::info!(reception_id = %updated.id, by = %auth.email, "reception updated");
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{id}")]
pub async fn delete_reception(
    auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_manager()?;
    OperationService::delete_operation(db.get_ref(), path.into_inner(), TypeOperation::Reception).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn receptions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/receptions")
            .service(list_receptions)
            .service(create_receptions)
            .service(update_reception)
            .service(delete_reception),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::accounts::TypeCompte;
    use crate::services::ledger::tests::account;
    use crate::services::stock::tests::operation;
    use rust_decimal::Decimal;

    #[test]
    fn test_to_responses_names_and_commission() {
        let client = account("Client Benali", TypeCompte::Client, 0);
        let mut sale = operation(TypeOperation::Livraison, Some("VIN1"), 1_500);
        sale.account_id = client.id;
        sale.prix_achat = Some(Decimal::from(1_200));
        let orphan = operation(TypeOperation::Livraison, Some("VIN2"), 900);

        let responses = to_responses(vec![sale, orphan], std::slice::from_ref(&client));

        assert_eq!(responses[0].account_name, "Client Benali");
        assert_eq!(responses[0].commission_effective, Decimal::from(300));
        assert_eq!(responses[1].account_name, "Inconnu");
    }
}
