use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::VehicleDefinitionRequest;
use crate::models::operations::{self, Entity as Operations, TypeOperation};
use crate::models::vehicle_definitions::{self, Entity as VehicleDefinitions};

/// Une réception utilise-t-elle encore cette marque/modèle ?
pub fn definition_in_use(definition: &vehicle_definitions::Model, receptions: &[operations::Model]) -> bool {
    let same = |a: &Option<String>, b: &str| a.as_deref().is_some_and(|v| v.trim().eq_ignore_ascii_case(b.trim()));

    receptions
        .iter()
        .filter(|op| op.is_reception())
        .any(|op| same(&op.marque, &definition.marque) && same(&op.modele, &definition.modele))
}

#[get("")]
pub async fn list_vehicles(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let definitions = VehicleDefinitions::find()
        .order_by_asc(vehicle_definitions::Column::Marque)
        .order_by_asc(vehicle_definitions::Column::Modele)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(definitions))
}

#[post("")]
pub async fn create_vehicle(
    auth: AuthUser,
    body: web::Json<VehicleDefinitionRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    body.validate()?;

    let definition = vehicle_definitions::ActiveModel {
        id: Set(Uuid::new_v4()),
        marque: Set(body.marque.trim().to_string()),
        modele: Set(body.modele.trim().to_string()),
        reference: Set(body.reference.clone().filter(|r| !r.trim().is_empty())),
        prix_achat_defaut: Set(body.prix_achat_defaut),
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(vehicle_id = %definition.id, by = %auth.email, "vehicle definition created");
    Ok(HttpResponse::Created().json(definition))
}

/// Refusé tant qu'une réception porte cette marque/modèle
#[delete("/{id}")]
pub async fn delete_vehicle(
    auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_manager()?;

    let definition = VehicleDefinitions::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Véhicule introuvable"))?;

    let receptions = Operations::find()
        .filter(operations::Column::TypeOperation.eq(TypeOperation::Reception))
        .all(db.get_ref())
        .await?;
    if definition_in_use(&definition, &receptions) {
        return Err(AppError::conflict(
            "Impossible de supprimer ce véhicule : des réceptions utilisent cette marque et ce modèle",
        ));
    }

    VehicleDefinitions::delete_by_id(definition.id)
        .exec(db.get_ref())
        .await?;

    tracing::info!(vehicle_id = %definition.id, by = %auth.email, "vehicle definition deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn vehicles_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vehicles")
            .service(list_vehicles)
            .service(create_vehicle)
            .service(delete_vehicle),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stock::tests::operation;

    fn clio() -> vehicle_definitions::Model {
        vehicle_definitions::Model {
            id: Uuid::new_v4(),
            marque: "Renault".to_string(),
            modele: "Clio 5".to_string(),
            reference: None,
            prix_achat_defaut: None,
        }
    }

    #[test]
    fn test_definition_in_use() {
        let reception = operation(TypeOperation::Reception, Some("VIN1"), 100);
        assert!(definition_in_use(&clio(), &[reception]));

        let mut other = clio();
        other.modele = "Megane".to_string();
        let reception = operation(TypeOperation::Reception, Some("VIN1"), 100);
        assert!(!definition_in_use(&other, &[reception]));

        // casse et espaces ignorés
        let mut reception = operation(TypeOperation::Reception, Some("VIN2"), 100);
        reception.marque = Some(" RENAULT ".to_string());
        assert!(definition_in_use(&clio(), &[reception]));
    }
}
