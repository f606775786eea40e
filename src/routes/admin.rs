use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::{CreateUserRequest, ImportQuery, UpdateUserRoleRequest, UserSummary};
use crate::models::users::{self, Entity as Users, Role};
use crate::routes::auth::normalize_email;
use crate::services::import::ImportService;
use crate::utils::password;

// Taille max du classeur importé
const MAX_WORKBOOK_BYTES: usize = 10 * 1024 * 1024;

/// Rôle attribuable par un administrateur, sinon 400
pub fn assignable_role(raw: &str) -> AppResult<Role> {
    Role::parse_assignable(raw.trim()).ok_or_else(|| {
        AppError::validation("Rôle invalide : admin, manager ou operateur attendu")
    })
}

/// GET /api/admin/users
#[get("")]
pub async fn list_users(auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let users: Vec<UserSummary> = Users::find()
        .order_by_asc(users::Column::CreatedAt)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/admin/users - créer un utilisateur avec son rôle
#[post("")]
pub async fn create_user(
    auth: AuthUser,
    body: web::Json<CreateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    body.validate()?;
    let role = assignable_role(&body.role)?;

    let password_hash = password::hash_password(&body.password).map_err(AppError::Internal)?;

    // email unique : le doublon remonte en 409 via la contrainte
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(&body.email)),
        password_hash: Set(password_hash),
        role: Set(role),
        last_sign_in: Set(None),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), by = %auth.email, "user created");
    Ok(HttpResponse::Created().json(UserSummary::from(user)))
}

/// POST /api/admin/users/role - changer le rôle d'un utilisateur
#[post("/role")]
pub async fn update_user_role(
    auth: AuthUser,
    body: web::Json<UpdateUserRoleRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let role = assignable_role(&body.role)?;

    let user = Users::find_by_id(body.user_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Utilisateur introuvable"))?;

    let mut active: users::ActiveModel = user.into();
    active.role = Set(role);
    let user = active.update(db.get_ref()).await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), by = %auth.email, "user role updated");
    Ok(HttpResponse::Ok().json(UserSummary::from(user)))
}

/// POST /api/admin/import?file=VMS_GESTION.xlsx - corps : le classeur .xlsx
#[post("")]
pub async fn import_workbook(
    auth: AuthUser,
    query: web::Query<ImportQuery>,
    body: web::Bytes,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    if body.is_empty() {
        return Err(AppError::validation("Classeur Excel manquant"));
    }

    let file = query
        .into_inner()
        .file
        .unwrap_or_else(|| "VMS_GESTION.xlsx".to_string());

    tracing::info!(file = %file, size = body.len(), by = %auth.email, "workbook import started");
    let report = ImportService::import_workbook(db.get_ref(), body.to_vec(), file).await?;

    Ok(HttpResponse::Ok().json(report))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/users")
            .service(list_users)
            .service(create_user)
            .service(update_user_role),
    )
    .service(
        web::scope("/admin/import")
            .app_data(web::PayloadConfig::new(MAX_WORKBOOK_BYTES))
            .service(import_workbook),
    );
}
