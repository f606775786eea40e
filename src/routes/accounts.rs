use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::accounts::{self, Entity as Accounts};
use crate::models::dto::{AccountRequest, SearchQuery};
use crate::services::filters;
use crate::services::ledger_service::LedgerService;

const ACCOUNT_IN_USE: &str = "Impossible de supprimer ce compte : il est lié à des opérations existantes \
     (réceptions, livraisons, paiements ou charges). Désactivez-le plutôt.";

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn find_account(db: &DatabaseConnection, id: Uuid) -> AppResult<accounts::Model> {
    Accounts::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Compte introuvable"))
}

/// Copie le corps de la requête dans le modèle actif (création ou mise à jour)
fn apply_request(active: &mut accounts::ActiveModel, body: &AccountRequest) {
    active.code_compte = Set(body.code_compte.trim().to_string());
    active.nom_compte = Set(body.nom_compte.trim().to_string());
    active.type_compte = Set(body.type_compte);
    active.solde_initial = Set(body.solde_initial);
    active.actif = Set(body.actif.unwrap_or(true));
    active.address = Set(trimmed(&body.address));
    active.n_carte_identite = Set(trimmed(&body.n_carte_identite));
    active.nif = Set(trimmed(&body.nif));
    active.nis = Set(trimmed(&body.nis));
    active.rc = Set(trimmed(&body.rc));
    active.ai = Set(trimmed(&body.ai));
    active.updated_at = Set(Utc::now().naive_utc());
}

/// GET /api/accounts?search=
#[get("")]
pub async fn list_accounts(
    _auth: AuthUser,
    query: web::Query<SearchQuery>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let accounts = Accounts::find()
        .order_by_asc(accounts::Column::NomCompte)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(filters::filter_accounts(accounts, &query.search)))
}

/// GET /api/accounts/balances - soldes calculés de tous les comptes
#[get("/balances")]
pub async fn list_balances(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(LedgerService::balances(db.get_ref()).await?))
}

#[get("/{id}")]
pub async fn get_account(
    _auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(find_account(db.get_ref(), path.into_inner()).await?))
}

#[get("/{id}/balance")]
pub async fn get_balance(
    _auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let balance = LedgerService::balance_for(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[post("")]
pub async fn create_account(
    auth: AuthUser,
    body: web::Json<AccountRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    body.validate()?;

    let now = Utc::now().naive_utc();
    let mut active = accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        ..Default::default()
    };
    apply_request(&mut active, &body);

    let account = active.insert(db.get_ref()).await?;
    tracing::info!(account_id = %account.id, code = %account.code_compte, by = %auth.email, "account created");
    Ok(HttpResponse::Created().json(account))
}

#[put("/{id}")]
pub async fn update_account(
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<AccountRequest>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_operator()?;
    body.validate()?;

    let mut active: accounts::ActiveModel = find_account(db.get_ref(), path.into_inner()).await?.into();
    apply_request(&mut active, &body);

    let account = active.update(db.get_ref()).await?;
    tracing::info!(account_id = %account.id, by = %auth.email, "account updated");
    Ok(HttpResponse::Ok().json(account))
}

#[delete("/{id}")]
pub async fn delete_account(
    auth: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    auth.require_manager()?;
    let account = find_account(db.get_ref(), path.into_inner()).await?;

    Accounts::delete_by_id(account.id)
        .exec(db.get_ref())
        .await
        .map_err(|e| AppError::referenced(e, ACCOUNT_IN_USE))?;

    tracing::info!(account_id = %account.id, by = %auth.email, "account deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn accounts_routes(cfg: &mut web::ServiceConfig) {
    // /balances avant /{id}
    cfg.service(
        web::scope("/accounts")
            .service(list_balances)
            .service(list_accounts)
            .service(create_account)
            .service(get_balance)
            .service(get_account)
            .service(update_account)
            .service(delete_account),
    );
}
