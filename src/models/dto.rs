// Data Transfer Objects : corps de requêtes, paramètres de recherche et réponses
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::accounts::TypeCompte;
use crate::models::payments::{ModePaiement, TypePaiement};
use crate::models::users::Role;

// ---------------------------------------------------------------------------
// Comptes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct AccountRequest {
    #[validate(length(min = 1, message = "Le code compte est obligatoire"))]
    pub code_compte: String,
    #[validate(length(min = 1, message = "Le nom du compte est obligatoire"))]
    pub nom_compte: String,
    pub type_compte: TypeCompte,
    #[serde(default)]
    pub solde_initial: Decimal,
    pub actif: Option<bool>,
    pub address: Option<String>,
    pub n_carte_identite: Option<String>,
    pub nif: Option<String>,
    pub nis: Option<String>,
    pub rc: Option<String>,
    pub ai: Option<String>,
}

// ---------------------------------------------------------------------------
// Réceptions / Livraisons
// ---------------------------------------------------------------------------

/// Une réception par numéro de châssis : la quantité = nombre de VIN saisis
#[derive(Debug, Deserialize, Validate)]
pub struct ReceptionRequest {
    pub account_id: Uuid,
    pub date_operation: NaiveDate,
    #[validate(length(min = 1, message = "La marque est obligatoire"))]
    pub marque: String,
    #[validate(length(min = 1, message = "Le modèle est obligatoire"))]
    pub modele: String,
    pub prix_total_achat: Decimal, // ce que l'on paie au fournisseur
    #[serde(default)]
    pub commission: Decimal,
    #[validate(length(min = 1, message = "Au moins un numéro de châssis est requis"))]
    pub vins: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReceptionUpdateRequest {
    pub account_id: Uuid,
    pub date_operation: NaiveDate,
    #[validate(length(min = 1, message = "La marque est obligatoire"))]
    pub marque: String,
    #[validate(length(min = 1, message = "Le modèle est obligatoire"))]
    pub modele: String,
    #[validate(length(min = 1, message = "Le numéro de châssis est obligatoire"))]
    pub numero_chassis: String,
    pub prix_total_achat: Decimal,
    #[serde(default)]
    pub commission: Decimal,
}

/// Vente d'un véhicule du stock ; les prix par défaut viennent de la réception
#[derive(Debug, Deserialize)]
pub struct LivraisonRequest {
    pub account_id: Option<Uuid>,
    pub date_operation: Option<NaiveDate>,
    pub reception_id: Uuid,
    pub prix_unitaire: Option<Decimal>,
    pub prix_achat: Option<Decimal>,
    pub commission: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OperationQuery {
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OperationResponse {
    #[serde(flatten)]
    pub operation: crate::models::operations::Model,
    pub account_name: String,
    pub commission_effective: Decimal,
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StockItem {
    pub reception_id: Uuid,
    pub date_operation: NaiveDate,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub numero_chassis: Option<String>,
    pub montant: Decimal,
    // Visibles uniquement pour manager/admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prix_achat: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub count: usize,
    pub total_value: Decimal,
    pub items: Vec<StockItem>,
}

// ---------------------------------------------------------------------------
// Paiements / Charges
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub account_id: Uuid,
    pub date_paiement: NaiveDate,
    pub type_paiement: TypePaiement,
    pub montant: Decimal,
    pub mode_paiement: ModePaiement,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub description: String,
    pub operation_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub type_paiement: Option<String>, // all, encaissement, decaissement
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChargeRequest {
    pub account_id: Uuid,
    pub date_charge: NaiveDate,
    #[validate(length(min = 1, message = "La description est obligatoire"))]
    pub description: String,
    pub montant: Decimal,
}

// ---------------------------------------------------------------------------
// Relevés / Journal
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct StatementQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalQuery {
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>, // all, reception, livraison, paiement, charge
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    pub file: Option<String>, // nom du fichier, repris dans le rapport
}

// ---------------------------------------------------------------------------
// Catalogue / Société
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct VehicleDefinitionRequest {
    #[validate(length(min = 1, message = "La marque est obligatoire"))]
    pub marque: String,
    #[validate(length(min = 1, message = "Le modèle est obligatoire"))]
    pub modele: String,
    pub reference: Option<String>,
    pub prix_achat_defaut: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanySettingsRequest {
    #[validate(length(min = 1, message = "Le nom de la société est obligatoire"))]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    pub website: Option<String>,
    #[serde(default)]
    pub capital: String,
    #[serde(default)]
    pub rc: String,
    #[serde(default)]
    pub nif: String,
    #[serde(default)]
    pub nis: String,
    #[serde(default)]
    pub ai: String,
}

// ---------------------------------------------------------------------------
// Authentification / Administration des utilisateurs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRoleRequest {
    #[serde(alias = "userId")]
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub last_sign_in: Option<NaiveDateTime>,
}

impl From<crate::models::users::Model> for UserSummary {
    fn from(user: crate::models::users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            last_sign_in: user.last_sign_in,
        }
    }
}
