// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - accounts : Comptes tiers (clients, fournisseurs, internes)
//   - operations : Réceptions (achats) et livraisons (ventes) de véhicules
//   - payments : Encaissements / décaissements
//   - charges : Dépenses rattachées à un compte
//   - vehicle_definitions : Catalogue marque/modèle (vehicules_ref)
//   - company_settings : Coordonnées légales de la société
//   - users : Utilisateurs et rôles (admin, manager, operateur, viewer)
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Tous les identifiants sont des UUID v4 générés côté Rust
//   - Les soldes et relevés ne sont pas des tables : voir services::ledger
//   - Les montants sont des Decimal (DA), jamais des f64
//
// ============================================================================

pub mod health;
pub mod accounts;
pub mod operations;
pub mod payments;
pub mod charges;
pub mod vehicle_definitions;
pub mod company_settings;
pub mod users;
pub mod dto;
