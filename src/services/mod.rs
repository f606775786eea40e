/*
services/
├─ stock.rs              ← état du parc (réceptions non livrées), commissions
├─ ledger.rs             ← soldes, relevés, créances/dettes, tableau de bord
├─ journal.rs            ← journal unifié opérations / paiements / charges
├─ filters.rs            ← recherche texte + période pour les listes
├─ ledger_service.rs     ← charge les tables puis appelle ledger / journal
├─ operation_service.rs  ← création / modification des réceptions et livraisons
└─ import.rs             ← import du classeur Excel (comptes, journal, charges)
*/
pub mod stock;
pub mod ledger;
pub mod journal;
pub mod filters;
pub mod ledger_service;
pub mod operation_service;
pub mod import;
