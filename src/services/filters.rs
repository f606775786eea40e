// Filtres de recherche partagés par les listes (recherche texte + période)
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::accounts::Model as Account;
use crate::models::dto::{JournalQuery, OperationQuery, PaymentQuery};
use crate::models::operations::Model as Operation;
use crate::models::payments::{Model as Payment, TypePaiement};
use crate::services::journal::JournalEntry;
use crate::services::stock::matches_vehicle;

/// Période inclusive ; les bornes absentes ne filtrent rien
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AppError::validation(
                    "La date de début doit précéder la date de fin",
                ));
            }
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

/// Recherche vide ou composée d'espaces => pas de filtre
fn needle(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Comptes dont le nom contient la recherche (pour filtrer opérations/paiements)
fn matching_account_ids(accounts: &[Account], lower: &str) -> HashSet<Uuid> {
    accounts
        .iter()
        .filter(|a| a.nom_compte.to_lowercase().contains(lower))
        .map(|a| a.id)
        .collect()
}

/// Nom ou code (insensible à la casse), ou NIF (tel quel)
pub fn filter_accounts(accounts: Vec<Account>, search: &Option<String>) -> Vec<Account> {
    let Some(raw) = needle(search) else {
        return accounts;
    };
    let lower = raw.to_lowercase();

    accounts
        .into_iter()
        .filter(|a| {
            a.nom_compte.to_lowercase().contains(&lower)
                || a.code_compte.to_lowercase().contains(&lower)
                || a.nif.as_deref().is_some_and(|nif| nif.contains(&raw))
        })
        .collect()
}

pub fn filter_operations(
    operations: Vec<Operation>,
    accounts: &[Account],
    query: &OperationQuery,
) -> AppResult<Vec<Operation>> {
    let range = DateRange::new(query.date_from, query.date_to)?;
    let search = needle(&query.search).map(|s| s.to_lowercase());
    let account_ids = search
        .as_deref()
        .map(|s| matching_account_ids(accounts, s))
        .unwrap_or_default();

    Ok(operations
        .into_iter()
        .filter(|op| range.contains(op.date_operation))
        .filter(|op| match &search {
            None => true,
            Some(s) => matches_vehicle(op, s) || account_ids.contains(&op.account_id),
        })
        .collect())
}

pub fn filter_payments(
    payments: Vec<Payment>,
    accounts: &[Account],
    query: &PaymentQuery,
) -> AppResult<Vec<Payment>> {
    let range = DateRange::new(query.date_from, query.date_to)?;
    let direction = match query.type_paiement.as_deref() {
        None | Some("") | Some("all") => None,
        Some("encaissement") => Some(TypePaiement::Encaissement),
        Some("decaissement") => Some(TypePaiement::Decaissement),
        Some(other) => {
            return Err(AppError::validation(format!("Type de paiement inconnu : {}", other)));
        }
    };
    let search = needle(&query.search).map(|s| s.to_lowercase());
    let account_ids = search
        .as_deref()
        .map(|s| matching_account_ids(accounts, s))
        .unwrap_or_default();

    Ok(payments
        .into_iter()
        .filter(|p| range.contains(p.date_paiement))
        .filter(|p| direction.is_none_or(|d| p.type_paiement == d))
        .filter(|p| match &search {
            None => true,
            Some(s) => {
                account_ids.contains(&p.account_id)
                    || p.description.to_lowercase().contains(s)
                    || p.reference.to_lowercase().contains(s)
            }
        })
        .collect())
}

pub fn filter_journal(entries: Vec<JournalEntry>, query: &JournalQuery) -> AppResult<Vec<JournalEntry>> {
    let range = DateRange::new(query.date_from, query.date_to)?;
    let search = needle(&query.search).map(|s| s.to_lowercase());
    let entry_type = query.entry_type.as_deref().unwrap_or("all");

    if !matches!(entry_type, "all" | "reception" | "livraison" | "paiement" | "charge") {
        return Err(AppError::validation(format!("Type d'écriture inconnu : {}", entry_type)));
    }

    Ok(entries
        .into_iter()
        .filter(|e| range.contains(e.date))
        .filter(|e| query.account_id.is_none_or(|id| e.account_id == id))
        .filter(|e| match &search {
            None => true,
            Some(s) => e.description.to_lowercase().contains(s) || e.account_name.to_lowercase().contains(s),
        })
        .filter(|e| match entry_type {
            "all" => true,
            "paiement" => e.is_payment(),
            other => e.original_type == other,
        })
        .collect())
}
