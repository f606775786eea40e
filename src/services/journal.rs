// Journal unifié : opérations + paiements + charges, du plus récent au plus ancien
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::accounts::Model as Account;
use crate::models::charges::Model as Charge;
use crate::models::operations::{Model as Operation, TypeOperation};
use crate::models::payments::{Model as Payment, TypePaiement};
use crate::services::stock::effective_commission;

const UNKNOWN_ACCOUNT: &str = "Inconnu";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub original_type: String, // reception, livraison, encaissement, decaissement, charge
    pub display_type: String,
    pub account_id: Uuid,
    pub account_name: String,
    pub description: String,
    pub montant: Decimal,
    pub commission: Decimal, // uniquement pour les ventes
    pub is_credit: bool,     // entrée d'argent (théorique)
}

impl JournalEntry {
    pub fn is_payment(&self) -> bool {
        self.original_type == "encaissement" || self.original_type == "decaissement"
    }
}

pub fn merge_entries(
    accounts: &[Account],
    operations: &[Operation],
    payments: &[Payment],
    charges: &[Charge],
) -> Vec<JournalEntry> {
    let names: HashMap<Uuid, &str> = accounts.iter().map(|a| (a.id, a.nom_compte.as_str())).collect();
    let name_of = |id: &Uuid| names.get(id).copied().unwrap_or(UNKNOWN_ACCOUNT).to_string();

    let mut entries = Vec::with_capacity(operations.len() + payments.len() + charges.len());

    for op in operations {
        let (original_type, display_type, commission) = match op.type_operation {
            TypeOperation::Reception => ("reception", "Réception Stock", Decimal::ZERO),
            TypeOperation::Livraison => ("livraison", "Vente Véhicule", effective_commission(op)),
        };
        entries.push(JournalEntry {
            id: op.id,
            date: op.date_operation,
            original_type: original_type.to_string(),
            display_type: display_type.to_string(),
            account_id: op.account_id,
            account_name: name_of(&op.account_id),
            description: format!("{} - VIN: {}", op.model_label(), op.chassis().unwrap_or("-")),
            montant: op.montant,
            commission,
            is_credit: op.is_livraison(),
        });
    }

    for p in payments {
        let is_encaissement = p.type_paiement == TypePaiement::Encaissement;
        let description = [&p.description, &p.reference]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| "Paiement".to_string());

        entries.push(JournalEntry {
            id: p.id,
            date: p.date_paiement,
            original_type: if is_encaissement { "encaissement" } else { "decaissement" }.to_string(),
            display_type: if is_encaissement { "Encaissement" } else { "Décaissement" }.to_string(),
            account_id: p.account_id,
            account_name: name_of(&p.account_id),
            description,
            montant: p.montant,
            commission: Decimal::ZERO,
            is_credit: is_encaissement,
        });
    }

    for c in charges {
        entries.push(JournalEntry {
            id: c.id,
            date: c.date_charge,
            original_type: "charge".to_string(),
            display_type: "Charge".to_string(),
            account_id: c.account_id,
            account_name: name_of(&c.account_id),
            description: c.description.clone(),
            montant: c.montant,
            commission: Decimal::ZERO,
            is_credit: false,
        });
    }

    // tri stable : à date égale on garde l'ordre opérations / paiements / charges
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::accounts::TypeCompte;
    use crate::services::ledger::tests::{account, payment};
    use crate::services::stock::tests::operation;

    #[test]
    fn test_merge_sorted_descending_with_names() {
        let client = account("Client A", TypeCompte::Client, 0);

        let mut sale = operation(TypeOperation::Livraison, Some("VIN9"), 1_200);
        sale.account_id = client.id;
        sale.prix_achat = Some(Decimal::from(1_000));

        let orphan = operation(TypeOperation::Reception, Some("VIN8"), 900);
        let pay = payment(client.id, TypePaiement::Encaissement, 500, 20);

        let entries = merge_entries(std::slice::from_ref(&client), &[sale, orphan], &[pay], &[]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].original_type, "encaissement"); // mars > janvier
        assert!(entries[0].is_credit);
        assert!(entries[0].is_payment());
        assert_eq!(entries[0].description, "VIR-20");

        let sale_entry = entries.iter().find(|e| e.original_type == "livraison").unwrap();
        assert_eq!(sale_entry.account_name, "Client A");
        assert_eq!(sale_entry.commission, Decimal::from(200));
        assert_eq!(sale_entry.description, "Renault Clio 5 - VIN: VIN9");

        let reception_entry = entries.iter().find(|e| e.original_type == "reception").unwrap();
        assert_eq!(reception_entry.account_name, "Inconnu");
        assert!(!reception_entry.is_credit);
    }
}
