// Stock : véhicules reçus mais pas encore vendus (rapprochement par châssis)
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

use crate::models::operations::Model as Operation;

/// Statistiques du parc
#[derive(Debug, Clone, PartialEq)]
pub struct StockStats {
    pub count: usize,
    pub total_value: Decimal,
}

/// Ensemble des numéros de châssis déjà livrés (vendus)
pub fn sold_vins(operations: &[Operation]) -> HashSet<&str> {
    operations
        .iter()
        .filter(|op| op.is_livraison())
        .filter_map(|op| op.chassis())
        .collect()
}

/// Réceptions dont le châssis n'apparaît dans aucune livraison.
/// Une réception sans châssis ne peut pas être rapprochée : elle n'est pas listée.
pub fn available_stock(operations: &[Operation]) -> Vec<&Operation> {
    let sold = sold_vins(operations);

    operations
        .iter()
        .filter(|op| op.is_reception())
        .filter(|op| matches!(op.chassis(), Some(vin) if !sold.contains(vin)))
        .collect()
}

/// Vrai si une réception (autre que `except`) porte déjà ce châssis, vendu ou non
pub fn is_received(operations: &[Operation], vin: &str, except: Option<Uuid>) -> bool {
    let vin = vin.trim();
    operations
        .iter()
        .filter(|op| op.is_reception() && Some(op.id) != except)
        .any(|op| op.chassis() == Some(vin))
}

/// Modèles disponibles ("marque modele"), triés et sans doublon
pub fn available_models(stock: &[&Operation]) -> Vec<String> {
    stock
        .iter()
        .map(|op| op.model_label())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn stock_stats(stock: &[&Operation]) -> StockStats {
    StockStats {
        count: stock.len(),
        total_value: stock.iter().map(|op| op.montant).sum(),
    }
}

/// Commission stockée si non nulle, sinon prix de vente - prix d'achat de base
pub fn effective_commission(op: &Operation) -> Decimal {
    match op.commission {
        Some(c) if !c.is_zero() => c,
        _ => op.prix_unitaire.unwrap_or(Decimal::ZERO) - op.prix_achat.unwrap_or(Decimal::ZERO),
    }
}

/// PRIX D'ACHAT = PRIX DE BASE + COMMISSION, donc base = total - commission
pub fn base_price(total: Decimal, commission: Decimal) -> Decimal {
    total - commission
}

/// Recherche texte sur marque / modèle / châssis
pub fn matches_vehicle(op: &Operation, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [&op.marque, &op.modele, &op.numero_chassis]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| v.to_lowercase().contains(&needle)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::operations::TypeOperation;
    use chrono::NaiveDate;

    pub(crate) fn operation(
        type_operation: TypeOperation,
        vin: Option<&str>,
        montant: i64,
    ) -> Operation {
        Operation {
            id: Uuid::new_v4(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
            date_operation: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            type_operation,
            account_id: Uuid::new_v4(),
            montant: Decimal::from(montant),
            quantite: 1,
            marque: Some("Renault".to_string()),
            modele: Some("Clio 5".to_string()),
            numero_chassis: vin.map(str::to_string),
            prix_achat: None,
            prix_vente: None,
            prix_unitaire: Some(Decimal::from(montant)),
            commission: None,
        }
    }

    #[test]
    fn test_stock_excludes_sold_vins() {
        let ops = vec![
            operation(TypeOperation::Reception, Some("VF1AAA"), 1_000),
            operation(TypeOperation::Reception, Some("VF1BBB"), 2_000),
            operation(TypeOperation::Livraison, Some("VF1AAA"), 1_000),
        ];

        let stock = available_stock(&ops);
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].chassis(), Some("VF1BBB"));
    }

    #[test]
    fn test_is_received_covers_sold_vehicles() {
        let ops = vec![
            operation(TypeOperation::Reception, Some("VF1AAA"), 1_000),
            operation(TypeOperation::Livraison, Some("VF1AAA"), 1_000),
            operation(TypeOperation::Livraison, Some("VF1ZZZ"), 1_000),
        ];

        assert!(is_received(&ops, " VF1AAA ", None));
        assert!(!is_received(&ops, "VF1AAA", Some(ops[0].id)));
        // une livraison seule ne compte pas comme réception
        assert!(!is_received(&ops, "VF1ZZZ", None));
    }

    #[test]
    fn test_reception_without_vin_is_not_listed() {
        let ops = vec![
            operation(TypeOperation::Reception, None, 1_000),
            operation(TypeOperation::Reception, Some("   "), 1_000),
            operation(TypeOperation::Reception, Some("VF1CCC"), 1_500),
        ];

        let stock = available_stock(&ops);
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].chassis(), Some("VF1CCC"));
    }

    #[test]
    fn test_vin_match_ignores_surrounding_spaces() {
        let ops = vec![
            operation(TypeOperation::Reception, Some("VF1DDD "), 1_000),
            operation(TypeOperation::Livraison, Some(" VF1DDD"), 1_000),
        ];
        assert!(available_stock(&ops).is_empty());
    }

    #[test]
    fn test_stats_and_models() {
        let mut peugeot = operation(TypeOperation::Reception, Some("VF3AAA"), 3_000);
        peugeot.marque = Some("Peugeot".to_string());
        peugeot.modele = Some("208".to_string());

        let ops = vec![
            operation(TypeOperation::Reception, Some("VF1AAA"), 1_000),
            operation(TypeOperation::Reception, Some("VF1BBB"), 2_000),
            peugeot,
        ];
        let stock = available_stock(&ops);

        let stats = stock_stats(&stock);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_value, Decimal::from(6_000));

        assert_eq!(available_models(&stock), vec!["Peugeot 208".to_string(), "Renault Clio 5".to_string()]);
    }

    #[test]
    fn test_effective_commission_fallback() {
        let mut sale = operation(TypeOperation::Livraison, Some("VF1AAA"), 1_200);
        sale.prix_achat = Some(Decimal::from(1_000));

        sale.commission = None;
        assert_eq!(effective_commission(&sale), Decimal::from(200));

        sale.commission = Some(Decimal::ZERO);
        assert_eq!(effective_commission(&sale), Decimal::from(200));

        sale.commission = Some(Decimal::from(150));
        assert_eq!(effective_commission(&sale), Decimal::from(150));
    }

    #[test]
    fn test_base_price() {
        assert_eq!(base_price(Decimal::from(2_500_000), Decimal::from(100_000)), Decimal::from(2_400_000));
    }

    #[test]
    fn test_matches_vehicle() {
        let op = operation(TypeOperation::Reception, Some("VF1XYZ"), 1_000);
        assert!(matches_vehicle(&op, "clio"));
        assert!(matches_vehicle(&op, "xyz"));
        assert!(!matches_vehicle(&op, "peugeot"));
    }
}
