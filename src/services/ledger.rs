// Grand livre : soldes, relevés et tableau de bord calculés en mémoire
//
// Convention de signe (solde interne d'un compte) :
//   reception     +montant  (on doit au fournisseur)
//   livraison     -montant  (le client nous doit)
//   charge        +montant  (dépense facturée par le tiers)
//   encaissement  +montant  (le client règle sa dette)
//   decaissement  -montant  (on règle le fournisseur)
//
// Un client qui nous doit de l'argent a donc un solde NÉGATIF, affiché comme
// un montant dû positif.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::accounts::{Model as Account, TypeCompte};
use crate::models::charges::Model as Charge;
use crate::models::operations::{Model as Operation, TypeOperation};
use crate::models::payments::{ModePaiement, Model as Payment, TypePaiement};
use crate::services::stock;
use crate::utils::format::calculate_percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingKind {
    Reception,
    Livraison,
    Encaissement,
    Decaissement,
    Charge,
}

impl PostingKind {
    fn sign(self) -> Decimal {
        match self {
            PostingKind::Reception | PostingKind::Charge | PostingKind::Encaissement => Decimal::ONE,
            PostingKind::Livraison | PostingKind::Decaissement => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Une ligne signée du grand livre d'un compte
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub kind: PostingKind,
    pub montant: Decimal, // déjà signé
    pub libelle: String,
}

impl Posting {
    fn new(
        id: Uuid,
        account_id: Uuid,
        date: NaiveDate,
        created_at: NaiveDateTime,
        kind: PostingKind,
        amount: Decimal,
        libelle: String,
    ) -> Self {
        Self {
            id,
            account_id,
            date,
            created_at,
            kind,
            montant: kind.sign() * amount,
            libelle,
        }
    }
}

pub fn postings_from(operations: &[Operation], payments: &[Payment], charges: &[Charge]) -> Vec<Posting> {
    let mut postings = Vec::with_capacity(operations.len() + payments.len() + charges.len());

    for op in operations {
        let kind = match op.type_operation {
            TypeOperation::Reception => PostingKind::Reception,
            TypeOperation::Livraison => PostingKind::Livraison,
        };
        let libelle = match op.chassis() {
            Some(vin) => format!("{} - VIN: {}", op.model_label(), vin),
            None => op.model_label(),
        };
        postings.push(Posting::new(op.id, op.account_id, op.date_operation, op.created_at, kind, op.montant, libelle));
    }

    for p in payments {
        let kind = match p.type_paiement {
            TypePaiement::Encaissement => PostingKind::Encaissement,
            TypePaiement::Decaissement => PostingKind::Decaissement,
        };
        let libelle = if !p.reference.is_empty() { p.reference.clone() } else { p.description.clone() };
        postings.push(Posting::new(p.id, p.account_id, p.date_paiement, p.created_at, kind, p.montant, libelle));
    }

    for c in charges {
        postings.push(Posting::new(
            c.id,
            c.account_id,
            c.date_charge,
            c.created_at,
            PostingKind::Charge,
            c.montant,
            c.description.clone(),
        ));
    }

    postings
}

// ---------------------------------------------------------------------------
// Soldes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub code_compte: String,
    pub nom_compte: String,
    pub type_compte: TypeCompte,
    pub solde_initial: Decimal,
    pub total_mouvements: Decimal,
    pub solde_actuel: Decimal,
    pub derniere_operation: Option<NaiveDate>,
    pub actif: bool,
}

impl AccountBalance {
    /// Créance : un client qui nous doit de l'argent
    pub fn is_creance(&self) -> bool {
        self.type_compte == TypeCompte::Client && self.solde_actuel < Decimal::ZERO
    }

    /// Dette : un fournisseur à qui l'on doit de l'argent
    pub fn is_dette(&self) -> bool {
        self.type_compte == TypeCompte::Fournisseur && self.solde_actuel > Decimal::ZERO
    }

    /// Montant dû affiché (toujours positif)
    pub fn amount_due(&self) -> Decimal {
        self.solde_actuel.abs()
    }
}

pub fn compute_balances(accounts: &[Account], postings: &[Posting]) -> Vec<AccountBalance> {
    let mut movements: HashMap<Uuid, (Decimal, Option<NaiveDate>)> = HashMap::new();

    for posting in postings {
        let entry = movements.entry(posting.account_id).or_insert((Decimal::ZERO, None));
        entry.0 += posting.montant;
        entry.1 = entry.1.max(Some(posting.date));
    }

    let mut balances: Vec<AccountBalance> = accounts
        .iter()
        .map(|account| {
            let (total, last) = movements.get(&account.id).copied().unwrap_or((Decimal::ZERO, None));
            AccountBalance {
                account_id: account.id,
                code_compte: account.code_compte.clone(),
                nom_compte: account.nom_compte.clone(),
                type_compte: account.type_compte,
                solde_initial: account.solde_initial,
                total_mouvements: total,
                solde_actuel: account.solde_initial + total,
                derniere_operation: last,
                actif: account.actif,
            }
        })
        .collect();

    balances.sort_by(|a, b| a.nom_compte.cmp(&b.nom_compte));
    balances
}

// ---------------------------------------------------------------------------
// Relevé de compte
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    pub transaction_id: Uuid,
    pub date_operation: NaiveDate,
    pub type_operation: PostingKind,
    pub libelle: String,
    pub montant: Decimal,
    pub solde_cumule: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub account_id: Uuid,
    pub code_compte: String,
    pub nom_compte: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub solde_ouverture: Decimal,
    pub solde_cloture: Decimal,
    pub lines: Vec<StatementLine>,
}

/// Le solde d'ouverture reprend tout ce qui précède date_from ;
/// les lignes après date_to sont ignorées.
pub fn build_statement(
    account: &Account,
    postings: &[Posting],
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> Statement {
    let mut own: Vec<&Posting> = postings.iter().filter(|p| p.account_id == account.id).collect();
    own.sort_by(|a, b| (a.date, a.created_at, a.id).cmp(&(b.date, b.created_at, b.id)));

    let carried: Decimal = own
        .iter()
        .filter(|p| date_from.is_some_and(|from| p.date < from))
        .map(|p| p.montant)
        .sum();
    let solde_ouverture = account.solde_initial + carried;

    let mut running = solde_ouverture;
    let lines: Vec<StatementLine> = own
        .into_iter()
        .filter(|p| date_from.is_none_or(|from| p.date >= from))
        .filter(|p| date_to.is_none_or(|to| p.date <= to))
        .map(|p| {
            running += p.montant;
            StatementLine {
                transaction_id: p.id,
                date_operation: p.date,
                type_operation: p.kind,
                libelle: p.libelle.clone(),
                montant: p.montant,
                solde_cumule: running,
            }
        })
        .collect();

    Statement {
        account_id: account.id,
        code_compte: account.code_compte.clone(),
        nom_compte: account.nom_compte.clone(),
        date_from,
        date_to,
        solde_ouverture,
        solde_cloture: running,
        lines,
    }
}

// ---------------------------------------------------------------------------
// Finance / Tableau de bord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceTotals {
    pub total_creances: Decimal, // ce que les clients nous doivent
    pub total_dettes: Decimal,   // ce que l'on doit aux fournisseurs
}

pub fn finance_totals(balances: &[AccountBalance]) -> FinanceTotals {
    FinanceTotals {
        total_creances: balances.iter().filter(|b| b.is_creance()).map(|b| b.amount_due()).sum(),
        total_dettes: balances.iter().filter(|b| b.is_dette()).map(|b| b.solde_actuel).sum(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_commissions: Decimal,
    pub total_sales: Decimal,
    pub commission_rate: Decimal, // % des ventes, arrondi
    pub total_receptions: Decimal,
    pub total_client_due: Decimal,
    pub total_payments: Decimal,
    pub total_charges: Decimal,
    pub total_balance: Decimal,
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub stock_count: usize,
    pub stock_value: Decimal,
}

pub fn dashboard_summary(
    accounts: &[Account],
    operations: &[Operation],
    payments: &[Payment],
    charges: &[Charge],
    balances: &[AccountBalance],
) -> DashboardSummary {
    let livraisons = || operations.iter().filter(|op| op.is_livraison());
    let stock_items = stock::available_stock(operations);
    let stats = stock::stock_stats(&stock_items);
    let total_commissions: Decimal = livraisons().map(stock::effective_commission).sum();
    let total_sales: Decimal = livraisons().map(|op| op.montant).sum();

    DashboardSummary {
        total_commissions,
        total_sales,
        commission_rate: calculate_percentage(total_commissions, total_sales),
        total_receptions: operations.iter().filter(|op| op.is_reception()).map(|op| op.montant).sum(),
        total_client_due: finance_totals(balances).total_creances,
        total_payments: payments.iter().map(|p| p.montant).sum(),
        total_charges: charges.iter().map(|c| c.montant).sum(),
        total_balance: balances.iter().map(|b| b.solde_actuel).sum(),
        total_accounts: accounts.len(),
        active_accounts: accounts.iter().filter(|a| a.actif).count(),
        stock_count: stats.count,
        stock_value: stats.total_value,
    }
}

/// Paiement proposé pour solder un compte en totalité (non enregistré)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementDraft {
    pub account_id: Uuid,
    pub date_paiement: NaiveDate,
    pub type_paiement: TypePaiement,
    pub montant: Decimal,
    pub mode_paiement: ModePaiement,
    pub reference: String,
    pub description: String,
}

pub fn settlement_draft(balance: &AccountBalance, today: NaiveDate) -> SettlementDraft {
    let type_paiement = if balance.type_compte == TypeCompte::Client {
        TypePaiement::Encaissement
    } else {
        TypePaiement::Decaissement
    };

    SettlementDraft {
        account_id: balance.account_id,
        date_paiement: today,
        type_paiement,
        montant: balance.amount_due(),
        mode_paiement: ModePaiement::Especes,
        reference: "Règlement Solde".to_string(),
        description: format!("Règlement total du solde pour {}", balance.nom_compte),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::stock::tests::operation;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    pub(crate) fn account(nom: &str, type_compte: TypeCompte, solde_initial: i64) -> Account {
        let now = date(1).and_hms_opt(0, 0, 0).unwrap();
        Account {
            id: Uuid::new_v4(),
            code_compte: nom.to_uppercase(),
            nom_compte: nom.to_string(),
            type_compte,
            solde_initial: Decimal::from(solde_initial),
            actif: true,
            address: None,
            n_carte_identite: None,
            nif: None,
            nis: None,
            rc: None,
            ai: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn payment(account_id: Uuid, type_paiement: TypePaiement, montant: i64, day: u32) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            account_id,
            date_paiement: date(day),
            montant: Decimal::from(montant),
            type_paiement,
            mode_paiement: ModePaiement::Virement,
            reference: format!("VIR-{}", day),
            description: String::new(),
            operation_id: None,
            created_at: date(day).and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn charge(account_id: Uuid, montant: i64, day: u32) -> Charge {
        let at = date(day).and_hms_opt(10, 0, 0).unwrap();
        Charge {
            id: Uuid::new_v4(),
            account_id,
            date_charge: date(day),
            description: "Transport".to_string(),
            montant: Decimal::from(montant),
            created_at: at,
            updated_at: at,
        }
    }

    fn op_on(account_id: Uuid, type_operation: TypeOperation, vin: &str, montant: i64, day: u32) -> Operation {
        let mut op = operation(type_operation, Some(vin), montant);
        op.account_id = account_id;
        op.date_operation = date(day);
        op
    }

    #[test]
    fn test_client_owing_money_is_negative() {
        let client = account("Client A", TypeCompte::Client, 0);
        let ops = vec![op_on(client.id, TypeOperation::Livraison, "VIN1", 1_500_000, 5)];
        let postings = postings_from(&ops, &[], &[]);

        let balances = compute_balances(std::slice::from_ref(&client), &postings);
        let balance = &balances[0];

        assert_eq!(balance.solde_actuel, Decimal::from(-1_500_000));
        assert!(balance.is_creance());
        assert_eq!(balance.amount_due(), Decimal::from(1_500_000));
        assert_eq!(balance.derniere_operation, Some(date(5)));
    }

    #[test]
    fn test_payments_settle_balances() {
        let client = account("Client A", TypeCompte::Client, 0);
        let supplier = account("Fournisseur B", TypeCompte::Fournisseur, 0);
        let ops = vec![
            op_on(supplier.id, TypeOperation::Reception, "VIN1", 1_000_000, 2),
            op_on(client.id, TypeOperation::Livraison, "VIN1", 1_000_000, 4),
        ];
        let payments = vec![
            payment(client.id, TypePaiement::Encaissement, 1_000_000, 6),
            payment(supplier.id, TypePaiement::Decaissement, 400_000, 7),
        ];
        let postings = postings_from(&ops, &payments, &[]);
        let balances = compute_balances(&[client.clone(), supplier.clone()], &postings);

        let by_id = |id: Uuid| balances.iter().find(|b| b.account_id == id).unwrap();
        assert_eq!(by_id(client.id).solde_actuel, Decimal::ZERO);
        assert_eq!(by_id(supplier.id).solde_actuel, Decimal::from(600_000));
        assert!(by_id(supplier.id).is_dette());

        let totals = finance_totals(&balances);
        assert_eq!(totals.total_creances, Decimal::ZERO);
        assert_eq!(totals.total_dettes, Decimal::from(600_000));
    }

    #[test]
    fn test_charges_and_opening_balance() {
        let supplier = account("Transporteur", TypeCompte::Fournisseur, 50_000);
        let charges = vec![charge(supplier.id, 20_000, 3)];
        let postings = postings_from(&[], &[], &charges);

        let balances = compute_balances(std::slice::from_ref(&supplier), &postings);
        assert_eq!(balances[0].total_mouvements, Decimal::from(20_000));
        assert_eq!(balances[0].solde_actuel, Decimal::from(70_000));
    }

    #[test]
    fn test_balances_sorted_by_name_and_untouched_accounts_kept() {
        let accounts = vec![
            account("Zeta", TypeCompte::Interne, 10),
            account("Alpha", TypeCompte::Client, 0),
        ];
        let balances = compute_balances(&accounts, &[]);

        assert_eq!(balances[0].nom_compte, "Alpha");
        assert_eq!(balances[1].solde_actuel, Decimal::from(10));
        assert_eq!(balances[1].derniere_operation, None);
    }

    #[test]
    fn test_statement_running_balance() {
        let client = account("Client A", TypeCompte::Client, 100);
        let ops = vec![
            op_on(client.id, TypeOperation::Livraison, "VIN1", 1_000, 2),
            op_on(client.id, TypeOperation::Livraison, "VIN2", 500, 10),
        ];
        let payments = vec![
            payment(client.id, TypePaiement::Encaissement, 300, 5),
            payment(client.id, TypePaiement::Encaissement, 200, 20),
        ];
        let postings = postings_from(&ops, &payments, &[]);

        let statement = build_statement(&client, &postings, Some(date(5)), Some(date(15)));

        // Ouverture = 100 - 1000 (livraison du 2, avant la période)
        assert_eq!(statement.solde_ouverture, Decimal::from(-900));
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.lines[0].type_operation, PostingKind::Encaissement);
        assert_eq!(statement.lines[0].solde_cumule, Decimal::from(-600));
        assert_eq!(statement.lines[1].montant, Decimal::from(-500));
        assert_eq!(statement.lines[1].solde_cumule, Decimal::from(-1_100));
        assert_eq!(statement.solde_cloture, Decimal::from(-1_100));
    }

    #[test]
    fn test_statement_without_window_matches_balance() {
        let client = account("Client A", TypeCompte::Client, 0);
        let other = account("Client B", TypeCompte::Client, 0);
        let ops = vec![
            op_on(client.id, TypeOperation::Livraison, "VIN1", 1_000, 2),
            op_on(other.id, TypeOperation::Livraison, "VIN2", 9_999, 3),
        ];
        let postings = postings_from(&ops, &[payment(client.id, TypePaiement::Encaissement, 250, 4)], &[]);

        let statement = build_statement(&client, &postings, None, None);
        let balances = compute_balances(std::slice::from_ref(&client), &postings);

        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.solde_cloture, balances[0].solde_actuel);
    }

    #[test]
    fn test_dashboard_summary() {
        let client = account("Client A", TypeCompte::Client, 0);
        let supplier = account("Fournisseur B", TypeCompte::Fournisseur, 0);

        let mut sale = op_on(client.id, TypeOperation::Livraison, "VIN1", 1_200, 4);
        sale.prix_achat = Some(Decimal::from(1_000));
        sale.prix_unitaire = Some(Decimal::from(1_200));

        let ops = vec![
            op_on(supplier.id, TypeOperation::Reception, "VIN1", 1_200, 2),
            op_on(supplier.id, TypeOperation::Reception, "VIN2", 800, 3),
            sale,
        ];
        let payments = vec![payment(client.id, TypePaiement::Encaissement, 200, 5)];
        let charges = vec![charge(supplier.id, 50, 6)];
        let accounts = vec![client, supplier];
        let balances = compute_balances(&accounts, &postings_from(&ops, &payments, &charges));

        let summary = dashboard_summary(&accounts, &ops, &payments, &charges, &balances);
        assert_eq!(summary.total_commissions, Decimal::from(200));
        assert_eq!(summary.total_sales, Decimal::from(1_200));
        assert_eq!(summary.commission_rate, Decimal::from(17));
        assert_eq!(summary.total_receptions, Decimal::from(2_000));
        assert_eq!(summary.total_client_due, Decimal::from(1_000));
        assert_eq!(summary.total_payments, Decimal::from(200));
        assert_eq!(summary.total_charges, Decimal::from(50));
        assert_eq!(summary.total_accounts, 2);
        assert_eq!(summary.stock_count, 1);
        assert_eq!(summary.stock_value, Decimal::from(800));
    }

    #[test]
    fn test_settlement_draft() {
        let client = account("Client A", TypeCompte::Client, -700);
        let balances = compute_balances(std::slice::from_ref(&client), &[]);

        let draft = settlement_draft(&balances[0], date(9));
        assert_eq!(draft.type_paiement, TypePaiement::Encaissement);
        assert_eq!(draft.montant, Decimal::from(700));
        assert_eq!(draft.mode_paiement, ModePaiement::Especes);
        assert_eq!(draft.description, "Règlement total du solde pour Client A");

        let supplier = account("Fournisseur", TypeCompte::Fournisseur, 300);
        let balances = compute_balances(std::slice::from_ref(&supplier), &[]);
        assert_eq!(settlement_draft(&balances[0], date(9)).type_paiement, TypePaiement::Decaissement);
    }
}
