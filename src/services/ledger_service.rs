use chrono::{NaiveDate, Utc};
use sea_orm::*;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{accounts, charges, operations, payments};
use crate::services::filters::DateRange;
use crate::services::journal::{self, JournalEntry};
use crate::services::ledger::{self, AccountBalance, DashboardSummary, FinanceTotals, SettlementDraft, Statement};

pub struct LedgerService;

/// Tout ce qu'il faut pour recalculer les soldes (rechargé à chaque requête)
pub struct LedgerSnapshot {
    pub accounts: Vec<accounts::Model>,
    pub operations: Vec<operations::Model>,
    pub payments: Vec<payments::Model>,
    pub charges: Vec<charges::Model>,
}

impl LedgerSnapshot {
    pub fn balances(&self) -> Vec<AccountBalance> {
        let postings = ledger::postings_from(&self.operations, &self.payments, &self.charges);
        ledger::compute_balances(&self.accounts, &postings)
    }
}

#[derive(Debug, Serialize)]
pub struct FinanceOverview {
    #[serde(flatten)]
    pub totals: FinanceTotals,
    pub balances: Vec<AccountBalance>,
}

impl LedgerService {
    pub async fn load(db: &DatabaseConnection) -> Result<LedgerSnapshot, DbErr> {
        // requêtes indépendantes, lancées en parallèle
        let (accounts, operations, payments, charges) = futures::try_join!(
            accounts::Entity::find().order_by_asc(accounts::Column::NomCompte).all(db),
            operations::Entity::find().all(db),
            payments::Entity::find().all(db),
            charges::Entity::find().all(db),
        )?;

        Ok(LedgerSnapshot {
            accounts,
            operations,
            payments,
            charges,
        })
    }

    pub async fn balances(db: &DatabaseConnection) -> AppResult<Vec<AccountBalance>> {
        Ok(Self::load(db).await?.balances())
    }

    pub async fn balance_for(db: &DatabaseConnection, account_id: Uuid) -> AppResult<AccountBalance> {
        Self::balances(db)
            .await?
            .into_iter()
            .find(|b| b.account_id == account_id)
            .ok_or_else(|| AppError::not_found("Compte introuvable"))
    }

    pub async fn statement(
        db: &DatabaseConnection,
        account_id: Uuid,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> AppResult<Statement> {
        DateRange::new(date_from, date_to)?;

        let snapshot = Self::load(db).await?;
        let account = snapshot
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .ok_or_else(|| AppError::not_found("Compte introuvable"))?;

        let postings = ledger::postings_from(&snapshot.operations, &snapshot.payments, &snapshot.charges);
        Ok(ledger::build_statement(account, &postings, date_from, date_to))
    }

    pub async fn finance_overview(db: &DatabaseConnection) -> AppResult<FinanceOverview> {
        let balances = Self::balances(db).await?;
        Ok(FinanceOverview {
            totals: ledger::finance_totals(&balances),
            balances,
        })
    }

    pub async fn settlement(db: &DatabaseConnection, account_id: Uuid) -> AppResult<SettlementDraft> {
        let balance = Self::balance_for(db, account_id).await?;
        if balance.solde_actuel.is_zero() {
            return Err(AppError::validation("Ce compte est déjà soldé"));
        }
        Ok(ledger::settlement_draft(&balance, Utc::now().date_naive()))
    }

    pub async fn dashboard(db: &DatabaseConnection) -> AppResult<DashboardSummary> {
        let snapshot = Self::load(db).await?;
        let balances = snapshot.balances();

        Ok(ledger::dashboard_summary(
            &snapshot.accounts,
            &snapshot.operations,
            &snapshot.payments,
            &snapshot.charges,
            &balances,
        ))
    }

    pub async fn journal(db: &DatabaseConnection) -> AppResult<Vec<JournalEntry>> {
        let snapshot = Self::load(db).await?;
        Ok(journal::merge_entries(
            &snapshot.accounts,
            &snapshot.operations,
            &snapshot.payments,
            &snapshot.charges,
        ))
    }
}
