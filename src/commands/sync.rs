use crate::commands::Out;
use crate::db::ExpenseDebtDraft;
use crate::engine::{
    assess_expense, evaluate_missed_cycle, should_retain_expense_debt, CarryoverDecision,
};
use crate::model::{Debt, MonthKey};
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

/// What a sync pass changed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CarryoverReport {
    /// Debts whose missed payment cycle closed and accrued.
    pub accrued: Vec<Debt>,
    /// Debts materialized or refreshed from unpaid expenses.
    pub converted: Vec<Debt>,
    /// Ids of stale expense-sourced debts that were dropped.
    pub removed: Vec<String>,
    /// Unpaid expenses that were assessed and skipped.
    pub skipped: usize,
}

/// Runs the full carryover pass:
/// 1. Close missed payment cycles on regular debts (accrue and roll due dates).
/// 2. Convert overdue or part-paid expenses into debts.
/// 3. Drop expense-sourced debts whose source no longer justifies them.
pub async fn sync(config: &Config, force_ids: &[String]) -> Result<Out<CarryoverReport>> {
    let report = sync_plan(config, force_ids, Utc::now()).await?;
    let message = format!(
        "Accrued {} missed cycle(s), converted {} expense(s), removed {} stale debt(s), skipped {}",
        report.accrued.len(),
        report.converted.len(),
        report.removed.len(),
        report.skipped
    );
    Ok(Out::new(message, report))
}

/// The sync pass behind the `sync` command, also run before summaries so
/// derived debt state is current.
pub(crate) async fn sync_plan(
    config: &Config,
    force_ids: &[String],
    now: DateTime<Utc>,
) -> Result<CarryoverReport> {
    let db = config.db();
    let policy = config.policy();
    let today = now.date_naive();
    let mut report = CarryoverReport::default();

    for debt in db.list_debts().await? {
        if debt.is_expense_sourced() {
            continue;
        }
        let payments = db.payments_for_debt(&debt.id).await?;
        if let Some(outcome) = evaluate_missed_cycle(&debt, &payments, policy.grace_days, now) {
            let updated = db.apply_cycle_outcome(&debt.id, &outcome).await?;
            debug!(
                "Cycle closed on '{}': accrued {}, due rolls to {}",
                updated.name, outcome.accrued, outcome.next_due
            );
            report.accrued.push(updated);
        }
    }

    for expense in db.unpaid_expenses().await? {
        let force = force_ids.iter().any(|id| id == &expense.id);
        match assess_expense(&expense, &policy, today, force) {
            CarryoverDecision::Convert { remaining } => {
                let draft = ExpenseDebtDraft {
                    expense_id: expense.id.clone(),
                    month_key: MonthKey::from_number(expense.month).unwrap_or_default(),
                    year: expense.year,
                    category_id: expense.category.as_ref().map(|c| c.id.clone()),
                    category_name: expense.category.as_ref().map(|c| c.name.clone()),
                    expense_name: expense.name.clone(),
                    remaining,
                };
                if let Some(debt) = db.upsert_expense_debt(&draft).await? {
                    debug!("Carried '{}' forward as '{}'", expense.name, debt.name);
                    report.converted.push(debt);
                }
            }
            CarryoverDecision::Skip(reason) => {
                trace!("Skipping expense '{}': {reason}", expense.name);
                report.skipped += 1;
            }
        }
    }

    for debt in db.list_debts().await? {
        let Some(source) = &debt.source else {
            continue;
        };
        let source_expense = db.get_expense(&source.expense_id).await?;
        if !should_retain_expense_debt(&debt, source_expense.as_ref(), &policy, today) {
            db.delete_debt(&debt.id).await?;
            debug!("Dropped stale expense debt '{}'", debt.name);
            report.removed.push(debt.id.clone());
        }
    }

    Ok(report)
}
