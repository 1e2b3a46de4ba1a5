//! Decides whether an unpaid expense carries forward into a debt.
//!
//! The store invokes [`assess_expense`] before materializing a debt and
//! [`should_retain_expense_debt`] when re-checking debts it materialized
//! earlier. Both are pure; all persistence happens in the caller.

use crate::engine::classify::is_non_debt_category_name;
use crate::engine::due::{clamped_date, days_in_month};
use crate::model::{Debt, Expense, Money};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days past the due date before an unpaid expense converts to a debt.
pub const OVERDUE_GRACE_DAYS: i64 = 5;

/// What a budget plan is for. Only personal plans convert unpaid expenses to
/// debts; seasonal plans (holidays and similar) track spending without
/// carrying anything forward.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    #[default]
    Personal,
    Seasonal,
}

serde_plain::derive_display_from_serialize!(PlanKind);
serde_plain::derive_fromstr_from_deserialize!(PlanKind);

/// Plan-level settings that drive carryover decisions. Built once from the
/// configuration and passed by reference wherever needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CarryoverPolicy {
    /// Default due day-of-month for expenses without an explicit due date.
    pub default_due_day: u32,
    pub grace_days: i64,
    pub plan_kind: PlanKind,
}

impl Default for CarryoverPolicy {
    fn default() -> Self {
        Self {
            default_due_day: 27,
            grace_days: OVERDUE_GRACE_DAYS,
            plan_kind: PlanKind::Personal,
        }
    }
}

/// Why an expense did not convert to a debt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NonPersonalPlan,
    AlreadyPaid,
    Allocation,
    ExemptCategory,
    NothingOutstanding,
    NotYetOverdue,
}

serde_plain::derive_display_from_serialize!(SkipReason);

/// The outcome of assessing one expense for carryover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryoverDecision {
    /// Materialize (or refresh) a debt for the outstanding remainder.
    Convert { remaining: Money },
    Skip(SkipReason),
}

/// The effective due date for an expense: its explicit date when set,
/// otherwise the plan's default due day clamped into the expense month.
pub fn resolve_expense_due_date(
    year: i32,
    month: u32,
    due_date: Option<NaiveDate>,
    default_due_day: u32,
) -> NaiveDate {
    if let Some(date) = due_date {
        return date;
    }
    let month = month.clamp(1, 12);
    let day = default_due_day.clamp(1, days_in_month(year, month));
    clamped_date(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// True once `today` has reached the due date plus the grace window.
fn is_overdue_by_grace(due: NaiveDate, grace_days: i64, today: NaiveDate) -> bool {
    let threshold = due
        .checked_add_signed(Duration::days(grace_days))
        .unwrap_or(due);
    today >= threshold
}

/// Decides whether an unpaid expense should carry forward into a debt.
///
/// `force` bypasses only the overdue check; an allocation or an exempt
/// category never converts, forced or not — that is the hard invariant
/// enforced here, at generation time.
pub fn assess_expense(
    expense: &Expense,
    policy: &CarryoverPolicy,
    today: NaiveDate,
    force: bool,
) -> CarryoverDecision {
    if policy.plan_kind != PlanKind::Personal {
        return CarryoverDecision::Skip(SkipReason::NonPersonalPlan);
    }
    if expense.paid {
        return CarryoverDecision::Skip(SkipReason::AlreadyPaid);
    }
    if expense.is_allocation {
        return CarryoverDecision::Skip(SkipReason::Allocation);
    }
    if is_non_debt_category_name(expense.category_name()) {
        return CarryoverDecision::Skip(SkipReason::ExemptCategory);
    }
    let remaining = expense.remaining();
    if !remaining.is_positive() {
        return CarryoverDecision::Skip(SkipReason::NothingOutstanding);
    }
    let due = resolve_expense_due_date(
        expense.year,
        expense.month,
        expense.due_date,
        policy.default_due_day,
    );
    let overdue = is_overdue_by_grace(due, policy.grace_days, today);
    if !force && !overdue && !expense.has_partial_payment() {
        return CarryoverDecision::Skip(SkipReason::NotYetOverdue);
    }
    CarryoverDecision::Convert { remaining }
}

/// Visibility rule for a debt that was generated from an expense.
///
/// Expense-sourced debts are derived state: when the source expense has been
/// paid, reclassified into an exempt category, turned into an allocation, or
/// is no longer overdue, the debt should be dropped rather than shown as a
/// missed obligation. Debts whose source expense cannot be resolved are kept.
pub fn should_retain_expense_debt(
    debt: &Debt,
    source_expense: Option<&Expense>,
    policy: &CarryoverPolicy,
    today: NaiveDate,
) -> bool {
    let Some(source) = &debt.source else {
        return true;
    };
    if is_non_debt_category_name(source.category_name.as_deref()) {
        return false;
    }
    let Some(expense) = source_expense else {
        return true;
    };
    if expense.is_allocation || expense.paid {
        return false;
    }
    if is_non_debt_category_name(expense.category_name()) {
        return false;
    }
    if !expense.remaining().is_positive() {
        return false;
    }
    let due = resolve_expense_due_date(
        expense.year,
        expense.month,
        expense.due_date,
        policy.default_due_day,
    );
    is_overdue_by_grace(due, policy.grace_days, today) || expense.has_partial_payment()
}
