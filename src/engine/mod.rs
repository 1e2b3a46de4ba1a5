//! The debt derivation engine.
//!
//! Every function in this module tree is a total, synchronous, side-effect-free
//! function over its arguments: given the same inputs, the same output is
//! always produced. Out-of-range numeric input degrades to a sentinel (empty
//! string for dates, zero for money) rather than an error, so callers can
//! treat every operation here as infallible. Persistence and mutation live in
//! the store; the engine only derives.

mod accrual;
mod carryover;
mod classify;
mod due;
mod payment;
mod payoff;
mod summary;

pub use accrual::{
    cycle_key, evaluate_missed_cycle, parse_cycle_key, prev_cycle_key, CycleOutcome,
    PaymentRecord,
};
pub use carryover::{
    assess_expense, resolve_expense_due_date, should_retain_expense_debt, CarryoverDecision,
    CarryoverPolicy, PlanKind, SkipReason, OVERDUE_GRACE_DAYS,
};
pub use classify::is_non_debt_category_name;
pub use due::{
    days_until, default_debt_due_date, default_debt_due_date_iso, due_preview, DuePreview,
    DueUrgency,
};
pub use payment::{debt_monthly_payment, total_monthly_debt_payments};
pub use payoff::{project_payoff, PayoffProjection, DEFAULT_PROJECTION_HORIZON_MONTHS};
pub use summary::{
    days_until_payday, is_near_payday, payment_cycle_key, summarize, DebtSummary,
    NEAR_PAYDAY_DAYS,
};
