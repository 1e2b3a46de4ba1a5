//! Missed-payment accrual for debts with a calendar due date.
//!
//! When a payment cycle closes (due date plus grace window) and less than the
//! planned `amount` was paid during the cycle, the shortfall is added back
//! onto the balance and the due date rolls forward one month. The evaluation
//! is pure; the store applies the outcome.

use crate::engine::due::midnight_utc;
use crate::model::{Debt, Money};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A recorded payment against a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentRecord {
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
}

/// The result of a completed payment cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CycleOutcome {
    /// The unpaid remainder to add onto both balances. May be zero, in which
    /// case only the due date moves.
    pub accrued: Money,
    pub next_due: NaiveDate,
}

/// Adds (or subtracts) whole months, clamping the day into the target month.
pub(crate) fn add_months_clamped(date: NaiveDate, delta: i32) -> NaiveDate {
    let shifted = if delta >= 0 {
        date.checked_add_months(Months::new(delta as u32))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Evaluates whether a debt's current payment cycle has closed unpaid.
///
/// Applies only to regular (non-expense-sourced) debts with a due date and a
/// positive balance. Returns `None` while the cycle is still open. Once `now`
/// is past `due + grace_days`, payments landing in `(due - 1 month, due +
/// grace_days]` count toward the cycle, and the shortfall against `amount`
/// (floored at zero) accrues.
pub fn evaluate_missed_cycle(
    debt: &Debt,
    payments: &[PaymentRecord],
    grace_days: i64,
    now: DateTime<Utc>,
) -> Option<CycleOutcome> {
    if debt.is_expense_sourced() || !debt.current_balance.is_positive() {
        return None;
    }
    let due = debt.due_date?;
    let grace_end = midnight_utc(
        due.checked_add_signed(Duration::days(grace_days))
            .unwrap_or(due),
    );
    if now <= grace_end {
        return None;
    }
    let cycle_start = midnight_utc(add_months_clamped(due, -1));
    let paid: Money = payments
        .iter()
        .filter(|p| p.paid_at > cycle_start && p.paid_at <= grace_end)
        .map(|p| p.amount)
        .sum();
    let accrued = (debt.amount - paid).floor_zero();
    Some(CycleOutcome {
        accrued,
        next_due: add_months_clamped(due, 1),
    })
}

/// The `"YYYY-MM"` payment-cycle key for a date.
pub fn cycle_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// The cycle key for the month before `date`'s month.
pub fn prev_cycle_key(date: NaiveDate) -> String {
    let first = date.with_day(1).unwrap_or(date);
    cycle_key(add_months_clamped(first, -1))
}

/// Parses a `"YYYY-MM"` cycle key into year and month.
pub fn parse_cycle_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DebtSource, DebtType, MonthKey};
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn monthly_debt() -> Debt {
        let mut debt = Debt::new("d1", "Car Loan", DebtType::Loan);
        debt.initial_balance = Money::from(5000);
        debt.current_balance = Money::from(3000);
        debt.amount = Money::from(250);
        debt.due_date = Some(day(2024, 3, 15));
        debt
    }

    fn payment(amount: i64, y: i32, m: u32, d: u32) -> PaymentRecord {
        PaymentRecord {
            amount: Money::from(amount),
            paid_at: instant(y, m, d),
        }
    }

    #[test]
    fn test_open_cycle_is_none() {
        let debt = monthly_debt();
        // Grace ends at midnight on the 20th; noon on the 20th is past it,
        // noon on the 19th is not.
        assert_eq!(
            evaluate_missed_cycle(&debt, &[], 5, instant(2024, 3, 19)),
            None
        );
        assert!(evaluate_missed_cycle(&debt, &[], 5, instant(2024, 3, 20)).is_some());
    }

    #[test]
    fn test_full_shortfall_accrues_and_due_rolls() {
        let debt = monthly_debt();
        let outcome = evaluate_missed_cycle(&debt, &[], 5, instant(2024, 4, 1)).unwrap();
        assert_eq!(outcome.accrued, Money::from(250));
        assert_eq!(outcome.next_due, day(2024, 4, 15));
    }

    #[test]
    fn test_partial_payment_accrues_remainder() {
        let debt = monthly_debt();
        let payments = [payment(100, 2024, 3, 10)];
        let outcome = evaluate_missed_cycle(&debt, &payments, 5, instant(2024, 4, 1)).unwrap();
        assert_eq!(outcome.accrued, Money::from(150));
    }

    #[test]
    fn test_fully_paid_cycle_rolls_without_accrual() {
        let debt = monthly_debt();
        let payments = [payment(250, 2024, 3, 14)];
        let outcome = evaluate_missed_cycle(&debt, &payments, 5, instant(2024, 4, 1)).unwrap();
        assert!(outcome.accrued.is_zero());
        assert_eq!(outcome.next_due, day(2024, 4, 15));
    }

    #[test]
    fn test_payments_outside_cycle_window_do_not_count() {
        let debt = monthly_debt();
        let payments = [
            // Before the previous due date: outside the cycle.
            payment(250, 2024, 2, 14),
            // After the grace window closed.
            payment(250, 2024, 3, 25),
        ];
        let outcome = evaluate_missed_cycle(&debt, &payments, 5, instant(2024, 4, 1)).unwrap();
        assert_eq!(outcome.accrued, Money::from(250));
    }

    #[test]
    fn test_overpayment_floors_at_zero() {
        let debt = monthly_debt();
        let payments = [payment(400, 2024, 3, 10)];
        let outcome = evaluate_missed_cycle(&debt, &payments, 5, instant(2024, 4, 1)).unwrap();
        assert!(outcome.accrued.is_zero());
    }

    #[test]
    fn test_expense_sourced_and_settled_debts_skip() {
        let mut sourced = monthly_debt();
        sourced.source = Some(DebtSource {
            expense_id: "e1".to_string(),
            month_key: MonthKey::March,
            year: 2024,
            ..DebtSource::default()
        });
        assert_eq!(
            evaluate_missed_cycle(&sourced, &[], 5, instant(2024, 4, 1)),
            None
        );

        let mut settled = monthly_debt();
        settled.current_balance = Money::ZERO;
        assert_eq!(
            evaluate_missed_cycle(&settled, &[], 5, instant(2024, 4, 1)),
            None
        );

        let mut no_due = monthly_debt();
        no_due.due_date = None;
        assert_eq!(
            evaluate_missed_cycle(&no_due, &[], 5, instant(2024, 4, 1)),
            None
        );
    }

    #[test]
    fn test_month_end_due_date_clamps_when_rolling() {
        let mut debt = monthly_debt();
        debt.due_date = Some(day(2024, 1, 31));
        let outcome = evaluate_missed_cycle(&debt, &[], 5, instant(2024, 2, 10)).unwrap();
        assert_eq!(outcome.next_due, day(2024, 2, 29));
    }

    #[test]
    fn test_cycle_keys() {
        assert_eq!(cycle_key(day(2024, 2, 29)), "2024-02");
        assert_eq!(prev_cycle_key(day(2024, 1, 15)), "2023-12");
        assert_eq!(parse_cycle_key("2024-02"), Some((2024, 2)));
        assert_eq!(parse_cycle_key("2024-13"), None);
        assert_eq!(parse_cycle_key("24-02"), None);
        assert_eq!(parse_cycle_key("banana"), None);
    }

    #[test]
    fn test_add_months_clamped() {
        assert_eq!(add_months_clamped(day(2024, 1, 31), 1), day(2024, 2, 29));
        assert_eq!(add_months_clamped(day(2024, 3, 31), -1), day(2024, 2, 29));
        assert_eq!(add_months_clamped(day(2024, 12, 15), 1), day(2025, 1, 15));
    }
}
