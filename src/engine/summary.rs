//! Aggregate views across a plan's debts.

use crate::engine::accrual::cycle_key;
use crate::engine::due::days_in_month;
use crate::engine::payment::total_monthly_debt_payments;
use crate::model::{Debt, Money};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A debt with a planned amount due within this many days of payday is
/// flagged as competing with the next paycheck.
pub const NEAR_PAYDAY_DAYS: i64 = 3;

/// Partitioned view over all of a plan's debts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DebtSummary {
    pub regular: Vec<Debt>,
    pub expense_sourced: Vec<Debt>,
    pub active: Vec<Debt>,
    pub active_regular: Vec<Debt>,
    pub active_expense_sourced: Vec<Debt>,
    /// Credit and store cards among the regular debts.
    pub credit_cards: Vec<Debt>,
    pub total_debt_balance: Money,
    pub total_monthly_payments: Money,
}

/// Builds the summary partition. "Active" here means a positive outstanding
/// balance; the monthly-payment total additionally excludes debts flagged
/// paid, per the aggregate payment rule.
pub fn summarize(debts: &[Debt]) -> DebtSummary {
    let has_balance = |d: &&Debt| d.current_balance.is_positive();

    let regular: Vec<Debt> = debts
        .iter()
        .filter(|d| !d.is_expense_sourced())
        .cloned()
        .collect();
    let expense_sourced: Vec<Debt> = debts
        .iter()
        .filter(|d| d.is_expense_sourced())
        .cloned()
        .collect();
    let active: Vec<Debt> = debts.iter().filter(has_balance).cloned().collect();
    let active_regular: Vec<Debt> = regular.iter().filter(has_balance).cloned().collect();
    let active_expense_sourced: Vec<Debt> =
        expense_sourced.iter().filter(has_balance).cloned().collect();
    let credit_cards: Vec<Debt> = regular
        .iter()
        .filter(|d| d.debt_type.is_card())
        .cloned()
        .collect();
    let total_debt_balance = debts.iter().map(|d| d.current_balance).sum();
    let total_monthly_payments = total_monthly_debt_payments(debts);

    DebtSummary {
        regular,
        expense_sourced,
        active,
        active_regular,
        active_expense_sourced,
        credit_cards,
        total_debt_balance,
        total_monthly_payments,
    }
}

/// Days from `today` until the plan's pay day, wrapping into next month when
/// the pay day has already passed this month.
pub fn days_until_payday(today: NaiveDate, pay_date: u32) -> i64 {
    let current_day = today.day();
    if pay_date >= current_day {
        i64::from(pay_date) - i64::from(current_day)
    } else {
        let month_days = days_in_month(today.year(), today.month());
        i64::from(month_days) - i64::from(current_day) + i64::from(pay_date)
    }
}

/// True when a debt with a planned payment is about to compete with payday.
pub fn is_near_payday(debt: &Debt, days_until_payday: i64) -> bool {
    days_until_payday <= NEAR_PAYDAY_DAYS && debt.amount.is_positive()
}

/// The `"YYYY-MM"` key for the current UTC month's payment cycle.
pub fn payment_cycle_key(now: DateTime<Utc>) -> String {
    cycle_key(now.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DebtSource, DebtType, MonthKey};
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Vec<Debt> {
        let mut visa = Debt::new("d1", "Visa", DebtType::CreditCard);
        visa.current_balance = Money::from(800);
        visa.amount = Money::from(100);

        let mut loan = Debt::new("d2", "Car Loan", DebtType::Loan);
        loan.current_balance = Money::from(3000);
        loan.installment_months = Some(10);

        let mut settled = Debt::new("d3", "Store Card", DebtType::StoreCard);
        settled.current_balance = Money::ZERO;
        settled.paid = true;

        let mut electric = Debt::new("d4", "Electric (MARCH 2024)", DebtType::Other);
        electric.current_balance = Money::from(60);
        electric.amount = Money::from(60);
        electric.source = Some(DebtSource {
            expense_id: "e1".to_string(),
            month_key: MonthKey::March,
            year: 2024,
            ..DebtSource::default()
        });

        vec![visa, loan, settled, electric]
    }

    #[test]
    fn test_partition() {
        let summary = summarize(&fixture());
        assert_eq!(summary.regular.len(), 3);
        assert_eq!(summary.expense_sourced.len(), 1);
        assert_eq!(summary.active.len(), 3);
        assert_eq!(summary.active_regular.len(), 2);
        assert_eq!(summary.active_expense_sourced.len(), 1);
        // Both cards are credit cards regardless of balance.
        assert_eq!(summary.credit_cards.len(), 2);
    }

    #[test]
    fn test_totals() {
        let summary = summarize(&fixture());
        assert_eq!(summary.total_debt_balance, Money::from(3860));
        // 100 (visa) + 300 (loan installment) + 60 (electric); settled is paid.
        assert_eq!(summary.total_monthly_payments, Money::from(460));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert!(summary.active.is_empty());
        assert_eq!(summary.total_debt_balance, Money::ZERO);
        assert_eq!(summary.total_monthly_payments, Money::ZERO);
    }

    #[test]
    fn test_days_until_payday() {
        assert_eq!(days_until_payday(day(2024, 3, 10), 27), 17);
        assert_eq!(days_until_payday(day(2024, 3, 27), 27), 0);
        // Payday passed: wrap into next month (31-day March).
        assert_eq!(days_until_payday(day(2024, 3, 28), 27), 30);
        // February wrap.
        assert_eq!(days_until_payday(day(2024, 2, 28), 27), 28);
    }

    #[test]
    fn test_is_near_payday() {
        let mut debt = Debt::new("d1", "Visa", DebtType::CreditCard);
        debt.amount = Money::from(100);
        assert!(is_near_payday(&debt, 3));
        assert!(!is_near_payday(&debt, 4));

        debt.amount = Money::ZERO;
        assert!(!is_near_payday(&debt, 1));
    }

    #[test]
    fn test_payment_cycle_key() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 10, 0, 0).unwrap();
        assert_eq!(payment_cycle_key(now), "2024-02");
    }
}
