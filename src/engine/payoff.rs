//! Payoff projection: how long until a debt reaches zero.

use crate::engine::accrual::add_months_clamped;
use crate::model::{Debt, Money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How far forward the projection walks before giving up.
pub const DEFAULT_PROJECTION_HORIZON_MONTHS: u32 = 60;

/// Projected payoff schedule for a single debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PayoffProjection {
    /// The monthly payment the projection assumed.
    pub monthly_payment: Money,
    /// Months until the balance reaches zero. `None` when the payment is zero
    /// or the balance does not reach zero within the horizon.
    pub months_left: Option<u32>,
    pub paid_off_by: Option<NaiveDate>,
}

/// Projects when a debt will be paid off at a planned monthly payment.
///
/// When no planned payment is given, the installment plan stands in, computed
/// from the initial balance (so months-left shrinks as payments land) or the
/// current balance when no initial balance was recorded. A configured monthly
/// minimum floors the payment. Interest compounds monthly at
/// `interest_rate / 100 / 12` when an APR is present.
pub fn project_payoff(
    debt: &Debt,
    planned_monthly_payment: Money,
    max_months: u32,
    today: NaiveDate,
) -> PayoffProjection {
    let balance = debt.current_balance.floor_zero().value();

    let mut planned = planned_monthly_payment.value();
    if planned <= Decimal::ZERO {
        if let Some(months) = debt.installment_months.filter(|m| *m > 0) {
            let principal = if debt.initial_balance.is_positive() {
                debt.initial_balance.value()
            } else {
                balance
            };
            if principal > Decimal::ZERO {
                planned = principal / Decimal::from(months);
            }
        }
    }
    if let Some(minimum) = debt.monthly_minimum.filter(Money::is_positive) {
        if minimum.value() > planned {
            planned = minimum.value();
        }
    }
    if planned < Decimal::ZERO {
        planned = Decimal::ZERO;
    }
    let monthly_payment = Money::new(planned);

    let monthly_rate = match debt.interest_rate.filter(|r| *r > Decimal::ZERO) {
        Some(apr) => apr / Decimal::from(1200),
        None => Decimal::ZERO,
    };

    // Walk the balance forward month by month until it hits zero or the
    // horizon runs out.
    let mut current = balance;
    let mut months = 0u32;
    while months < max_months && current > Decimal::ZERO {
        current = current * (Decimal::ONE + monthly_rate) - planned;
        if current < Decimal::ZERO {
            current = Decimal::ZERO;
        }
        months += 1;
    }

    let cannot_payoff = planned.is_zero() || current > Decimal::ZERO;
    if balance <= Decimal::ZERO || months == 0 || cannot_payoff {
        return PayoffProjection {
            monthly_payment,
            months_left: if cannot_payoff { None } else { Some(0) },
            paid_off_by: None,
        };
    }
    PayoffProjection {
        monthly_payment,
        months_left: Some(months),
        paid_off_by: Some(add_months_clamped(today, months as i32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DebtType;
    use std::str::FromStr;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn debt(balance: i64) -> Debt {
        let mut d = Debt::new("d1", "Loan", DebtType::Loan);
        d.initial_balance = Money::from(balance);
        d.current_balance = Money::from(balance);
        d
    }

    #[test]
    fn test_simple_division_without_interest() {
        let d = debt(1200);
        let projection = project_payoff(&d, Money::from(200), 60, day(2024, 1, 15));
        assert_eq!(projection.monthly_payment, Money::from(200));
        assert_eq!(projection.months_left, Some(6));
        assert_eq!(projection.paid_off_by, Some(day(2024, 7, 15)));
    }

    #[test]
    fn test_zero_payment_cannot_payoff() {
        let d = debt(1200);
        let projection = project_payoff(&d, Money::ZERO, 60, day(2024, 1, 15));
        assert_eq!(projection.months_left, None);
        assert_eq!(projection.paid_off_by, None);
    }

    #[test]
    fn test_horizon_exhaustion_cannot_payoff() {
        let d = debt(100_000);
        let projection = project_payoff(&d, Money::from(10), 60, day(2024, 1, 15));
        assert_eq!(projection.months_left, None);
    }

    #[test]
    fn test_installment_plan_stands_in_for_missing_payment() {
        let mut d = debt(1200);
        d.installment_months = Some(6);
        let projection = project_payoff(&d, Money::ZERO, 60, day(2024, 1, 15));
        // Installment is based on the initial balance.
        assert_eq!(projection.monthly_payment, Money::from(200));
        assert_eq!(projection.months_left, Some(6));
    }

    #[test]
    fn test_installment_uses_current_balance_when_initial_missing() {
        let mut d = debt(0);
        d.current_balance = Money::from(600);
        d.installment_months = Some(6);
        let projection = project_payoff(&d, Money::ZERO, 60, day(2024, 1, 15));
        assert_eq!(projection.monthly_payment, Money::from(100));
    }

    #[test]
    fn test_minimum_floors_the_payment() {
        let mut d = debt(1200);
        d.monthly_minimum = Some(Money::from(300));
        let projection = project_payoff(&d, Money::from(200), 60, day(2024, 1, 15));
        assert_eq!(projection.monthly_payment, Money::from(300));
        assert_eq!(projection.months_left, Some(4));
    }

    #[test]
    fn test_settled_debt_is_zero_months() {
        let mut d = debt(0);
        d.current_balance = Money::ZERO;
        let projection = project_payoff(&d, Money::from(100), 60, day(2024, 1, 15));
        assert_eq!(projection.months_left, Some(0));
        assert_eq!(projection.paid_off_by, None);
    }

    #[test]
    fn test_interest_stretches_the_schedule() {
        let mut with_interest = debt(1200);
        with_interest.interest_rate = Some(Decimal::from_str("24.0").unwrap());
        let flat = project_payoff(&debt(1200), Money::from(110), 120, day(2024, 1, 15));
        let compounding =
            project_payoff(&with_interest, Money::from(110), 120, day(2024, 1, 15));
        assert!(compounding.months_left.unwrap() > flat.months_left.unwrap());
    }
}
