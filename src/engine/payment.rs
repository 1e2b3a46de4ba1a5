//! Effective monthly payment derivation.

use crate::model::{Debt, Money};
use rust_decimal::Decimal;

/// The effective monthly payment owed on a debt.
///
/// First applicable branch wins:
/// 1. An installment plan (`installment_months > 0` with a positive balance)
///    divides the current balance evenly; a configured `monthly_minimum`
///    larger than the installment wins over it.
/// 2. Otherwise a configured, positive `monthly_minimum` is returned directly.
/// 3. Otherwise the manually configured `amount`, zero when unset.
///
/// Division is plain decimal division with no rounding; rounding is a
/// presentation concern.
pub fn debt_monthly_payment(debt: &Debt) -> Money {
    if let Some(months) = debt.installment_months.filter(|m| *m > 0) {
        if debt.current_balance.is_positive() {
            let installment = debt.current_balance.value() / Decimal::from(months);
            let minimum = debt
                .monthly_minimum
                .map(|m| m.value())
                .unwrap_or(Decimal::ZERO);
            let effective = if minimum > installment {
                minimum
            } else {
                installment
            };
            return Money::new(effective);
        }
    }
    if let Some(minimum) = debt.monthly_minimum.filter(Money::is_positive) {
        return minimum;
    }
    debt.amount
}

/// Sums effective monthly payments across all active debts.
///
/// Debts marked paid or with no remaining balance contribute zero. The fold is
/// a pure decimal sum, so the result is independent of input order.
pub fn total_monthly_debt_payments(debts: &[Debt]) -> Money {
    debts
        .iter()
        .filter(|d| d.is_active())
        .map(debt_monthly_payment)
        .sum()
}
