use crate::model::{Money, MonthKey};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of obligation a debt represents.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    CreditCard,
    StoreCard,
    Loan,
    Mortgage,
    HirePurchase,
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(DebtType);
serde_plain::derive_fromstr_from_deserialize!(DebtType);

impl DebtType {
    /// Credit and store cards are grouped together in summaries.
    pub fn is_card(&self) -> bool {
        matches!(self, DebtType::CreditCard | DebtType::StoreCard)
    }
}

/// Provenance for a debt generated from an unpaid expense.
///
/// These fields are immutable once set: they identify the expense that spawned
/// the debt, not vice versa, and are used to keep the debt in sync with (and
/// eventually retire it alongside) its originating expense row.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DebtSource {
    pub expense_id: String,
    pub month_key: MonthKey,
    pub year: i32,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub expense_name: Option<String>,
}

/// A tracked balance owed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Debt {
    pub id: String,
    pub name: String,
    pub debt_type: DebtType,
    pub initial_balance: Money,
    /// Never negative. Non-increasing under payment application; missed-cycle
    /// accrual is the one flow that raises it (together with `initial_balance`).
    pub current_balance: Money,
    /// Manually configured fallback monthly payment.
    pub amount: Money,
    /// Optional floor on the monthly payment.
    pub monthly_minimum: Option<Money>,
    /// Annual percentage rate. Informational to the payment calculator;
    /// consumed by the payoff projection.
    pub interest_rate: Option<Decimal>,
    /// When set and the balance is positive, the balance divides evenly over
    /// this many months.
    pub installment_months: Option<u32>,
    pub due_date: Option<NaiveDate>,
    /// Suppresses this debt from aggregate totals.
    pub paid: bool,
    pub paid_amount: Money,
    pub source: Option<DebtSource>,
    pub created_at: DateTime<Utc>,
}

impl Debt {
    /// A blank debt with the given identity. Callers fill in balances and
    /// payment configuration field by field.
    pub fn new(id: impl Into<String>, name: impl Into<String>, debt_type: DebtType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            debt_type,
            initial_balance: Money::ZERO,
            current_balance: Money::ZERO,
            amount: Money::ZERO,
            monthly_minimum: None,
            interest_rate: None,
            installment_months: None,
            due_date: None,
            paid: false,
            paid_amount: Money::ZERO,
            source: None,
            created_at: Utc::now(),
        }
    }

    /// Unpaid with a positive balance: contributes to aggregate payment totals.
    pub fn is_active(&self) -> bool {
        !self.paid && self.current_balance.is_positive()
    }

    /// True when this debt was generated from an unpaid expense.
    pub fn is_expense_sourced(&self) -> bool {
        self.source.is_some()
    }

    /// Percentage of the initial balance that has been paid down, 0-100.
    /// Zero when there was no initial balance to pay.
    pub fn percent_paid(&self) -> Decimal {
        let initial = self.initial_balance.value();
        if !self.initial_balance.is_positive() {
            return Decimal::ZERO;
        }
        (initial - self.current_balance.value()) / initial * Decimal::from(100)
    }

    /// An expense-sourced debt with an outstanding balance cannot be deleted
    /// directly; pay it down or delete the source expense instead.
    pub fn can_delete(&self) -> bool {
        !(self.is_expense_sourced() && self.current_balance.is_positive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let mut debt = Debt::new("d1", "Visa", DebtType::CreditCard);
        debt.current_balance = Money::from(100);
        assert!(debt.is_active());

        debt.paid = true;
        assert!(!debt.is_active());

        debt.paid = false;
        debt.current_balance = Money::ZERO;
        assert!(!debt.is_active());
    }

    #[test]
    fn test_percent_paid() {
        let mut debt = Debt::new("d1", "Loan", DebtType::Loan);
        debt.initial_balance = Money::from(1000);
        debt.current_balance = Money::from(250);
        assert_eq!(debt.percent_paid(), Decimal::from(75));

        debt.initial_balance = Money::ZERO;
        assert_eq!(debt.percent_paid(), Decimal::ZERO);
    }

    #[test]
    fn test_can_delete() {
        let mut debt = Debt::new("d1", "Electric: March", DebtType::Other);
        debt.current_balance = Money::from(40);
        assert!(debt.can_delete());

        debt.source = Some(DebtSource {
            expense_id: "e1".to_string(),
            month_key: MonthKey::March,
            year: 2024,
            ..DebtSource::default()
        });
        assert!(!debt.can_delete());

        debt.current_balance = Money::ZERO;
        assert!(debt.can_delete());
    }

    #[test]
    fn test_debt_type_wire_format() {
        assert_eq!(DebtType::CreditCard.to_string(), "credit_card");
        assert_eq!("hire_purchase".parse::<DebtType>().unwrap(), DebtType::HirePurchase);
        assert!(DebtType::StoreCard.is_card());
        assert!(!DebtType::Mortgage.is_card());
    }
}
