use crate::args::{AddDebtArgs, PayoffArgs};
use crate::commands::Out;
use crate::engine::{
    debt_monthly_payment, default_debt_due_date, due_preview, project_payoff,
    total_monthly_debt_payments, DuePreview, PayoffProjection,
    DEFAULT_PROJECTION_HORIZON_MONTHS,
};
use crate::model::{Debt, Money};
use crate::{Config, Result};
use anyhow::bail;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A debt together with its derived display state.
#[derive(Debug, Clone, Serialize)]
pub struct DebtView {
    pub debt: Debt,
    pub effective_monthly_payment: Money,
    pub percent_paid: Decimal,
    pub due: DuePreview,
}

impl DebtView {
    fn derive(debt: Debt, pay_date: u32) -> Self {
        let effective_monthly_payment = debt_monthly_payment(&debt);
        let percent_paid = debt.percent_paid();
        let due = due_preview(debt.paid, debt.due_date, i64::from(pay_date), Utc::now());
        Self {
            debt,
            effective_monthly_payment,
            percent_paid,
            due,
        }
    }
}

/// Inserts a manually created debt. When no due date is given, the plan's pay
/// date resolves the default.
pub async fn add_debt(config: &Config, args: AddDebtArgs) -> Result<Out<Debt>> {
    let mut debt = Debt::new(Uuid::new_v4().to_string(), args.name(), args.debt_type());
    debt.initial_balance = args.balance();
    debt.current_balance = args.balance();
    debt.amount = args.amount().unwrap_or_default();
    debt.monthly_minimum = args.minimum();
    debt.installment_months = args.installment_months();
    debt.interest_rate = args.interest_rate();
    debt.due_date = args
        .due_date()
        .or_else(|| default_debt_due_date(i64::from(config.pay_date()), Utc::now()));
    config.db().insert_debt(&debt).await?;
    let message = format!(
        "Added debt '{}' ({}) with balance {}",
        debt.name, debt.id, debt.current_balance
    );
    Ok(Out::new(message, debt))
}

/// Lists all debts with their derived payment and due-status state.
pub async fn list_debts(config: &Config) -> Result<Out<Vec<DebtView>>> {
    let debts = config.db().list_debts().await?;
    let total = total_monthly_debt_payments(&debts);
    let views: Vec<DebtView> = debts
        .into_iter()
        .map(|d| DebtView::derive(d, config.pay_date()))
        .collect();
    let message = format!(
        "{} debt(s), {} owed monthly across active debts",
        views.len(),
        total
    );
    Ok(Out::new(message, views))
}

/// Records a payment against a debt.
pub async fn pay_debt(config: &Config, id: &str, amount: Money) -> Result<Out<Debt>> {
    if !amount.is_positive() {
        bail!("Payment amount must be positive, got {amount}");
    }
    let debt = config.db().record_payment(id, amount, Utc::now()).await?;
    let message = if debt.paid {
        format!("Paid {} on '{}'; the debt is settled", amount, debt.name)
    } else {
        format!(
            "Paid {} on '{}'; {} remaining",
            amount, debt.name, debt.current_balance
        )
    };
    Ok(Out::new(message, debt))
}

/// Deletes a debt. Expense-sourced debts with an outstanding balance refuse:
/// they are derived state and retire with their source expense.
pub async fn remove_debt(config: &Config, id: &str) -> Result<Out<()>> {
    let Some(debt) = config.db().get_debt(id).await? else {
        bail!("No debt found with id '{id}'");
    };
    if !debt.can_delete() {
        bail!(
            "'{}' was generated from an unpaid expense and still has {} outstanding; \
             pay it down or settle the source expense instead",
            debt.name,
            debt.current_balance
        );
    }
    config.db().delete_debt(id).await?;
    Ok(Out::new_message(format!("Removed debt '{}'", debt.name)))
}

/// Projects when a debt will be paid off.
pub async fn payoff(config: &Config, args: PayoffArgs) -> Result<Out<PayoffProjection>> {
    let Some(debt) = config.db().get_debt(args.id()).await? else {
        bail!("No debt found with id '{}'", args.id());
    };
    let planned = args.monthly().unwrap_or(debt.amount);
    let horizon = args
        .horizon_months()
        .unwrap_or(DEFAULT_PROJECTION_HORIZON_MONTHS);
    let projection = project_payoff(&debt, planned, horizon, Utc::now().date_naive());
    let message = match (projection.months_left, projection.paid_off_by) {
        (Some(0), _) => format!("'{}' is already paid off", debt.name),
        (Some(months), Some(date)) => format!(
            "'{}' pays off in {} month(s), around {} at {} per month",
            debt.name, months, date, projection.monthly_payment
        ),
        _ => format!(
            "'{}' will not pay off within {} months at {} per month",
            debt.name, horizon, projection.monthly_payment
        ),
    };
    Ok(Out::new(message, projection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DebtType;
    use crate::test::TestEnv;

    fn add_args(name: &str, balance: i64) -> AddDebtArgs {
        AddDebtArgs::new(
            name,
            DebtType::CreditCard,
            Money::from(balance),
            Some(Money::from(50)),
            None,
            None,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let env = TestEnv::new().await;
        let config = env.config();

        let out = add_debt(&config, add_args("Visa", 900)).await.unwrap();
        let debt = out.structure().unwrap();
        assert_eq!(debt.current_balance, Money::from(900));
        // No explicit due date: the pay-date default was resolved.
        assert!(debt.due_date.is_some());

        let out = list_debts(&config).await.unwrap();
        let views = out.structure().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].effective_monthly_payment, Money::from(50));
    }

    #[tokio::test]
    async fn test_pay_and_settle() {
        let env = TestEnv::new().await;
        let config = env.config();
        let debt = add_debt(&config, add_args("Visa", 100))
            .await
            .unwrap()
            .structure()
            .unwrap()
            .clone();

        assert!(pay_debt(&config, &debt.id, Money::ZERO).await.is_err());

        let out = pay_debt(&config, &debt.id, Money::from(100)).await.unwrap();
        assert!(out.structure().unwrap().paid);
        assert!(out.message().contains("settled"));
    }

    #[tokio::test]
    async fn test_remove_unknown_debt_fails() {
        let env = TestEnv::new().await;
        assert!(remove_debt(&env.config(), "nope").await.is_err());
    }

    #[tokio::test]
    async fn test_payoff_projection() {
        let env = TestEnv::new().await;
        let config = env.config();
        let debt = add_debt(&config, add_args("Visa", 600))
            .await
            .unwrap()
            .structure()
            .unwrap()
            .clone();

        let args = PayoffArgs::new(&debt.id, Some(Money::from(100)), None);
        let out = payoff(&config, args).await.unwrap();
        let projection = out.structure().unwrap();
        assert_eq!(projection.months_left, Some(6));
    }
}
