use crate::args::AddExpenseArgs;
use crate::commands::Out;
use crate::model::{Category, Expense, Money};
use crate::{Config, Result};
use anyhow::bail;
use uuid::Uuid;

/// Inserts an expense row for a budget month.
pub async fn add_expense(config: &Config, args: AddExpenseArgs) -> Result<Out<Expense>> {
    if !(1..=12).contains(&args.month()) {
        bail!("Month must be between 1 and 12, got {}", args.month());
    }
    let category = args
        .category()
        .map(|name| Category::new(Uuid::new_v4().to_string(), name));
    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        name: args.name().to_string(),
        amount: args.amount(),
        paid_amount: Money::ZERO,
        paid: false,
        is_allocation: args.allocation(),
        due_date: args.due_date(),
        year: args.year(),
        month: args.month(),
        category,
    };
    config.db().insert_expense(&expense).await?;
    let kind = if expense.is_allocation {
        "allocation"
    } else {
        "expense"
    };
    let message = format!(
        "Added {kind} '{}' ({}) for {} {}-{:02}",
        expense.name, expense.id, expense.amount, expense.year, expense.month
    );
    Ok(Out::new(message, expense))
}

/// Lists all expense rows.
pub async fn list_expenses(config: &Config) -> Result<Out<Vec<Expense>>> {
    let expenses = config.db().list_expenses().await?;
    let unpaid = expenses.iter().filter(|e| !e.paid).count();
    let message = format!("{} expense(s), {} unpaid", expenses.len(), unpaid);
    Ok(Out::new(message, expenses))
}

/// Applies a payment to an expense; it settles once nothing remains.
pub async fn pay_expense(config: &Config, id: &str, amount: Money) -> Result<Out<Expense>> {
    if !amount.is_positive() {
        bail!("Payment amount must be positive, got {amount}");
    }
    let expense = config.db().pay_expense(id, amount).await?;
    let message = if expense.paid {
        format!("Paid {} on '{}'; the expense is settled", amount, expense.name)
    } else {
        format!(
            "Paid {} on '{}'; {} remaining",
            amount,
            expense.name,
            expense.remaining()
        )
    };
    Ok(Out::new(message, expense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    fn add_args(name: &str, amount: i64) -> AddExpenseArgs {
        AddExpenseArgs::new(name, Money::from(amount), 2024, 3, None, false, None)
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let env = TestEnv::new().await;
        let config = env.config();

        add_expense(&config, add_args("Electric", 120)).await.unwrap();
        let out = list_expenses(&config).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        assert!(out.message().contains("1 unpaid"));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_month() {
        let env = TestEnv::new().await;
        let args = AddExpenseArgs::new("Electric", Money::from(120), 2024, 13, None, false, None);
        assert!(add_expense(&env.config(), args).await.is_err());
    }

    #[tokio::test]
    async fn test_partial_then_full_payment() {
        let env = TestEnv::new().await;
        let config = env.config();
        let expense = add_expense(&config, add_args("Electric", 120))
            .await
            .unwrap()
            .structure()
            .unwrap()
            .clone();

        let out = pay_expense(&config, &expense.id, Money::from(50)).await.unwrap();
        assert!(!out.structure().unwrap().paid);
        assert!(out.message().contains("$70.00 remaining"));

        let out = pay_expense(&config, &expense.id, Money::from(70)).await.unwrap();
        assert!(out.structure().unwrap().paid);
    }
}
