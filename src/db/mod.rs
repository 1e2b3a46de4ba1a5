//! This module is responsible for reading, writing and managing the SQLite
//! database.
//!
//! Money columns are stored as decimal TEXT and coerced back through
//! [`Money::parse_or_zero`]; dates are ISO-8601 TEXT. The engine never touches
//! the database: commands compose store reads, engine decisions, and the
//! mutations here.

use crate::engine::{CycleOutcome, PaymentRecord};
use crate::model::{Debt, DebtSource, DebtType, Expense, Money, MonthKey};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const CREATE_DEBTS: &str = "CREATE TABLE IF NOT EXISTS debts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    debt_type TEXT NOT NULL,
    initial_balance TEXT NOT NULL,
    current_balance TEXT NOT NULL,
    amount TEXT NOT NULL,
    monthly_minimum TEXT,
    interest_rate TEXT,
    installment_months INTEGER,
    due_date TEXT,
    paid INTEGER NOT NULL DEFAULT 0,
    paid_amount TEXT NOT NULL,
    source_expense_id TEXT,
    source_month_key TEXT,
    source_year INTEGER,
    source_category_id TEXT,
    source_category_name TEXT,
    source_expense_name TEXT,
    created_at TEXT NOT NULL
)";

const CREATE_EXPENSES: &str = "CREATE TABLE IF NOT EXISTS expenses (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    amount TEXT NOT NULL,
    paid_amount TEXT NOT NULL,
    paid INTEGER NOT NULL DEFAULT 0,
    is_allocation INTEGER NOT NULL DEFAULT 0,
    due_date TEXT,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    category_id TEXT,
    category_name TEXT
)";

const CREATE_PAYMENTS: &str = "CREATE TABLE IF NOT EXISTS debt_payments (
    id TEXT PRIMARY KEY,
    debt_id TEXT NOT NULL,
    amount TEXT NOT NULL,
    paid_at TEXT NOT NULL
)";

const CREATE_SOURCE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
    idx_debts_source_expense ON debts (source_expense_id) \
    WHERE source_expense_id IS NOT NULL";

/// The fields needed to materialize (or refresh) a debt from an unpaid
/// expense. Provenance fields are written once and never change.
#[derive(Debug, Clone)]
pub(crate) struct ExpenseDebtDraft {
    pub expense_id: String,
    pub month_key: MonthKey,
    pub year: i32,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub expense_name: String,
    pub remaining: Money,
}

impl ExpenseDebtDraft {
    /// Display name for a generated debt, e.g. `"Utilities: Electric (MARCH 2024)"`.
    fn display_name(&self) -> String {
        let category = match &self.category_name {
            Some(name) => format!("{name}: "),
            None => String::new(),
        };
        format!(
            "{category}{} ({} {})",
            self.expense_name,
            self.month_key.to_string().trim(),
            self.year
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database file already exists at '{}'", path.display());
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to create SQLite file at {}", path.display()))?;
        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Creates the connection pool
    /// - Brings the schema up to date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let options = SqliteConnectOptions::new().filename(path);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite file at {}", path.display()))?;
        let db = Self { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<()> {
        for statement in [
            CREATE_DEBTS,
            CREATE_EXPENSES,
            CREATE_PAYMENTS,
            CREATE_SOURCE_INDEX,
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Unable to initialize the database schema")?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------- debts

    pub(crate) async fn insert_debt(&self, debt: &Debt) -> Result<()> {
        sqlx::query(
            "INSERT INTO debts (
                id, name, debt_type, initial_balance, current_balance, amount,
                monthly_minimum, interest_rate, installment_months, due_date,
                paid, paid_amount, source_expense_id, source_month_key,
                source_year, source_category_id, source_category_name,
                source_expense_name, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&debt.id)
        .bind(&debt.name)
        .bind(debt.debt_type.to_string())
        .bind(money_text(debt.initial_balance))
        .bind(money_text(debt.current_balance))
        .bind(money_text(debt.amount))
        .bind(debt.monthly_minimum.map(money_text))
        .bind(debt.interest_rate.map(|r| r.to_string()))
        .bind(debt.installment_months.map(i64::from))
        .bind(debt.due_date.map(date_text))
        .bind(debt.paid)
        .bind(money_text(debt.paid_amount))
        .bind(debt.source.as_ref().map(|s| s.expense_id.clone()))
        .bind(debt.source.as_ref().map(|s| s.month_key.to_string()))
        .bind(debt.source.as_ref().map(|s| i64::from(s.year)))
        .bind(debt.source.as_ref().and_then(|s| s.category_id.clone()))
        .bind(debt.source.as_ref().and_then(|s| s.category_name.clone()))
        .bind(debt.source.as_ref().and_then(|s| s.expense_name.clone()))
        .bind(debt.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to insert debt '{}'", debt.name))?;
        Ok(())
    }

    pub(crate) async fn update_debt(&self, debt: &Debt) -> Result<()> {
        let result = sqlx::query(
            "UPDATE debts SET
                name = ?, debt_type = ?, initial_balance = ?, current_balance = ?,
                amount = ?, monthly_minimum = ?, interest_rate = ?,
                installment_months = ?, due_date = ?, paid = ?, paid_amount = ?,
                source_category_id = ?, source_category_name = ?,
                source_expense_name = ?
            WHERE id = ?",
        )
        .bind(&debt.name)
        .bind(debt.debt_type.to_string())
        .bind(money_text(debt.initial_balance))
        .bind(money_text(debt.current_balance))
        .bind(money_text(debt.amount))
        .bind(debt.monthly_minimum.map(money_text))
        .bind(debt.interest_rate.map(|r| r.to_string()))
        .bind(debt.installment_months.map(i64::from))
        .bind(debt.due_date.map(date_text))
        .bind(debt.paid)
        .bind(money_text(debt.paid_amount))
        .bind(debt.source.as_ref().and_then(|s| s.category_id.clone()))
        .bind(debt.source.as_ref().and_then(|s| s.category_name.clone()))
        .bind(debt.source.as_ref().and_then(|s| s.expense_name.clone()))
        .bind(&debt.id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to update debt '{}'", debt.id))?;
        if result.rows_affected() == 0 {
            bail!("No debt found with id '{}'", debt.id);
        }
        Ok(())
    }

    pub(crate) async fn list_debts(&self) -> Result<Vec<Debt>> {
        let rows = sqlx::query("SELECT * FROM debts ORDER BY created_at DESC, id")
            .fetch_all(&self.pool)
            .await
            .context("Unable to list debts")?;
        rows.iter().map(debt_from_row).collect()
    }

    pub(crate) async fn get_debt(&self, id: &str) -> Result<Option<Debt>> {
        let row = sqlx::query("SELECT * FROM debts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get debt '{id}'"))?;
        row.as_ref().map(debt_from_row).transpose()
    }

    pub(crate) async fn get_debt_by_source_expense(
        &self,
        expense_id: &str,
    ) -> Result<Option<Debt>> {
        let row = sqlx::query("SELECT * FROM debts WHERE source_expense_id = ?")
            .bind(expense_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| {
                format!("Unable to get debt for source expense '{expense_id}'")
            })?;
        row.as_ref().map(debt_from_row).transpose()
    }

    pub(crate) async fn delete_debt(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM debt_payments WHERE debt_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete payments for debt '{id}'"))?;
        let result = sqlx::query("DELETE FROM debts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete debt '{id}'"))?;
        if result.rows_affected() == 0 {
            bail!("No debt found with id '{id}'");
        }
        Ok(())
    }

    /// Materializes, refreshes, or retires the debt generated from an expense.
    ///
    /// A non-positive remainder settles any existing debt rather than creating
    /// one. An existing debt keeps its name and provenance; only the balances
    /// and the refreshable source labels change.
    pub(crate) async fn upsert_expense_debt(
        &self,
        draft: &ExpenseDebtDraft,
    ) -> Result<Option<Debt>> {
        let existing = self.get_debt_by_source_expense(&draft.expense_id).await?;

        if !draft.remaining.is_positive() {
            let Some(mut debt) = existing else {
                return Ok(None);
            };
            debt.paid_amount = debt.initial_balance;
            debt.current_balance = Money::ZERO;
            debt.paid = true;
            self.update_debt(&debt).await?;
            return Ok(Some(debt));
        }

        if let Some(mut debt) = existing {
            debt.current_balance = draft.remaining;
            debt.paid = false;
            debt.paid_amount = (debt.initial_balance - draft.remaining).floor_zero();
            if let Some(source) = &mut debt.source {
                source.category_id = draft.category_id.clone();
                source.category_name = draft.category_name.clone();
                source.expense_name = Some(draft.expense_name.clone());
            }
            self.update_debt(&debt).await?;
            return Ok(Some(debt));
        }

        let mut debt = Debt::new(
            Uuid::new_v4().to_string(),
            draft.display_name(),
            DebtType::Other,
        );
        debt.initial_balance = draft.remaining;
        debt.current_balance = draft.remaining;
        debt.amount = draft.remaining;
        debt.source = Some(DebtSource {
            expense_id: draft.expense_id.clone(),
            month_key: draft.month_key,
            year: draft.year,
            category_id: draft.category_id.clone(),
            category_name: draft.category_name.clone(),
            expense_name: Some(draft.expense_name.clone()),
        });
        self.insert_debt(&debt).await?;
        Ok(Some(debt))
    }

    // ------------------------------------------------------------- payments

    /// Records a payment: inserts the payment row, decrements the balance
    /// (floored at zero), and flips `paid` when the balance reaches zero.
    pub(crate) async fn record_payment(
        &self,
        debt_id: &str,
        amount: Money,
        paid_at: DateTime<Utc>,
    ) -> Result<Debt> {
        let Some(mut debt) = self.get_debt(debt_id).await? else {
            bail!("No debt found with id '{debt_id}'");
        };
        sqlx::query("INSERT INTO debt_payments (id, debt_id, amount, paid_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(debt_id)
            .bind(money_text(amount))
            .bind(paid_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to record payment for debt '{debt_id}'"))?;

        debt.current_balance = (debt.current_balance - amount).floor_zero();
        debt.paid_amount += amount;
        if debt.current_balance.is_zero() {
            debt.paid = true;
        }
        self.update_debt(&debt).await?;
        Ok(debt)
    }

    pub(crate) async fn payments_for_debt(&self, debt_id: &str) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query("SELECT * FROM debt_payments WHERE debt_id = ? ORDER BY paid_at")
            .bind(debt_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to list payments for debt '{debt_id}'"))?;
        rows.iter().map(payment_from_row).collect()
    }

    /// Applies a closed payment cycle: the shortfall accrues onto both
    /// balances and the due date rolls forward.
    pub(crate) async fn apply_cycle_outcome(
        &self,
        debt_id: &str,
        outcome: &CycleOutcome,
    ) -> Result<Debt> {
        let Some(mut debt) = self.get_debt(debt_id).await? else {
            bail!("No debt found with id '{debt_id}'");
        };
        debt.current_balance += outcome.accrued;
        debt.initial_balance += outcome.accrued;
        debt.due_date = Some(outcome.next_due);
        self.update_debt(&debt).await?;
        Ok(debt)
    }

    // ------------------------------------------------------------- expenses

    pub(crate) async fn insert_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            "INSERT INTO expenses (
                id, name, amount, paid_amount, paid, is_allocation, due_date,
                year, month, category_id, category_name
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.id)
        .bind(&expense.name)
        .bind(money_text(expense.amount))
        .bind(money_text(expense.paid_amount))
        .bind(expense.paid)
        .bind(expense.is_allocation)
        .bind(expense.due_date.map(date_text))
        .bind(i64::from(expense.year))
        .bind(i64::from(expense.month))
        .bind(expense.category.as_ref().map(|c| c.id.clone()))
        .bind(expense.category.as_ref().map(|c| c.name.clone()))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to insert expense '{}'", expense.name))?;
        Ok(())
    }

    pub(crate) async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query("SELECT * FROM expenses ORDER BY year, month, name")
            .fetch_all(&self.pool)
            .await
            .context("Unable to list expenses")?;
        rows.iter().map(expense_from_row).collect()
    }

    pub(crate) async fn unpaid_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query("SELECT * FROM expenses WHERE paid = 0 ORDER BY year, month, name")
            .fetch_all(&self.pool)
            .await
            .context("Unable to list unpaid expenses")?;
        rows.iter().map(expense_from_row).collect()
    }

    pub(crate) async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        let row = sqlx::query("SELECT * FROM expenses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get expense '{id}'"))?;
        row.as_ref().map(expense_from_row).transpose()
    }

    /// Applies a payment to an expense; marks it paid once nothing remains.
    pub(crate) async fn pay_expense(&self, id: &str, amount: Money) -> Result<Expense> {
        let Some(mut expense) = self.get_expense(id).await? else {
            bail!("No expense found with id '{id}'");
        };
        expense.paid_amount += amount;
        if !expense.remaining().is_positive() {
            expense.paid = true;
        }
        let result = sqlx::query("UPDATE expenses SET paid_amount = ?, paid = ? WHERE id = ?")
            .bind(money_text(expense.paid_amount))
            .bind(expense.paid)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update expense '{id}'"))?;
        if result.rows_affected() == 0 {
            bail!("No expense found with id '{id}'");
        }
        Ok(expense)
    }
}

fn money_text(money: Money) -> String {
    money.value().to_string()
}

fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn debt_from_row(row: &SqliteRow) -> Result<Debt> {
    let source = match row.try_get::<Option<String>, _>("source_expense_id")? {
        Some(expense_id) => Some(DebtSource {
            expense_id,
            month_key: row
                .try_get::<Option<String>, _>("source_month_key")?
                .as_deref()
                .and_then(MonthKey::parse_lenient)
                .unwrap_or_default(),
            year: row
                .try_get::<Option<i64>, _>("source_year")?
                .unwrap_or_default() as i32,
            category_id: row.try_get("source_category_id")?,
            category_name: row.try_get("source_category_name")?,
            expense_name: row.try_get("source_expense_name")?,
        }),
        None => None,
    };
    let created_at_text: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_text)
        .map(|d| d.with_timezone(&Utc))
        .with_context(|| format!("Invalid created_at timestamp '{created_at_text}'"))?;
    Ok(Debt {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        debt_type: row
            .try_get::<String, _>("debt_type")?
            .parse()
            .unwrap_or_default(),
        initial_balance: Money::parse_or_zero(&row.try_get::<String, _>("initial_balance")?),
        current_balance: Money::parse_or_zero(&row.try_get::<String, _>("current_balance")?),
        amount: Money::parse_or_zero(&row.try_get::<String, _>("amount")?),
        monthly_minimum: row
            .try_get::<Option<String>, _>("monthly_minimum")?
            .map(|s| Money::parse_or_zero(&s)),
        interest_rate: row
            .try_get::<Option<String>, _>("interest_rate")?
            .and_then(|s| Decimal::from_str(&s).ok()),
        installment_months: row
            .try_get::<Option<i64>, _>("installment_months")?
            .map(|m| m as u32),
        due_date: row
            .try_get::<Option<String>, _>("due_date")?
            .as_deref()
            .and_then(parse_date),
        paid: row.try_get("paid")?,
        paid_amount: Money::parse_or_zero(&row.try_get::<String, _>("paid_amount")?),
        source,
        created_at,
    })
}

fn expense_from_row(row: &SqliteRow) -> Result<Expense> {
    let category = match row.try_get::<Option<String>, _>("category_name")? {
        Some(name) => Some(crate::model::Category::new(
            row.try_get::<Option<String>, _>("category_id")?
                .unwrap_or_default(),
            name,
        )),
        None => None,
    };
    Ok(Expense {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        amount: Money::parse_or_zero(&row.try_get::<String, _>("amount")?),
        paid_amount: Money::parse_or_zero(&row.try_get::<String, _>("paid_amount")?),
        paid: row.try_get("paid")?,
        is_allocation: row.try_get("is_allocation")?,
        due_date: row
            .try_get::<Option<String>, _>("due_date")?
            .as_deref()
            .and_then(parse_date),
        year: row.try_get::<i64, _>("year")? as i32,
        month: row.try_get::<i64, _>("month")? as u32,
        category,
    })
}

fn payment_from_row(row: &SqliteRow) -> Result<PaymentRecord> {
    let paid_at_text: String = row.try_get("paid_at")?;
    let paid_at = DateTime::parse_from_rfc3339(&paid_at_text)
        .map(|d| d.with_timezone(&Utc))
        .with_context(|| format!("Invalid paid_at timestamp '{paid_at_text}'"))?;
    Ok(PaymentRecord {
        amount: Money::parse_or_zero(&row.try_get::<String, _>("amount")?),
        paid_at,
    })
}
