use crate::model::{Category, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single expense row in a budget month.
///
/// Expenses are either bills (payable, may carry forward into a debt when they
/// go unpaid past their due date) or allocations: planned spending envelopes
/// that must never generate debt.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: Money,
    pub paid_amount: Money,
    pub paid: bool,
    pub is_allocation: bool,
    /// Explicit due date. When absent, the plan's default due day applies.
    pub due_date: Option<NaiveDate>,
    pub year: i32,
    /// Month number, 1-12.
    pub month: u32,
    pub category: Option<Category>,
}

impl Expense {
    /// The amount still owed on this expense.
    pub fn remaining(&self) -> Money {
        self.amount - self.paid_amount
    }

    /// True when some but not all of the expense has been paid.
    pub fn has_partial_payment(&self) -> bool {
        self.paid_amount.is_positive()
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}
