//! Types that represent the core data model, such as `Debt` and `Expense`.
mod category;
mod debt;
mod expense;
mod money;
mod month_key;

pub use category::Category;
pub use debt::{Debt, DebtSource, DebtType};
pub use expense::Expense;
pub use money::Money;
pub use month_key::MonthKey;
