//! These structs provide the CLI interface for the carryover CLI.

use crate::engine::PlanKind;
use crate::model::{DebtType, Money};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// carryover: A command-line tool for tracking household debts and
/// carried-forward expenses.
///
/// Expenses that go unpaid past their due date (plus a grace window) carry
/// forward into debts. Debts with a calendar due date accrue any missed
/// monthly payment back onto their balance. The `sync` subcommand runs that
/// carryover pass; `summary` runs it and reports the resulting totals.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Decide what directory you
    /// want to store data in and pass this as --carryover-home (by default it
    /// will be $HOME/carryover), and tell carryover which day of the month
    /// your income arrives with --pay-date.
    Init(InitArgs),
    /// Add a debt or an expense.
    Add(AddArgs),
    /// List debts or expenses.
    List(ListArgs),
    /// Record a payment against a debt or an expense.
    Pay(PayArgs),
    /// Delete a debt.
    Remove(RemoveArgs),
    /// Run the carryover sync pass: close missed payment cycles, convert
    /// overdue expenses into debts, and drop stale expense debts.
    Sync(SyncArgs),
    /// Summarize all debts with monthly payment totals.
    Summary,
    /// Project when a debt will be paid off.
    Payoff(PayoffArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where carryover data and configuration is held.
    /// Defaults to ~/carryover
    #[arg(long, env = "CARRYOVER_HOME", default_value_t = default_carryover_home())]
    carryover_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, carryover_home: PathBuf) -> Self {
        Self {
            log_level,
            carryover_home: carryover_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn carryover_home(&self) -> &DisplayPath {
        &self.carryover_home
    }
}

/// Args for the `carryover init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// Day-of-month, 1-31, on which income arrives. Default due dates land on
    /// this day.
    #[arg(long, default_value_t = 27)]
    pay_date: u32,

    /// Whether this plan converts unpaid expenses into debts ("personal") or
    /// only tracks spending ("seasonal").
    #[arg(long, default_value_t = PlanKind::Personal)]
    plan_kind: PlanKind,
}

impl InitArgs {
    pub fn new(pay_date: u32, plan_kind: PlanKind) -> Self {
        Self {
            pay_date,
            plan_kind,
        }
    }

    pub fn pay_date(&self) -> u32 {
        self.pay_date
    }

    pub fn plan_kind(&self) -> PlanKind {
        self.plan_kind
    }
}

#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entity: AddSubcommand,
}

impl AddArgs {
    pub fn entity(&self) -> &AddSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Add a manually tracked debt.
    Debt(AddDebtArgs),
    /// Add an expense row for a budget month.
    Expense(AddExpenseArgs),
}

/// Args for the `carryover add debt` command.
#[derive(Debug, Parser, Clone)]
pub struct AddDebtArgs {
    /// Display name for the debt.
    name: String,

    /// The kind of obligation: credit_card, store_card, loan, mortgage,
    /// hire_purchase or other.
    #[arg(long = "type", default_value_t = DebtType::Other)]
    debt_type: DebtType,

    /// The outstanding balance.
    #[arg(long)]
    balance: Money,

    /// Planned monthly payment.
    #[arg(long)]
    amount: Option<Money>,

    /// Minimum monthly payment; floors the effective payment.
    #[arg(long)]
    minimum: Option<Money>,

    /// Divide the balance evenly over this many months.
    #[arg(long)]
    installment_months: Option<u32>,

    /// Annual percentage rate, e.g. 19.9.
    #[arg(long)]
    interest_rate: Option<Decimal>,

    /// Due date as YYYY-MM-DD. Defaults from the plan's pay date.
    #[arg(long)]
    due_date: Option<NaiveDate>,
}

impl AddDebtArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        debt_type: DebtType,
        balance: Money,
        amount: Option<Money>,
        minimum: Option<Money>,
        installment_months: Option<u32>,
        interest_rate: Option<Decimal>,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            name: name.into(),
            debt_type,
            balance,
            amount,
            minimum,
            installment_months,
            interest_rate,
            due_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debt_type(&self) -> DebtType {
        self.debt_type
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn amount(&self) -> Option<Money> {
        self.amount
    }

    pub fn minimum(&self) -> Option<Money> {
        self.minimum
    }

    pub fn installment_months(&self) -> Option<u32> {
        self.installment_months
    }

    pub fn interest_rate(&self) -> Option<Decimal> {
        self.interest_rate
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

/// Args for the `carryover add expense` command.
#[derive(Debug, Parser, Clone)]
pub struct AddExpenseArgs {
    /// Display name for the expense.
    name: String,

    /// The amount owed.
    #[arg(long)]
    amount: Money,

    /// The budget year.
    #[arg(long)]
    year: i32,

    /// The budget month, 1-12.
    #[arg(long)]
    month: u32,

    /// Category name. Food/dining and transport/travel categories never
    /// carry forward into debts.
    #[arg(long)]
    category: Option<String>,

    /// Mark this as an allocation (a spending envelope that never carries
    /// forward) instead of a bill.
    #[arg(long)]
    allocation: bool,

    /// Due date as YYYY-MM-DD. Defaults to the plan's pay date within the
    /// expense month.
    #[arg(long)]
    due_date: Option<NaiveDate>,
}

impl AddExpenseArgs {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        year: i32,
        month: u32,
        category: Option<&str>,
        allocation: bool,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            year,
            month,
            category: category.map(String::from),
            allocation,
            due_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn allocation(&self) -> bool {
        self.allocation
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// List all debts with derived payment and due-status state.
    Debts,
    /// List all expenses.
    Expenses,
}

#[derive(Debug, Parser, Clone)]
pub struct PayArgs {
    #[command(subcommand)]
    entity: PaySubcommand,
}

impl PayArgs {
    pub fn entity(&self) -> &PaySubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum PaySubcommand {
    /// Record a payment against a debt.
    Debt(PaymentArgs),
    /// Record a payment against an expense.
    Expense(PaymentArgs),
}

/// Args for the `carryover pay` subcommands.
#[derive(Debug, Parser, Clone)]
pub struct PaymentArgs {
    /// The id of the debt or expense being paid.
    id: String,

    /// The payment amount.
    #[arg(long)]
    amount: Money,
}

impl PaymentArgs {
    pub fn new(id: impl Into<String>, amount: Money) -> Self {
        Self {
            id: id.into(),
            amount,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

/// Args for the `carryover remove` command.
#[derive(Debug, Parser, Clone)]
pub struct RemoveArgs {
    /// The id of the debt to delete.
    id: String,
}

impl RemoveArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `carryover sync` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SyncArgs {
    /// Convert these expenses immediately, even if they are not yet overdue.
    /// May be given multiple times. Exempt categories and allocations still
    /// never convert.
    #[arg(long = "expense-id")]
    expense_ids: Vec<String>,
}

impl SyncArgs {
    pub fn new(expense_ids: Vec<String>) -> Self {
        Self { expense_ids }
    }

    pub fn expense_ids(&self) -> &[String] {
        &self.expense_ids
    }
}

/// Args for the `carryover payoff` command.
#[derive(Debug, Parser, Clone)]
pub struct PayoffArgs {
    /// The id of the debt to project.
    id: String,

    /// The monthly payment to assume. Defaults to the debt's planned amount.
    #[arg(long)]
    monthly: Option<Money>,

    /// How many months forward to project before giving up.
    #[arg(long)]
    horizon_months: Option<u32>,
}

impl PayoffArgs {
    pub fn new(id: impl Into<String>, monthly: Option<Money>, horizon_months: Option<u32>) -> Self {
        Self {
            id: id.into(),
            monthly,
            horizon_months,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn monthly(&self) -> Option<Money> {
        self.monthly
    }

    pub fn horizon_months(&self) -> Option<u32> {
        self.horizon_months
    }
}

fn default_carryover_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("carryover"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --carryover-home or CARRYOVER_HOME instead of relying on the \
                default carryover home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("carryover")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        <Args as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_add_debt_parsing() {
        let args = Args::try_parse_from([
            "carryover",
            "add",
            "debt",
            "Visa",
            "--type",
            "credit_card",
            "--balance",
            "$1,200.00",
            "--minimum",
            "35",
        ])
        .unwrap();
        let Command::Add(add) = args.command() else {
            panic!("expected add command");
        };
        let AddSubcommand::Debt(debt) = add.entity() else {
            panic!("expected debt entity");
        };
        assert_eq!(debt.name(), "Visa");
        assert_eq!(debt.debt_type(), DebtType::CreditCard);
        assert_eq!(debt.balance(), Money::from(1200));
        assert_eq!(debt.minimum(), Some(Money::from(35)));
        assert_eq!(debt.amount(), None);
    }

    #[test]
    fn test_strict_money_parse_rejects_garbage() {
        let result = Args::try_parse_from([
            "carryover",
            "add",
            "debt",
            "Visa",
            "--balance",
            "lots of money",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sync_force_ids() {
        let args = Args::try_parse_from([
            "carryover",
            "sync",
            "--expense-id",
            "e1",
            "--expense-id",
            "e2",
        ])
        .unwrap();
        let Command::Sync(s) = args.command() else {
            panic!("expected sync command");
        };
        assert_eq!(s.expense_ids(), ["e1".to_string(), "e2".to_string()]);
    }
}
