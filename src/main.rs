use carryover::args::{
    AddSubcommand, Args, Command, ListSubcommand, PaySubcommand,
};
use carryover::{commands, Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().carryover_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.pay_date(), init_args.plan_kind())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = Config::load(home).await?;
            match add_args.entity() {
                AddSubcommand::Debt(debt_args) => {
                    commands::add_debt(&config, debt_args.clone()).await?.print()
                }
                AddSubcommand::Expense(expense_args) => {
                    commands::add_expense(&config, expense_args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            match list_args.entity() {
                ListSubcommand::Debts => commands::list_debts(&config).await?.print(),
                ListSubcommand::Expenses => commands::list_expenses(&config).await?.print(),
            }
        }

        Command::Pay(pay_args) => {
            let config = Config::load(home).await?;
            match pay_args.entity() {
                PaySubcommand::Debt(payment) => {
                    commands::pay_debt(&config, payment.id(), payment.amount())
                        .await?
                        .print()
                }
                PaySubcommand::Expense(payment) => {
                    commands::pay_expense(&config, payment.id(), payment.amount())
                        .await?
                        .print()
                }
            }
        }

        Command::Remove(remove_args) => {
            let config = Config::load(home).await?;
            commands::remove_debt(&config, remove_args.id()).await?.print()
        }

        Command::Sync(sync_args) => {
            let config = Config::load(home).await?;
            commands::sync(&config, sync_args.expense_ids())
                .await?
                .print()
        }

        Command::Summary => {
            let config = Config::load(home).await?;
            commands::summary(&config).await?.print()
        }

        Command::Payoff(payoff_args) => {
            let config = Config::load(home).await?;
            commands::payoff(&config, payoff_args.clone()).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
