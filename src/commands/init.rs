use crate::commands::Out;
use crate::engine::PlanKind;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Writes an initial `config.json` with the given pay date and plan kind
/// - Creates and initializes the SQLite database
///
/// # Arguments
/// - `carryover_home` - The directory that will be the root of the data
///   directory, e.g. `$HOME/carryover`
/// - `pay_date` - Day-of-month, 1-31, on which income arrives. Default due
///   dates land on this day.
/// - `plan_kind` - Whether this plan converts unpaid expenses into debts.
///
/// # Errors
/// - Returns an error if the pay date is out of range or any file operation
///   fails.
pub async fn init(carryover_home: &Path, pay_date: u32, plan_kind: PlanKind) -> Result<Out<()>> {
    let _config = Config::create(carryover_home, pay_date, plan_kind)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok("Successfully created the carryover directory and config".into())
}
