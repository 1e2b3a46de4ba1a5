//! Configuration file handling.
//!
//! The configuration file is stored at `$CARRYOVER_HOME/config.json` and holds
//! the plan-level settings that drive carryover decisions: the pay date, the
//! overdue grace window, and the kind of plan. The SQLite database lives in
//! the same directory.

use crate::db::Db;
use crate::engine::{CarryoverPolicy, PlanKind, OVERDUE_GRACE_DAYS};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "carryover";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const CARRYOVER_SQLITE: &str = "carryover.sqlite";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$CARRYOVER_HOME`, and from there
/// it loads `config.json` and the database. It is constructed once at process
/// start and passed by reference to whatever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    sqlite_path: PathBuf,
    db: Db,
}

impl Config {
    /// Creates the data directory and:
    /// - Writes an initial `config.json` with the given pay date and plan kind
    /// - Creates and initializes the SQLite database
    ///
    /// # Errors
    /// - Returns an error if `pay_date` is out of range or any file operation
    ///   fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        pay_date: u32,
        plan_kind: PlanKind,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the carryover home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            pay_date,
            grace_days: OVERDUE_GRACE_DAYS,
            plan_kind,
        };
        config_file.validate()?;
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(CARRYOVER_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            sqlite_path,
            db,
        })
    }

    /// This will
    /// - validate that the home directory and config file exist
    /// - load and validate the config file
    /// - load the SQLite database
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Carryover home is missing, run 'carryover init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(CARRYOVER_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            sqlite_path,
            db,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// Day-of-month, 1-31, on which income arrives and default due dates land.
    pub fn pay_date(&self) -> u32 {
        self.config_file.pay_date
    }

    pub fn grace_days(&self) -> i64 {
        self.config_file.grace_days
    }

    pub fn plan_kind(&self) -> PlanKind {
        self.config_file.plan_kind
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    /// The carryover policy derived from this configuration.
    pub fn policy(&self) -> CarryoverPolicy {
        CarryoverPolicy {
            default_due_day: self.config_file.pay_date,
            grace_days: self.config_file.grace_days,
            plan_kind: self.config_file.plan_kind,
        }
    }
}

/// Represents the serialization and deserialization format of the
/// configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "carryover",
///   "config_version": 1,
///   "pay_date": 27,
///   "grace_days": 5,
///   "plan_kind": "personal"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "carryover"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Day-of-month on which income arrives, 1-31
    pay_date: u32,

    /// Days past a due date before an unpaid obligation carries forward
    grace_days: i64,

    /// Whether this plan converts unpaid expenses into debts
    plan_kind: PlanKind,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            pay_date: 27,
            grace_days: OVERDUE_GRACE_DAYS,
            plan_kind: PlanKind::Personal,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its
    /// settings fail validation.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        config.validate()?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.pay_date) {
            bail!("pay_date must be between 1 and 31, got {}", self.pay_date);
        }
        if self.grace_days < 0 {
            bail!("grace_days must not be negative, got {}", self.grace_days);
        }
        Ok(())
    }
}
