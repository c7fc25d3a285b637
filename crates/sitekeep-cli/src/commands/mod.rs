//! Subcommand implementations

use anyhow::Context as _;
use clap::Args;
use sitekeep_core::MaintenanceConfig;
use std::path::PathBuf;

pub mod init;
pub mod maintain;
pub mod provision;
pub mod reconcile;
pub mod restore;
pub mod status;

/// Settings shared by every subcommand
pub struct Context {
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn load_config(&self) -> anyhow::Result<MaintenanceConfig> {
        match &self.config_path {
            Some(path) => MaintenanceConfig::load(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(MaintenanceConfig::default()),
        }
    }
}

/// How a successful command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// The command ran but left something for the operator to look at
    NeedsAttention,
}

/// Location of the store file
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Path to the CMS SQLite store
    #[arg(long, env = "SITEKEEP_DB", default_value = ".tmp/data.db")]
    pub db: PathBuf,
}
