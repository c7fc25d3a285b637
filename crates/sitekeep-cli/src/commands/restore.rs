//! Snapshot restore command
//!
//! Usage: sitekeep restore <SNAPSHOT> [--db PATH]

use super::{Context, Outcome, StoreArgs};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// SQL dump to load
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(ctx: &Context, args: RestoreArgs) -> anyhow::Result<Outcome> {
    let report = sitekeep_store::restore(&args.snapshot, &args.store.db)?;
    crate::output::emit(ctx.json, &report, || crate::output::restore_text(&report))?;

    if report.warnings.is_empty() {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::NeedsAttention)
    }
}
