//! Full maintenance run: restore (optional), reconcile, provision
//!
//! Each step opens its own store handle; nothing carries over in memory
//! between steps.

use super::{Context, Outcome, StoreArgs};
use clap::Args;
use serde::Serialize;
use sitekeep_core::model::{ProvisionReport, ReconcileReport, RestoreReport};
use sitekeep_store::{provision_all, reconcile_all, with_store};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct MaintainArgs {
    /// Restore from this SQL dump first
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Serialize)]
struct MaintainReport {
    restore: Option<RestoreReport>,
    reconcile: Vec<ReconcileReport>,
    provision: Vec<ProvisionReport>,
}

pub fn execute(ctx: &Context, args: MaintainArgs) -> anyhow::Result<Outcome> {
    let config = ctx.load_config()?;

    let restore = match &args.snapshot {
        Some(snapshot) => Some(sitekeep_store::restore(snapshot, &args.store.db)?),
        None => None,
    };
    let reconcile = with_store(&args.store.db, |handle| reconcile_all(handle, &config))?;
    let provision = with_store(&args.store.db, |handle| provision_all(handle, &config))?;

    let report = MaintainReport {
        restore,
        reconcile,
        provision,
    };
    crate::output::emit(ctx.json, &report, || {
        let mut out = String::new();
        if let Some(restore) = &report.restore {
            out.push_str(&crate::output::restore_text(restore));
        }
        out.push_str(&crate::output::reconcile_text(&report.reconcile));
        out.push_str(&crate::output::provision_text(&report.provision));
        out
    })?;

    let restore_clean = report
        .restore
        .as_ref()
        .map_or(true, |r| r.warnings.is_empty());
    if restore_clean && report.provision.iter().all(|r| r.is_complete()) {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::NeedsAttention)
    }
}
