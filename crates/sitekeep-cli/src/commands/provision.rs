//! Permission provision command
//!
//! Usage: sitekeep provision [--role TYPE] [--db PATH]

use super::{Context, Outcome, StoreArgs};
use clap::Args;
use sitekeep_store::provision::provision_all;
use sitekeep_store::with_store;

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Only provision this role type (defaults to every configured role)
    #[arg(long)]
    pub role: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(ctx: &Context, args: ProvisionArgs) -> anyhow::Result<Outcome> {
    let config = ctx.load_config()?;

    let reports = match &args.role {
        Some(role) => {
            let grants = config.grants_for(role);
            anyhow::ensure!(!grants.is_empty(), "no grants configured for role '{}'", role);
            vec![with_store(&args.store.db, |handle| {
                sitekeep_store::provision(handle, role, grants)
            })?]
        }
        None => with_store(&args.store.db, |handle| provision_all(handle, &config))?,
    };

    crate::output::emit(ctx.json, &reports, || crate::output::provision_text(&reports))?;

    if reports.iter().all(|r| r.is_complete()) {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::NeedsAttention)
    }
}
