//! Singleton status command
//!
//! Usage: sitekeep status [--check] [--db PATH]

use super::{Context, Outcome, StoreArgs};
use clap::Args;
use serde::Serialize;
use sitekeep_core::model::TableStatus;
use sitekeep_store::inspect::inspect;
use sitekeep_store::with_store;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Exit with status 2 when any table breaks the singleton invariant
    #[arg(long)]
    pub check: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Serialize)]
struct StatusEntry<'a> {
    #[serde(flatten)]
    status: &'a TableStatus,
    expected_locale: &'a str,
    canonical: bool,
}

pub fn execute(ctx: &Context, args: StatusArgs) -> anyhow::Result<Outcome> {
    let config = ctx.load_config()?;
    let targets = config.tables()?;

    let statuses = with_store(&args.store.db, |handle| {
        let handle = &*handle;
        targets
            .iter()
            .map(|t| Ok((inspect(handle, t.table)?, t.locale.clone())))
            .collect::<sitekeep_store::Result<Vec<_>>>()
    })?;

    let entries: Vec<StatusEntry<'_>> = statuses
        .iter()
        .map(|(status, locale)| StatusEntry {
            status,
            expected_locale: locale,
            canonical: status.is_canonical(locale),
        })
        .collect();
    crate::output::emit(ctx.json, &entries, || crate::output::status_text(&statuses))?;

    if args.check && entries.iter().any(|e| !e.canonical) {
        Ok(Outcome::NeedsAttention)
    } else {
        Ok(Outcome::Clean)
    }
}
