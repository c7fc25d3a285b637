//! Singleton reconcile command
//!
//! Usage: sitekeep reconcile [--table T]... [--locale L] [--dry-run] [--db PATH]

use super::{Context, Outcome, StoreArgs};
use crate::output::PlannedTable;
use clap::Args;
use sitekeep_core::config::TableTarget;
use sitekeep_core::{MaintenanceConfig, SingletonTable};
use sitekeep_store::reconcile::plan_table;
use sitekeep_store::{reconcile_targets, with_store};

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Only reconcile these tables (defaults to every configured table)
    #[arg(long = "table", value_parser = parse_table)]
    pub tables: Vec<SingletonTable>,

    /// Override the canonical locale for this run
    #[arg(long)]
    pub locale: Option<String>,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

fn parse_table(value: &str) -> Result<SingletonTable, String> {
    value.parse()
}

/// Resolve the tables and locales this run covers
pub fn targets(
    config: &MaintenanceConfig,
    tables: &[SingletonTable],
    locale: Option<&str>,
) -> anyhow::Result<Vec<TableTarget>> {
    let mut targets = if tables.is_empty() {
        config.tables()?
    } else {
        tables
            .iter()
            .map(|&table| TableTarget {
                table,
                locale: config.locale_for(table),
            })
            .collect()
    };
    if let Some(locale) = locale {
        anyhow::ensure!(!locale.trim().is_empty(), "--locale must not be empty");
        for target in &mut targets {
            target.locale = locale.to_string();
        }
    }
    Ok(targets)
}

pub fn execute(ctx: &Context, args: ReconcileArgs) -> anyhow::Result<Outcome> {
    let config = ctx.load_config()?;
    let targets = targets(&config, &args.tables, args.locale.as_deref())?;

    if args.dry_run {
        let plans = with_store(&args.store.db, |handle| {
            let handle = &*handle;
            targets
                .iter()
                .map(|t| {
                    Ok(PlannedTable {
                        table: t.table.to_string(),
                        locale: t.locale.clone(),
                        plan: plan_table(handle, t.table, &t.locale)?,
                    })
                })
                .collect::<sitekeep_store::Result<Vec<_>>>()
        })?;
        crate::output::emit(ctx.json, &plans, || crate::output::plan_text(&plans))?;
        return Ok(Outcome::Clean);
    }

    let reports = with_store(&args.store.db, |handle| reconcile_targets(handle, &targets))?;
    crate::output::emit(ctx.json, &reports, || crate::output::reconcile_text(&reports))?;
    Ok(Outcome::Clean)
}
