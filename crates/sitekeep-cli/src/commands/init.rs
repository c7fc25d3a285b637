//! Empty store bootstrap

use super::{Context, Outcome, StoreArgs};
use clap::Args;
use serde::Serialize;
use sitekeep_store::schema::{ensure_default_roles, ensure_schema};
use sitekeep_store::StoreHandle;

#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Serialize)]
struct InitReport {
    db: String,
    roles_added: usize,
}

pub fn execute(ctx: &Context, args: InitArgs) -> anyhow::Result<Outcome> {
    if let Some(parent) = args.store.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let handle = StoreHandle::create(&args.store.db)?;
    ensure_schema(&handle)?;
    let roles_added = ensure_default_roles(&handle, chrono::Utc::now().timestamp_millis())?;
    handle.close()?;

    let report = InitReport {
        db: args.store.db.display().to_string(),
        roles_added,
    };
    crate::output::emit(ctx.json, &report, || {
        format!(
            "✓ Store ready at {} ({} roles added)\n",
            report.db, report.roles_added
        )
    })?;
    Ok(Outcome::Clean)
}
