//! Report rendering

use serde::Serialize;
use sitekeep_core::model::{ProvisionReport, ReconcileReport, RestoreReport, TableStatus};
use sitekeep_core::ReconcilePlan;

/// Print `value` as pretty JSON, or the text rendering otherwise
pub fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

pub fn restore_text(report: &RestoreReport) -> String {
    let mut out = format!(
        "Restored {} from {}\n  snapshot_digest: {}\n  snapshot_bytes: {}\n",
        report.target_path, report.snapshot_path, report.snapshot_digest, report.snapshot_bytes
    );
    for count in &report.table_counts {
        match count.rows {
            Some(rows) => out.push_str(&format!("  {}: {} rows\n", count.table, rows)),
            None => out.push_str(&format!("  {}: (missing)\n", count.table)),
        }
    }
    for warning in &report.warnings {
        out.push_str(&format!("⚠ {}\n", warning));
    }
    out
}

pub fn reconcile_text(reports: &[ReconcileReport]) -> String {
    let mut out = String::new();
    for r in reports {
        match r.kept_id {
            None => out.push_str(&format!("{}: nothing to reconcile\n", r.table)),
            Some(kept) if r.is_noop() => {
                out.push_str(&format!("{}: already canonical (id {})\n", r.table, kept))
            }
            Some(kept) => out.push_str(&format!(
                "✓ {}: kept id {} of {} rows, deleted {:?}, {} locale={}\n",
                r.table,
                kept,
                r.rows_seen,
                r.deleted_ids,
                if r.updated { "updated" } else { "unchanged" },
                r.locale
            )),
        }
    }
    out
}

#[derive(Debug, Serialize)]
pub struct PlannedTable {
    pub table: String,
    pub locale: String,
    pub plan: Option<ReconcilePlan>,
}

pub fn plan_text(plans: &[PlannedTable]) -> String {
    let mut out = String::from("Dry run (no changes written):\n");
    for p in plans {
        match &p.plan {
            None => out.push_str(&format!("  {}: nothing to reconcile\n", p.table)),
            Some(plan) => out.push_str(&format!(
                "  {}: keep id {}, delete {:?}, fix locale: {}, publish: {}\n",
                p.table, plan.keep, plan.delete, plan.fix_locale, plan.fill_published_at
            )),
        }
    }
    out
}

pub fn provision_text(reports: &[ProvisionReport]) -> String {
    let mut out = String::new();
    for r in reports {
        out.push_str(&format!(
            "Role {} (id {}): {} inserted, {} skipped, {} failed\n",
            r.role_type,
            r.role_id,
            r.inserted.len(),
            r.skipped.len(),
            r.failures.len()
        ));
        for action in &r.inserted {
            out.push_str(&format!("  + {}\n", action));
        }
        for failure in &r.failures {
            out.push_str(&format!("  ✗ {}: {}\n", failure.action, failure.message));
        }
    }
    out
}

pub fn status_text(statuses: &[(TableStatus, String)]) -> String {
    let mut out = String::new();
    for (status, locale) in statuses {
        let marker = if status.is_canonical(locale) { "✓" } else { "✗" };
        out.push_str(&format!(
            "{} {}: {} rows ({} published, {} drafts), locales {:?}, expected {}\n",
            marker,
            status.table,
            status.rows,
            status.published,
            status.drafts,
            status.locales,
            locale
        ));
    }
    out
}
