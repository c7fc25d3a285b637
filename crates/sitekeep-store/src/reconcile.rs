//! Singleton reconciliation
//!
//! Collapses every configured singleton table to one canonical row: the
//! survivor is chosen by `sitekeep_core::plan_reconcile`, every other row is
//! deleted, and the survivor gets the canonical locale and a publish
//! timestamp if it had none.
//!
//! Each table is reconciled inside one transaction, so a rejected write
//! leaves the table exactly as it was before the pass. Across tables the
//! pass is fail-fast: partial reconciliation is structurally unsafe, so the
//! first failing table stops the run.

#![allow(clippy::result_large_err)]

use crate::db::StoreHandle;
use crate::errors::{from_rusqlite, reconcile_write_failed, Result};
use crate::inspect::load_rows;
use rusqlite::params;
use sitekeep_core::config::TableTarget;
use sitekeep_core::model::ReconcileReport;
use sitekeep_core::{
    log_op_end, log_op_error, log_op_start, plan_reconcile, MaintenanceConfig, ReconcilePlan,
    SingletonTable,
};
use sitekeep_core_types::PassId;
use std::time::Instant;

/// Reconcile one table to `canonical_locale`, stamping with the current time
pub fn reconcile(
    handle: &mut StoreHandle,
    table: SingletonTable,
    canonical_locale: &str,
) -> Result<ReconcileReport> {
    let now = chrono::Utc::now().timestamp_millis();
    reconcile_at(handle, table, canonical_locale, now)
}

/// Reconcile one table using `now_ms` for any timestamp written
pub fn reconcile_at(
    handle: &mut StoreHandle,
    table: SingletonTable,
    canonical_locale: &str,
    now_ms: i64,
) -> Result<ReconcileReport> {
    reconcile_table(handle, table, canonical_locale, now_ms, &PassId::new())
}

/// Reconcile every configured table in order, stopping at the first failure
pub fn reconcile_all(
    handle: &mut StoreHandle,
    config: &MaintenanceConfig,
) -> Result<Vec<ReconcileReport>> {
    let targets = config.tables()?;
    reconcile_targets(handle, &targets)
}

/// Reconcile `targets` in order as one pass: a single pass id and clock,
/// stopping at the first failed table
pub fn reconcile_targets(
    handle: &mut StoreHandle,
    targets: &[TableTarget],
) -> Result<Vec<ReconcileReport>> {
    let now = chrono::Utc::now().timestamp_millis();
    reconcile_targets_at(handle, targets, now, &PassId::new())
}

fn reconcile_targets_at(
    handle: &mut StoreHandle,
    targets: &[TableTarget],
    now_ms: i64,
    pass_id: &PassId,
) -> Result<Vec<ReconcileReport>> {
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        reports.push(reconcile_table(
            handle,
            target.table,
            &target.locale,
            now_ms,
            pass_id,
        )?);
    }
    Ok(reports)
}

/// Compute what reconciling `table` would do, without writing
pub fn plan_table(
    handle: &StoreHandle,
    table: SingletonTable,
    canonical_locale: &str,
) -> Result<Option<ReconcilePlan>> {
    let rows = load_rows(handle.conn(), table)
        .map_err(|e| from_rusqlite(e).with_op("plan").with_table(table.table_name()))?;
    Ok(plan_reconcile(&rows, canonical_locale))
}

fn reconcile_table(
    handle: &mut StoreHandle,
    table: SingletonTable,
    canonical_locale: &str,
    now_ms: i64,
    pass_id: &PassId,
) -> Result<ReconcileReport> {
    let start = Instant::now();
    log_op_start!(
        "reconcile",
        pass_id = pass_id.as_str(),
        table = table.table_name(),
        locale = canonical_locale
    );

    let result = apply(handle, table, canonical_locale, now_ms);
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(report) => {
            log_op_end!(
                "reconcile",
                duration_ms = duration_ms,
                pass_id = pass_id.as_str(),
                table = table.table_name(),
                deleted = report.deleted_ids.len() as u64,
                updated = report.updated
            );
        }
        Err(err) => {
            log_op_error!(
                "reconcile",
                err,
                duration_ms = duration_ms,
                pass_id = pass_id.as_str(),
                table = table.table_name()
            );
        }
    }
    result
}

fn apply(
    handle: &mut StoreHandle,
    table: SingletonTable,
    canonical_locale: &str,
    now_ms: i64,
) -> Result<ReconcileReport> {
    let name = table.table_name();
    let tx = handle
        .conn_mut()
        .transaction()
        .map_err(|e| reconcile_write_failed(table, Vec::new(), e))?;

    let rows = load_rows(&tx, table)
        .map_err(|e| from_rusqlite(e).with_op("reconcile").with_table(name))?;

    let Some(plan) = plan_reconcile(&rows, canonical_locale) else {
        tracing::info!(table = name, "nothing to reconcile");
        return Ok(ReconcileReport::nothing_to_reconcile(table, canonical_locale));
    };

    let delete_sql = format!("DELETE FROM \"{}\" WHERE id = ?1", name);
    let mut touched = Vec::with_capacity(plan.delete.len());
    for &row_id in &plan.delete {
        tracing::info!(
            table = name,
            row_id = row_id,
            kept_id = plan.keep,
            "deleting non-canonical singleton row"
        );
        touched.push(row_id);
        tx.execute(&delete_sql, [row_id])
            .map_err(|e| reconcile_write_failed(table, touched.clone(), e))?;
    }

    let updated = plan.needs_update();
    if updated {
        // COALESCE keeps an existing publish timestamp untouched.
        let update_sql = format!(
            "UPDATE \"{}\"
             SET locale = ?1, published_at = COALESCE(published_at, ?2), updated_at = ?2
             WHERE id = ?3",
            name
        );
        tx.execute(&update_sql, params![canonical_locale, now_ms, plan.keep])
            .map_err(|e| reconcile_write_failed(table, touched.clone(), e))?;
    }

    tx.commit()
        .map_err(|e| reconcile_write_failed(table, touched.clone(), e))?;

    Ok(ReconcileReport {
        table,
        locale: canonical_locale.to_string(),
        rows_seen: rows.len(),
        kept_id: Some(plan.keep),
        deleted_ids: plan.delete,
        updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;

    fn store() -> StoreHandle {
        let handle = StoreHandle::open_in_memory().unwrap();
        ensure_schema(&handle).unwrap();
        handle
    }

    #[test]
    fn test_empty_table_is_noop() {
        let mut handle = store();
        let report = reconcile(&mut handle, SingletonTable::DonationsPage, "en").unwrap();
        assert_eq!(report.kept_id, None);
        assert!(report.is_noop());
    }

    #[test]
    fn test_targets_share_pass_id_and_clock() {
        let mut handle = store();
        handle
            .conn_mut()
            .execute_batch(
                "INSERT INTO globals (id, published_at) VALUES (1, NULL);
                 INSERT INTO home_pages (id, published_at) VALUES (1, NULL);",
            )
            .unwrap();
        let targets = vec![
            TableTarget {
                table: SingletonTable::Globals,
                locale: "en".to_string(),
            },
            TableTarget {
                table: SingletonTable::HomePage,
                locale: "fr".to_string(),
            },
        ];

        let reports = reconcile_targets_at(&mut handle, &targets, 42, &PassId::new()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].locale, "fr");

        let stamps: Vec<i64> = handle
            .conn()
            .prepare(
                "SELECT published_at FROM globals
                 UNION ALL SELECT published_at FROM home_pages",
            )
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(stamps, vec![42, 42]);
    }

    #[test]
    fn test_plan_table_does_not_write() {
        let mut handle = store();
        handle
            .conn_mut()
            .execute_batch(
                "INSERT INTO globals (id, published_at) VALUES (1, NULL);
                 INSERT INTO globals (id, published_at) VALUES (2, NULL);",
            )
            .unwrap();

        let plan = plan_table(&handle, SingletonTable::Globals, "en")
            .unwrap()
            .unwrap();
        assert_eq!(plan.keep, 2);
        assert_eq!(plan.delete, vec![1]);

        let count: i64 = handle
            .conn()
            .query_row("SELECT COUNT(*) FROM globals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
