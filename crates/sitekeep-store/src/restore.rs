//! Snapshot restore
//!
//! Rebuilds a store file from a SQL dump. This is a full replace: the
//! existing store (and its journal sidecars) is deleted, a new empty store
//! is created, and the dump is executed against it with foreign key
//! enforcement off, since exports do not order tables topologically.
//!
//! There is no rollback. A failed restore leaves a partially loaded store;
//! re-running with the same snapshot starts from scratch again.

#![allow(clippy::result_large_err)]

use crate::db::StoreHandle;
use crate::errors::{from_rusqlite, io_error, restore_failed, snapshot_unreadable, Result};
use crate::inspect::table_exists;
use sha2::{Digest, Sha256};
use sitekeep_core::model::{RestoreReport, TableCount};
use sitekeep_core::{log_op_end, log_op_error, log_op_start, SingletonTable};
use sitekeep_core_types::PassId;
use std::path::Path;
use std::time::Instant;

const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Replace the store at `target_path` with the contents of `snapshot_path`
pub fn restore(snapshot_path: &Path, target_path: &Path) -> Result<RestoreReport> {
    let pass_id = PassId::new();
    let start = Instant::now();
    let snapshot = snapshot_path.display().to_string();
    log_op_start!(
        "restore",
        pass_id = pass_id.as_str(),
        snapshot_path = snapshot.as_str(),
        target_path = %target_path.display()
    );

    let result = run(snapshot_path, target_path);
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(report) => {
            log_op_end!(
                "restore",
                duration_ms = duration_ms,
                pass_id = pass_id.as_str(),
                snapshot_digest = report.snapshot_digest.as_str(),
                warnings = report.warnings.len() as u64
            );
        }
        Err(err) => {
            log_op_error!(
                "restore",
                err,
                duration_ms = duration_ms,
                pass_id = pass_id.as_str(),
                snapshot_path = snapshot.as_str()
            );
        }
    }
    result
}

fn run(snapshot_path: &Path, target_path: &Path) -> Result<RestoreReport> {
    let snapshot = snapshot_path.display().to_string();
    let target = target_path.display().to_string();

    // Read before deleting anything so an unreadable dump costs nothing.
    let bytes = std::fs::read(snapshot_path).map_err(|e| snapshot_unreadable(&snapshot, e.to_string()))?;
    let sql = std::str::from_utf8(&bytes)
        .map_err(|e| snapshot_unreadable(&snapshot, format!("dump is not valid UTF-8: {}", e)))?;
    let snapshot_digest = hex::encode(Sha256::digest(&bytes));

    remove_store_files(target_path)?;
    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("restore", &target, e))?;
    }

    let handle = StoreHandle::create(target_path)?;
    let conn = handle.conn();
    conn.execute_batch("PRAGMA foreign_keys = OFF;")
        .map_err(|e| restore_failed(&snapshot, e))?;
    conn.execute_batch(sql)
        .map_err(|e| restore_failed(&snapshot, e))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| restore_failed(&snapshot, e))?;

    let mut table_counts = Vec::with_capacity(SingletonTable::ALL.len());
    let mut warnings = Vec::new();
    for table in SingletonTable::ALL {
        let rows = count_rows(conn, table)?;
        if table.is_load_bearing() {
            match rows {
                None => warnings.push(format!("table {} is missing from the snapshot", table)),
                Some(0) => warnings.push(format!("table {} is empty after restore", table)),
                Some(_) => {}
            }
        }
        table_counts.push(TableCount { table, rows });
    }
    for warning in &warnings {
        tracing::warn!(snapshot_path = snapshot.as_str(), "{}", warning);
    }

    handle.close()?;

    Ok(RestoreReport {
        snapshot_path: snapshot,
        target_path: target,
        snapshot_digest,
        snapshot_bytes: bytes.len() as u64,
        table_counts,
        warnings,
    })
}

fn count_rows(conn: &rusqlite::Connection, table: SingletonTable) -> Result<Option<i64>> {
    let name = table.table_name();
    if !table_exists(conn, name).map_err(from_rusqlite)? {
        return Ok(None);
    }
    let count = conn
        .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", name), [], |row| {
            row.get(0)
        })
        .map_err(|e| from_rusqlite(e).with_op("restore_count").with_table(name))?;
    Ok(Some(count))
}

/// Delete the store file and any SQLite sidecars; absent files are fine
fn remove_store_files(target_path: &Path) -> Result<()> {
    let mut paths = vec![target_path.to_path_buf()];
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = target_path.as_os_str().to_owned();
        sidecar.push(suffix);
        paths.push(sidecar.into());
    }

    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "removed existing store file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error("restore", &path.display().to_string(), e)),
        }
    }
    Ok(())
}
