#![allow(dead_code)]

use rusqlite::{params, Connection};
use sitekeep_core::SingletonTable;
use sitekeep_store::schema::{ensure_default_roles, ensure_schema};
use sitekeep_store::StoreHandle;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 2025-01-01T00:00:00Z in epoch milliseconds
pub const JAN_1_2025: i64 = 1_735_689_600_000;

/// Fresh on-disk store with the CMS tables and default roles
pub fn fresh_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("data.db");
    let handle = StoreHandle::create(&path).unwrap();
    ensure_schema(&handle).unwrap();
    ensure_default_roles(&handle, 0).unwrap();
    handle.close().unwrap();
    path
}

pub fn open(path: &Path) -> StoreHandle {
    StoreHandle::open(path).unwrap()
}

pub fn insert_row(
    conn: &Connection,
    table: SingletonTable,
    id: i64,
    published_at: Option<i64>,
    locale: Option<&str>,
) {
    conn.execute(
        &format!(
            "INSERT INTO {} (id, document_id, locale, published_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0)",
            table.table_name()
        ),
        params![id, format!("doc-{}", table.table_name()), locale, published_at],
    )
    .unwrap();
}

/// (id, locale, published_at, updated_at) for every row, id ordered
pub fn dump_rows(
    conn: &Connection,
    table: SingletonTable,
) -> Vec<(i64, Option<String>, Option<i64>, Option<i64>)> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, locale, published_at, updated_at FROM {} ORDER BY id",
            table.table_name()
        ))
        .unwrap();
    stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

pub fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}
