//! Read-only views of singleton tables

use crate::db::StoreHandle;
use crate::errors::{from_rusqlite, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use sitekeep_core::model::TableStatus;
use sitekeep_core::{SingletonRow, SingletonTable, StoredTime};
use std::collections::BTreeSet;

/// Load the bookkeeping columns of every row, in ascending id order
pub fn load_rows(conn: &Connection, table: SingletonTable) -> rusqlite::Result<Vec<SingletonRow>> {
    // Table names come from the closed SingletonTable set.
    let sql = format!(
        "SELECT id, document_id, locale, published_at, created_at, updated_at
         FROM \"{}\" ORDER BY id ASC",
        table.table_name()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SingletonRow {
                id: row.get(0)?,
                document_id: row.get(1)?,
                locale: row.get(2)?,
                published_at: stored_time(row, 3)?,
                created_at: stored_time(row, 4)?,
                updated_at: stored_time(row, 5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Read a DATETIME column whatever storage class the value landed in
fn stored_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<StoredTime>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(ms) => Some(StoredTime::Millis(ms)),
        ValueRef::Real(ms) => Some(StoredTime::Millis(ms as i64)),
        ValueRef::Text(text) | ValueRef::Blob(text) => {
            Some(StoredTime::Text(String::from_utf8_lossy(text).into_owned()))
        }
    })
}

/// Whether `name` exists as a table in the store
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )
}

/// Summarize the current contents of one singleton table
pub fn inspect(handle: &StoreHandle, table: SingletonTable) -> Result<TableStatus> {
    let rows = load_rows(handle.conn(), table)
        .map_err(|e| from_rusqlite(e).with_op("inspect").with_table(table.table_name()))?;

    let published = rows.iter().filter(|r| r.is_published()).count();
    let locales: BTreeSet<String> = rows.iter().filter_map(|r| r.locale.clone()).collect();

    Ok(TableStatus {
        table,
        rows: rows.len(),
        published,
        drafts: rows.len() - published,
        locales: locales.into_iter().collect(),
    })
}

/// Inspect each table in `tables`, in order
pub fn inspect_all(handle: &StoreHandle, tables: &[SingletonTable]) -> Result<Vec<TableStatus>> {
    tables.iter().map(|t| inspect(handle, *t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_schema;

    #[test]
    fn test_inspect_counts_drafts_and_locales() {
        let handle = StoreHandle::open_in_memory().unwrap();
        ensure_schema(&handle).unwrap();
        handle
            .conn()
            .execute_batch(
                "INSERT INTO home_pages (locale, published_at) VALUES ('en', NULL);
                 INSERT INTO home_pages (locale, published_at) VALUES ('en', 100);
                 INSERT INTO home_pages (locale, published_at) VALUES ('fr', NULL);",
            )
            .unwrap();

        let status = inspect(&handle, SingletonTable::HomePage).unwrap();
        assert_eq!(status.rows, 3);
        assert_eq!(status.published, 1);
        assert_eq!(status.drafts, 2);
        assert_eq!(status.locales, vec!["en".to_string(), "fr".to_string()]);
        assert!(!status.is_canonical("en"));
    }

    #[test]
    fn test_load_rows_is_id_ordered() {
        let handle = StoreHandle::open_in_memory().unwrap();
        ensure_schema(&handle).unwrap();
        handle
            .conn()
            .execute_batch(
                "INSERT INTO globals (id, published_at) VALUES (9, NULL);
                 INSERT INTO globals (id, published_at) VALUES (2, 5);",
            )
            .unwrap();

        let ids: Vec<i64> = load_rows(handle.conn(), SingletonTable::Globals)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn test_load_rows_accepts_text_timestamps() {
        let handle = StoreHandle::open_in_memory().unwrap();
        ensure_schema(&handle).unwrap();
        handle
            .conn()
            .execute_batch(
                "INSERT INTO globals (id, published_at, created_at, updated_at)
                 VALUES (1, '2025-01-01', 7, '2025-01-01 10:00:00');
                 INSERT INTO globals (id, published_at) VALUES (2, NULL);",
            )
            .unwrap();

        let rows = load_rows(handle.conn(), SingletonTable::Globals).unwrap();
        assert_eq!(
            rows[0].published_at,
            Some(StoredTime::Text("2025-01-01".to_string()))
        );
        assert_eq!(rows[0].created_at, Some(StoredTime::Millis(7)));
        assert_eq!(
            rows[0].updated_at,
            Some(StoredTime::Text("2025-01-01 10:00:00".to_string()))
        );
        assert_eq!(rows[1].published_at, None);

        let status = inspect(&handle, SingletonTable::Globals).unwrap();
        assert_eq!(status.published, 1);
        assert_eq!(status.drafts, 1);
    }

    #[test]
    fn test_inspect_missing_table_is_persistence_error() {
        let handle = StoreHandle::open_in_memory().unwrap();
        let err = inspect(&handle, SingletonTable::Globals).unwrap_err();
        assert_eq!(err.table(), Some("globals"));
    }
}
