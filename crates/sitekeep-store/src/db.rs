//! Store handle management
//!
//! A `StoreHandle` owns the SQLite connection for the duration of one
//! maintenance pass. `with_store` scopes acquisition and release so the
//! connection is closed on every exit path.

use crate::errors::{from_rusqlite, store_unavailable, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Exclusive handle on a CMS store
pub struct StoreHandle {
    conn: Connection,
    location: String,
}

impl StoreHandle {
    /// Open an existing store; a missing file is an error, not a new store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let location = path.as_ref().display().to_string();
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| store_unavailable(&location, e))?;
        Self::configured(conn, location)
    }

    /// Open a store, creating an empty file if none exists
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let location = path.as_ref().display().to_string();
        let conn = Connection::open(path.as_ref()).map_err(|e| store_unavailable(&location, e))?;
        Self::configured(conn, location)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| store_unavailable(":memory:", e))?;
        Self::configured(conn, ":memory:".to_string())
    }

    fn configured(conn: Connection, location: String) -> Result<Self> {
        configure(&conn).map_err(|e| e.with_path(location.clone()))?;
        Ok(Self { conn, location })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Path the store was opened from (`:memory:` for in-memory stores)
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| from_rusqlite(e))
    }
}

/// Enforce foreign keys and wait on a busy store instead of failing at once
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        .map_err(from_rusqlite)?;
    Ok(())
}

/// Open the store at `path`, run `f`, and close the store afterwards
///
/// The pass's own error wins over a close error.
pub fn with_store<P, T, F>(path: P, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&mut StoreHandle) -> Result<T>,
{
    let mut handle = StoreHandle::open(path)?;
    let result = f(&mut handle);
    let location = handle.location().to_string();
    match (result, handle.close()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err.with_path(location)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            tracing::warn!(store = %location, error = %close_err, "store close failed after pass error");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitekeep_core::ExErrorKind;

    #[test]
    fn test_open_missing_store_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = StoreHandle::open(dir.path().join("missing.db"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ExErrorKind::StoreUnavailable);
        assert!(err.path().unwrap().ends_with("missing.db"));
    }

    #[test]
    fn test_create_then_open() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.db");
        StoreHandle::create(&path).unwrap().close().unwrap();

        let handle = StoreHandle::open(&path).unwrap();
        let fk: i64 = handle
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_with_store_propagates_pass_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.db");
        StoreHandle::create(&path).unwrap().close().unwrap();

        let result: Result<()> = with_store(&path, |_| {
            Err(sitekeep_core::ExError::new(ExErrorKind::Internal).with_message("boom"))
        });
        assert_eq!(result.unwrap_err().message(), "boom");
    }
}
