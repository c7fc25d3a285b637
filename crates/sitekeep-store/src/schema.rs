//! Schema bootstrap for empty stores
//!
//! The CMS owns its schema; this only exists so that a fresh development
//! store (and the test suites) can be prepared without booting the server.
//! Statements are `IF NOT EXISTS`, so existing tables are never altered.

use crate::db::StoreHandle;
use crate::errors::{from_rusqlite, Result};
use rusqlite::params;

const CMS_TABLES_SQL: &str = include_str!("../schema/001_cms_tables.sql");

/// Role types the CMS seeds on first boot
pub const DEFAULT_ROLES: [(&str, &str, &str); 2] = [
    ("public", "Public", "Default role given to unauthenticated user."),
    (
        "authenticated",
        "Authenticated",
        "Default role given to authenticated user.",
    ),
];

/// Create the singleton and permission tables if they are missing
pub fn ensure_schema(handle: &StoreHandle) -> Result<()> {
    handle
        .conn()
        .execute_batch(CMS_TABLES_SQL)
        .map_err(|e| from_rusqlite(e).with_op("ensure_schema"))
}

/// Insert the default roles that do not exist yet; returns how many were added
pub fn ensure_default_roles(handle: &StoreHandle, now_ms: i64) -> Result<usize> {
    let conn = handle.conn();
    let mut added = 0;
    for (role_type, name, description) in DEFAULT_ROLES {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM up_roles WHERE type = ?1)",
                [role_type],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        if exists {
            continue;
        }
        conn.execute(
            "INSERT INTO up_roles (document_id, name, description, type, created_at, updated_at, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?5)",
            params![
                uuid::Uuid::new_v4().simple().to_string(),
                name,
                description,
                role_type,
                now_ms
            ],
        )
        .map_err(from_rusqlite)?;
        added += 1;
    }
    Ok(added)
}
