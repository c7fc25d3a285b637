//! Error handling for sitekeep-store
//!
//! Wraps sitekeep-core ExError with store-specific helpers

use sitekeep_core::errors::{ExError, ExErrorKind};
use sitekeep_core::SingletonTable;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// The store file could not be opened or created
pub fn store_unavailable(path: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::StoreUnavailable)
        .with_op("open_store")
        .with_path(path)
        .with_message(err.to_string())
}

/// The snapshot file could not be read or decoded
pub fn snapshot_unreadable(path: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::SnapshotUnreadable)
        .with_op("restore")
        .with_path(path)
        .with_message(reason)
}

/// Executing the snapshot's statements failed part way through
pub fn restore_failed(path: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::RestoreExecutionFailed)
        .with_op("restore")
        .with_path(path)
        .with_message(err.to_string())
}

/// A write inside a reconcile pass was rejected; the pass was rolled back
pub fn reconcile_write_failed(
    table: SingletonTable,
    touched: Vec<i64>,
    err: rusqlite::Error,
) -> ExError {
    ExError::new(ExErrorKind::ReconcileWriteFailed)
        .with_op("reconcile")
        .with_table(table.table_name())
        .with_row_ids(touched)
        .with_message(err.to_string())
}

/// No role of the requested type exists
pub fn role_not_found(role_type: &str) -> ExError {
    ExError::new(ExErrorKind::RoleNotFound)
        .with_op("provision")
        .with_message(format!("No role with type '{}'", role_type))
}

/// More than one role matches the requested type
pub fn role_ambiguous(role_type: &str, ids: &[i64]) -> ExError {
    ExError::new(ExErrorKind::RoleAmbiguous)
        .with_op("provision")
        .with_row_ids(ids.to_vec())
        .with_message(format!(
            "{} roles share type '{}'",
            ids.len(),
            role_type
        ))
}

/// A single grant could not be written
pub fn provision_write_failed(action: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::ProvisionWriteFailed)
        .with_op("provision")
        .with_action(action)
        .with_message(reason)
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, path: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_path(path)
        .with_message(err.to_string())
}
