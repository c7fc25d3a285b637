use crate::config::ConfigError;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that operators and tests can match
/// on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Store access
    StoreUnavailable,
    Persistence,

    // Snapshot restore
    SnapshotUnreadable,
    RestoreExecutionFailed,

    // Permission provisioning
    RoleNotFound,
    RoleAmbiguous,
    ProvisionWriteFailed,

    // Singleton reconciliation
    ReconcileWriteFailed,

    // Input/config
    InvalidInput,
    Config,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::SnapshotUnreadable => "ERR_SNAPSHOT_UNREADABLE",
            ExErrorKind::RestoreExecutionFailed => "ERR_RESTORE_EXECUTION_FAILED",
            ExErrorKind::RoleNotFound => "ERR_ROLE_NOT_FOUND",
            ExErrorKind::RoleAmbiguous => "ERR_ROLE_AMBIGUOUS",
            ExErrorKind::ProvisionWriteFailed => "ERR_PROVISION_WRITE_FAILED",
            ExErrorKind::ReconcileWriteFailed => "ERR_RECONCILE_WRITE_FAILED",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever context the failing pass had:
/// the table being reconciled, the grant being written, the snapshot path.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    action: Option<String>,
    path: Option<String>,
    message: String,
    row_ids: Option<Vec<i64>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            action: None,
            path: None,
            message: String::new(),
            row_ids: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add grant action context
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the row ids a failed pass had touched (rolled back on failure)
    pub fn with_row_ids(mut self, ids: Vec<i64>) -> Self {
        self.row_ids = Some(ids);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the grant action context, if any
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the touched row ids, if any
    pub fn row_ids(&self) -> Option<&[i64]> {
        self.row_ids.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(action) = &self.action {
            write!(f, " (action: {})", action)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(ids) = &self.row_ids {
            write!(f, " (rows rolled back: {:?})", ids)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let ex = ExError::new(ExErrorKind::Config)
            .with_op("load_config")
            .with_message(err.to_string());
        match err {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => ex.with_path(path),
            _ => ex,
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

// ========== End Error Facility ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::StoreUnavailable,
            ExErrorKind::Persistence,
            ExErrorKind::SnapshotUnreadable,
            ExErrorKind::RestoreExecutionFailed,
            ExErrorKind::RoleNotFound,
            ExErrorKind::RoleAmbiguous,
            ExErrorKind::ProvisionWriteFailed,
            ExErrorKind::ReconcileWriteFailed,
            ExErrorKind::InvalidInput,
            ExErrorKind::Config,
            ExErrorKind::Io,
            ExErrorKind::Serialization,
            ExErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_display_carries_context() {
        let err = ExError::new(ExErrorKind::ReconcileWriteFailed)
            .with_op("reconcile")
            .with_table("globals")
            .with_message("constraint failed")
            .with_row_ids(vec![3, 4]);

        let text = err.to_string();
        assert!(text.starts_with("[ERR_RECONCILE_WRITE_FAILED]"));
        assert!(text.contains("operation 'reconcile'"));
        assert!(text.contains("table: globals"));
        assert!(text.contains("[3, 4]"));
    }

    #[test]
    fn test_config_error_conversion_keeps_path() {
        let err: ExError = ConfigError::Parse {
            path: "sitekeep.toml".to_string(),
            reason: "expected `=`".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::Config);
        assert_eq!(err.path(), Some("sitekeep.toml"));
    }
}
