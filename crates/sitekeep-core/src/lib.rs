//! sitekeep core - domain model and facilities for CMS store maintenance
//!
//! This crate provides the pieces shared by every maintenance pass:
//! - Singleton table enumeration and row model
//! - Permission grant and role model
//! - Canonical-row selection for singleton reconciliation (pure, no I/O)
//! - Pass reports suitable for printing or JSON output
//! - Maintenance configuration (TOML)
//! - Structured error and logging facilities

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod reconcile_plan;

// Re-export commonly used types
pub use config::{ConfigError, MaintenanceConfig};
pub use errors::{ExError, ExErrorKind, Result};
pub use model::{GrantRequest, PermissionGrant, Role, SingletonRow, SingletonTable, StoredTime};
pub use reconcile_plan::{plan_reconcile, ReconcilePlan};
