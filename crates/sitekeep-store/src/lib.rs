//! sitekeep store - maintenance passes over the CMS SQLite store
//!
//! Provides:
//! - Store handle with scoped acquisition and guaranteed release
//! - Schema bootstrap for empty development stores
//! - Snapshot restore (full replace from a SQL dump)
//! - Singleton reconciliation (one canonical row per singleton table)
//! - Permission provisioning (additive, idempotent grants per role)
//! - Read-only inspection of singleton tables
//!
//! Passes are synchronous and assume exclusive access to the store; stop
//! the CMS server before running them.

pub mod db;
pub mod errors;
pub mod inspect;
pub mod provision;
pub mod reconcile;
pub mod restore;
pub mod schema;

// Re-export key entry points
pub use db::{with_store, StoreHandle};
pub use errors::Result;
pub use provision::{provision, provision_all};
pub use reconcile::{reconcile, reconcile_all, reconcile_targets};
pub use restore::restore;
