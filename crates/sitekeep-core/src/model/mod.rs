pub mod grant;
pub mod report;
pub mod singleton;

pub use grant::{GrantRequest, PermissionGrant, Role};
pub use report::{
    GrantFailure, ProvisionReport, ReconcileReport, RestoreReport, TableCount, TableStatus,
};
pub use singleton::{SingletonRow, SingletonTable, StoredTime};
