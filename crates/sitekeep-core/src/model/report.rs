//! Structured reports returned by each maintenance pass
//!
//! Reports carry counts and identifiers only; rendering is the caller's job.

use serde::{Deserialize, Serialize};

use super::singleton::SingletonTable;

/// Row count for one table after a restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: SingletonTable,
    /// `None` when the table does not exist in the restored store
    pub rows: Option<i64>,
}

/// Outcome of a snapshot restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub snapshot_path: String,
    pub target_path: String,
    /// SHA-256 of the dump bytes, hex encoded
    pub snapshot_digest: String,
    pub snapshot_bytes: u64,
    pub table_counts: Vec<TableCount>,
    pub warnings: Vec<String>,
}

impl RestoreReport {
    pub fn count_for(&self, table: SingletonTable) -> Option<i64> {
        self.table_counts
            .iter()
            .find(|c| c.table == table)
            .and_then(|c| c.rows)
    }

    pub fn home_count(&self) -> Option<i64> {
        self.count_for(SingletonTable::HomePage)
    }

    pub fn global_count(&self) -> Option<i64> {
        self.count_for(SingletonTable::Globals)
    }
}

/// Outcome of reconciling one singleton table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub table: SingletonTable,
    pub locale: String,
    pub rows_seen: usize,
    /// `None` when the table was empty and there was nothing to reconcile
    pub kept_id: Option<i64>,
    pub deleted_ids: Vec<i64>,
    /// Whether the surviving row needed its locale or publish state fixed
    pub updated: bool,
}

impl ReconcileReport {
    pub fn nothing_to_reconcile(table: SingletonTable, locale: impl Into<String>) -> Self {
        Self {
            table,
            locale: locale.into(),
            rows_seen: 0,
            kept_id: None,
            deleted_ids: Vec::new(),
            updated: false,
        }
    }

    /// True when the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.deleted_ids.is_empty() && !self.updated
    }
}

/// A grant that could not be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantFailure {
    pub action: String,
    pub subject: Option<String>,
    pub message: String,
}

/// Outcome of provisioning grants for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub role_type: String,
    pub role_id: i64,
    pub inserted: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<GrantFailure>,
}

impl ProvisionReport {
    pub fn new(role_type: impl Into<String>, role_id: i64) -> Self {
        Self {
            role_type: role_type.into(),
            role_id,
            inserted: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when every requested grant is now present
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Current shape of a singleton table, as seen by `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table: SingletonTable,
    pub rows: usize,
    pub published: usize,
    pub drafts: usize,
    /// Distinct locales present, sorted; rows without a locale are omitted
    pub locales: Vec<String>,
}

impl TableStatus {
    /// Whether the table satisfies the singleton invariant for `locale`
    pub fn is_canonical(&self, locale: &str) -> bool {
        self.rows == 1 && self.published == 1 && self.locales == [locale]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_report_counts() {
        let report = RestoreReport {
            snapshot_path: "dump.sql".to_string(),
            target_path: "data.db".to_string(),
            snapshot_digest: String::new(),
            snapshot_bytes: 0,
            table_counts: vec![
                TableCount {
                    table: SingletonTable::HomePage,
                    rows: Some(2),
                },
                TableCount {
                    table: SingletonTable::Globals,
                    rows: None,
                },
            ],
            warnings: vec![],
        };

        assert_eq!(report.home_count(), Some(2));
        assert_eq!(report.global_count(), None);
    }

    #[test]
    fn test_table_status_canonical() {
        let status = TableStatus {
            table: SingletonTable::Globals,
            rows: 1,
            published: 1,
            drafts: 0,
            locales: vec!["en".to_string()],
        };
        assert!(status.is_canonical("en"));
        assert!(!status.is_canonical("fr"));

        let two_rows = TableStatus { rows: 2, ..status };
        assert!(!two_rows.is_canonical("en"));
    }

    #[test]
    fn test_report_serializes_table_by_name() {
        let report = ReconcileReport::nothing_to_reconcile(SingletonTable::DonationsPage, "en");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["table"], "donations_pages");
        assert!(report.is_noop());
    }
}
