//! Canonical-row selection for singleton tables
//!
//! Given the rows of one singleton table in read order (ascending id), decide
//! which row survives and what must change. No I/O happens here; the store
//! layer executes the plan.
//!
//! Selection rules:
//! 1. Prefer published rows over drafts.
//! 2. Among the preferred group, keep the last one in read order. Read order
//!    tracks insertion order because ids are assigned monotonically, so no
//!    timestamp comparison is made.
//! 3. Every other row is deleted.

use serde::{Deserialize, Serialize};

use crate::model::SingletonRow;

/// What a reconcile pass will do to one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub keep: i64,
    pub delete: Vec<i64>,
    /// Survivor's locale differs from the canonical one
    pub fix_locale: bool,
    /// Survivor is a draft and must get a publish timestamp
    pub fill_published_at: bool,
}

impl ReconcilePlan {
    /// Whether the survivor gets rewritten; collapsing other rows into it
    /// counts as a change and refreshes its `updated_at`
    pub fn needs_update(&self) -> bool {
        self.fix_locale || self.fill_published_at || !self.delete.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.delete.is_empty() && !self.needs_update()
    }
}

/// Build the plan for `rows`; `None` when there is nothing to reconcile
pub fn plan_reconcile(rows: &[SingletonRow], canonical_locale: &str) -> Option<ReconcilePlan> {
    let survivor = rows
        .iter()
        .rev()
        .find(|r| r.is_published())
        .or_else(|| rows.last())?;

    let delete = rows
        .iter()
        .filter(|r| r.id != survivor.id)
        .map(|r| r.id)
        .collect();

    Some(ReconcilePlan {
        keep: survivor.id,
        delete,
        fix_locale: survivor.locale.as_deref() != Some(canonical_locale),
        fill_published_at: survivor.published_at.is_none(),
    })
}
