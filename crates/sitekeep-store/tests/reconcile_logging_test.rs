// Logging assertions for reconciliation.
//
// Installs the global capture subscriber, so this file holds a single test.

mod common;

use common::{fresh_store, insert_row, open};
use sitekeep_core::logging_facility::init_test_capture;
use sitekeep_core::SingletonTable;
use sitekeep_store::reconcile;
use tempfile::TempDir;

#[test]
fn test_each_deleted_row_is_logged() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    insert_row(handle.conn(), SingletonTable::HomePage, 5, None, None);
    insert_row(handle.conn(), SingletonTable::HomePage, 6, Some(1), None);
    insert_row(handle.conn(), SingletonTable::HomePage, 7, None, None);
    capture.clear();

    reconcile(&mut handle, SingletonTable::HomePage, "en").unwrap();

    capture.assert_event_exists("reconcile", "start");
    capture.assert_event_exists("reconcile", "end");
    assert_eq!(capture.field_values("row_id"), vec!["5", "7"]);
    assert_eq!(
        capture.count_events(|e| e.field("kept_id") == Some("6")),
        2
    );
}
