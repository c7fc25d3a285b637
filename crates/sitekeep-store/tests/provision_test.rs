// Integration tests for permission provisioning

mod common;

use common::{count, fresh_store, open};
use sitekeep_core::{ExErrorKind, GrantRequest, MaintenanceConfig};
use sitekeep_store::provision::{find_role, grants_for_role, provision_all};
use sitekeep_store::provision;
use tempfile::TempDir;

#[test]
fn test_second_run_skips_existing_grant() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    let grants = vec![GrantRequest::new("api::global.global.find")];

    let first = provision(&mut handle, "public", &grants).unwrap();
    let second = provision(&mut handle, "public", &grants).unwrap();

    assert_eq!(first.inserted, vec!["api::global.global.find".to_string()]);
    assert!(first.skipped.is_empty());
    assert!(second.inserted.is_empty());
    assert_eq!(second.skipped, vec!["api::global.global.find".to_string()]);
    assert_eq!(count(handle.conn(), "SELECT COUNT(*) FROM up_permissions"), 1);
    assert_eq!(count(handle.conn(), "SELECT COUNT(*) FROM up_permissions_role_lnk"), 1);
}

#[test]
fn test_repeated_runs_leave_identical_rows() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    let config = MaintenanceConfig::default();

    provision_all(&mut handle, &config).unwrap();
    let role = find_role(handle.conn(), "public").unwrap();
    let after_first = grants_for_role(handle.conn(), role.id).unwrap();

    provision_all(&mut handle, &config).unwrap();
    let after_second = grants_for_role(handle.conn(), role.id).unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_first.len(), config.grants_for("public").len());
    let duplicates = count(
        handle.conn(),
        "SELECT COUNT(*) FROM (
            SELECT p.action, l.role_id FROM up_permissions p
            JOIN up_permissions_role_lnk l ON l.permission_id = p.id
            GROUP BY p.action, l.role_id HAVING COUNT(*) > 1
         )",
    );
    assert_eq!(duplicates, 0);
}

#[test]
fn test_existing_grant_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    let role = find_role(handle.conn(), "public").unwrap();
    handle
        .conn()
        .execute_batch(&format!(
            "INSERT INTO up_permissions (id, action, properties, conditions)
             VALUES (40, 'api::event.event.find', '{{\"fields\":[\"title\"]}}', '[\"isOwner\"]');
             INSERT INTO up_permissions_role_lnk (permission_id, role_id, permission_ord)
             VALUES (40, {}, 1);",
            role.id
        ))
        .unwrap();

    let report = provision(
        &mut handle,
        "public",
        &[
            GrantRequest::new("api::event.event.find"),
            GrantRequest::new("api::event.event.findOne"),
        ],
    )
    .unwrap();

    assert_eq!(report.skipped, vec!["api::event.event.find".to_string()]);
    let grants = grants_for_role(handle.conn(), role.id).unwrap();
    let existing = grants.iter().find(|g| g.id == 40).unwrap();
    assert_eq!(existing.properties["fields"][0], "title");
    assert_eq!(existing.conditions[0], "isOwner");
    let added = grants
        .iter()
        .find(|g| g.action == "api::event.event.findOne")
        .unwrap();
    assert_eq!(added.properties, serde_json::json!({}));
    assert_eq!(added.conditions, serde_json::json!([]));
}

#[test]
fn test_same_action_on_other_role_does_not_count() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    let grants = vec![GrantRequest::new("api::program.program.find")];

    provision(&mut handle, "authenticated", &grants).unwrap();
    let report = provision(&mut handle, "public", &grants).unwrap();

    assert_eq!(report.inserted.len(), 1);
    assert_eq!(count(handle.conn(), "SELECT COUNT(*) FROM up_permissions_role_lnk"), 2);
}

#[test]
fn test_failed_grant_does_not_stop_batch() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    handle
        .conn()
        .execute_batch(
            "CREATE TRIGGER reject_broken BEFORE INSERT ON up_permissions
             WHEN NEW.action = 'api::broken.broken.find'
             BEGIN SELECT RAISE(ABORT, 'rejected by store'); END;",
        )
        .unwrap();

    let report = provision(
        &mut handle,
        "public",
        &[
            GrantRequest::new("api::event.event.find"),
            GrantRequest::new("api::broken.broken.find").with_subject("broken"),
            GrantRequest::new("api::event.event.findOne"),
        ],
    )
    .unwrap();

    assert_eq!(report.inserted.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].action, "api::broken.broken.find");
    assert_eq!(report.failures[0].subject.as_deref(), Some("broken"));
    assert!(report.failures[0].message.contains("ERR_PROVISION_WRITE_FAILED"));
    assert!(report.failures[0].message.contains("rejected by store"));
}

#[test]
fn test_failed_link_leaves_no_orphan_permission() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    handle
        .conn()
        .execute_batch(
            "CREATE TRIGGER reject_flaky_link BEFORE INSERT ON up_permissions_role_lnk
             WHEN (SELECT action FROM up_permissions WHERE id = NEW.permission_id) = 'api::flaky.flaky.find'
             BEGIN SELECT RAISE(ABORT, 'link rejected'); END;",
        )
        .unwrap();

    let report = provision(&mut handle, "public", &[GrantRequest::new("api::flaky.flaky.find")]).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        count(
            handle.conn(),
            "SELECT COUNT(*) FROM up_permissions WHERE action = 'api::flaky.flaky.find'"
        ),
        0
    );
}

#[test]
fn test_unknown_role_fails_whole_call() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);

    let err = provision(&mut handle, "editor", &[GrantRequest::new("api::event.event.find")])
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::RoleNotFound);
    assert_eq!(count(handle.conn(), "SELECT COUNT(*) FROM up_permissions"), 0);
}

#[test]
fn test_ambiguous_role_fails_whole_call() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    let mut handle = open(&path);
    handle
        .conn()
        .execute("INSERT INTO up_roles (name, type) VALUES ('Public copy', 'public')", [])
        .unwrap();

    let err = provision(&mut handle, "public", &[GrantRequest::new("api::event.event.find")])
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::RoleAmbiguous);
    assert_eq!(err.row_ids().map(|ids| ids.len()), Some(2));
}
