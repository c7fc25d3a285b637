//! Permission provisioning
//!
//! Ensures a role holds a set of grants, each `(action, role)` pair at most
//! once. Provisioning is additive: existing grants are never modified or
//! removed, so repeated runs converge on the same rows.
//!
//! Unlike reconciliation, a failed grant does not stop the batch. Every
//! grant is written in its own savepoint, so a partial run leaves only
//! complete grants behind, and the failures are collected in the report.

#![allow(clippy::result_large_err)]

use crate::db::StoreHandle;
use crate::errors::{from_rusqlite, provision_write_failed, role_ambiguous, role_not_found, Result};
use rusqlite::{params, Connection};
use sitekeep_core::model::{GrantFailure, ProvisionReport};
use sitekeep_core::{
    log_op_end, log_op_error, log_op_start, GrantRequest, MaintenanceConfig, PermissionGrant, Role,
};
use sitekeep_core_types::PassId;
use std::collections::HashSet;
use std::time::Instant;

/// Ensure the single role of `role_type` holds every grant in `grants`
pub fn provision(
    handle: &mut StoreHandle,
    role_type: &str,
    grants: &[GrantRequest],
) -> Result<ProvisionReport> {
    let now = chrono::Utc::now().timestamp_millis();
    provision_at(handle, role_type, grants, now, &PassId::new())
}

/// Provision every role listed in the config; stops at the first role
/// lookup failure
pub fn provision_all(
    handle: &mut StoreHandle,
    config: &MaintenanceConfig,
) -> Result<Vec<ProvisionReport>> {
    let pass_id = PassId::new();
    let now = chrono::Utc::now().timestamp_millis();
    let mut reports = Vec::with_capacity(config.roles.len());
    for (role_type, grants) in &config.roles {
        reports.push(provision_at(handle, role_type, grants, now, &pass_id)?);
    }
    Ok(reports)
}

/// Look up the one role with `role_type`
pub fn find_role(conn: &Connection, role_type: &str) -> Result<Role> {
    let mut stmt = conn
        .prepare("SELECT id, type, name FROM up_roles WHERE type = ?1 ORDER BY id")
        .map_err(from_rusqlite)?;
    let mut roles = stmt
        .query_map([role_type], |row| {
            Ok(Role {
                id: row.get(0)?,
                role_type: row.get(1)?,
                name: row.get(2)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)?;

    match roles.len() {
        0 => Err(role_not_found(role_type)),
        1 => Ok(roles.remove(0)),
        _ => {
            let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
            Err(role_ambiguous(role_type, &ids))
        }
    }
}

/// All grants currently linked to `role_id`, ordered by permission id
pub fn grants_for_role(conn: &Connection, role_id: i64) -> Result<Vec<PermissionGrant>> {
    let mut stmt = conn
        .prepare(
            "SELECT p.id, p.action, p.subject, p.properties, p.conditions, l.role_id
             FROM up_permissions p
             JOIN up_permissions_role_lnk l ON l.permission_id = p.id
             WHERE l.role_id = ?1
             ORDER BY p.id",
        )
        .map_err(from_rusqlite)?;
    let raw = stmt
        .query_map([role_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })
        .map_err(from_rusqlite)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)?;

    raw.into_iter()
        .map(|(id, action, subject, properties, conditions, role_id)| {
            Ok(PermissionGrant {
                id,
                action,
                subject,
                properties: parse_json_column(properties.as_deref(), "{}")?,
                conditions: parse_json_column(conditions.as_deref(), "[]")?,
                role_id,
            })
        })
        .collect()
}

fn parse_json_column(value: Option<&str>, empty: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(value.unwrap_or(empty))?)
}

fn provision_at(
    handle: &mut StoreHandle,
    role_type: &str,
    grants: &[GrantRequest],
    now_ms: i64,
    pass_id: &PassId,
) -> Result<ProvisionReport> {
    let start = Instant::now();
    log_op_start!(
        "provision",
        pass_id = pass_id.as_str(),
        role_type = role_type,
        requested = grants.len() as u64
    );

    let role = match find_role(handle.conn(), role_type) {
        Ok(role) => role,
        Err(err) => {
            log_op_error!(
                "provision",
                err,
                duration_ms = start.elapsed().as_millis() as u64,
                pass_id = pass_id.as_str(),
                role_type = role_type
            );
            return Err(err);
        }
    };

    let mut report = ProvisionReport::new(role_type, role.id);
    let mut seen = HashSet::new();
    for grant in grants.iter().filter(|g| seen.insert(g.action.as_str())) {
        match ensure_grant(handle.conn_mut(), role.id, grant, now_ms) {
            Ok(true) => report.inserted.push(grant.action.clone()),
            Ok(false) => report.skipped.push(grant.action.clone()),
            Err(err) => {
                tracing::warn!(
                    role_type = role_type,
                    action = grant.action.as_str(),
                    err_code = err.code(),
                    "grant not written"
                );
                report.failures.push(GrantFailure {
                    action: grant.action.clone(),
                    subject: grant.subject.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    log_op_end!(
        "provision",
        duration_ms = start.elapsed().as_millis() as u64,
        pass_id = pass_id.as_str(),
        role_type = role_type,
        inserted = report.inserted.len() as u64,
        skipped = report.skipped.len() as u64,
        failed = report.failures.len() as u64
    );
    Ok(report)
}

/// Insert the grant unless `(action, role_id)` already exists; returns
/// whether a row was written
fn ensure_grant(
    conn: &mut Connection,
    role_id: i64,
    grant: &GrantRequest,
    now_ms: i64,
) -> Result<bool> {
    grant
        .validate()
        .map_err(|reason| provision_write_failed(&grant.action, reason))?;

    let exists: bool = conn
        .query_row(
            "SELECT EXISTS (
                SELECT 1 FROM up_permissions p
                JOIN up_permissions_role_lnk l ON l.permission_id = p.id
                WHERE p.action = ?1 AND l.role_id = ?2
             )",
            params![grant.action, role_id],
            |row| row.get(0),
        )
        .map_err(|e| provision_write_failed(&grant.action, e.to_string()))?;
    if exists {
        return Ok(false);
    }

    let write_failed = |e: rusqlite::Error| provision_write_failed(&grant.action, e.to_string());
    let sp = conn.savepoint().map_err(write_failed)?;
    sp.execute(
        "INSERT INTO up_permissions
            (document_id, action, subject, properties, conditions, created_at, updated_at, published_at)
         VALUES (?1, ?2, ?3, '{}', '[]', ?4, ?4, ?4)",
        params![
            uuid::Uuid::new_v4().simple().to_string(),
            grant.action,
            grant.subject,
            now_ms
        ],
    )
    .map_err(write_failed)?;
    let permission_id = sp.last_insert_rowid();

    let next_ord: f64 = sp
        .query_row(
            "SELECT COALESCE(MAX(permission_ord), 0) + 1 FROM up_permissions_role_lnk WHERE role_id = ?1",
            [role_id],
            |row| row.get(0),
        )
        .map_err(write_failed)?;
    sp.execute(
        "INSERT INTO up_permissions_role_lnk (permission_id, role_id, permission_ord)
         VALUES (?1, ?2, ?3)",
        params![permission_id, role_id, next_ord],
    )
    .map_err(write_failed)?;
    sp.commit().map_err(write_failed)?;

    Ok(true)
}
