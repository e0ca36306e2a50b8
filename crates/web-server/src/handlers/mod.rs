//! Request handlers, one module per resource.
//!
//! Handlers validate the payload with the `core-types` rules, call the
//! store, write an audit entry for state changes and map "no row" results to
//! 404 or 409.

use crate::{error::AppError, AppState};
use axum::{http::StatusCode, Json};
use core_types::NewAuditLog;
use std::fmt::Display;

pub mod accounts;
pub mod admin;
pub mod audit;
pub mod dashboard;
pub mod employees;
pub mod extra_pay;
pub mod leave;
pub mod onboarding;
pub mod paf;
pub mod payroll;
pub mod signatures;
pub mod timecards;
pub mod users;
pub mod workflows;

/// `201 Created` with the new row as the body.
pub type Created<T> = (StatusCode, Json<T>);

pub(crate) fn created<T>(row: T) -> Created<T> {
    (StatusCode::CREATED, Json(row))
}

/// Records a state change. The entry is written after the change itself, so
/// a failure here is logged and otherwise ignored.
pub(crate) async fn record_audit(state: &AppState, entry: NewAuditLog) {
    if let Err(e) = state.store.create_audit_log(&entry).await {
        tracing::warn!(
            error = %e,
            entity_type = %entry.entity_type,
            entity_id = entry.entity_id,
            action = %entry.action,
            "Failed to write audit log entry."
        );
    }
}

/// Result of a conditional update that matched nothing: the row is either
/// gone or in a status the action cannot start from.
pub(crate) fn refused<S: Display>(
    entity: &str,
    id: i64,
    action: &str,
    current: Option<S>,
) -> AppError {
    match current {
        None => AppError::NotFound(format!("{entity} {id} not found")),
        Some(status) => AppError::Conflict(format!(
            "Cannot {action} {entity} {id} while it is {status}"
        )),
    }
}

pub(crate) fn not_found(entity: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{entity} {id} not found"))
}

/// `204 No Content` when a row was removed, 404 otherwise.
pub(crate) fn deleted(entity: &str, id: i64, removed: bool) -> Result<StatusCode, AppError> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(entity, id))
    }
}

/// Uses the request body when one was sent and parsed, the defaults otherwise.
pub(crate) fn body_or_default<T: Default>(body: Option<Json<T>>) -> T {
    body.map(|Json(inner)| inner).unwrap_or_default()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
