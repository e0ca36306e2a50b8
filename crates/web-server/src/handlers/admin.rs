use crate::AppState;
use axum::{extract::State, Json};
use database::{run_cleanup, CleanupReport};
use std::sync::Arc;

/// # POST /api/admin/cleanup
/// Empties every HR table except `users`. Per-table failures are reported in
/// the body rather than failing the request.
///
/// The run itself is logged, not written to `audit_logs`.
pub async fn cleanup(State(state): State<Arc<AppState>>) -> Json<CleanupReport> {
    tracing::warn!("Data cleanup requested over HTTP.");
    let report = run_cleanup(state.store.as_ref()).await;

    if !report.is_clean() {
        tracing::error!(errors = ?report.errors, "Data cleanup left some tables untouched.");
    }
    Json(report)
}
