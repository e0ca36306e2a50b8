use crate::{error::AppError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use core_types::{AuditFilter, AuditLog};
use std::sync::Arc;

/// # GET /api/audit-logs?entityType=&entityId=&limit=
/// Newest first.
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AuditFilter>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    Ok(Json(state.store.list_audit_logs(&filter).await?))
}
