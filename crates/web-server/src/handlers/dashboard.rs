use crate::{error::AppError, AppState};
use axum::{extract::State, Json};
use core_types::DashboardStats;
use std::sync::Arc;

/// # GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(state.store.dashboard_stats().await?))
}
