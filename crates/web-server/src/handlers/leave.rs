use super::{body_or_default, created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, LeaveAction, LeaveDecision, LeaveRequest, LeaveType, NewAuditLog,
    NewLeaveRequest, NewLeaveType, StatusTransition,
};
use database::TransitionInput;
use serde_json::json;
use std::sync::Arc;

/// # GET /api/leave-types
pub async fn list_leave_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaveType>>, AppError> {
    Ok(Json(state.store.list_leave_types().await?))
}

/// # POST /api/leave-types
pub async fn create_leave_type(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewLeaveType>,
) -> Result<Created<LeaveType>, AppError> {
    input.validate()?;
    Ok(created(state.store.create_leave_type(&input).await?))
}

/// # DELETE /api/leave-types/:id
pub async fn delete_leave_type(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("leave type", id, state.store.delete_leave_type(id).await?)
}

/// # GET /api/leave-requests
pub async fn list_leave_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    Ok(Json(state.store.list_leave_requests().await?))
}

/// # GET /api/leave-requests/:id
pub async fn get_leave_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LeaveRequest>, AppError> {
    let request = state
        .store
        .get_leave_request(id)
        .await?
        .ok_or_else(|| not_found("leave request", id))?;
    Ok(Json(request))
}

/// # POST /api/leave-requests
pub async fn create_leave_request(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewLeaveRequest>,
) -> Result<Created<LeaveRequest>, AppError> {
    input.validate()?;
    let request = state.store.create_leave_request(&input).await?;
    record_audit(
        &state,
        NewAuditLog::new(entity::LEAVE_REQUEST, request.id, "create")
            .with_details(json!({ "employeeId": request.employee_id, "days": request.days() })),
    )
    .await;
    Ok(created(request))
}

/// # DELETE /api/leave-requests/:id
pub async fn delete_leave_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("leave request", id, state.store.delete_leave_request(id).await?)
}

async fn decide(
    state: &AppState,
    id: i64,
    action: LeaveAction,
    decision: LeaveDecision,
) -> Result<Json<LeaveRequest>, AppError> {
    let input = TransitionInput::new(decision.reviewer_id, decision.notes);
    let Some(request) = state.store.transition_leave_request(id, action, &input).await? else {
        let current = state.store.get_leave_request(id).await?.map(|r| r.status);
        return Err(refused("leave request", id, action.name(), current));
    };

    record_audit(
        state,
        NewAuditLog::new(entity::LEAVE_REQUEST, id, action.name())
            .by(input.actor_id)
            .with_details(json!({ "status": request.status, "notes": input.note })),
    )
    .await;
    Ok(Json(request))
}

/// # POST /api/leave-requests/:id/approve
pub async fn approve_leave_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<LeaveDecision>>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide(&state, id, LeaveAction::Approve, body_or_default(body)).await
}

/// # POST /api/leave-requests/:id/reject
pub async fn reject_leave_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<LeaveDecision>>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide(&state, id, LeaveAction::Reject, body_or_default(body)).await
}

/// # POST /api/leave-requests/:id/cancel
pub async fn cancel_leave_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<LeaveDecision>>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide(&state, id, LeaveAction::Cancel, body_or_default(body)).await
}
