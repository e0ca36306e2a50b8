use super::{body_or_default, created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, CoreError, NewAuditLog, NewTimeCard, StatusTransition, TimeCard,
    TimeCardUpdate, TimecardAction, TimecardStep,
};
use database::TransitionInput;
use serde_json::json;
use std::sync::Arc;

/// # GET /api/timecards
pub async fn list_timecards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TimeCard>>, AppError> {
    Ok(Json(state.store.list_timecards().await?))
}

/// # GET /api/timecards/:id
pub async fn get_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimeCard>, AppError> {
    let card = state
        .store
        .get_timecard(id)
        .await?
        .ok_or_else(|| not_found("time card", id))?;
    Ok(Json(card))
}

/// # POST /api/timecards
pub async fn create_timecard(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTimeCard>,
) -> Result<Created<TimeCard>, AppError> {
    input.validate()?;
    let card = state.store.create_timecard(&input).await?;
    record_audit(
        &state,
        NewAuditLog::new(entity::TIMECARD, card.id, "create")
            .with_details(json!({ "employeeId": card.employee_id, "weekStart": card.week_start })),
    )
    .await;
    Ok(created(card))
}

/// # PATCH|PUT /api/timecards/:id
/// Hours can only change while the card is with the secretary (draft or
/// sent back). The status check and the write are one statement.
pub async fn update_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<TimeCardUpdate>,
) -> Result<Json<TimeCard>, AppError> {
    input.validate()?;
    let mut merged = state
        .store
        .get_timecard(id)
        .await?
        .ok_or_else(|| not_found("time card", id))?;
    // Checks the weekly total against the merged values.
    input.apply_to(&mut merged)?;

    let Some(card) = state.store.update_timecard(id, &input).await? else {
        let current = state.store.get_timecard(id).await?.map(|c| c.status);
        return Err(refused("time card", id, "edit", current));
    };
    record_audit(
        &state,
        NewAuditLog::new(entity::TIMECARD, id, "update")
            .with_details(json!({ "totalHours": card.total_hours() })),
    )
    .await;
    Ok(Json(card))
}

/// # DELETE /api/timecards/:id
pub async fn delete_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("time card", id, state.store.delete_timecard(id).await?)
}

/// Moves the card one approval stage. Out-of-order calls answer 409 and
/// leave the card untouched.
async fn advance(
    state: &AppState,
    id: i64,
    action: TimecardAction,
    step: TimecardStep,
) -> Result<Json<TimeCard>, AppError> {
    let reason = step.reason.filter(|r| !r.trim().is_empty());
    if action == TimecardAction::Reject && reason.is_none() {
        return Err(CoreError::invalid("reason", "is required to reject a time card").into());
    }

    let input = TransitionInput::new(step.actor_id, reason);
    let Some(card) = state.store.transition_timecard(id, action, &input).await? else {
        let current = state.store.get_timecard(id).await?.map(|c| c.status);
        return Err(refused("time card", id, action.name(), current));
    };

    tracing::info!(timecard_id = id, status = %card.status, "Time card moved to next stage.");
    record_audit(
        state,
        NewAuditLog::new(entity::TIMECARD, id, action.name())
            .by(input.actor_id)
            .with_details(json!({ "status": card.status, "reason": input.note })),
    )
    .await;
    Ok(Json(card))
}

/// # POST /api/timecards/:id/submit
pub async fn submit_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<TimecardStep>>,
) -> Result<Json<TimeCard>, AppError> {
    advance(&state, id, TimecardAction::Submit, body_or_default(body)).await
}

/// # POST /api/timecards/:id/employee-approve
pub async fn employee_approve_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<TimecardStep>>,
) -> Result<Json<TimeCard>, AppError> {
    advance(&state, id, TimecardAction::EmployeeApprove, body_or_default(body)).await
}

/// # POST /api/timecards/:id/admin-approve
pub async fn admin_approve_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<TimecardStep>>,
) -> Result<Json<TimeCard>, AppError> {
    advance(&state, id, TimecardAction::AdminApprove, body_or_default(body)).await
}

/// # POST /api/timecards/:id/payroll-process
pub async fn payroll_process_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<TimecardStep>>,
) -> Result<Json<TimeCard>, AppError> {
    advance(&state, id, TimecardAction::PayrollProcess, body_or_default(body)).await
}

/// # POST /api/timecards/:id/reject
pub async fn reject_timecard(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<TimecardStep>>,
) -> Result<Json<TimeCard>, AppError> {
    advance(&state, id, TimecardAction::Reject, body_or_default(body)).await
}
