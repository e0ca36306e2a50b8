use super::{body_or_default, created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, NewAuditLog, NewPaf, Paf, PafAction, PafDecision, PafStatus, PafUpdate,
    StatusTransition,
};
use database::TransitionInput;
use serde_json::json;
use std::sync::Arc;

/// # GET /api/paf
pub async fn list_pafs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Paf>>, AppError> {
    Ok(Json(state.store.list_pafs().await?))
}

/// # GET /api/paf/:id
pub async fn get_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Paf>, AppError> {
    let paf = state
        .store
        .get_paf(id)
        .await?
        .ok_or_else(|| not_found("personnel action form", id))?;
    Ok(Json(paf))
}

async fn create(
    state: &AppState,
    input: NewPaf,
    status: PafStatus,
) -> Result<Created<Paf>, AppError> {
    // Nothing is written for an invalid form.
    input.validate()?;
    let paf = state.store.create_paf(&input, status).await?;
    record_audit(
        state,
        NewAuditLog::new(entity::PAF, paf.id, "create")
            .by(paf.requested_by)
            .with_details(json!({
                "type": paf.paf_type,
                "positionTitle": paf.position_title,
                "status": paf.status,
            })),
    )
    .await;
    Ok(created(paf))
}

/// # POST /api/paf
/// Saves the form as a draft.
pub async fn create_paf(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewPaf>,
) -> Result<Created<Paf>, AppError> {
    create(&state, input, PafStatus::Draft).await
}

/// # POST /api/paf/submit
/// Creates the form and sends it for review in one call.
pub async fn create_and_submit_paf(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewPaf>,
) -> Result<Created<Paf>, AppError> {
    create(&state, input, PafStatus::Submitted).await
}

/// # PATCH|PUT /api/paf/:id
/// Approved and denied forms answer 409.
pub async fn update_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<PafUpdate>,
) -> Result<Json<Paf>, AppError> {
    input.validate()?;
    let Some(paf) = state.store.update_paf(id, &input).await? else {
        let current = state.store.get_paf(id).await?.map(|p| p.status);
        return Err(refused("personnel action form", id, "edit", current));
    };
    Ok(Json(paf))
}

/// # DELETE /api/paf/:id
pub async fn delete_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("personnel action form", id, state.store.delete_paf(id).await?)
}

async fn decide(
    state: &AppState,
    id: i64,
    action: PafAction,
    decision: PafDecision,
) -> Result<Json<Paf>, AppError> {
    let input = TransitionInput::new(decision.actor_id, decision.notes);
    let Some(paf) = state.store.transition_paf(id, action, &input).await? else {
        let current = state.store.get_paf(id).await?.map(|p| p.status);
        return Err(refused("personnel action form", id, action.name(), current));
    };

    record_audit(
        state,
        NewAuditLog::new(entity::PAF, id, action.name())
            .by(input.actor_id)
            .with_details(json!({ "status": paf.status, "notes": input.note })),
    )
    .await;
    Ok(Json(paf))
}

/// # POST /api/paf/:id/submit
pub async fn submit_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<PafDecision>>,
) -> Result<Json<Paf>, AppError> {
    decide(&state, id, PafAction::Submit, body_or_default(body)).await
}

/// # POST /api/paf/:id/review
pub async fn review_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<PafDecision>>,
) -> Result<Json<Paf>, AppError> {
    decide(&state, id, PafAction::Review, body_or_default(body)).await
}

/// # POST /api/paf/:id/approve
pub async fn approve_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<PafDecision>>,
) -> Result<Json<Paf>, AppError> {
    decide(&state, id, PafAction::Approve, body_or_default(body)).await
}

/// # POST /api/paf/:id/deny
pub async fn deny_paf(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<PafDecision>>,
) -> Result<Json<Paf>, AppError> {
    decide(&state, id, PafAction::Deny, body_or_default(body)).await
}
