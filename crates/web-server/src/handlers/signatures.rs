use super::{body_or_default, created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use core_types::{
    audit::entity, DeclineDocument, NewAuditLog, NewSignatureRequest, SignDocument,
    SignatureAction, SignatureRequest, SignatureStatus, StatusTransition,
};
use database::TransitionInput;
use serde_json::json;
use std::sync::Arc;

/// # GET /api/signature-requests
pub async fn list_signature_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SignatureRequest>>, AppError> {
    Ok(Json(state.store.list_signature_requests().await?))
}

/// # GET /api/signature-requests/:id
pub async fn get_signature_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SignatureRequest>, AppError> {
    let request = state
        .store
        .get_signature_request(id)
        .await?
        .ok_or_else(|| not_found("signature request", id))?;
    Ok(Json(request))
}

/// # POST /api/signature-requests
pub async fn create_signature_request(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewSignatureRequest>,
) -> Result<Created<SignatureRequest>, AppError> {
    input.validate()?;
    let request = state.store.create_signature_request(&input).await?;
    record_audit(
        &state,
        NewAuditLog::new(entity::SIGNATURE_REQUEST, request.id, "create")
            .by(request.requested_by)
            .with_details(json!({
                "employeeId": request.employee_id,
                "document": request.document_title,
            })),
    )
    .await;
    Ok(created(request))
}

/// # DELETE /api/signature-requests/:id
pub async fn delete_signature_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("signature request", id, state.store.delete_signature_request(id).await?)
}

async fn respond(
    state: &AppState,
    id: i64,
    action: SignatureAction,
    note: Option<String>,
) -> Result<Json<SignatureRequest>, AppError> {
    let input = TransitionInput::new(None, note);
    let Some(request) = state.store.transition_signature_request(id, action, &input).await? else {
        let current = state.store.get_signature_request(id).await?;
        let expired = current.as_ref().is_some_and(|r| {
            r.status == SignatureStatus::Pending && r.expires_at.is_some_and(|at| at <= Utc::now())
        });
        if expired {
            return Err(AppError::Conflict(format!("Signature request {id} has expired")));
        }
        return Err(refused("signature request", id, action.name(), current.map(|r| r.status)));
    };

    record_audit(
        state,
        NewAuditLog::new(entity::SIGNATURE_REQUEST, id, action.name())
            .with_details(json!({ "status": request.status })),
    )
    .await;
    Ok(Json(request))
}

/// # POST /api/signature-requests/:id/sign
pub async fn sign_document(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<SignDocument>,
) -> Result<Json<SignatureRequest>, AppError> {
    input.validate()?;
    respond(&state, id, SignatureAction::Sign, Some(input.signature_data)).await
}

/// # POST /api/signature-requests/:id/decline
pub async fn decline_document(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<DeclineDocument>>,
) -> Result<Json<SignatureRequest>, AppError> {
    let input: DeclineDocument = body_or_default(body);
    respond(&state, id, SignatureAction::Decline, input.reason).await
}
