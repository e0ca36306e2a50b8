use super::{body_or_default, created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, CoreError, ExtraPayAction, ExtraPayContract, ExtraPayContractUpdate,
    ExtraPayDecision, ExtraPayRequest, NewAuditLog, NewExtraPayContract, NewExtraPayRequest,
    StatusTransition,
};
use database::TransitionInput;
use serde_json::json;
use std::sync::Arc;

// --- Contracts ---

/// # GET /api/extra-pay/contracts
pub async fn list_contracts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ExtraPayContract>>, AppError> {
    Ok(Json(state.store.list_extra_pay_contracts().await?))
}

/// # GET /api/extra-pay/contracts/:id
pub async fn get_contract(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExtraPayContract>, AppError> {
    let contract = state
        .store
        .get_extra_pay_contract(id)
        .await?
        .ok_or_else(|| not_found("extra pay contract", id))?;
    Ok(Json(contract))
}

/// # POST /api/extra-pay/contracts
pub async fn create_contract(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewExtraPayContract>,
) -> Result<Created<ExtraPayContract>, AppError> {
    input.validate()?;
    Ok(created(state.store.create_extra_pay_contract(&input).await?))
}

/// # PATCH|PUT /api/extra-pay/contracts/:id
pub async fn update_contract(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<ExtraPayContractUpdate>,
) -> Result<Json<ExtraPayContract>, AppError> {
    input.validate()?;
    let contract = state
        .store
        .update_extra_pay_contract(id, &input)
        .await?
        .ok_or_else(|| not_found("extra pay contract", id))?;
    Ok(Json(contract))
}

/// # DELETE /api/extra-pay/contracts/:id
/// Claims against the contract go with it.
pub async fn delete_contract(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("extra pay contract", id, state.store.delete_extra_pay_contract(id).await?)
}

/// # GET /api/extra-pay/contracts/:id/requests
pub async fn list_contract_requests(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ExtraPayRequest>>, AppError> {
    if state.store.get_extra_pay_contract(id).await?.is_none() {
        return Err(not_found("extra pay contract", id));
    }
    Ok(Json(state.store.list_extra_pay_requests_for_contract(id).await?))
}

// --- Requests ---

/// # GET /api/extra-pay/requests
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ExtraPayRequest>>, AppError> {
    Ok(Json(state.store.list_extra_pay_requests().await?))
}

/// # GET /api/extra-pay/requests/:id
pub async fn get_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExtraPayRequest>, AppError> {
    let request = state
        .store
        .get_extra_pay_request(id)
        .await?
        .ok_or_else(|| not_found("extra pay request", id))?;
    Ok(Json(request))
}

/// # POST /api/extra-pay/requests
/// Without an `amount` the claim is for the full contract amount.
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewExtraPayRequest>,
) -> Result<Created<ExtraPayRequest>, AppError> {
    input.validate()?;
    let contract = state
        .store
        .get_extra_pay_contract(input.contract_id)
        .await?
        .ok_or_else(|| {
            CoreError::invalid(
                "contractId",
                format!("extra pay contract {} does not exist", input.contract_id),
            )
        })?;
    let amount = input.amount.unwrap_or(contract.amount);

    let request = state.store.create_extra_pay_request(&input, amount).await?;
    record_audit(
        &state,
        NewAuditLog::new(entity::EXTRA_PAY_REQUEST, request.id, "create").with_details(json!({
            "contractId": request.contract_id,
            "employeeId": request.employee_id,
            "amount": request.amount,
        })),
    )
    .await;
    Ok(created(request))
}

/// # DELETE /api/extra-pay/requests/:id
pub async fn delete_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("extra pay request", id, state.store.delete_extra_pay_request(id).await?)
}

async fn decide(
    state: &AppState,
    id: i64,
    action: ExtraPayAction,
    decision: ExtraPayDecision,
) -> Result<Json<ExtraPayRequest>, AppError> {
    let input = TransitionInput::new(decision.actor_id, decision.reason);
    let updated = state
        .store
        .transition_extra_pay_request(id, action, &input)
        .await
        .map_err(|e| match action {
            ExtraPayAction::MarkPaid => AppError::Payroll(e),
            _ => AppError::Database(e),
        })?;
    let Some(request) = updated else {
        let current = state.store.get_extra_pay_request(id).await?.map(|r| r.status);
        return Err(refused("extra pay request", id, action.name(), current));
    };

    record_audit(
        state,
        NewAuditLog::new(entity::EXTRA_PAY_REQUEST, id, action.name())
            .by(input.actor_id)
            .with_details(json!({ "status": request.status, "amount": request.amount })),
    )
    .await;
    Ok(Json(request))
}

/// # POST /api/extra-pay/requests/:id/approve
pub async fn approve_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<ExtraPayDecision>>,
) -> Result<Json<ExtraPayRequest>, AppError> {
    decide(&state, id, ExtraPayAction::Approve, body_or_default(body)).await
}

/// # POST /api/extra-pay/requests/:id/reject
pub async fn reject_request(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<ExtraPayDecision>>,
) -> Result<Json<ExtraPayRequest>, AppError> {
    decide(&state, id, ExtraPayAction::Reject, body_or_default(body)).await
}

/// # POST /api/extra-pay/requests/:id/mark-paid
pub async fn mark_request_paid(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<ExtraPayDecision>>,
) -> Result<Json<ExtraPayRequest>, AppError> {
    decide(&state, id, ExtraPayAction::MarkPaid, body_or_default(body)).await
}
