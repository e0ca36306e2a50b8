use super::{created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, NewAuditLog, NewPayrollRecord, PayrollAction, PayrollRecord, StatusTransition,
};
use serde_json::json;
use std::sync::Arc;

/// # GET /api/payroll
pub async fn list_payroll_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PayrollRecord>>, AppError> {
    Ok(Json(state.store.list_payroll_records().await?))
}

/// # GET /api/payroll/:id
pub async fn get_payroll_record(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PayrollRecord>, AppError> {
    let record = state
        .store
        .get_payroll_record(id)
        .await?
        .ok_or_else(|| not_found("payroll record", id))?;
    Ok(Json(record))
}

/// # POST /api/payroll
/// `netPay` defaults to gross pay minus deductions.
pub async fn create_payroll_record(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewPayrollRecord>,
) -> Result<Created<PayrollRecord>, AppError> {
    input.validate()?;
    let record = state
        .store
        .create_payroll_record(&input)
        .await
        .map_err(AppError::Payroll)?;

    record_audit(
        &state,
        NewAuditLog::new(entity::PAYROLL_RECORD, record.id, "create").with_details(json!({
            "employeeId": record.employee_id,
            "grossPay": record.gross_pay,
            "netPay": record.net_pay,
        })),
    )
    .await;
    Ok(created(record))
}

/// # DELETE /api/payroll/:id
pub async fn delete_payroll_record(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("payroll record", id, state.store.delete_payroll_record(id).await?)
}

async fn transition(
    state: &AppState,
    id: i64,
    action: PayrollAction,
) -> Result<Json<PayrollRecord>, AppError> {
    let updated = state
        .store
        .transition_payroll_record(id, action)
        .await
        .map_err(AppError::Payroll)?;
    let Some(record) = updated else {
        let current = state.store.get_payroll_record(id).await?.map(|r| r.status);
        return Err(refused("payroll record", id, action.name(), current));
    };

    tracing::info!(payroll_id = id, status = %record.status, "Payroll record updated.");
    record_audit(
        state,
        NewAuditLog::new(entity::PAYROLL_RECORD, id, action.name())
            .with_details(json!({ "status": record.status, "netPay": record.net_pay })),
    )
    .await;
    Ok(Json(record))
}

/// # POST /api/payroll/:id/process
pub async fn process_payroll_record(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PayrollRecord>, AppError> {
    transition(&state, id, PayrollAction::Process).await
}

/// # POST /api/payroll/:id/mark-paid
pub async fn mark_payroll_record_paid(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PayrollRecord>, AppError> {
    transition(&state, id, PayrollAction::MarkPaid).await
}
