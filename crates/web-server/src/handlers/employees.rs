use super::{created, deleted, not_found, record_audit, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, Employee, EmployeeUpdate, LeaveRequest, NewAuditLog, NewEmployee,
    PayrollRecord, TimeCard,
};
use serde_json::json;
use std::sync::Arc;

/// # GET /api/employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.store.list_employees().await?))
}

/// # GET /api/employees/:id
pub async fn get_employee(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Employee>, AppError> {
    let employee = state
        .store
        .get_employee(id)
        .await?
        .ok_or_else(|| not_found("employee", id))?;
    Ok(Json(employee))
}

/// # POST /api/employees
/// The employee's first (draft) time card is created alongside.
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewEmployee>,
) -> Result<Created<Employee>, AppError> {
    input.validate()?;
    let employee = state.store.create_employee(&input).await?;

    tracing::info!(
        employee_id = employee.id,
        number = %employee.employee_number,
        "Employee created."
    );
    record_audit(
        &state,
        NewAuditLog::new(entity::EMPLOYEE, employee.id, "create")
            .with_details(json!({ "employeeNumber": employee.employee_number })),
    )
    .await;
    Ok(created(employee))
}

/// # PATCH|PUT /api/employees/:id
pub async fn update_employee(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<EmployeeUpdate>,
) -> Result<Json<Employee>, AppError> {
    input.validate()?;
    let employee = state
        .store
        .update_employee(id, &input)
        .await?
        .ok_or_else(|| not_found("employee", id))?;

    record_audit(
        &state,
        NewAuditLog::new(entity::EMPLOYEE, id, "update")
            .with_details(json!({ "status": employee.status })),
    )
    .await;
    Ok(Json(employee))
}

/// # DELETE /api/employees/:id
/// Their time cards, requests and accounts are removed with them.
pub async fn delete_employee(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    let removed = state.store.delete_employee(id).await?;
    if removed {
        record_audit(&state, NewAuditLog::new(entity::EMPLOYEE, id, "delete")).await;
    }
    deleted("employee", id, removed)
}

async fn require_employee(state: &AppState, id: i64) -> Result<(), AppError> {
    match state.store.get_employee(id).await? {
        Some(_) => Ok(()),
        None => Err(not_found("employee", id)),
    }
}

/// # GET /api/employees/:id/timecards
pub async fn employee_timecards(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TimeCard>>, AppError> {
    require_employee(&state, id).await?;
    Ok(Json(state.store.list_timecards_for_employee(id).await?))
}

/// # GET /api/employees/:id/leave-requests
pub async fn employee_leave_requests(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    require_employee(&state, id).await?;
    Ok(Json(state.store.list_leave_requests_for_employee(id).await?))
}

/// # GET /api/employees/:id/payroll
pub async fn employee_payroll(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PayrollRecord>>, AppError> {
    require_employee(&state, id).await?;
    Ok(Json(state.store.list_payroll_records_for_employee(id).await?))
}
