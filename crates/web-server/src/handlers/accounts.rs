use super::{body_or_default, created, deleted, not_found, record_audit, refused, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, AccessLevel, AccountAction, AccountChange, EmployeeAccount, GrantAccess,
    NewAuditLog, NewEmployeeAccount, StatusTransition,
};
use database::TransitionInput;
use serde_json::json;
use std::sync::Arc;

/// # GET /api/employee-accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EmployeeAccount>>, AppError> {
    Ok(Json(state.store.list_employee_accounts().await?))
}

/// # GET /api/employee-accounts/:id
pub async fn get_account(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmployeeAccount>, AppError> {
    let account = state
        .store
        .get_employee_account(id)
        .await?
        .ok_or_else(|| not_found("employee account", id))?;
    Ok(Json(account))
}

/// # POST /api/employee-accounts
/// New accounts start pending with no access.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewEmployeeAccount>,
) -> Result<Created<EmployeeAccount>, AppError> {
    input.validate()?;
    let account = state.store.create_employee_account(&input).await?;
    record_audit(
        &state,
        NewAuditLog::new(entity::EMPLOYEE_ACCOUNT, account.id, "create")
            .with_details(json!({
                "employeeId": account.employee_id,
                "username": account.username,
            })),
    )
    .await;
    Ok(created(account))
}

/// # DELETE /api/employee-accounts/:id
pub async fn delete_account(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("employee account", id, state.store.delete_employee_account(id).await?)
}

async fn change(
    state: &AppState,
    id: i64,
    action: AccountAction,
    level: AccessLevel,
    actor_id: Option<i64>,
) -> Result<Json<EmployeeAccount>, AppError> {
    let input = TransitionInput::new(actor_id, None);
    let Some(account) = state
        .store
        .transition_employee_account(id, action, level, &input)
        .await?
    else {
        let current = state.store.get_employee_account(id).await?.map(|a| a.status);
        return Err(refused("employee account", id, action.name(), current));
    };

    tracing::info!(
        account_id = id,
        status = %account.status,
        access = %account.access_level,
        "Employee account changed."
    );
    record_audit(
        state,
        NewAuditLog::new(entity::EMPLOYEE_ACCOUNT, id, action.name())
            .by(actor_id)
            .with_details(json!({ "status": account.status, "accessLevel": account.access_level })),
    )
    .await;
    Ok(Json(account))
}

/// # POST /api/employee-accounts/:id/grant-access
pub async fn grant_access(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<GrantAccess>>,
) -> Result<Json<EmployeeAccount>, AppError> {
    let input: GrantAccess = body_or_default(body);
    input.validate()?;
    change(&state, id, AccountAction::GrantAccess, input.access_level, input.granted_by).await
}

/// # POST /api/employee-accounts/:id/suspend
/// Keeps the access level so a later grant can restore it.
pub async fn suspend_account(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<AccountChange>>,
) -> Result<Json<EmployeeAccount>, AppError> {
    let input: AccountChange = body_or_default(body);
    change(&state, id, AccountAction::Suspend, AccessLevel::NoAccess, input.actor_id).await
}

/// # POST /api/employee-accounts/:id/revoke-access
pub async fn revoke_access(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    body: Option<Json<AccountChange>>,
) -> Result<Json<EmployeeAccount>, AppError> {
    let input: AccountChange = body_or_default(body);
    change(&state, id, AccountAction::RevokeAccess, AccessLevel::NoAccess, input.actor_id).await
}
