use super::{created, deleted, not_found, record_audit, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{
    audit::entity, NewAuditLog, NewOnboardingForm, NewOnboardingSubmission,
    NewOnboardingWorkflow, OnboardingForm, OnboardingFormUpdate, OnboardingSubmission,
    OnboardingWorkflow, OnboardingWorkflowUpdate,
};
use serde_json::json;
use std::sync::Arc;

// --- Workflows ---

/// # GET /api/onboarding/workflows
pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OnboardingWorkflow>>, AppError> {
    Ok(Json(state.store.list_onboarding_workflows().await?))
}

/// # GET /api/onboarding/workflows/:id
pub async fn get_workflow(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OnboardingWorkflow>, AppError> {
    let workflow = state
        .store
        .get_onboarding_workflow(id)
        .await?
        .ok_or_else(|| not_found("onboarding workflow", id))?;
    Ok(Json(workflow))
}

/// # POST /api/onboarding/workflows
pub async fn create_workflow(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewOnboardingWorkflow>,
) -> Result<Created<OnboardingWorkflow>, AppError> {
    input.validate()?;
    let workflow = state.store.create_onboarding_workflow(&input).await?;
    record_audit(
        &state,
        NewAuditLog::new(entity::ONBOARDING_WORKFLOW, workflow.id, "create")
            .with_details(json!({
                "employeeId": workflow.employee_id,
                "totalSteps": workflow.total_steps,
            })),
    )
    .await;
    Ok(created(workflow))
}

/// # PATCH|PUT /api/onboarding/workflows/:id
pub async fn update_workflow(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<OnboardingWorkflowUpdate>,
) -> Result<Json<OnboardingWorkflow>, AppError> {
    input.validate()?;
    let workflow = state
        .store
        .update_onboarding_workflow(id, &input)
        .await?
        .ok_or_else(|| not_found("onboarding workflow", id))?;
    Ok(Json(workflow))
}

/// # POST /api/onboarding/workflows/:id/advance
/// Completes the current step; the last step completes the workflow.
pub async fn advance_workflow(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OnboardingWorkflow>, AppError> {
    let Some(workflow) = state.store.advance_onboarding_workflow(id).await? else {
        return match state.store.get_onboarding_workflow(id).await? {
            None => Err(not_found("onboarding workflow", id)),
            Some(_) => Err(AppError::Conflict(format!(
                "Onboarding workflow {id} is already completed"
            ))),
        };
    };

    record_audit(
        &state,
        NewAuditLog::new(entity::ONBOARDING_WORKFLOW, id, "advance").with_details(json!({
            "currentStep": workflow.current_step,
            "status": workflow.status,
        })),
    )
    .await;
    Ok(Json(workflow))
}

/// # DELETE /api/onboarding/workflows/:id
pub async fn delete_workflow(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("onboarding workflow", id, state.store.delete_onboarding_workflow(id).await?)
}

// --- Forms ---

/// # GET /api/onboarding/forms
pub async fn list_forms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OnboardingForm>>, AppError> {
    Ok(Json(state.store.list_onboarding_forms().await?))
}

/// # GET /api/onboarding/forms/:id
pub async fn get_form(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OnboardingForm>, AppError> {
    let form = state
        .store
        .get_onboarding_form(id)
        .await?
        .ok_or_else(|| not_found("onboarding form", id))?;
    Ok(Json(form))
}

/// # POST /api/onboarding/forms
pub async fn create_form(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewOnboardingForm>,
) -> Result<Created<OnboardingForm>, AppError> {
    input.validate()?;
    Ok(created(state.store.create_onboarding_form(&input).await?))
}

/// # PATCH|PUT /api/onboarding/forms/:id
pub async fn update_form(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<OnboardingFormUpdate>,
) -> Result<Json<OnboardingForm>, AppError> {
    input.validate()?;
    let form = state
        .store
        .update_onboarding_form(id, &input)
        .await?
        .ok_or_else(|| not_found("onboarding form", id))?;
    Ok(Json(form))
}

/// # DELETE /api/onboarding/forms/:id
pub async fn delete_form(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("onboarding form", id, state.store.delete_onboarding_form(id).await?)
}

/// # GET /api/onboarding/forms/:id/submissions
pub async fn list_submissions(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OnboardingSubmission>>, AppError> {
    if state.store.get_onboarding_form(id).await?.is_none() {
        return Err(not_found("onboarding form", id));
    }
    Ok(Json(state.store.list_onboarding_submissions(id).await?))
}

/// # POST /api/onboarding/forms/:id/submissions
/// Inactive forms no longer accept submissions.
pub async fn create_submission(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewOnboardingSubmission>,
) -> Result<Created<OnboardingSubmission>, AppError> {
    input.validate()?;
    let form = state
        .store
        .get_onboarding_form(id)
        .await?
        .ok_or_else(|| not_found("onboarding form", id))?;
    if !form.is_active {
        return Err(AppError::Conflict(format!(
            "Onboarding form {id} is not accepting submissions"
        )));
    }
    Ok(created(state.store.create_onboarding_submission(id, &input).await?))
}
