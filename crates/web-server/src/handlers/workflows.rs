use super::{created, deleted, not_found, Created};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{NewWorkflowTemplate, WorkflowTemplate, WorkflowTemplateUpdate};
use std::sync::Arc;

/// # GET /api/workflow-templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WorkflowTemplate>>, AppError> {
    Ok(Json(state.store.list_workflow_templates().await?))
}

/// # GET /api/workflow-templates/:id
pub async fn get_template(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorkflowTemplate>, AppError> {
    let template = state
        .store
        .get_workflow_template(id)
        .await?
        .ok_or_else(|| not_found("workflow template", id))?;
    Ok(Json(template))
}

/// # POST /api/workflow-templates
/// Steps are renumbered in the order given.
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewWorkflowTemplate>,
) -> Result<Created<WorkflowTemplate>, AppError> {
    input.validate()?;
    Ok(created(state.store.create_workflow_template(&input).await?))
}

/// # PATCH|PUT /api/workflow-templates/:id
pub async fn update_template(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<WorkflowTemplateUpdate>,
) -> Result<Json<WorkflowTemplate>, AppError> {
    input.validate()?;
    let template = state
        .store
        .update_workflow_template(id, &input)
        .await?
        .ok_or_else(|| not_found("workflow template", id))?;
    Ok(Json(template))
}

/// # DELETE /api/workflow-templates/:id
pub async fn delete_template(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("workflow template", id, state.store.delete_workflow_template(id).await?)
}
