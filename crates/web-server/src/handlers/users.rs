use super::{created, deleted, not_found, Created};
use crate::auth::{hash_password, verify_password};
use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{LoginRequest, NewUser, User};
use std::sync::Arc;

/// # POST /api/auth/login
/// Answers with the user (without the hash) when the password matches.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .store
        .get_user_by_username(input.username.trim())
        .await?
        .ok_or_else(invalid)?;
    if !user.is_active || !verify_password(&input.password, &user.password_hash) {
        tracing::info!(username = %user.username, "Rejected login attempt.");
        return Err(invalid());
    }

    tracing::info!(user_id = user.id, "User signed in.");
    Ok(Json(user))
}

/// # GET /api/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.store.list_users().await?))
}

/// # GET /api/users/:id
pub async fn get_user(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, AppError> {
    let user = state.store.get_user(id).await?.ok_or_else(|| not_found("user", id))?;
    Ok(Json(user))
}

/// # POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> Result<Created<User>, AppError> {
    input.validate()?;
    let hash = hash_password(&input.password)?;
    let user = state.store.create_user(&input, &hash).await?;
    tracing::info!(user_id = user.id, role = %user.role, "User created.");
    Ok(created(user))
}

/// # DELETE /api/users/:id
pub async fn delete_user(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    deleted("user", id, state.store.delete_user(id).await?)
}
