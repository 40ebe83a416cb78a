//! User administration HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::user::{UpdateUserInput, UserService};
use crate::AppState;

/// List all user accounts
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "users", "view") {
        return response;
    }
    let service = UserService::new(state.db.clone());

    match service.list_users().await {
        Ok(users) => (StatusCode::OK, Json(serde_json::json!({ "users": users }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a user account
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "users", "view") {
        return response;
    }
    let service = UserService::new(state.db.clone());

    match service.get_user(user_id).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a user's role, overrides, or status
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "users", "edit") {
        return response;
    }
    let service = UserService::new(state.db.clone());

    match service.update_user(user_id, input).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deactivate a user account
pub async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "users", "delete") {
        return response;
    }
    let service = UserService::new(state.db.clone());

    match service.deactivate_user(user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
