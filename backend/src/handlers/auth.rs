//! Authentication HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::middleware::CurrentUser;
use crate::services::auth::{AuthService, LoginInput, RegisterInput};
use crate::AppState;

/// Register a new user account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> impl IntoResponse {
    let service = AuthService::new(state.db.clone(), state.config.clone());

    match service.register(input).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Authenticate and receive an access token
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> impl IntoResponse {
    let service = AuthService::new(state.db.clone(), state.config.clone());

    match service.login(input).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The authenticated user's own account
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let service = AuthService::new(state.db.clone(), state.config.clone());

    match service.get_user(user.user_id).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => e.into_response(),
    }
}
