//! Stock report HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::report::ReportService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ThresholdQuery {
    pub threshold: Option<i64>,
}

/// Chain-wide shortage report
pub async fn shortage_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ThresholdQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "reports", "view") {
        return response;
    }
    let service = ReportService::new(state.db.clone());

    match service.shortage_report(query.threshold).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Headline shortage numbers and most affected branches
pub async fn shortage_statistics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ThresholdQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "reports", "view") {
        return response;
    }
    let service = ReportService::new(state.db.clone());

    match service.shortage_statistics(query.threshold).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Chain-wide overstock report
pub async fn overstock_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ThresholdQuery>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "reports", "view") {
        return response;
    }
    let service = ReportService::new(state.db.clone());

    match service.overstock_report(query.threshold).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}
