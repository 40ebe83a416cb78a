//! Pharmacy branch HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::pharmacy::{
    CreatePharmacyInput, PharmacyService, SetDailyDiscountInput, UpdatePharmacyInput,
};
use crate::AppState;

/// List all pharmacies
pub async fn list_pharmacies(State(state): State<AppState>) -> impl IntoResponse {
    let service = PharmacyService::new(state.db.clone());

    match service.list_pharmacies().await {
        Ok(pharmacies) => (
            StatusCode::OK,
            Json(serde_json::json!({ "pharmacies": pharmacies })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a pharmacy
pub async fn get_pharmacy(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PharmacyService::new(state.db.clone());

    match service.get_pharmacy(pharmacy_id).await {
        Ok(pharmacy) => (StatusCode::OK, Json(pharmacy)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a pharmacy branch
pub async fn create_pharmacy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreatePharmacyInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "pharmacies", "create") {
        return response;
    }
    let service = PharmacyService::new(state.db.clone());

    match service.create_pharmacy(input).await {
        Ok(pharmacy) => (StatusCode::CREATED, Json(pharmacy)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a pharmacy
pub async fn update_pharmacy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pharmacy_id): Path<Uuid>,
    Json(input): Json<UpdatePharmacyInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "pharmacies", "edit") {
        return response;
    }
    let service = PharmacyService::new(state.db.clone());

    match service.update_pharmacy(pharmacy_id, input).await {
        Ok(pharmacy) => (StatusCode::OK, Json(pharmacy)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a pharmacy branch
pub async fn delete_pharmacy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pharmacy_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "pharmacies", "delete") {
        return response;
    }
    let service = PharmacyService::new(state.db.clone());

    match service.delete_pharmacy(pharmacy_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Set today's storewide discount
pub async fn set_daily_discount(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pharmacy_id): Path<Uuid>,
    Json(input): Json<SetDailyDiscountInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "pharmacies", "edit") {
        return response;
    }
    let service = PharmacyService::new(state.db.clone());

    match service.set_daily_discount(pharmacy_id, input).await {
        Ok(pharmacy) => (StatusCode::OK, Json(pharmacy)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Today's storewide discount, if one is active
pub async fn get_daily_discount(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PharmacyService::new(state.db.clone());

    match service.get_daily_discount(pharmacy_id).await {
        Ok(discount) => (
            StatusCode::OK,
            Json(serde_json::json!({ "daily_discount_pct": discount })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
