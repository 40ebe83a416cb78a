//! Supplier HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::supplier::{
    CreateSupplierInput, SupplierService, UpdateSupplierInput, UpsertSupplierPriceInput,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListSuppliersQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// List suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<ListSuppliersQuery>,
) -> impl IntoResponse {
    let service = SupplierService::new(state.db.clone());

    match service.list_suppliers(query.include_inactive).await {
        Ok(suppliers) => (
            StatusCode::OK,
            Json(serde_json::json!({ "suppliers": suppliers })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a supplier
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = SupplierService::new(state.db.clone());

    match service.get_supplier(supplier_id).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSupplierInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "suppliers", "create") {
        return response;
    }
    let service = SupplierService::new(state.db.clone());

    match service.create_supplier(input).await {
        Ok(supplier) => (StatusCode::CREATED, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "suppliers", "edit") {
        return response;
    }
    let service = SupplierService::new(state.db.clone());

    match service.update_supplier(supplier_id, input).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deactivate a supplier
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "suppliers", "delete") {
        return response;
    }
    let service = SupplierService::new(state.db.clone());

    match service.deactivate_supplier(supplier_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Reactivate a supplier
pub async fn reactivate_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "suppliers", "edit") {
        return response;
    }
    let service = SupplierService::new(state.db.clone());

    match service.reactivate_supplier(supplier_id).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Aggregate supplier statistics
pub async fn get_supplier_statistics(State(state): State<AppState>) -> impl IntoResponse {
    let service = SupplierService::new(state.db.clone());

    match service.get_statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List a supplier's quick quotes
pub async fn list_supplier_prices(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = SupplierService::new(state.db.clone());

    match service.list_prices(supplier_id).await {
        Ok(prices) => (StatusCode::OK, Json(serde_json::json!({ "prices": prices })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Insert or refresh a quick quote
pub async fn upsert_supplier_price(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpsertSupplierPriceInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "suppliers", "edit") {
        return response;
    }
    let service = SupplierService::new(state.db.clone());

    match service.upsert_price(supplier_id, input).await {
        Ok(price) => (StatusCode::OK, Json(price)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a quick quote
pub async fn delete_supplier_price(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((supplier_id, price_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "suppliers", "edit") {
        return response;
    }
    let service = SupplierService::new(state.db.clone());

    match service.delete_price(supplier_id, price_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// All suppliers' quotes for one product code, cheapest first
pub async fn list_prices_for_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = SupplierService::new(state.db.clone());

    match service.list_prices_for_code(&code).await {
        Ok(prices) => (StatusCode::OK, Json(serde_json::json!({ "prices": prices })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}
