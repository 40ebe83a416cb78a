//! Inventory HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::inventory::{CreateItemInput, InventoryService, UpdateItemInput};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListInventoryQuery {
    pub pharmacy_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SearchInventoryQuery {
    pub q: String,
    pub pharmacy_id: Option<Uuid>,
}

/// List inventory, optionally scoped to a branch
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<ListInventoryQuery>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.list_items(query.pharmacy_id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Search inventory by code, description, or lab
pub async fn search_inventory(
    State(state): State<AppState>,
    Query(query): Query<SearchInventoryQuery>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.search_items(&query.q, query.pharmacy_id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get an inventory item
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = InventoryService::new(state.db.clone());

    match service.get_item(item_id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create an inventory item
pub async fn create_inventory_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateItemInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "inventory", "create") {
        return response;
    }
    let service = InventoryService::new(state.db.clone());

    match service.create_item(input).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an inventory item
pub async fn update_inventory_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "inventory", "edit") {
        return response;
    }
    let service = InventoryService::new(state.db.clone());

    match service.update_item(item_id, input).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an inventory item
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "inventory", "delete") {
        return response;
    }
    let service = InventoryService::new(state.db.clone());

    match service.delete_item(item_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
