//! Purchase order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, AuthUser, CurrentUser};
use crate::services::order::{
    CreateOrdersInput, OrderFilter, OrderService, ReceiveOrderInput, UpdateOrderItemsInput,
    UpdateStatusInput,
};
use crate::AppState;
use shared::models::Role;

/// Create purchase orders from a cart, one per supplier
pub async fn create_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateOrdersInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "orders", "create") {
        return response;
    }
    let service = OrderService::new(state.db.clone());

    match service.create_from_cart(input).await {
        Ok(orders) => (StatusCode::CREATED, Json(serde_json::json!({ "orders": orders })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List purchase orders
///
/// Supplier accounts only see their own orders regardless of filters.
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(mut filter): Query<OrderFilter>,
) -> impl IntoResponse {
    if user.role == Role::Supplier {
        filter.supplier_id = user.supplier_id;
    }
    let service = OrderService::new(state.db.clone());

    match service.list_orders(filter).await {
        Ok(orders) => (StatusCode::OK, Json(serde_json::json!({ "orders": orders })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a purchase order
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.get_order(order_id).await {
        Ok(order) => {
            if !user.may_access_supplier(order.supplier_id) {
                return crate::error::AppError::InsufficientPermissions.into_response();
            }
            (StatusCode::OK, Json(order)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Supplier accounts may only mutate orders addressed to their own supplier
async fn check_order_ownership(
    service: &OrderService,
    user: &AuthUser,
    order_id: Uuid,
) -> Result<(), Response> {
    if user.role != Role::Supplier {
        return Ok(());
    }
    match service.get_order(order_id).await {
        Ok(order) if user.may_access_supplier(order.supplier_id) => Ok(()),
        Ok(_) => Err(crate::error::AppError::InsufficientPermissions.into_response()),
        Err(e) => Err(e.into_response()),
    }
}

/// Move an order through its lifecycle
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "orders", "edit") {
        return response;
    }
    let service = OrderService::new(state.db.clone());
    if let Err(response) = check_order_ownership(&service, &user, order_id).await {
        return response;
    }

    match service.update_status(order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark an order received
pub async fn receive_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceiveOrderInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "orders", "edit") {
        return response;
    }
    let service = OrderService::new(state.db.clone());
    if let Err(response) = check_order_ownership(&service, &user, order_id).await {
        return response;
    }

    match service.mark_received(order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Replace a pending order's lines
pub async fn update_order_items(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderItemsInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "orders", "edit") {
        return response;
    }
    let service = OrderService::new(state.db.clone());
    if let Err(response) = check_order_ownership(&service, &user, order_id).await {
        return response;
    }

    match service.update_items(order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Purchase history for a product code
pub async fn get_purchase_history(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.purchase_history(&code).await {
        Ok(history) => (StatusCode::OK, Json(serde_json::json!({ "history": history })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Most recent price paid for a product code
pub async fn get_last_purchase_price(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.last_purchase_price(&code).await {
        Ok(entry) => (
            StatusCode::OK,
            Json(serde_json::json!({ "last_purchase": entry })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
