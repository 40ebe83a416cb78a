//! Supplier price list HTTP handlers
//!
//! Supplier accounts may only touch their own list; staff roles with the
//! suppliers permissions may touch any.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::price_list::{PriceListService, UpsertOfferInput};
use crate::AppState;
use shared::models::Role;

/// Supplier accounts are confined to their own list
fn check_list_scope(user: &AuthUser, supplier_id: Uuid) -> Result<(), Response> {
    if user.role == Role::Supplier {
        if user.may_access_supplier(supplier_id) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions.into_response())
        }
    } else {
        crate::middleware::check_permission(user, "suppliers", "edit")
    }
}

/// List a supplier's published offers
pub async fn list_offers(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PriceListService::new(state.db.clone());

    match service.list_offers(supplier_id).await {
        Ok(offers) => (StatusCode::OK, Json(serde_json::json!({ "offers": offers })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Insert or refresh a single offer
pub async fn upsert_offer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpsertOfferInput>,
) -> impl IntoResponse {
    if let Err(response) = check_list_scope(&user, supplier_id) {
        return response;
    }
    let service = PriceListService::new(state.db.clone());

    match service.upsert_offer(supplier_id, input).await {
        Ok(offer) => (StatusCode::OK, Json(offer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a single offer
pub async fn delete_offer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((supplier_id, item_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) = check_list_scope(&user, supplier_id) {
        return response;
    }
    let service = PriceListService::new(state.db.clone());

    match service.delete_offer(supplier_id, item_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Bulk-load a supplier's price list from an uploaded CSV file
pub async fn upload_price_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    if let Err(response) = check_list_scope(&user, supplier_id) {
        return response;
    }

    let mut file_data: Option<Vec<u8>> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let is_file = field.name() == Some("file") || field.file_name().is_some();
                if is_file {
                    match field.bytes().await {
                        Ok(bytes) => {
                            file_data = Some(bytes.to_vec());
                            break;
                        }
                        Err(e) => {
                            return AppError::UploadError(format!("Failed to read file: {}", e))
                                .into_response();
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return AppError::UploadError(format!("Malformed multipart body: {}", e))
                    .into_response();
            }
        }
    }

    let data = match file_data {
        Some(data) if !data.is_empty() => data,
        _ => {
            return AppError::UploadError("No file provided".to_string()).into_response();
        }
    };

    let service = PriceListService::new(state.db.clone());
    match service.upload_csv(supplier_id, &data).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Suppliers that currently have a published price list
pub async fn list_suppliers_with_lists(State(state): State<AppState>) -> impl IntoResponse {
    let service = PriceListService::new(state.db.clone());

    match service.suppliers_with_lists().await {
        Ok(suppliers) => (
            StatusCode::OK,
            Json(serde_json::json!({ "suppliers": suppliers })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
