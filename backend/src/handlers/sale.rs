//! Sales HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::sale::{CreateSaleInput, SaleFilter, SaleService};
use crate::AppState;
use shared::types::DateRange;

#[derive(Debug, Default, Deserialize)]
pub struct SalesSummaryQuery {
    pub pharmacy_id: Option<Uuid>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> impl IntoResponse {
    if let Err(response) = check_permission(&user, "sales", "create") {
        return response;
    }
    let service = SaleService::new(state.db.clone());

    match service.create_sale(input).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List sales, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    Query(filter): Query<SaleFilter>,
) -> impl IntoResponse {
    let service = SaleService::new(state.db.clone());

    match service.list_sales(filter).await {
        Ok(sales) => (StatusCode::OK, Json(serde_json::json!({ "sales": sales })))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a sale with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = SaleService::new(state.db.clone());

    match service.get_sale(sale_id).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Revenue and units sold
pub async fn sales_summary(
    State(state): State<AppState>,
    Query(query): Query<SalesSummaryQuery>,
) -> impl IntoResponse {
    let service = SaleService::new(state.db.clone());

    let range = match (query.start, query.end) {
        (Some(start), Some(end)) => Some(DateRange { start, end }),
        _ => None,
    };

    match service.sales_summary(query.pharmacy_id, range).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}
