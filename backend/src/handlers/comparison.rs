//! Price comparison HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::services::comparison::ComparisonService;
use crate::AppState;
use shared::pricing::evaluate_cascade;

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Free-text search over code, description, and lab
    #[serde(default)]
    pub q: String,
}

/// Input for a standalone cascade evaluation
#[derive(Debug, Deserialize)]
pub struct CascadeInput {
    pub base_price: Decimal,
    pub commercial_discount_pct: Option<Decimal>,
    pub early_pay_discount_pct: Option<Decimal>,
}

/// Compare matching offers across all active suppliers
pub async fn compare_prices(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> impl IntoResponse {
    let service = ComparisonService::new(state.db.clone());

    match service.search(&query.q).await {
        Ok(products) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "query": query.q,
                "products": products,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run the discount cascade over a single price
pub async fn evaluate_discounts(Json(input): Json<CascadeInput>) -> impl IntoResponse {
    let breakdown = evaluate_cascade(
        input.base_price,
        input.commercial_discount_pct,
        input.early_pay_discount_pct,
    );
    (StatusCode::OK, Json(breakdown))
}
