//! Cross-supplier price comparison service
//!
//! Fetches the offer snapshot (price list items joined with supplier terms)
//! and delegates the ranking to the pure comparison engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::pricing::{compare_offers, ProductComparison, SupplierOffer};

/// Comparison service
#[derive(Clone)]
pub struct ComparisonService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OfferRow {
    code: String,
    description: String,
    lab: String,
    list_price: Option<Decimal>,
    discounted_list_price: Option<Decimal>,
    available: bool,
    supplier_id: Uuid,
    supplier_name: String,
    commercial_discount_pct: Decimal,
    early_pay_discount_pct: Decimal,
    credit_days: i32,
    updated_at: Option<DateTime<Utc>>,
}

impl ComparisonService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Rank all matching offers across active suppliers
    pub async fn search(&self, query: &str) -> AppResult<Vec<ProductComparison>> {
        let offers = self.offer_snapshot().await?;
        Ok(compare_offers(query, offers))
    }

    /// Current offers from every active supplier's price list
    ///
    /// Rows without a usable list price are dropped here; the engine assumes
    /// every offer it sees can be priced.
    async fn offer_snapshot(&self) -> AppResult<Vec<SupplierOffer>> {
        let rows = sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT p.code, p.description, p.lab, p.list_price, p.discounted_list_price,
                   p.available, s.id as supplier_id, s.name as supplier_name,
                   s.commercial_discount_pct, s.early_pay_discount_pct, s.credit_days,
                   p.updated_at
            FROM price_list_items p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE s.active = TRUE
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let list_price = row.list_price?;
                Some(SupplierOffer {
                    code: row.code,
                    description: row.description,
                    lab: row.lab,
                    list_price,
                    discounted_list_price: row.discounted_list_price,
                    available: row.available,
                    supplier_id: row.supplier_id,
                    supplier_name: row.supplier_name,
                    commercial_discount_pct: row.commercial_discount_pct,
                    early_pay_discount_pct: row.early_pay_discount_pct,
                    credit_days: row.credit_days,
                    updated_at: row.updated_at,
                })
            })
            .collect())
    }
}
