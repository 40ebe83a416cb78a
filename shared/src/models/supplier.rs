//! Supplier models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A drug wholesaler the chain buys from
///
/// Discount rates are supplier-wide: the commercial discount applies to every
/// product on the supplier's list, the early-payment discount applies on top
/// of the commercially discounted price when invoices are settled early.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_days: i32,
    pub commercial_discount_pct: Decimal,
    pub early_pay_discount_pct: Decimal,
    /// Soft-delete flag; inactive suppliers are hidden, never removed
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A raw per-product price quoted by a supplier
///
/// This is the lightweight quick-reference table used by the shortage report
/// cross-reference; the full price lists with availability live in
/// `PriceListItem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPrice {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub code: String,
    pub description: String,
    pub price: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// One product entry on a supplier's uploaded price list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListItem {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub code: String,
    pub description: String,
    pub lab: String,
    /// Nullable in storage as a tolerance measure; ingestion never writes
    /// priceless rows, and the comparison engine drops them at the snapshot
    pub list_price: Option<Decimal>,
    /// Pre-discounted price override from the list itself, when present
    pub discounted_list_price: Option<Decimal>,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate statistics across active suppliers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierStatistics {
    pub total_suppliers: i64,
    pub suppliers_with_credit: i64,
    pub avg_credit_days: Decimal,
    pub avg_commercial_discount_pct: Decimal,
}
