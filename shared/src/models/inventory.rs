//! Inventory models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inventory row for one product at one pharmacy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub code: String,
    pub description: String,
    pub lab: Option<String>,
    /// Nationally produced vs imported
    pub national: Option<bool>,
    pub department: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub list_price: Option<Decimal>,
    pub discount_pct: Option<Decimal>,
    pub net_price: Option<Decimal>,
    /// Units currently on hand ("pedido" on the legacy sheets)
    pub on_hand: i64,
    /// Total units counted at the last stocktake
    pub total_units: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Pharmacy name, populated on reads that join the pharmacy
    pub pharmacy_name: Option<String>,
}
