//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchase order placed by a pharmacy with one supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub supplier_id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub received_date: Option<DateTime<Utc>>,
    pub delivery_photo_url: Option<String>,
    pub items: Vec<PurchaseOrderItem>,
}

/// Lifecycle of a purchase order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Received,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "in_transit" => Some(OrderStatus::InTransit),
            "received" => Some(OrderStatus::Received),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// One product line of a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// A purchase recorded when an order is received, used for price history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseHistoryEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub pharmacy_id: Uuid,
    pub supplier_id: Uuid,
    pub code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub purchased_at: DateTime<Utc>,
}
