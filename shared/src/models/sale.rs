//! Sale models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point-of-sale transaction at a pharmacy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub pharmacy_id: Uuid,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub sold_at: DateTime<Utc>,
    /// Client name, populated on reads that join the client
    pub client_name: Option<String>,
    /// Pharmacy name, populated on reads that join the pharmacy
    pub pharmacy_name: Option<String>,
}

/// Payment methods accepted at the counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }
}

/// One line of a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub inventory_item_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub product_description: Option<String>,
}

/// Chain-wide sales totals
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_items_sold: i64,
}
