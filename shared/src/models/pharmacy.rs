//! Pharmacy branch models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pharmacy branch of the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Storewide discount applied for a single day, if any
    pub daily_discount_pct: Option<Decimal>,
    pub daily_discount_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
