//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Inclusive date range for report and summary queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}
