//! Chain-wide stock reports
//!
//! Shortage analysis runs over a full inventory snapshot in memory; the
//! overstock report is the same snapshot filtered the other way.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::inventory::InventoryService;
use super::supplier::SupplierService;
use crate::error::AppResult;
use shared::shortage::{analyze_shortages, InventoryLevel, ShortageEntry, ShortagePriority};

/// Default low-stock threshold for the shortage report
pub const DEFAULT_SHORTAGE_THRESHOLD: i64 = 5;

/// Default high-stock threshold for the overstock report
pub const DEFAULT_OVERSTOCK_THRESHOLD: i64 = 50;

/// Report service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Full shortage report
#[derive(Debug, Serialize)]
pub struct ShortageReport {
    pub threshold: i64,
    pub entries: Vec<ShortageEntry>,
}

/// Aggregate shortage numbers plus the hardest-hit branches
#[derive(Debug, Serialize)]
pub struct ShortageStatistics {
    pub threshold: i64,
    pub total_products: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub total_suggested_quantity: i64,
    pub total_estimated_value: Decimal,
    pub top_pharmacies: Vec<PharmacyImpact>,
}

/// How strongly one branch shows up in the shortage report
#[derive(Debug, Serialize)]
pub struct PharmacyImpact {
    pub pharmacy_id: Uuid,
    pub pharmacy_name: String,
    pub products_short: i64,
    pub total_suggested_quantity: i64,
}

/// One pharmacy's stock of an overstocked product
#[derive(Debug, Serialize)]
pub struct OverstockLevel {
    pub pharmacy_id: Uuid,
    pub pharmacy_name: String,
    pub on_hand: i64,
}

/// One product held above the high-stock threshold somewhere in the chain
#[derive(Debug, Serialize)]
pub struct OverstockEntry {
    pub code: String,
    pub description: String,
    pub lab: Option<String>,
    pub total_on_hand: i64,
    pub estimated_value: Decimal,
    pub per_pharmacy: Vec<OverstockLevel>,
}

/// Full overstock report
#[derive(Debug, Serialize)]
pub struct OverstockReport {
    pub threshold: i64,
    pub entries: Vec<OverstockEntry>,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Products at or below the threshold anywhere in the chain
    pub async fn shortage_report(&self, threshold: Option<i64>) -> AppResult<ShortageReport> {
        let threshold = threshold.unwrap_or(DEFAULT_SHORTAGE_THRESHOLD).max(0);

        let levels = InventoryService::new(self.db.clone()).levels_snapshot().await?;
        let best_offers = SupplierService::new(self.db.clone())
            .best_prices_by_code()
            .await?;

        let entries = analyze_shortages(levels, threshold, &best_offers);
        Ok(ShortageReport { threshold, entries })
    }

    /// Headline shortage numbers and the five most affected branches
    pub async fn shortage_statistics(
        &self,
        threshold: Option<i64>,
    ) -> AppResult<ShortageStatistics> {
        let report = self.shortage_report(threshold).await?;

        let mut high_priority = 0;
        let mut medium_priority = 0;
        let mut low_priority = 0;
        let mut total_suggested_quantity = 0;
        let mut total_estimated_value = Decimal::ZERO;
        let mut per_pharmacy: HashMap<Uuid, PharmacyImpact> = HashMap::new();

        for entry in &report.entries {
            match entry.priority {
                ShortagePriority::High => high_priority += 1,
                ShortagePriority::Medium => medium_priority += 1,
                ShortagePriority::Low => low_priority += 1,
            }
            total_suggested_quantity += entry.total_suggested_quantity;
            total_estimated_value += entry.total_estimated_value;

            for pharmacy in &entry.per_pharmacy {
                let impact =
                    per_pharmacy
                        .entry(pharmacy.pharmacy_id)
                        .or_insert_with(|| PharmacyImpact {
                            pharmacy_id: pharmacy.pharmacy_id,
                            pharmacy_name: pharmacy.pharmacy_name.clone(),
                            products_short: 0,
                            total_suggested_quantity: 0,
                        });
                impact.products_short += 1;
                impact.total_suggested_quantity += pharmacy.suggested_quantity;
            }
        }

        let mut top_pharmacies: Vec<PharmacyImpact> = per_pharmacy.into_values().collect();
        top_pharmacies.sort_by(|a, b| {
            b.products_short
                .cmp(&a.products_short)
                .then_with(|| b.total_suggested_quantity.cmp(&a.total_suggested_quantity))
                .then_with(|| a.pharmacy_name.cmp(&b.pharmacy_name))
        });
        top_pharmacies.truncate(5);

        Ok(ShortageStatistics {
            threshold: report.threshold,
            total_products: report.entries.len(),
            high_priority,
            medium_priority,
            low_priority,
            total_suggested_quantity,
            total_estimated_value,
            top_pharmacies,
        })
    }

    /// Products held above the high-stock threshold, biggest piles first
    pub async fn overstock_report(&self, threshold: Option<i64>) -> AppResult<OverstockReport> {
        let threshold = threshold.unwrap_or(DEFAULT_OVERSTOCK_THRESHOLD).max(0);

        let levels = InventoryService::new(self.db.clone()).levels_snapshot().await?;
        let entries = build_overstock(levels, threshold);

        Ok(OverstockReport { threshold, entries })
    }
}

fn build_overstock(levels: Vec<InventoryLevel>, threshold: i64) -> Vec<OverstockEntry> {
    let mut groups: HashMap<String, Vec<InventoryLevel>> = HashMap::new();
    for level in levels {
        if level.on_hand > threshold {
            groups.entry(level.code.clone()).or_default().push(level);
        }
    }

    let mut entries: Vec<OverstockEntry> = groups
        .into_iter()
        .map(|(code, group)| {
            let (description, lab) = group
                .first()
                .map(|r| (r.description.clone(), r.lab.clone()))
                .unwrap_or_default();
            let reference_price = group
                .first()
                .and_then(|r| r.net_price.or(r.list_price))
                .unwrap_or(Decimal::ZERO);

            let mut per_pharmacy: Vec<OverstockLevel> = group
                .iter()
                .map(|r| OverstockLevel {
                    pharmacy_id: r.pharmacy_id,
                    pharmacy_name: r.pharmacy_name.clone(),
                    on_hand: r.on_hand,
                })
                .collect();
            per_pharmacy.sort_by(|a, b| {
                b.on_hand
                    .cmp(&a.on_hand)
                    .then_with(|| a.pharmacy_name.cmp(&b.pharmacy_name))
            });

            let total_on_hand: i64 = per_pharmacy.iter().map(|p| p.on_hand).sum();

            OverstockEntry {
                code,
                description,
                lab,
                total_on_hand,
                estimated_value: Decimal::from(total_on_hand) * reference_price,
                per_pharmacy,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_on_hand
            .cmp(&a.total_on_hand)
            .then_with(|| a.code.cmp(&b.code))
    });

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn level(code: &str, pharmacy: u128, on_hand: i64, net_price: &str) -> InventoryLevel {
        InventoryLevel {
            code: code.to_string(),
            description: format!("product {code}"),
            lab: None,
            on_hand,
            net_price: Some(Decimal::from_str(net_price).unwrap()),
            list_price: None,
            pharmacy_id: Uuid::from_u128(pharmacy),
            pharmacy_name: format!("pharmacy-{pharmacy}"),
        }
    }

    #[test]
    fn overstock_only_counts_rows_above_threshold() {
        let levels = vec![
            level("A1", 1, 80, "10"),
            level("A1", 2, 30, "10"),
            level("B2", 1, 51, "10"),
        ];
        let entries = build_overstock(levels, 50);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "A1");
        assert_eq!(entries[0].total_on_hand, 80);
        assert_eq!(entries[0].per_pharmacy.len(), 1);
        assert_eq!(entries[1].code, "B2");
    }

    #[test]
    fn overstock_sorts_by_total_stock_desc() {
        let levels = vec![
            level("A1", 1, 60, "10"),
            level("B2", 1, 70, "10"),
            level("B2", 2, 70, "10"),
        ];
        let entries = build_overstock(levels, 50);
        assert_eq!(entries[0].code, "B2");
        assert_eq!(entries[0].total_on_hand, 140);
        assert_eq!(entries[0].estimated_value, Decimal::from(1400));
    }
}
