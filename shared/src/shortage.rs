//! Stock shortage analysis
//!
//! Pure computation over an inventory snapshot: groups low-stock rows per
//! product across pharmacies, derives purchase suggestions against a
//! minimum-stock target, classifies urgency, and cross-references the
//! cheapest known supplier quote.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single pharmacy's stock level for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub code: String,
    pub description: String,
    pub lab: Option<String>,
    pub on_hand: i64,
    pub net_price: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub pharmacy_id: Uuid,
    pub pharmacy_name: String,
}

/// The cheapest quote known for a product, from the supplier price table
///
/// The cross-reference compares raw quoted prices; the discount cascade is
/// not applied on this path. That asymmetry with the comparison engine is
/// inherited from the system this replaces and kept on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestSupplierPrice {
    pub supplier_name: String,
    pub price: Decimal,
}

/// Urgency tier for a shortage, by the share of affected pharmacies that are
/// completely out of stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShortagePriority {
    High,
    Medium,
    Low,
}

impl ShortagePriority {
    /// Numeric rank for sorting; higher is more urgent
    pub fn rank(&self) -> u8 {
        match self {
            ShortagePriority::High => 3,
            ShortagePriority::Medium => 2,
            ShortagePriority::Low => 1,
        }
    }

    fn from_out_of_stock_fraction(fraction: Decimal) -> Self {
        if fraction >= Decimal::new(7, 1) {
            ShortagePriority::High
        } else if fraction >= Decimal::new(3, 1) {
            ShortagePriority::Medium
        } else {
            ShortagePriority::Low
        }
    }
}

/// Purchase suggestion for one pharmacy within a shortage entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyShortage {
    pub pharmacy_id: Uuid,
    pub pharmacy_name: String,
    pub on_hand: i64,
    pub suggested_quantity: i64,
    pub estimated_value: Decimal,
}

/// One product's aggregated shortage across the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortageEntry {
    pub code: String,
    pub description: String,
    pub lab: Option<String>,
    pub total_on_hand: i64,
    pub pharmacies_out_of_stock: i64,
    pub total_pharmacies_affected: i64,
    pub total_suggested_quantity: i64,
    pub total_estimated_value: Decimal,
    pub priority: ShortagePriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_unit_price: Option<Decimal>,
    pub per_pharmacy: Vec<PharmacyShortage>,
}

/// Minimum stock each pharmacy should hold, derived from the report
/// threshold with a fixed floor of 15 units
pub fn min_stock_target(threshold: i64) -> i64 {
    (threshold * 3).max(15)
}

/// Analyze an inventory snapshot for shortages.
///
/// Rows at or below `threshold` (or fully out of stock) are grouped per
/// product code. Each affected pharmacy gets a suggestion topping it up to
/// the minimum stock target, valued at the product's reference price (the
/// group's first-seen net price, falling back to its list price).
pub fn analyze_shortages(
    rows: Vec<InventoryLevel>,
    threshold: i64,
    best_offers: &HashMap<String, BestSupplierPrice>,
) -> Vec<ShortageEntry> {
    let mut groups: HashMap<String, Vec<InventoryLevel>> = HashMap::new();
    for row in rows {
        if row.on_hand == 0 || row.on_hand <= threshold {
            groups.entry(row.code.clone()).or_default().push(row);
        }
    }

    let min_stock = min_stock_target(threshold);
    let mut entries: Vec<ShortageEntry> = groups
        .into_iter()
        .map(|(code, group)| build_entry(code, group, min_stock, best_offers))
        .collect();

    // Most urgent first; within a tier, the biggest purchase first
    entries.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| b.total_suggested_quantity.cmp(&a.total_suggested_quantity))
            .then_with(|| a.code.cmp(&b.code))
    });

    entries
}

fn build_entry(
    code: String,
    group: Vec<InventoryLevel>,
    min_stock: i64,
    best_offers: &HashMap<String, BestSupplierPrice>,
) -> ShortageEntry {
    let (description, lab) = group
        .first()
        .map(|r| (r.description.clone(), r.lab.clone()))
        .unwrap_or_default();

    let reference_price = group
        .first()
        .and_then(|r| r.net_price.or(r.list_price))
        .unwrap_or(Decimal::ZERO);

    let mut per_pharmacy: Vec<PharmacyShortage> = Vec::with_capacity(group.len());
    let mut total_on_hand = 0;
    let mut pharmacies_out_of_stock = 0;

    for row in &group {
        total_on_hand += row.on_hand;
        if row.on_hand == 0 {
            pharmacies_out_of_stock += 1;
        }
        let suggested_quantity = (min_stock - row.on_hand).max(0);
        per_pharmacy.push(PharmacyShortage {
            pharmacy_id: row.pharmacy_id,
            pharmacy_name: row.pharmacy_name.clone(),
            on_hand: row.on_hand,
            suggested_quantity,
            estimated_value: Decimal::from(suggested_quantity) * reference_price,
        });
    }

    per_pharmacy.sort_by(|a, b| {
        b.suggested_quantity
            .cmp(&a.suggested_quantity)
            .then_with(|| a.pharmacy_name.cmp(&b.pharmacy_name))
    });

    let total_suggested_quantity: i64 = per_pharmacy.iter().map(|p| p.suggested_quantity).sum();
    let total_estimated_value: Decimal = per_pharmacy.iter().map(|p| p.estimated_value).sum();

    let total_pharmacies_affected = per_pharmacy.len() as i64;
    // Guard: a group can never be empty post-grouping, but a zero divisor
    // must not panic regardless
    let priority = if total_pharmacies_affected == 0 {
        ShortagePriority::Low
    } else {
        let fraction =
            Decimal::from(pharmacies_out_of_stock) / Decimal::from(total_pharmacies_affected);
        ShortagePriority::from_out_of_stock_fraction(fraction)
    };

    let best = best_offers.get(&code);

    ShortageEntry {
        code,
        description,
        lab,
        total_on_hand,
        pharmacies_out_of_stock,
        total_pharmacies_affected,
        total_suggested_quantity,
        total_estimated_value,
        priority,
        suggested_supplier: best.map(|b| b.supplier_name.clone()),
        suggested_unit_price: best.map(|b| b.price),
        per_pharmacy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn level(code: &str, pharmacy: u128, on_hand: i64, net_price: &str) -> InventoryLevel {
        InventoryLevel {
            code: code.to_string(),
            description: format!("product {code}"),
            lab: Some("LabGen".to_string()),
            on_hand,
            net_price: Some(dec(net_price)),
            list_price: None,
            pharmacy_id: Uuid::from_u128(pharmacy),
            pharmacy_name: format!("pharmacy-{pharmacy}"),
        }
    }

    #[test]
    fn min_stock_floors_at_fifteen() {
        assert_eq!(min_stock_target(0), 15);
        assert_eq!(min_stock_target(5), 15);
        assert_eq!(min_stock_target(6), 18);
        assert_eq!(min_stock_target(50), 150);
    }

    #[test]
    fn rows_above_threshold_are_ignored() {
        let rows = vec![level("A1", 1, 6, "10"), level("A1", 2, 3, "10")];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_pharmacies_affected, 1);
        assert_eq!(entries[0].per_pharmacy[0].on_hand, 3);
    }

    #[test]
    fn suggestion_tops_up_to_min_stock() {
        let rows = vec![level("A1", 1, 0, "20"), level("A1", 2, 3, "20")];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        let entry = &entries[0];
        assert_eq!(entry.per_pharmacy[0].suggested_quantity, 15);
        assert_eq!(entry.per_pharmacy[0].estimated_value, dec("300"));
        assert_eq!(entry.per_pharmacy[1].suggested_quantity, 12);
        assert_eq!(entry.per_pharmacy[1].estimated_value, dec("240"));
        assert_eq!(entry.total_suggested_quantity, 27);
        assert_eq!(entry.total_estimated_value, dec("540"));
        assert_eq!(entry.pharmacies_out_of_stock, 1);
        assert_eq!(entry.priority, ShortagePriority::Medium);
    }

    #[test]
    fn priority_tiers_follow_out_of_stock_share() {
        // 3 of 4 pharmacies empty: 0.75 -> High
        let rows = vec![
            level("A1", 1, 0, "5"),
            level("A1", 2, 0, "5"),
            level("A1", 3, 0, "5"),
            level("A1", 4, 2, "5"),
        ];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries[0].priority, ShortagePriority::High);

        // 0 of 2 empty -> Low
        let rows = vec![level("B2", 1, 2, "5"), level("B2", 2, 4, "5")];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries[0].priority, ShortagePriority::Low);
    }

    #[test]
    fn cross_reference_attaches_cheapest_supplier() {
        let rows = vec![level("A1", 1, 0, "20")];
        let mut best = HashMap::new();
        best.insert(
            "A1".to_string(),
            BestSupplierPrice {
                supplier_name: "Droguería Norte".to_string(),
                price: dec("17.50"),
            },
        );
        let entries = analyze_shortages(rows, 5, &best);
        assert_eq!(
            entries[0].suggested_supplier.as_deref(),
            Some("Droguería Norte")
        );
        assert_eq!(entries[0].suggested_unit_price, Some(dec("17.50")));

        let rows = vec![level("ZZ", 1, 0, "20")];
        let entries = analyze_shortages(rows, 5, &best);
        assert!(entries[0].suggested_supplier.is_none());
    }

    #[test]
    fn urgent_entries_sort_first() {
        let rows = vec![
            // all empty -> High
            level("A1", 1, 0, "5"),
            level("A1", 2, 0, "5"),
            // stocked low -> Low
            level("B2", 1, 4, "5"),
            level("B2", 2, 4, "5"),
        ];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries[0].code, "A1");
        assert_eq!(entries[1].code, "B2");
    }
}
