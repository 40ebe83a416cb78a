//! Tests for the chain-wide shortage analysis
//!
//! Exercises grouping, purchase suggestions, urgency classification, and the
//! supplier cross-reference over synthetic inventory snapshots.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use shared::shortage::{
    analyze_shortages, min_stock_target, BestSupplierPrice, InventoryLevel, ShortagePriority,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
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

// =============================================================================
// Shortage analysis
// =============================================================================

mod shortage_analysis {
    use super::*;

    #[test]
    fn two_branch_shortage_adds_up() {
        // Threshold 5, one branch empty and one at 3 units, net price 20:
        // top-ups of 15 and 12 units worth 300 and 240
        let rows = vec![level("A1", 1, 0, "20"), level("A1", 2, 3, "20")];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.total_on_hand, 3);
        assert_eq!(entry.total_pharmacies_affected, 2);
        assert_eq!(entry.pharmacies_out_of_stock, 1);
        assert_eq!(entry.total_suggested_quantity, 27);
        assert_eq!(entry.total_estimated_value, dec("540"));
        assert_eq!(entry.priority, ShortagePriority::Medium);

        // Out-of-stock branch needs more, so it leads the breakdown
        assert_eq!(entry.per_pharmacy[0].suggested_quantity, 15);
        assert_eq!(entry.per_pharmacy[0].estimated_value, dec("300"));
        assert_eq!(entry.per_pharmacy[1].suggested_quantity, 12);
        assert_eq!(entry.per_pharmacy[1].estimated_value, dec("240"));
    }

    #[test]
    fn min_stock_target_floors_at_fifteen() {
        assert_eq!(min_stock_target(0), 15);
        assert_eq!(min_stock_target(4), 15);
        assert_eq!(min_stock_target(5), 15);
        assert_eq!(min_stock_target(6), 18);
        assert_eq!(min_stock_target(20), 60);
    }

    #[test]
    fn well_stocked_rows_do_not_report() {
        let rows = vec![level("A1", 1, 6, "10"), level("B2", 1, 100, "10")];
        assert!(analyze_shortages(rows, 5, &HashMap::new()).is_empty());
    }

    #[test]
    fn priority_boundaries_are_inclusive() {
        // Exactly 7 of 10 branches empty: fraction 0.7 lands in High
        let mut rows: Vec<InventoryLevel> =
            (1..=7).map(|p| level("A1", p, 0, "5")).collect();
        rows.extend((8..=10).map(|p| level("A1", p, 2, "5")));
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries[0].priority, ShortagePriority::High);

        // Exactly 3 of 10 empty: fraction 0.3 lands in Medium
        let mut rows: Vec<InventoryLevel> =
            (1..=3).map(|p| level("B2", p, 0, "5")).collect();
        rows.extend((4..=10).map(|p| level("B2", p, 2, "5")));
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries[0].priority, ShortagePriority::Medium);

        // Nobody empty: Low
        let rows = vec![level("C3", 1, 2, "5"), level("C3", 2, 4, "5")];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        assert_eq!(entries[0].priority, ShortagePriority::Low);
    }

    #[test]
    fn list_price_backs_up_missing_net_price() {
        let mut row = level("A1", 1, 0, "0");
        row.net_price = None;
        row.list_price = Some(dec("8"));
        let entries = analyze_shortages(vec![row], 5, &HashMap::new());
        assert_eq!(entries[0].total_estimated_value, dec("120"));
    }

    #[test]
    fn no_price_means_zero_value_but_quantities_remain() {
        let mut row = level("A1", 1, 0, "0");
        row.net_price = None;
        row.list_price = None;
        let entries = analyze_shortages(vec![row], 5, &HashMap::new());
        assert_eq!(entries[0].total_suggested_quantity, 15);
        assert_eq!(entries[0].total_estimated_value, Decimal::ZERO);
    }

    #[test]
    fn cheapest_supplier_is_cross_referenced() {
        let mut best = HashMap::new();
        best.insert(
            "A1".to_string(),
            BestSupplierPrice {
                supplier_name: "Droguería Norte".to_string(),
                price: dec("17.50"),
            },
        );

        let entries = analyze_shortages(vec![level("A1", 1, 0, "20")], 5, &best);
        assert_eq!(
            entries[0].suggested_supplier.as_deref(),
            Some("Droguería Norte")
        );
        assert_eq!(entries[0].suggested_unit_price, Some(dec("17.50")));

        // No quote on file leaves the fields absent
        let entries = analyze_shortages(vec![level("ZZ", 1, 0, "20")], 5, &best);
        assert!(entries[0].suggested_supplier.is_none());
        assert!(entries[0].suggested_unit_price.is_none());
    }

    #[test]
    fn entries_sort_urgency_then_volume_then_code() {
        let rows = vec![
            // High urgency, every branch empty
            level("C3", 1, 0, "5"),
            level("C3", 2, 0, "5"),
            // Low urgency, small top-up
            level("A1", 1, 4, "5"),
            // Low urgency, bigger top-up
            level("B2", 1, 1, "5"),
        ];
        let entries = analyze_shortages(rows, 5, &HashMap::new());
        let codes: Vec<_> = entries.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["C3", "B2", "A1"]);
    }

    #[test]
    fn zero_threshold_reports_only_empty_branches() {
        let rows = vec![level("A1", 1, 0, "10"), level("A1", 2, 1, "10")];
        let entries = analyze_shortages(rows, 0, &HashMap::new());
        assert_eq!(entries[0].total_pharmacies_affected, 1);
        assert_eq!(entries[0].per_pharmacy[0].on_hand, 0);
    }
}

// =============================================================================
// Property-based tests
// =============================================================================

mod property_tests {
    use super::*;

    fn rows_strategy() -> impl Strategy<Value = Vec<InventoryLevel>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["A1", "B2", "C3", "D4"]),
                0i64..=40,
                0u64..=50_000u64,
            ),
            1..16,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (code, on_hand, cents))| InventoryLevel {
                    code: code.to_string(),
                    description: format!("product {code}"),
                    lab: None,
                    on_hand,
                    net_price: Some(Decimal::new(cents as i64, 2)),
                    list_price: None,
                    // One pharmacy per row keeps group keys unique
                    pharmacy_id: Uuid::from_u128(i as u128 + 1),
                    pharmacy_name: format!("pharmacy-{i}"),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Suggestions never go negative and never exceed the target
        #[test]
        fn prop_suggestions_top_up_to_target(
            rows in rows_strategy(),
            threshold in 0i64..=20,
        ) {
            let target = min_stock_target(threshold);
            for entry in analyze_shortages(rows, threshold, &HashMap::new()) {
                for pharmacy in &entry.per_pharmacy {
                    prop_assert!(pharmacy.suggested_quantity >= 0);
                    prop_assert!(pharmacy.suggested_quantity <= target);
                    prop_assert_eq!(
                        pharmacy.suggested_quantity,
                        (target - pharmacy.on_hand).max(0)
                    );
                }
            }
        }

        /// Entry totals equal the sum of their per-pharmacy breakdown
        #[test]
        fn prop_totals_match_breakdown(
            rows in rows_strategy(),
            threshold in 0i64..=20,
        ) {
            for entry in analyze_shortages(rows, threshold, &HashMap::new()) {
                let quantity: i64 = entry.per_pharmacy.iter().map(|p| p.suggested_quantity).sum();
                let value: Decimal = entry.per_pharmacy.iter().map(|p| p.estimated_value).sum();
                prop_assert_eq!(entry.total_suggested_quantity, quantity);
                prop_assert_eq!(entry.total_estimated_value, value);
                prop_assert_eq!(
                    entry.total_pharmacies_affected,
                    entry.per_pharmacy.len() as i64
                );
            }
        }

        /// Only rows at or below the threshold make it into a report
        #[test]
        fn prop_reported_rows_respect_threshold(
            rows in rows_strategy(),
            threshold in 0i64..=20,
        ) {
            for entry in analyze_shortages(rows, threshold, &HashMap::new()) {
                for pharmacy in &entry.per_pharmacy {
                    prop_assert!(pharmacy.on_hand == 0 || pharmacy.on_hand <= threshold);
                }
            }
        }

        /// The report lists the most urgent entries first
        #[test]
        fn prop_entries_sorted_by_urgency(
            rows in rows_strategy(),
            threshold in 0i64..=20,
        ) {
            let entries = analyze_shortages(rows, threshold, &HashMap::new());
            for pair in entries.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.priority.rank() >= b.priority.rank());
                if a.priority.rank() == b.priority.rank() {
                    prop_assert!(a.total_suggested_quantity >= b.total_suggested_quantity);
                }
            }
        }

        /// Out-of-stock counts never exceed the affected pharmacy count
        #[test]
        fn prop_out_of_stock_bounded(
            rows in rows_strategy(),
            threshold in 0i64..=20,
        ) {
            for entry in analyze_shortages(rows, threshold, &HashMap::new()) {
                prop_assert!(entry.pharmacies_out_of_stock <= entry.total_pharmacies_affected);
                prop_assert!(entry.total_pharmacies_affected > 0);
            }
        }
    }
}
