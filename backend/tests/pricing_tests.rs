//! Tests for the supplier price comparison engine
//!
//! Covers the sequential discount cascade and the cross-supplier ranking.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::pricing::{compare_offers, evaluate_cascade, SupplierOffer};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn offer(
    supplier: u128,
    code: &str,
    list_price: &str,
    commercial_pct: &str,
    early_pay_pct: &str,
) -> SupplierOffer {
    SupplierOffer {
        code: code.to_string(),
        description: format!("product {code}"),
        lab: "LabGen".to_string(),
        list_price: dec(list_price),
        discounted_list_price: None,
        available: true,
        supplier_id: Uuid::from_u128(supplier),
        supplier_name: format!("supplier-{supplier}"),
        commercial_discount_pct: dec(commercial_pct),
        early_pay_discount_pct: dec(early_pay_pct),
        credit_days: 30,
        updated_at: Some(Utc::now()),
    }
}

// =============================================================================
// Discount cascade
// =============================================================================

mod discount_cascade {
    use super::*;

    #[test]
    fn cascade_compounds_sequentially() {
        // 100 with 10% commercial then 5% early pay: 100 -> 90 -> 85.50
        let breakdown = evaluate_cascade(dec("100"), Some(dec("10")), Some(dec("5")));
        assert_eq!(breakdown.after_commercial, dec("90"));
        assert_eq!(breakdown.after_early_pay, dec("85.50"));
        assert_eq!(breakdown.commercial_savings, dec("10"));
        assert_eq!(breakdown.early_pay_savings, dec("4.50"));
        assert_eq!(breakdown.total_savings, dec("14.50"));
    }

    #[test]
    fn missing_rates_count_as_zero() {
        let breakdown = evaluate_cascade(dec("80"), None, None);
        assert_eq!(breakdown.after_commercial, dec("80"));
        assert_eq!(breakdown.after_early_pay, dec("80"));
        assert_eq!(breakdown.total_savings, dec("0"));
    }

    #[test]
    fn early_pay_alone_applies_to_full_price() {
        let breakdown = evaluate_cascade(dec("200"), None, Some(dec("10")));
        assert_eq!(breakdown.after_commercial, dec("200"));
        assert_eq!(breakdown.after_early_pay, dec("180"));
    }

    #[test]
    fn out_of_range_rates_pass_through() {
        // Rates above 100 are not rejected; the arithmetic just runs
        let breakdown = evaluate_cascade(dec("100"), Some(dec("150")), None);
        assert_eq!(breakdown.after_commercial, dec("-50"));
    }

    #[test]
    fn zero_base_price_stays_zero() {
        let breakdown = evaluate_cascade(dec("0"), Some(dec("10")), Some(dec("5")));
        assert_eq!(breakdown.after_early_pay, dec("0"));
        assert_eq!(breakdown.total_savings, dec("0"));
    }
}

// =============================================================================
// Cross-supplier comparison
// =============================================================================

mod offer_comparison {
    use super::*;

    #[test]
    fn ranks_by_post_commercial_price() {
        // A: 100 at 10% -> 90. B: 95 at 2% -> 93.10. A wins despite B's
        // lower list price once B's weak discount is applied.
        let offers = vec![
            offer(1, "A1", "100", "10", "5"),
            offer(2, "A1", "95", "2", "0"),
        ];
        let products = compare_offers("A1", offers);
        assert_eq!(products.len(), 1);

        let group = &products[0];
        assert_eq!(group.best_price, Some(dec("90.00")));
        assert_eq!(group.best_supplier.as_deref(), Some("supplier-1"));
        assert!(group.offers[0].is_best);
        assert!(!group.offers[1].is_best);
    }

    #[test]
    fn exactly_one_best_offer_per_group() {
        let offers = vec![
            offer(1, "A1", "100", "10", "0"),
            offer(2, "A1", "100", "10", "0"),
            offer(3, "A1", "120", "0", "0"),
        ];
        let products = compare_offers("A1", offers);
        let best_count = products[0].offers.iter().filter(|o| o.is_best).count();
        assert_eq!(best_count, 1);
    }

    #[test]
    fn ties_break_on_supplier_id() {
        // Identical effective prices; the lower supplier id must win no
        // matter the input order
        let offers = vec![
            offer(9, "A1", "100", "10", "0"),
            offer(2, "A1", "100", "10", "0"),
        ];
        let products = compare_offers("A1", offers);
        assert!(products[0].offers[0].is_best);
        assert_eq!(products[0].offers[0].supplier_id, Uuid::from_u128(2));
    }

    #[test]
    fn gap_annotations_measure_distance_to_best() {
        let offers = vec![
            offer(1, "A1", "100", "10", "0"),
            offer(2, "A1", "100", "0", "0"),
        ];
        let products = compare_offers("A1", offers);
        let runner_up = &products[0].offers[1];
        assert_eq!(runner_up.price_gap, Some(dec("10.00")));
        // 10 over a best of 90 is roughly 11.11 percent
        let gap_pct = runner_up.gap_percent.unwrap();
        assert!(gap_pct > dec("11.11") && gap_pct < dec("11.12"));
    }

    #[test]
    fn unavailable_offers_are_excluded() {
        let mut unavailable = offer(1, "A1", "50", "0", "0");
        unavailable.available = false;
        let offers = vec![unavailable, offer(2, "A1", "100", "0", "0")];

        let products = compare_offers("A1", offers);
        assert_eq!(products[0].offers.len(), 1);
        assert_eq!(products[0].best_price, Some(dec("100")));
    }

    #[test]
    fn empty_query_returns_nothing() {
        let offers = vec![offer(1, "A1", "100", "0", "0")];
        assert!(compare_offers("", offers.clone()).is_empty());
        assert!(compare_offers("   ", offers).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_across_fields() {
        let offers = vec![offer(1, "A1", "100", "0", "0")];
        assert_eq!(compare_offers("a1", offers.clone()).len(), 1);
        assert_eq!(compare_offers("PRODUCT", offers.clone()).len(), 1);
        assert_eq!(compare_offers("labgen", offers).len(), 1);
    }

    #[test]
    fn single_offer_group_has_no_gap_annotations() {
        let offers = vec![offer(1, "A1", "100", "10", "5")];
        let products = compare_offers("A1", offers);
        let only = &products[0].offers[0];
        assert!(only.is_best);
        assert!(only.price_gap.is_none());
        assert!(only.gap_percent.is_none());
    }

    #[test]
    fn discounted_list_price_is_the_cascade_base() {
        let mut discounted = offer(1, "A1", "100", "10", "0");
        discounted.discounted_list_price = Some(dec("80"));
        let products = compare_offers("A1", vec![discounted]);
        assert_eq!(products[0].best_price, Some(dec("72.0")));
    }

    #[test]
    fn groups_sort_by_best_price_ascending() {
        let offers = vec![
            offer(1, "B2", "200", "0", "0"),
            offer(1, "A1", "100", "0", "0"),
            offer(1, "C3", "50", "0", "0"),
        ];
        let products = compare_offers("product", offers);
        let codes: Vec<_> = products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["C3", "A1", "B2"]);
    }
}

// =============================================================================
// Property-based tests
// =============================================================================

mod property_tests {
    use super::*;

    /// Prices up to 10,000.00, in cents to stay exact
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (0u64..=1_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
    }

    /// Valid discount rates, 0.00 to 100.00
    fn pct_strategy() -> impl Strategy<Value = Decimal> {
        (0u64..=10_000u64).prop_map(|bp| Decimal::new(bp as i64, 2))
    }

    fn offers_strategy() -> impl Strategy<Value = Vec<SupplierOffer>> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["A1", "B2", "C3"]),
                price_strategy(),
                pct_strategy(),
                pct_strategy(),
            ),
            1..12,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (code, price, commercial, early))| SupplierOffer {
                    code: code.to_string(),
                    description: format!("product {code}"),
                    lab: String::new(),
                    list_price: price,
                    discounted_list_price: None,
                    available: true,
                    supplier_id: Uuid::from_u128(i as u128 + 1),
                    supplier_name: format!("supplier-{i}"),
                    commercial_discount_pct: commercial,
                    early_pay_discount_pct: early,
                    credit_days: 0,
                    updated_at: None,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Each discount step can only lower the price
        #[test]
        fn prop_cascade_is_monotonic(
            base in price_strategy(),
            commercial in pct_strategy(),
            early in pct_strategy(),
        ) {
            let breakdown = evaluate_cascade(base, Some(commercial), Some(early));
            prop_assert!(breakdown.after_commercial <= base);
            prop_assert!(breakdown.after_early_pay <= breakdown.after_commercial);
            prop_assert!(breakdown.after_early_pay >= Decimal::ZERO);
        }

        /// Savings account for every unit of price reduction
        #[test]
        fn prop_savings_are_exact(
            base in price_strategy(),
            commercial in pct_strategy(),
            early in pct_strategy(),
        ) {
            let breakdown = evaluate_cascade(base, Some(commercial), Some(early));
            prop_assert_eq!(breakdown.total_savings, base - breakdown.after_early_pay);
            prop_assert_eq!(
                breakdown.total_savings,
                breakdown.commercial_savings + breakdown.early_pay_savings
            );
        }

        /// Every product group marks exactly one best offer
        #[test]
        fn prop_exactly_one_best_per_group(offers in offers_strategy()) {
            for group in compare_offers("product", offers) {
                let best_count = group.offers.iter().filter(|o| o.is_best).count();
                prop_assert_eq!(best_count, 1);
                prop_assert!(group.offers[0].is_best);
            }
        }

        /// Gap annotations never go negative and the best offer has none
        #[test]
        fn prop_gaps_are_non_negative(offers in offers_strategy()) {
            for group in compare_offers("product", offers) {
                for ranked in &group.offers {
                    if ranked.is_best {
                        prop_assert!(ranked.price_gap.is_none());
                    } else if let Some(gap) = ranked.price_gap {
                        prop_assert!(gap >= Decimal::ZERO);
                    }
                }
            }
        }

        /// Offers within a group are sorted cheapest-first
        #[test]
        fn prop_offers_sorted_within_group(offers in offers_strategy()) {
            for group in compare_offers("product", offers) {
                for pair in group.offers.windows(2) {
                    prop_assert!(pair[0].after_commercial <= pair[1].after_commercial);
                }
            }
        }

        /// Product groups are sorted by best price ascending
        #[test]
        fn prop_groups_sorted_by_best_price(offers in offers_strategy()) {
            let products = compare_offers("product", offers);
            for pair in products.windows(2) {
                if let (Some(a), Some(b)) = (pair[0].best_price, pair[1].best_price) {
                    prop_assert!(a <= b);
                }
            }
        }
    }
}
