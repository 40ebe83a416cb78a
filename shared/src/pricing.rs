//! Supplier price comparison engine
//!
//! Pure computations over an already-fetched snapshot of supplier price
//! lists: the sequential discount cascade and the per-product ranking of
//! offers across suppliers. No I/O happens here; the backend services fetch
//! the snapshot and hand it in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One supplier's offer for one product, joined with the supplier's terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOffer {
    pub code: String,
    pub description: String,
    pub lab: String,
    pub list_price: Decimal,
    /// Pre-discounted price from the list itself; takes precedence over
    /// `list_price` as the cascade's base when present
    pub discounted_list_price: Option<Decimal>,
    pub available: bool,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub commercial_discount_pct: Decimal,
    pub early_pay_discount_pct: Decimal,
    pub credit_days: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SupplierOffer {
    /// The price the discount cascade starts from
    pub fn effective_base_price(&self) -> Decimal {
        self.discounted_list_price.unwrap_or(self.list_price)
    }
}

/// Result of running both discounts over a base price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountBreakdown {
    pub after_commercial: Decimal,
    pub after_early_pay: Decimal,
    pub commercial_savings: Decimal,
    pub early_pay_savings: Decimal,
    pub total_savings: Decimal,
}

/// Apply the supplier's two discounts sequentially.
///
/// The early-payment discount compounds on the commercially discounted
/// price, not on the original: paying early earns a cut of what the invoice
/// would have said, which is the agreed business rule. Absent rates count as
/// zero. Rates outside 0-100 are not rejected; the arithmetic passes through.
pub fn evaluate_cascade(
    base_price: Decimal,
    commercial_pct: Option<Decimal>,
    early_pay_pct: Option<Decimal>,
) -> DiscountBreakdown {
    let hundred = Decimal::from(100);
    let commercial_pct = commercial_pct.unwrap_or(Decimal::ZERO);
    let early_pay_pct = early_pay_pct.unwrap_or(Decimal::ZERO);

    let commercial_savings = base_price * commercial_pct / hundred;
    let after_commercial = base_price - commercial_savings;
    let early_pay_savings = after_commercial * early_pay_pct / hundred;
    let after_early_pay = after_commercial - early_pay_savings;

    DiscountBreakdown {
        after_commercial,
        after_early_pay,
        commercial_savings,
        early_pay_savings,
        total_savings: commercial_savings + early_pay_savings,
    }
}

/// One supplier's offer after the cascade, annotated with its rank data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedOffer {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub list_price: Decimal,
    pub commercial_discount_pct: Decimal,
    pub early_pay_discount_pct: Decimal,
    pub after_commercial: Decimal,
    pub after_early_pay: Decimal,
    pub commercial_savings: Decimal,
    pub early_pay_savings: Decimal,
    pub total_savings: Decimal,
    pub credit_days: i32,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_best: bool,
    /// Absolute gap to the group's best price; absent on the best offer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_gap: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_percent: Option<Decimal>,
}

/// All suppliers' ranked offers for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductComparison {
    pub code: String,
    pub description: String,
    pub lab: String,
    pub best_price: Option<Decimal>,
    pub best_supplier: Option<String>,
    pub savings_at_best: Option<Decimal>,
    pub offers: Vec<RankedOffer>,
}

/// Compare all matching supplier offers, grouped per product.
///
/// Offers are matched case-insensitively against code, description, and lab.
/// An empty query returns no products; matching everything by accident would
/// dump entire price lists on the caller.
///
/// Ranking uses the post-commercial-discount price: the early-payment
/// discount is a conditional benefit, so it never decides which supplier is
/// cheapest. Ties break on supplier id to keep the ranking deterministic
/// regardless of snapshot order.
pub fn compare_offers(query: &str, offers: Vec<SupplierOffer>) -> Vec<ProductComparison> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut groups: HashMap<(String, String), Vec<SupplierOffer>> = HashMap::new();
    for offer in offers {
        if !offer.available {
            continue;
        }
        let matches = offer.code.to_lowercase().contains(&needle)
            || offer.description.to_lowercase().contains(&needle)
            || offer.lab.to_lowercase().contains(&needle);
        if !matches {
            continue;
        }
        let key = (offer.code.clone(), offer.description.to_lowercase());
        groups.entry(key).or_default().push(offer);
    }

    let mut comparisons: Vec<ProductComparison> = groups
        .into_values()
        .map(rank_group)
        .collect();

    // Cheapest products first; groups without a best price (guarded, should
    // not occur) sort last
    comparisons.sort_by(|a, b| match (a.best_price, b.best_price) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.code.cmp(&b.code)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.code.cmp(&b.code),
    });

    comparisons
}

/// Rank one product's offers and annotate gaps to the best price
fn rank_group(offers: Vec<SupplierOffer>) -> ProductComparison {
    let (code, description, lab) = offers
        .first()
        .map(|o| (o.code.clone(), o.description.clone(), o.lab.clone()))
        .unwrap_or_default();

    let mut ranked: Vec<RankedOffer> = offers
        .into_iter()
        .map(|offer| {
            let breakdown = evaluate_cascade(
                offer.effective_base_price(),
                Some(offer.commercial_discount_pct),
                Some(offer.early_pay_discount_pct),
            );
            let list_price = offer.effective_base_price();
            RankedOffer {
                supplier_id: offer.supplier_id,
                supplier_name: offer.supplier_name,
                list_price,
                commercial_discount_pct: offer.commercial_discount_pct,
                early_pay_discount_pct: offer.early_pay_discount_pct,
                after_commercial: breakdown.after_commercial,
                after_early_pay: breakdown.after_early_pay,
                commercial_savings: breakdown.commercial_savings,
                early_pay_savings: breakdown.early_pay_savings,
                total_savings: breakdown.total_savings,
                credit_days: offer.credit_days,
                updated_at: offer.updated_at,
                is_best: false,
                price_gap: None,
                gap_percent: None,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.after_commercial
            .cmp(&b.after_commercial)
            .then_with(|| a.supplier_id.cmp(&b.supplier_id))
    });

    let (best_price, best_supplier, savings_at_best) = match ranked.first_mut() {
        Some(best) => {
            best.is_best = true;
            (
                Some(best.after_commercial),
                Some(best.supplier_name.clone()),
                Some(best.total_savings),
            )
        }
        None => (None, None, None),
    };

    if let Some(best_price) = best_price {
        let hundred = Decimal::from(100);
        for offer in ranked.iter_mut().skip(1) {
            let gap = offer.after_commercial - best_price;
            offer.price_gap = Some(gap);
            offer.gap_percent = Some(if best_price.is_zero() {
                Decimal::ZERO
            } else {
                gap / best_price * hundred
            });
        }
    }

    ProductComparison {
        code,
        description,
        lab,
        best_price,
        best_supplier,
        savings_at_best,
        offers: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn offer(code: &str, supplier: u128, list_price: Decimal, commercial: Decimal) -> SupplierOffer {
        SupplierOffer {
            code: code.to_string(),
            description: format!("product {code}"),
            lab: "LabGen".to_string(),
            list_price,
            discounted_list_price: None,
            available: true,
            supplier_id: Uuid::from_u128(supplier),
            supplier_name: format!("supplier-{supplier}"),
            commercial_discount_pct: commercial,
            early_pay_discount_pct: Decimal::ZERO,
            credit_days: 30,
            updated_at: None,
        }
    }

    #[test]
    fn cascade_compounds_sequentially() {
        let b = evaluate_cascade(dec("100"), Some(dec("10")), Some(dec("5")));
        assert_eq!(b.after_commercial, dec("90"));
        assert_eq!(b.after_early_pay, dec("85.5"));
        assert_eq!(b.total_savings, dec("14.5"));
    }

    #[test]
    fn missing_rates_mean_no_discount() {
        let b = evaluate_cascade(dec("42"), None, None);
        assert_eq!(b.after_commercial, dec("42"));
        assert_eq!(b.after_early_pay, dec("42"));
        assert_eq!(b.total_savings, Decimal::ZERO);
    }

    #[test]
    fn empty_query_yields_nothing() {
        let offers = vec![offer("A1", 1, dec("100"), Decimal::ZERO)];
        assert!(compare_offers("", offers.clone()).is_empty());
        assert!(compare_offers("   ", offers).is_empty());
    }

    #[test]
    fn unavailable_offers_are_excluded() {
        let mut o = offer("A1", 1, dec("100"), Decimal::ZERO);
        o.available = false;
        assert!(compare_offers("A1", vec![o]).is_empty());
    }

    #[test]
    fn tie_breaks_on_supplier_id() {
        let offers = vec![
            offer("A1", 9, dec("100"), Decimal::ZERO),
            offer("A1", 2, dec("100"), Decimal::ZERO),
        ];
        let result = compare_offers("A1", offers);
        assert_eq!(result.len(), 1);
        let best = &result[0].offers[0];
        assert!(best.is_best);
        assert_eq!(best.supplier_id, Uuid::from_u128(2));
    }

    #[test]
    fn zero_best_price_guards_gap_percent() {
        let offers = vec![
            offer("A1", 1, Decimal::ZERO, Decimal::ZERO),
            offer("A1", 2, dec("10"), Decimal::ZERO),
        ];
        let result = compare_offers("A1", offers);
        let second = &result[0].offers[1];
        assert_eq!(second.price_gap, Some(dec("10")));
        assert_eq!(second.gap_percent, Some(Decimal::ZERO));
    }

    #[test]
    fn discounted_list_price_overrides_base() {
        let mut o = offer("A1", 1, dec("100"), Decimal::ZERO);
        o.discounted_list_price = Some(dec("80"));
        let result = compare_offers("A1", vec![o]);
        assert_eq!(result[0].best_price, Some(dec("80")));
    }
}
