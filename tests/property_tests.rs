//! Property-based tests for the derived product figures.
//!
//! Prices are generated as whole cents so every input is an exact decimal.

use chrono::Utc;
use inventory_api::entities::{item, product, ItemStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn positive_price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn product_with(wholesale: Decimal, retail: Decimal) -> product::Model {
    product::Model {
        id: Uuid::new_v4(),
        name: None,
        description: None,
        category: None,
        sku: "PROP-1".into(),
        wholesale: Some(wholesale),
        retail: Some(retail),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn items(sold: usize, unsold: usize) -> Vec<item::Model> {
    let product_id = Uuid::new_v4();
    std::iter::repeat(ItemStatus::Sold)
        .take(sold)
        .chain(std::iter::repeat(ItemStatus::Unsold).take(unsold))
        .map(|status| item::Model {
            id: Uuid::new_v4(),
            product_id,
            size: "M".into(),
            color: "red".into(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .collect()
}

// Property: margin sign follows the spread between the two prices
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn margin_sign_matches_price_spread(
        wholesale in price_strategy(),
        retail in positive_price_strategy(),
    ) {
        let margin = product_with(wholesale, retail).margin().unwrap();
        prop_assert_eq!(margin.is_sign_positive() && !margin.is_zero(), wholesale < retail);
        prop_assert_eq!(margin.is_zero(), wholesale == retail);
    }

    #[test]
    fn free_stock_is_full_margin(retail in positive_price_strategy()) {
        let margin = product_with(Decimal::ZERO, retail).margin().unwrap();
        prop_assert_eq!(margin, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn margin_never_exceeds_one_hundred(
        wholesale in price_strategy(),
        retail in positive_price_strategy(),
    ) {
        let margin = product_with(wholesale, retail).margin().unwrap();
        prop_assert!(margin <= Decimal::ONE_HUNDRED);
    }

    #[test]
    fn zero_retail_never_yields_a_margin(wholesale in price_strategy()) {
        prop_assert!(product_with(wholesale, Decimal::ZERO).margin().is_err());
    }
}

// Property: sell-through is a fraction of the items sold
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn sell_through_stays_within_unit_interval(sold in 0usize..50, unsold in 0usize..50) {
        prop_assume!(sold + unsold > 0);
        let ratio = product::sell_through(&items(sold, unsold)).unwrap();
        prop_assert!(ratio >= Decimal::ZERO);
        prop_assert!(ratio <= Decimal::ONE);
    }

    #[test]
    fn equal_halves_are_exactly_one_half(n in 1usize..50) {
        let ratio = product::sell_through(&items(n, n)).unwrap();
        prop_assert_eq!(ratio, Decimal::new(5, 1));
    }

    #[test]
    fn all_or_nothing_sold_is_exact(n in 1usize..50) {
        prop_assert_eq!(product::sell_through(&items(n, 0)).unwrap(), Decimal::ONE);
        prop_assert_eq!(product::sell_through(&items(0, n)).unwrap(), Decimal::ZERO);
    }
}
