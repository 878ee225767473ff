//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;
use stockview_protocol::{FilterState, PaginationInfo, SortDescriptor, SortDirection, StockRating};

/// Strategy for generating sort directions.
pub fn sort_direction_strategy() -> impl Strategy<Value = SortDirection> {
    prop_oneof![
        Just(SortDirection::Ascending),
        Just(SortDirection::Descending)
    ]
}

/// Strategy for generating sort field names.
///
/// Includes underscores and fields that already end in a direction suffix.
pub fn sort_field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z][a-z0-9]{0,11}").expect("Invalid regex"),
        prop::string::string_regex("[a-z]{1,6}(_[a-z]{1,6}){1,3}").expect("Invalid regex"),
        prop::string::string_regex("[a-z]{1,6}_(asc|desc)").expect("Invalid regex"),
    ]
}

/// Strategy for generating valid sort descriptors.
pub fn sort_descriptor_strategy() -> impl Strategy<Value = SortDescriptor> {
    (sort_field_strategy(), sort_direction_strategy())
        .prop_map(|(field, direction)| SortDescriptor::new(field, direction))
}

/// Strategy for generating filters over the recognised keys.
///
/// Values may be empty to exercise the "no constraint" path.
pub fn filter_strategy() -> impl Strategy<Value = FilterState> {
    (
        prop::option::of(prop::string::string_regex("[A-Z]{0,4}").expect("Invalid regex")),
        prop::option::of(prop_oneof![
            Just(String::new()),
            Just("Buy".to_string()),
            Just("Hold".to_string()),
            Just("Sell".to_string()),
        ]),
    )
        .prop_map(|(ticket, rating)| {
            let mut filter = FilterState::new();
            if let Some(ticket) = ticket {
                filter.set("ticket", ticket);
            }
            if let Some(rating) = rating {
                filter.set("rating", rating);
            }
            filter
        })
}

/// Strategy for generating stock records with unique-looking tickers.
pub fn stock_strategy() -> impl Strategy<Value = StockRating> {
    (
        prop::string::string_regex("[A-Z]{1,5}").expect("Invalid regex"),
        prop_oneof![Just("Buy"), Just("Hold"), Just("Sell"), Just("Neutral")],
    )
        .prop_map(|(ticker, rating)| {
            let mut record = StockRating::new(ticker);
            record.rating_to = rating.to_string();
            record
        })
}

/// Strategy for generating self-consistent pagination.
pub fn pagination_strategy() -> impl Strategy<Value = PaginationInfo> {
    (0u64..10_000, 1u32..200, 0u64..10_000).prop_map(|(total, limit, offset)| PaginationInfo {
        total,
        limit,
        offset,
        has_next: offset + u64::from(limit) < total,
    })
}

/// Configuration for property-based tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to generate.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockview_protocol::sort;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn sort_descriptor_field_is_non_empty(d in sort_descriptor_strategy()) {
            prop_assert!(!d.field().is_empty());
        }

        #[test]
        fn sort_descriptor_round_trips(d in sort_descriptor_strategy()) {
            prop_assert_eq!(sort::decode(&sort::encode(&d)).unwrap(), d);
        }

        #[test]
        fn filter_params_never_hold_empty_values(filter in filter_strategy()) {
            prop_assert!(filter.active_params().values().all(|v| !v.is_empty()));
        }

        #[test]
        fn pagination_has_next_is_consistent(p in pagination_strategy()) {
            prop_assert_eq!(p.has_next, p.next_offset() < p.total);
        }

        #[test]
        fn stock_ticker_is_uppercase(s in stock_strategy()) {
            prop_assert!(s.ticker.chars().all(|c| c.is_ascii_uppercase()));
        }
    }
}
