//! Filter state forwarded to the list API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-text ticker filter key (substring match done by the backend).
pub const FILTER_TICKET: &str = "ticket";

/// Categorical rating filter key.
pub const FILTER_RATING: &str = "rating";

/// Mapping from filter key to value.
///
/// An absent key and an empty value both mean "no constraint". Filtering is
/// always delegated to the backend; this type only carries the parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    fields: BTreeMap<String, String>,
}

impl FilterState {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the updated filter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Filter on a ticker substring.
    #[must_use]
    pub fn ticket(value: impl Into<String>) -> Self {
        Self::new().with(FILTER_TICKET, value)
    }

    /// Filter on a rating.
    #[must_use]
    pub fn rating(value: impl Into<String>) -> Self {
        Self::new().with(FILTER_RATING, value)
    }

    /// Sets `key` to `value`. An empty value is kept so that a merge can
    /// clear a previously set constraint.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the value for `key`, if any (possibly empty).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Shallow merge: only keys present in `other` change.
    pub fn merge(&mut self, other: &FilterState) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Returns a merged copy without modifying `self`.
    #[must_use]
    pub fn merged(&self, other: &FilterState) -> FilterState {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Returns the constraints that are actually in effect (non-empty values).
    pub fn active_params(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns true if no constraint is in effect.
    pub fn is_unconstrained(&self) -> bool {
        self.fields.values().all(String::is_empty)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = FilterState::new();
        for (key, value) in iter {
            filter.set(key, value);
        }
        filter
    }
}
