//! The list request descriptor.

use crate::sort::{self, SortDescriptor};
use std::collections::BTreeMap;

/// An immutable request for one page of the list.
///
/// `filter_params` only ever contains non-empty values: an omitted key means
/// "no constraint", never "filter by empty string".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    limit: u32,
    offset: u64,
    sort_token: String,
    filter_params: BTreeMap<String, String>,
}

impl ListQuery {
    /// Creates a query. Empty filter values are dropped.
    pub fn new(
        limit: u32,
        offset: u64,
        sort: &SortDescriptor,
        filter_params: BTreeMap<String, String>,
    ) -> Self {
        Self {
            limit,
            offset,
            sort_token: sort::encode(sort),
            filter_params: filter_params
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect(),
        }
    }

    /// Page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Offset of the first requested record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Encoded sort token.
    pub fn sort_token(&self) -> &str {
        &self.sort_token
    }

    /// Sort descriptor decoded from the token.
    pub fn sort(&self) -> SortDescriptor {
        sort::decode_or_default(&self.sort_token)
    }

    /// Filter parameters in effect.
    pub fn filter_params(&self) -> &BTreeMap<String, String> {
        &self.filter_params
    }

    /// Query-string pairs for the HTTP layer.
    ///
    /// Emits `limit`, `offset` and `sort` (the token), then `sort_by` and
    /// `order` for endpoints that read the split form, then every filter.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let sort = self.sort();
        let mut pairs = vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
            ("sort".to_string(), self.sort_token.clone()),
            ("sort_by".to_string(), sort.field().to_string()),
            ("order".to_string(), sort.direction().as_str().to_string()),
        ];
        pairs.extend(
            self.filter_params
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}
