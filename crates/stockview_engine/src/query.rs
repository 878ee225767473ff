//! Builds list requests from held view state.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::state::ViewState;
use stockview_protocol::{FilterState, ListQuery, SortDescriptor};

/// Per-request values that take precedence over held state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOverrides {
    /// Page size.
    pub limit: Option<u32>,
    /// Offset of the first record.
    pub offset: Option<u64>,
    /// Sort for this request only.
    pub sort: Option<SortDescriptor>,
    /// Filter fields merged over the held filter for this request only.
    pub filter: Option<FilterState>,
}

impl QueryOverrides {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the sort.
    #[must_use]
    pub fn with_sort(mut self, sort: SortDescriptor) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets filter fields.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Composes [`ListQuery`] values.
///
/// Precedence is overrides, then held state, then configured defaults. The
/// held sort is seeded from the configured default, so it always resolves.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_limit: u32,
    max_limit: u32,
}

impl QueryBuilder {
    /// Creates a builder using the defaults in `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    /// Builds a query for `state` with `overrides` applied.
    pub fn build<T>(
        &self,
        state: &ViewState<T>,
        overrides: &QueryOverrides,
    ) -> EngineResult<ListQuery> {
        // Only caller-supplied limits are range checked; the held limit is
        // whatever the server last reported.
        let limit = match overrides.limit {
            Some(limit) => {
                self.validate_limit(limit)?;
                limit
            }
            None => Some(state.pagination.limit)
                .filter(|limit| *limit > 0)
                .unwrap_or(self.default_limit),
        };

        let offset = overrides.offset.unwrap_or(state.pagination.offset);

        let sort = overrides.sort.as_ref().unwrap_or(&state.sort);

        let filter = match &overrides.filter {
            Some(fields) => state.filter.merged(fields),
            None => state.filter.clone(),
        };

        Ok(ListQuery::new(limit, offset, sort, filter.active_params()))
    }

    fn validate_limit(&self, limit: u32) -> EngineResult<()> {
        if limit == 0 || limit > self.max_limit {
            return Err(EngineError::Validation(format!(
                "limit {} outside 1..={}",
                limit, self.max_limit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockview_protocol::{PaginationInfo, StockRating, FILTER_RATING, FILTER_TICKET};

    fn builder() -> QueryBuilder {
        QueryBuilder::new(&EngineConfig::default())
    }

    #[test]
    fn defaults_on_fresh_state() {
        let state = ViewState::<StockRating>::new(SortDescriptor::default());
        let query = builder().build(&state, &QueryOverrides::none()).unwrap();

        assert_eq!(query.limit(), 50);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort_token(), "time_desc");
        assert!(query.filter_params().is_empty());
    }

    #[test]
    fn stored_state_beats_defaults() {
        let mut state = ViewState::<StockRating>::new(SortDescriptor::default());
        state.pagination = PaginationInfo {
            total: 300,
            limit: 20,
            offset: 40,
            has_next: true,
        };
        state.sort = SortDescriptor::ascending("ticker");
        state.filter = FilterState::rating("Buy");

        let query = builder().build(&state, &QueryOverrides::none()).unwrap();
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 40);
        assert_eq!(query.sort_token(), "ticker_asc");
        assert_eq!(
            query.filter_params().get(FILTER_RATING).map(String::as_str),
            Some("Buy")
        );
    }

    #[test]
    fn overrides_beat_stored_state() {
        let mut state = ViewState::<StockRating>::new(SortDescriptor::default());
        state.pagination.limit = 20;
        state.pagination.offset = 40;
        state.filter = FilterState::rating("Buy").with(FILTER_TICKET, "AA");

        let overrides = QueryOverrides::none()
            .with_limit(10)
            .with_offset(0)
            .with_sort(SortDescriptor::descending("change_percent"))
            .with_filter(FilterState::rating(""));

        let query = builder().build(&state, &overrides).unwrap();
        assert_eq!(query.limit(), 10);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort_token(), "change_percent_desc");
        // Empty override clears the rating for this request only.
        assert!(!query.filter_params().contains_key(FILTER_RATING));
        assert_eq!(
            query.filter_params().get(FILTER_TICKET).map(String::as_str),
            Some("AA")
        );
        assert_eq!(state.filter.get(FILTER_RATING), Some("Buy"));
    }

    #[test]
    fn zero_stored_limit_falls_back() {
        let mut state = ViewState::<StockRating>::new(SortDescriptor::default());
        state.pagination.limit = 0;
        let query = builder().build(&state, &QueryOverrides::none()).unwrap();
        assert_eq!(query.limit(), 50);
    }

    #[test]
    fn limit_out_of_range() {
        let state = ViewState::<StockRating>::new(SortDescriptor::default());
        let builder = QueryBuilder::new(&EngineConfig::default().with_max_limit(100));

        let err = builder
            .build(&state, &QueryOverrides::none().with_limit(0))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = builder
            .build(&state, &QueryOverrides::none().with_limit(101))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        assert!(builder
            .build(&state, &QueryOverrides::none().with_limit(100))
            .is_ok());
    }

    #[test]
    fn server_reported_limit_is_not_range_checked() {
        let mut state = ViewState::<StockRating>::new(SortDescriptor::default());
        state.pagination = PaginationInfo {
            total: 5000,
            limit: 1000,
            offset: 0,
            has_next: true,
        };

        let query = builder()
            .build(&state, &QueryOverrides::none().with_offset(1000))
            .unwrap();
        assert_eq!(query.limit(), 1000);
        assert_eq!(query.offset(), 1000);
    }
}
