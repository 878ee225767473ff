//! Configuration for the list engine.

use std::time::Duration;
use stockview_protocol::{SortDescriptor, DEFAULT_PAGE_LIMIT};

/// Public API root used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1/public";

/// Environment variable holding the API root.
pub const ENV_API_URL: &str = "STOCKVIEW_API_URL";
/// Environment variable holding the default page size.
pub const ENV_PAGE_SIZE: &str = "STOCKVIEW_PAGE_SIZE";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "STOCKVIEW_TIMEOUT_SECS";

/// Configuration for a list engine and its HTTP client.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// API root (e.g., "https://api.example.com/api/v1/public").
    pub base_url: String,
    /// Path of the list endpoint under `base_url`.
    pub list_path: String,
    /// Page size when neither the caller nor the held state supplies one.
    pub default_limit: u32,
    /// Largest page size accepted from callers.
    pub max_limit: u32,
    /// Sort used when none is stored.
    pub default_sort: SortDescriptor,
    /// Request timeout.
    pub timeout: Duration,
}

impl EngineConfig {
    /// Creates a configuration for the given API root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            list_path: "/stocks".into(),
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: 500,
            default_sort: SortDescriptor::default(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Missing or unparseable values keep their defaults. The page size is
    /// clamped to `1..=max_limit`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.is_empty()) {
            config.base_url = url;
        }
        if let Some(limit) = lookup(ENV_PAGE_SIZE)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|limit| *limit > 0)
        {
            config.default_limit = config.clamp_limit(limit);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Sets the list endpoint path.
    pub fn with_list_path(mut self, path: impl Into<String>) -> Self {
        self.list_path = path.into();
        self
    }

    /// Sets the default page size, clamped to `1..=max_limit`.
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = self.clamp_limit(limit);
        self
    }

    /// Sets the largest accepted page size (at least 1). A default page size
    /// above it is lowered to match.
    pub fn with_max_limit(mut self, limit: u32) -> Self {
        self.max_limit = limit.max(1);
        self.default_limit = self.clamp_limit(self.default_limit);
        self
    }

    /// Sets the default sort.
    pub fn with_default_sort(mut self, sort: SortDescriptor) -> Self {
        self.default_sort = sort;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn clamp_limit(&self, limit: u32) -> u32 {
        limit.clamp(1, self.max_limit.max(1))
    }

    /// Full URL of the list endpoint.
    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.list_path)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
