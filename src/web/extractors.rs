//! Request parameter extraction
//!
//! Listing parameters are clamped, not rejected: zero, negative, or absent
//! `page`/`limit` fall back to the defaults (page 1, limit 10), and `limit`
//! is capped at 100.

use serde::Deserialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Listing query parameters as they arrive on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl ListParams {
    /// Effective 1-based page number
    pub fn page(&self) -> u64 {
        match self.page {
            Some(p) if p > 0 => p as u64,
            _ => DEFAULT_PAGE,
        }
    }

    /// Effective page size
    pub fn limit(&self) -> u64 {
        match self.limit {
            Some(l) if l > 0 => std::cmp::min(l as u64, MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }

    /// Trimmed search term, `None` when empty
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
