//! Offset pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size for admin listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on requested page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page/limit query parameters with sane clamping.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageParams {
    /// Page number clamped to at least 1.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Page size clamped to 1..=MAX_PAGE_SIZE.
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the clamped page/limit.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageMeta {
    /// Builds metadata from the request parameters and a total row count.
    pub fn new(params: &PageParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            page: params.page(),
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_computation() {
        let params = PageParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_clamping() {
        let params = PageParams {
            page: 0,
            limit: 1000,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_meta_page_count_rounds_up() {
        let params = PageParams { page: 1, limit: 20 };
        let meta = PageMeta::new(&params, 41);
        assert_eq!(meta.pages, 3);

        let meta = PageMeta::new(&params, 40);
        assert_eq!(meta.pages, 2);

        let meta = PageMeta::new(&params, 0);
        assert_eq!(meta.pages, 0);
    }
}
