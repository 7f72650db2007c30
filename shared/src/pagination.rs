//! Pagination request and response types

use serde::{Deserialize, Serialize};

/// Default page size when the client does not ask for one
pub const DEFAULT_PER_PAGE: u32 = 20;
/// Upper bound on page size
pub const MAX_PER_PAGE: u32 = 100;

/// Page selection from the query string (`?page=2&per_page=50`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`
    pub fn limit(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Row offset for SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Rows of the current page
    pub data: Vec<T>,
    /// Total row count across all pages
    pub total: u64,
    /// Current page
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Number of pages
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(u64::from(limit)) as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Build from a page query and a total fetched with `COUNT(*)`
    pub fn from_query(data: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self::new(data, total.max(0) as u64, query.page(), query.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response() {
        let items = vec!["a", "b", "c"];
        let resp = PaginatedResponse::new(items, 100, 2, 10);

        assert_eq!(resp.total, 100);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp = PaginatedResponse::new(vec![1], 21, 3, 10);
        assert_eq!(resp.total_pages, 3);

        let resp = PaginatedResponse::<i32>::new(vec![], 0, 1, 20);
        assert_eq!(resp.total_pages, 0);
    }

    #[test]
    fn test_page_query_defaults_and_clamps() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), DEFAULT_PER_PAGE);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PER_PAGE);

        let q = PageQuery {
            page: Some(3),
            per_page: Some(25),
        };
        assert_eq!(q.offset(), 50);
    }
}
