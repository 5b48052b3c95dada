//! List pagination query parameters.

use serde::{Deserialize, Serialize};

pub const PAGE_LIMIT_DEFAULT: usize = 10;
pub const PAGE_LIMIT_MAX: usize = 100;

/// Query parameters for paginated listings.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

impl Pagination {
    /// Effective page size, clamped to `1..=PAGE_LIMIT_MAX`.
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(PAGE_LIMIT_DEFAULT)
            .clamp(1, PAGE_LIMIT_MAX)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: None,
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, skip: usize, limit: usize) -> Self {
        let has_more = skip + items.len() < total;
        Self {
            items,
            total,
            skip,
            limit,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clamped() {
        let p = Pagination {
            skip: 0,
            limit: Some(1000),
        };
        assert_eq!(p.limit(), PAGE_LIMIT_MAX);
        let p = Pagination {
            skip: 0,
            limit: Some(0),
        };
        assert_eq!(p.limit(), 1);
        assert_eq!(Pagination::default().limit(), PAGE_LIMIT_DEFAULT);
    }

    #[test]
    fn test_has_more() {
        let page = Page::new(vec![1, 2, 3], 10, 0, 3);
        assert!(page.has_more);
        let page = Page::new(vec![1, 2, 3], 3, 0, 10);
        assert!(!page.has_more);
    }
}
