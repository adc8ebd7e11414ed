//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination query parameters (reusable across all list endpoints)
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number, 1-indexed
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page, capped at the server maximum
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Zero-indexed page for the database paginator
    pub fn page_index(&self) -> u64 {
        self.page.saturating_sub(1)
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response envelope: count, next, previous, results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page from query results.
    ///
    /// `path` is the collection path used to render next/previous links,
    /// e.g. `/contracts`. `query` is the raw query string of the request;
    /// its filters are carried into the links so that following `next`
    /// pages through the same result set.
    pub fn new(
        results: Vec<T>,
        count: u64,
        params: &PaginationParams,
        path: &str,
        query: Option<&str>,
    ) -> Self {
        let per_page = params.limit();
        let total_pages = count.div_ceil(per_page.max(1));

        let filters: String = query
            .unwrap_or("")
            .split('&')
            .filter(|pair| {
                !pair.is_empty() && !pair.starts_with("page=") && !pair.starts_with("per_page=")
            })
            .map(|pair| format!("{}&", pair))
            .collect();

        let link = |page: u64| format!("{}?{}page={}&per_page={}", path, filters, page, per_page);

        let next = (params.page < total_pages).then(|| link(params.page + 1));
        let previous = (params.page > 1 && params.page <= total_pages + 1)
            .then(|| link(params.page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Map the result items, preserving pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u64, per_page: u64) -> PaginationParams {
        PaginationParams { page, per_page }
    }

    #[test]
    fn first_page_has_no_previous_link() {
        let page = Page::new(vec![1, 2], 5, &params(1, 2), "/clients", None);
        assert_eq!(page.count, 5);
        assert_eq!(page.previous, None);
        assert_eq!(page.next.as_deref(), Some("/clients?page=2&per_page=2"));
    }

    #[test]
    fn last_page_has_no_next_link() {
        let page = Page::new(vec![5], 5, &params(3, 2), "/clients", None);
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("/clients?page=2&per_page=2"));
    }

    #[test]
    fn links_carry_the_active_filters() {
        let query = "is_signed=true&amount_due__gt=0&page=2&per_page=2";
        let page = Page::new(vec![3, 4], 6, &params(2, 2), "/contracts", Some(query));
        assert_eq!(
            page.next.as_deref(),
            Some("/contracts?is_signed=true&amount_due__gt=0&page=3&per_page=2")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/contracts?is_signed=true&amount_due__gt=0&page=1&per_page=2")
        );
    }

    #[test]
    fn per_page_is_capped() {
        let p = params(1, 100_000);
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
    }
}
