//! Fixed-size page windows for list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// Number of entries on every list page
pub const PAGE_SIZE: i64 = 10;

/// `?page=N` query parameter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
}

/// A validated page: which slice of a result set of `total` rows to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub total: i64,
    pub num_pages: i64,
}

impl PageRequest {
    /// Resolve the requested page number against the size of the result set.
    ///
    /// The first page always exists, even for an empty result set. Any other
    /// page must fall within `1..=num_pages`.
    pub fn resolve(page: Option<i64>, total: i64) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let num_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);

        if page < 1 {
            return Err(AppError::NotFound("That page number is less than 1".to_string()));
        }
        if page > num_pages {
            return Err(AppError::NotFound("That page contains no results".to_string()));
        }

        Ok(Self { page, total, num_pages })
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * PAGE_SIZE
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries on this page
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
    /// Number of pages
    pub num_pages: i64,
    /// True when the result set spans more than one page
    pub is_paginated: bool,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self {
            items,
            total: request.total,
            page: request.page,
            per_page: PAGE_SIZE,
            num_pages: request.num_pages,
            is_paginated: request.num_pages > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_entries_span_two_pages() {
        let first = PageRequest::resolve(None, 13).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.num_pages, 2);
        assert_eq!(first.offset(), 0);

        let second = PageRequest::resolve(Some(2), 13).unwrap();
        assert_eq!(second.offset(), 10);
        // only the remaining three rows are left for page 2
        assert_eq!(second.total - second.offset(), 3);
    }

    #[test]
    fn test_out_of_range_pages_are_not_found() {
        assert!(matches!(PageRequest::resolve(Some(0), 13), Err(AppError::NotFound(_))));
        assert!(matches!(PageRequest::resolve(Some(-4), 13), Err(AppError::NotFound(_))));
        assert!(matches!(PageRequest::resolve(Some(3), 13), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_empty_result_has_a_first_page() {
        let page = PageRequest::resolve(Some(1), 0).unwrap();
        assert_eq!(page.num_pages, 1);
        assert!(PageRequest::resolve(Some(2), 0).is_err());
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let page = PageRequest::resolve(Some(2), 20).unwrap();
        assert_eq!(page.num_pages, 2);
        assert!(PageRequest::resolve(Some(3), 20).is_err());
    }
}
