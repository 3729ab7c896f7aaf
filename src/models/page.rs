//! Paging types for list endpoints.

use serde::{Deserialize, Serialize};

/// A request for one page of results. Pages are one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// One-based page number.
    pub page: u32,
    /// Maximum number of rows in the page.
    pub page_size: u32,
}

impl PageRequest {
    /// Creates a request for `page` with at most `page_size` rows.
    #[inline]
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Number of rows that precede this page.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

/// One page of rows plus the total number of rows matching the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Total matching rows across all pages.
    pub total_count: usize,
}

/// Wire shape of a paginated list response:
/// `{ "data": [...], "meta": { "page", "limit", "total", "totalPages" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Paging metadata.
    pub meta: PaginationMeta,
}

/// Paging metadata reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Page that was served.
    pub page: u32,
    /// Page size that was applied.
    pub limit: u32,
    /// Total matching rows.
    pub total: usize,
    /// Number of pages at this page size.
    pub total_pages: u32,
}

impl<T> From<PaginatedResponse<T>> for Page<T> {
    #[inline]
    fn from(response: PaginatedResponse<T>) -> Self {
        Self {
            items: response.data,
            total_count: response.meta.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(1, 100).offset(), 0);
        assert_eq!(PageRequest::new(3, 100).offset(), 200);
        assert_eq!(PageRequest::new(0, 100).offset(), 0);
    }

    #[test]
    fn response_converts_to_page() {
        let json = r#"{"data":[1,2,3],"meta":{"page":2,"limit":3,"total":8,"totalPages":3}}"#;
        let response: PaginatedResponse<u8> = serde_json::from_str(json).unwrap();
        let page = Page::from(response);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total_count, 8);
    }

    #[test]
    fn missing_total_is_rejected() {
        let json = r#"{"data":[],"meta":{"page":1,"limit":100,"totalPages":0}}"#;
        assert!(serde_json::from_str::<PaginatedResponse<u8>>(json).is_err());
    }

    #[test]
    fn non_array_data_is_rejected() {
        let json = r#"{"data":{"id":1},"meta":{"page":1,"limit":100,"total":1,"totalPages":1}}"#;
        assert!(serde_json::from_str::<PaginatedResponse<u8>>(json).is_err());
    }
}
