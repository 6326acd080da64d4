//! # Paging and Search Terms
//!
//! Pure inputs and outputs of the customer search.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ?page=2&limit=10&search=42                                             │
//! │       │                                                                 │
//! │       ├── PageRequest::from_raw("2", "10")  → page 2, size 10, offset 10│
//! │       └── SearchTerm::parse("42")           → text "42", id Some(42)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reel-db builds listing + count statements (all values bound)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page { rows, total, page, page_size, total_pages }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paging input never fails: anything missing, unparsable or out of range
//! falls back to a default or is clamped.

use serde::Serialize;

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Escape character used in generated `LIKE ... ESCAPE` clauses.
pub const LIKE_ESCAPE: char = '\\';

// =============================================================================
// Page Request
// =============================================================================

/// A clamped page position: `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Creates a page request, clamping out-of-range values.
    ///
    /// ## Example
    /// ```rust
    /// use reel_core::PageRequest;
    ///
    /// let req = PageRequest::new(0, 500);
    /// assert_eq!(req.page(), 1);
    /// assert_eq!(req.page_size(), 100);
    /// ```
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };

        PageRequest { page, page_size }
    }

    /// Creates a page request from raw query-string values.
    ///
    /// Missing or unparsable values use the defaults (page 1, size 20).
    pub fn from_raw(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let page_size = page_size
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);

        PageRequest::new(page, page_size)
    }

    /// 1-based page number.
    #[inline]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Rows per page.
    #[inline]
    pub const fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows to return (same as the page size).
    #[inline]
    pub const fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` rows: `ceil(total / page_size)`.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.page_size - 1) / self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, DEFAULT_PAGE_SIZE)
    }
}

// =============================================================================
// Search Term
// =============================================================================

/// A non-empty, trimmed customer search term.
///
/// When the text is an integer it may also match a customer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    customer_id: Option<i64>,
}

impl SearchTerm {
    /// Parses raw search text. Empty or whitespace-only text yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        Some(SearchTerm {
            text: text.to_string(),
            customer_id: text.parse::<i64>().ok(),
        })
    }

    /// The trimmed search text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The id to match when the text is an integer.
    pub fn customer_id(&self) -> Option<i64> {
        self.customer_id
    }

    /// `%term%` pattern with `LIKE` wildcards in the text escaped.
    ///
    /// Only ASCII letters are lower-cased, the same folding SQLite's `LOWER`
    /// applies. Use with `LOWER(column) LIKE ? ESCAPE '\'`.
    ///
    /// ## Example
    /// ```rust
    /// use reel_core::SearchTerm;
    ///
    /// let term = SearchTerm::parse("Smi_th").unwrap();
    /// assert_eq!(term.like_pattern(), "%smi\\_th%");
    /// ```
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.text.len() + 2);
        pattern.push('%');
        for c in self.text.to_ascii_lowercase().chars() {
            if c == '%' || c == '_' || c == LIKE_ESCAPE {
                pattern.push(LIKE_ESCAPE);
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of results plus the numbers needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Builds a page from its rows and the total matching row count.
    pub fn new(rows: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Page {
            rows,
            total,
            page: request.page(),
            page_size: request.page_size(),
            total_pages: request.total_pages(total),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::new(-3, 10).page(), 1);
        assert_eq!(PageRequest::new(1, 0).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(1, -5).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(1, 1000).page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_request_from_raw() {
        let req = PageRequest::from_raw(Some("3"), Some("10"));
        assert_eq!((req.page(), req.page_size(), req.offset()), (3, 10, 20));

        let req = PageRequest::from_raw(Some("abc"), None);
        assert_eq!((req.page(), req.page_size()), (1, DEFAULT_PAGE_SIZE));

        let req = PageRequest::from_raw(Some("1; DROP TABLE customer"), Some("2.5"));
        assert_eq!((req.page(), req.page_size()), (1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_offset_does_not_overflow() {
        let req = PageRequest::new(i64::MAX, 100);
        assert_eq!(req.offset(), i64::MAX);
    }

    #[test]
    fn test_total_pages() {
        let req = PageRequest::new(1, 10);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
        assert_eq!(req.total_pages(599), 60);
    }

    #[test]
    fn test_search_term_parse() {
        assert!(SearchTerm::parse("").is_none());
        assert!(SearchTerm::parse("   ").is_none());

        let numeric = SearchTerm::parse(" 42 ").unwrap();
        assert_eq!(numeric.text(), "42");
        assert_eq!(numeric.customer_id(), Some(42));

        let name = SearchTerm::parse("Mary").unwrap();
        assert_eq!(name.customer_id(), None);
        assert_eq!(name.like_pattern(), "%mary%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let term = SearchTerm::parse("100%").unwrap();
        assert_eq!(term.like_pattern(), "%100\\%%");

        let term = SearchTerm::parse("a\\b").unwrap();
        assert_eq!(term.like_pattern(), "%a\\\\b%");
    }

    #[test]
    fn test_like_pattern_folds_ascii_only() {
        let term = SearchTerm::parse("ÉMILE Zola").unwrap();
        assert_eq!(term.like_pattern(), "%Émile zola%");
    }

    #[test]
    fn test_page_new() {
        let req = PageRequest::new(2, 10);
        let page = Page::new(vec![1, 2, 3], 23, &req);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 3);
    }
}
