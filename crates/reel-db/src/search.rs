//! # Customer Search Builder
//!
//! Turns a page position and an optional search term into two statements:
//! one for the page of rows, one for the total count.
//!
//! ## Statement Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  search = "42", page 2, size 10                                        │
//! │                                                                         │
//! │  listing:                                                               │
//! │    SELECT ... FROM customer                                            │
//! │    WHERE (customer_id = ?                     ← only for integer text  │
//! │       OR LOWER(first_name) LIKE ? ESCAPE '\'                           │
//! │       OR LOWER(last_name) LIKE ? ESCAPE '\'                            │
//! │       OR LOWER(first_name || ' ' || last_name) LIKE ? ESCAPE '\')      │
//! │    ORDER BY last_name, first_name, customer_id                         │
//! │    LIMIT ? OFFSET ?                                                     │
//! │    params: [42, "%42%", "%42%", "%42%", 10, 10]                        │
//! │                                                                         │
//! │  count:                                                                 │
//! │    SELECT COUNT(*) FROM customer WHERE (same predicate)                │
//! │    params: [42, "%42%", "%42%", "%42%"]                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The statement text only ever varies between the filtered and unfiltered
//! shape. Ids, patterns, limits and offsets are all parameters.

use reel_core::{PageRequest, SearchTerm};

use crate::gateway::{SqlParam, Statement};

/// Columns read into [`reel_core::Customer`].
pub(crate) const CUSTOMER_COLUMNS: &str =
    "customer_id, first_name, last_name, email, active, address_id";

const NAME_PREDICATE: &str = "LOWER(first_name) LIKE ? ESCAPE '\\' \
     OR LOWER(last_name) LIKE ? ESCAPE '\\' \
     OR LOWER(first_name || ' ' || last_name) LIKE ? ESCAPE '\\'";

const ORDER_BY: &str = "ORDER BY last_name, first_name, customer_id";

/// The listing and count statements for one customer search.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSearchQuery {
    /// Page of rows, ordered by last name, first name, id.
    pub listing: Statement,
    /// Total rows matching the same predicate.
    pub count: Statement,
}

impl CustomerSearchQuery {
    /// Builds both statements.
    ///
    /// ## Example
    /// ```rust
    /// use reel_core::{PageRequest, SearchTerm};
    /// use reel_db::search::CustomerSearchQuery;
    ///
    /// let term = SearchTerm::parse("smith");
    /// let query = CustomerSearchQuery::build(&PageRequest::new(2, 10), term.as_ref());
    /// assert!(query.listing.sql().contains("LIMIT ? OFFSET ?"));
    /// assert!(!query.count.sql().contains("LIMIT"));
    /// ```
    pub fn build(page: &PageRequest, search: Option<&SearchTerm>) -> Self {
        let (predicate, params) = match search {
            Some(term) => filter(term),
            None => (String::new(), Vec::new()),
        };

        let mut listing = Statement::new(format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer{predicate} {ORDER_BY} LIMIT ? OFFSET ?"
        ));
        let mut count = Statement::new(format!("SELECT COUNT(*) FROM customer{predicate}"));

        for param in params {
            listing = listing.bind(param.clone());
            count = count.bind(param);
        }
        listing = listing.bind(page.limit()).bind(page.offset());

        CustomerSearchQuery { listing, count }
    }
}

/// WHERE clause and its parameters for a search term.
fn filter(term: &SearchTerm) -> (String, Vec<SqlParam>) {
    let pattern = term.like_pattern();
    let mut params = Vec::with_capacity(4);

    let clause = match term.customer_id() {
        Some(id) => {
            params.push(SqlParam::Int(id));
            format!(" WHERE (customer_id = ? OR {NAME_PREDICATE})")
        }
        None => format!(" WHERE ({NAME_PREDICATE})"),
    };

    for _ in 0..3 {
        params.push(SqlParam::Text(pattern.clone()));
    }

    (clause, params)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn has_digit(sql: &str) -> bool {
        sql.chars().any(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_unfiltered_listing() {
        let query = CustomerSearchQuery::build(&PageRequest::new(2, 10), None);

        assert!(!query.listing.sql().contains("WHERE"));
        assert!(query.listing.sql().contains(ORDER_BY));
        assert_eq!(
            query.listing.params(),
            &[SqlParam::Int(10), SqlParam::Int(10)]
        );
        assert_eq!(query.count.sql(), "SELECT COUNT(*) FROM customer");
        assert!(query.count.params().is_empty());
    }

    #[test]
    fn test_numeric_term_binds_id_and_patterns() {
        let term = SearchTerm::parse(" 42 ").unwrap();
        let query = CustomerSearchQuery::build(&PageRequest::new(3, 7), Some(&term));

        assert!(query.listing.sql().contains("customer_id = ?"));
        assert_eq!(
            query.listing.params(),
            &[
                SqlParam::Int(42),
                SqlParam::Text("%42%".to_string()),
                SqlParam::Text("%42%".to_string()),
                SqlParam::Text("%42%".to_string()),
                SqlParam::Int(7),
                SqlParam::Int(14),
            ]
        );
        assert_eq!(query.count.params(), &query.listing.params()[..4]);
    }

    #[test]
    fn test_text_term_has_no_id_clause() {
        let term = SearchTerm::parse("Smith").unwrap();
        let query = CustomerSearchQuery::build(&PageRequest::default(), Some(&term));

        assert!(!query.listing.sql().contains("customer_id = ?"));
        assert_eq!(query.count.params().len(), 3);
        assert_eq!(
            query.count.params()[0],
            SqlParam::Text("%smith%".to_string())
        );
    }

    #[test]
    fn test_no_value_reaches_statement_text() {
        let term = SearchTerm::parse("4242").unwrap();
        let query = CustomerSearchQuery::build(&PageRequest::new(9, 13), Some(&term));
        assert!(!has_digit(query.listing.sql()));
        assert!(!has_digit(query.count.sql()));

        let term = SearchTerm::parse("o'brien; --").unwrap();
        let query = CustomerSearchQuery::build(&PageRequest::new(1, 5), Some(&term));
        assert!(!query.listing.sql().contains("brien"));
        assert!(!has_digit(query.listing.sql()));
    }

    #[test]
    fn test_listing_and_count_share_the_predicate() {
        let term = SearchTerm::parse("ann").unwrap();
        let query = CustomerSearchQuery::build(&PageRequest::default(), Some(&term));

        let listing_where = query.listing.sql().split(" ORDER BY").next().unwrap();
        let listing_where = listing_where.split(" FROM customer").nth(1).unwrap();
        assert!(query.count.sql().ends_with(listing_where));
    }
}
