//! # reel-core: Pure Domain Logic for Reel Rentals
//!
//! This crate holds the rules of the rental workflow as plain data and pure
//! functions. Everything that touches the store lives in `reel-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Reel Rentals Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    reel-api (axum)                              │   │
//! │  │    /api/rentals, /api/customers, /api/films, /api/actors       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ reel-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  rental   │  │  paging   │  │ validation│  │   │
//! │  │   │ Customer  │  │RentalState│  │PageRequest│  │   email   │  │   │
//! │  │   │   Film    │  │ Outcome   │  │SearchTerm │  │   names   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    reel-db (Database Layer)                     │   │
//! │  │        query gateway, resolver, rental state machine            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity types (Customer, Film, Actor, ...)
//! - [`rental`] - Tagged rental state and rent outcomes
//! - [`paging`] - Page requests, search terms, result pages
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use reel_core::paging::{PageRequest, SearchTerm};
//!
//! // Missing or nonsense paging input falls back to defaults
//! let page = PageRequest::from_raw(Some("2"), Some("abc"));
//! assert_eq!(page.page(), 2);
//! assert_eq!(page.page_size(), 20);
//! assert_eq!(page.offset(), 20);
//!
//! // Numeric search text can also match a customer id
//! let term = SearchTerm::parse(" 42 ").unwrap();
//! assert_eq!(term.customer_id(), Some(42));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod paging;
pub mod rental;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use paging::{Page, PageRequest, SearchTerm};
pub use rental::{OutcomeKind, Rental, RentalOutcome, RentalState, RentalSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when the caller does not provide a usable one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a caller may request.
///
/// Larger requests are clamped rather than rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum email length accepted (matches the `customer.email` column).
pub const MAX_EMAIL_LENGTH: usize = 50;

/// Maximum length of a customer's first or last name.
pub const MAX_NAME_LENGTH: usize = 45;
