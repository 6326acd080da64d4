//! # reel-db: Database Layer for Reel Rentals
//!
//! Store access for the rental service: the query gateway, the customer
//! resolver, the rental state machine, the customer search builder and the
//! read-only catalog. Async SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Reel Rentals Data Flow                            │
//! │                                                                         │
//! │  reel-api handler (POST /api/rentals)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     reel-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   search     │  │   │
//! │  │   │   (pool.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ Customer      │    │ listing +    │  │   │
//! │  │   │ SqlitePool    │◄───│ Rental        │───►│ count        │  │   │
//! │  │   │ QueryGateway  │    │ Catalog       │    │ statements   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite database (schema owned outside this crate)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`gateway`] - Statements with bound parameters, executor-generic helpers
//! - [`search`] - Customer search/pagination statement builder
//! - [`repository`] - Customer, rental and catalog repositories
//! - [`error`] - Database and workflow error types
//! - `fixtures` - Fixture schema and demo data (tests, `fixtures` feature)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reel_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("sakila.db")).await?;
//!
//! let customer = db
//!     .customers()
//!     .resolve_or_create("mary.smith@sakilacustomer.org", None, None)
//!     .await?;
//! let outcome = db.rentals().rent(1, customer.customer_id).await?;
//! println!("{}", outcome.message());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod pool;
pub mod repository;
pub mod search;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, WorkflowError, WorkflowResult};
pub use gateway::{QueryGateway, SqlParam, Statement};
pub use pool::{Database, DbConfig};
pub use search::CustomerSearchQuery;

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::rental::RentalRepository;
