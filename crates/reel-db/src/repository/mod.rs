//! # Repository Module
//!
//! Store access for the rental service, one repository per concern.
//!
//! ## Repository Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.rentals().rent(film_id, customer_id)                       │
//! │       ▼                                                                 │
//! │  CustomerRepository   resolve_or_create, search, get/update/delete     │
//! │  RentalRepository     rent, return_rental, get, list_for_customer      │
//! │  CatalogRepository    films and actors (read-only)                     │
//! │       │                                                                 │
//! │       │  Statement + bound params                                      │
//! │       ▼                                                                 │
//! │  QueryGateway ──► SqlitePool                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository holds a cloned [`QueryGateway`](crate::gateway::QueryGateway),
//! so handing one to a task is as cheap as cloning the pool handle.

pub mod catalog;
pub mod customer;
pub mod rental;
