//! # Reel API
//!
//! HTTP surface of the rental store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Reel API Server                               │
//! │                                                                         │
//! │  Browser ───► axum (3001) ───► handlers ───► reel-db ───► SQLite       │
//! │                   │                                                     │
//! │                   └── TraceLayer ─ TimeoutLayer ─ CorsLayer             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Routes
//! ```text
//! GET    /health
//! GET    /api/films                   GET /api/films/top-rented
//! GET    /api/films/search?q=         GET /api/films/{id}
//! GET    /api/actors/top-actors       GET /api/actors/{id}
//! GET    /api/customers?page=&limit=&search=
//! POST   /api/customers/resolve
//! GET    /api/customers/{id}          PUT /api/customers/{id}
//! DELETE /api/customers/{id}          GET /api/customers/{id}/rentals?open=
//! POST   /api/rentals                 PUT /api/rentals/{id}/return
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{catalog, customers, health, rentals};
pub use crate::state::AppState;

/// Builds the application router over `state`.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Catalog
        .route("/api/films", get(catalog::list_films))
        .route("/api/films/top-rented", get(catalog::top_rented_films))
        .route("/api/films/search", get(catalog::search_films))
        .route("/api/films/{id}", get(catalog::film_details))
        .route("/api/actors/top-actors", get(catalog::top_actors))
        .route("/api/actors/{id}", get(catalog::actor_details))
        // Customers
        .route("/api/customers", get(customers::list_customers))
        .route("/api/customers/resolve", post(customers::resolve_customer))
        .route(
            "/api/customers/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/api/customers/{id}/rentals", get(customers::customer_rentals))
        // Rentals
        .route("/api/rentals", post(rentals::rent_film))
        .route("/api/rentals/{id}/return", put(rentals::return_rental))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
