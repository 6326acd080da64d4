//! Shared application state.

use reel_db::{CatalogRepository, CustomerRepository, Database, RentalRepository};

/// State handed to every handler.
///
/// Holds the one [`Database`] created in `main`. Cloning it clones the pool
/// handle.
#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
}

impl AppState {
    /// Wraps the injected database.
    pub fn new(db: Database) -> Self {
        AppState { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn customers(&self) -> CustomerRepository {
        self.db.customers()
    }

    pub fn rentals(&self) -> RentalRepository {
        self.db.rentals()
    }

    pub fn catalog(&self) -> CatalogRepository {
        self.db.catalog()
    }
}
