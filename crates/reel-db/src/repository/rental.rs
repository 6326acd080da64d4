//! # Rental Repository
//!
//! The rental state machine: renting a film and returning a rental.
//!
//! ## Rent Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rent(film_id, customer_id)                                            │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ 1. UPDATE inventory SET film_id = film_id WHERE film_id = ?       │
//! │   │     takes the write lock first; a second rent of this film waits   │
//! │   │                                                                     │
//! │   ├─ 2. open rental for (customer, film)?                              │
//! │   │     yes ──► ROLLBACK, AlreadyRented { title }                      │
//! │   │                                                                     │
//! │   ├─ 3. pick a copy: not rented out first, then any, lowest id         │
//! │   │     none ──► ROLLBACK, NoInventory                                 │
//! │   │                                                                     │
//! │   ├─ 4. INSERT rental (now, inventory, customer, NULL)                 │
//! │   │     fails ──► InsertFailed (transaction dropped = rolled back)     │
//! │   │                                                                     │
//! │  COMMIT   fails ──► InsertFailed                                        │
//! │   │                                                                     │
//! │   ▼                                                                     │
//! │  Success { title }                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures while taking the lock or checking eligibility are
//! returned as [`DbError`]. A failure to write the rental is an outcome.
//!
//! [`RentalRepository::return_rental`] is a plain update of `return_date`. It
//! does not look at the current state; callers that care use
//! [`RentalRepository::get`] and [`Rental::mark_returned`] first, then
//! [`RentalRepository::return_open_rental`], which only touches an open rental.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use reel_core::{Rental, RentalOutcome, RentalState, RentalSummary};

use crate::error::{DbError, DbResult};
use crate::gateway::{execute, fetch_optional_as, QueryGateway, Statement};

// =============================================================================
// Statements
// =============================================================================

/// No-op write on the film's copies. Makes the transaction a writer before
/// anything is read.
const LOCK_FILM_INVENTORY: &str = "UPDATE inventory SET film_id = film_id WHERE film_id = ?";

const FIND_OPEN_RENTAL: &str = "\
    SELECT r.rental_id, f.title \
    FROM rental r \
    JOIN inventory i ON r.inventory_id = i.inventory_id \
    JOIN film f ON i.film_id = f.film_id \
    WHERE r.customer_id = ? AND i.film_id = ? AND r.return_date IS NULL \
    ORDER BY r.rental_id \
    LIMIT 1";

const PICK_INVENTORY: &str = "\
    SELECT i.inventory_id, f.title \
    FROM inventory i \
    JOIN film f ON i.film_id = f.film_id \
    WHERE i.film_id = ? \
    ORDER BY EXISTS ( \
        SELECT 1 FROM rental r \
        WHERE r.inventory_id = i.inventory_id AND r.return_date IS NULL \
    ), i.inventory_id \
    LIMIT 1";

const INSERT_RENTAL: &str = "\
    INSERT INTO rental (rental_date, inventory_id, customer_id, return_date) \
    VALUES (?, ?, ?, NULL)";

const RENTAL_COLUMNS: &str = "rental_id, inventory_id, customer_id, rental_date, return_date";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct RentalRow {
    rental_id: i64,
    inventory_id: i64,
    customer_id: i64,
    rental_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Rental {
            rental_id: row.rental_id,
            inventory_id: row.inventory_id,
            customer_id: row.customer_id,
            state: RentalState::from_columns(row.rental_date, row.return_date),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RentalSummaryRow {
    rental_id: i64,
    inventory_id: i64,
    film_id: i64,
    title: String,
    rental_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
}

impl From<RentalSummaryRow> for RentalSummary {
    fn from(row: RentalSummaryRow) -> Self {
        RentalSummary {
            rental_id: row.rental_id,
            inventory_id: row.inventory_id,
            film_id: row.film_id,
            title: row.title,
            state: RentalState::from_columns(row.rental_date, row.return_date),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for rentals.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    gateway: QueryGateway,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(gateway: QueryGateway) -> Self {
        RentalRepository { gateway }
    }

    /// Rents a copy of `film_id` to `customer_id`.
    ///
    /// Returns an outcome for every business branch. Concurrent rents of the
    /// same film run one after the other, so a customer can never end up
    /// with two open rentals of one film.
    pub async fn rent(&self, film_id: i64, customer_id: i64) -> DbResult<RentalOutcome> {
        debug!(film_id, customer_id, "Renting film");

        let mut tx = self.gateway.begin().await?;

        execute(&mut *tx, &Statement::new(LOCK_FILM_INVENTORY).bind(film_id)).await?;

        let held: Option<(i64, String)> = fetch_optional_as(
            &mut *tx,
            &Statement::new(FIND_OPEN_RENTAL).bind(customer_id).bind(film_id),
        )
        .await?;
        if let Some((rental_id, title)) = held {
            tx.rollback().await?;
            debug!(film_id, customer_id, rental_id, "Film already rented by customer");
            return Ok(RentalOutcome::AlreadyRented { rental_id, title });
        }

        let copy: Option<(i64, String)> =
            fetch_optional_as(&mut *tx, &Statement::new(PICK_INVENTORY).bind(film_id)).await?;
        let Some((inventory_id, title)) = copy else {
            tx.rollback().await?;
            debug!(film_id, "Film has no inventory");
            return Ok(RentalOutcome::NoInventory { film_id });
        };

        let insert = Statement::new(INSERT_RENTAL)
            .bind(Utc::now())
            .bind(inventory_id)
            .bind(customer_id);
        if let Err(err) = execute(&mut *tx, &insert).await {
            warn!(film_id, inventory_id, customer_id, error = %err, "Rental insert failed");
            return Ok(RentalOutcome::InsertFailed {
                film_id,
                reason: err.to_string(),
            });
        }

        if let Err(err) = tx.commit().await {
            let err = DbError::from(err);
            warn!(film_id, inventory_id, customer_id, error = %err, "Rental commit failed");
            return Ok(RentalOutcome::InsertFailed {
                film_id,
                reason: err.to_string(),
            });
        }

        info!(film_id, inventory_id, customer_id, "Film rented");
        Ok(RentalOutcome::Success {
            film_id,
            inventory_id,
            customer_id,
            title,
        })
    }

    /// Sets the return timestamp of a rental to now.
    ///
    /// Unconditional: an unknown id or an already-returned rental is not an
    /// error here.
    pub async fn return_rental(&self, rental_id: i64) -> DbResult<()> {
        let updated = self
            .gateway
            .execute(
                &Statement::new("UPDATE rental SET return_date = ? WHERE rental_id = ?")
                    .bind(Utc::now())
                    .bind(rental_id),
            )
            .await?;

        debug!(rental_id, updated, "Rental returned");
        Ok(())
    }

    /// Sets the return timestamp only if the rental is still open.
    ///
    /// Returns `false` when nothing changed: the rental is unknown or was
    /// already returned. Of two concurrent calls for one rental, one wins.
    pub async fn return_open_rental(&self, rental_id: i64) -> DbResult<bool> {
        let updated = self
            .gateway
            .execute(
                &Statement::new(
                    "UPDATE rental SET return_date = ? \
                     WHERE rental_id = ? AND return_date IS NULL",
                )
                .bind(Utc::now())
                .bind(rental_id),
            )
            .await?;

        debug!(rental_id, updated, "Open rental returned");
        Ok(updated == 1)
    }

    /// Gets a rental by ID.
    pub async fn get(&self, rental_id: i64) -> DbResult<Option<Rental>> {
        let row: Option<RentalRow> = self
            .gateway
            .fetch_optional_as(
                &Statement::new(format!(
                    "SELECT {RENTAL_COLUMNS} FROM rental WHERE rental_id = ?"
                ))
                .bind(rental_id),
            )
            .await?;

        Ok(row.map(Rental::from))
    }

    /// Rentals of a customer with the film title, newest first.
    pub async fn list_for_customer(
        &self,
        customer_id: i64,
        open_only: bool,
    ) -> DbResult<Vec<RentalSummary>> {
        let statement = Statement::new(
            "SELECT r.rental_id, r.inventory_id, i.film_id, f.title, r.rental_date, r.return_date \
             FROM rental r \
             JOIN inventory i ON r.inventory_id = i.inventory_id \
             JOIN film f ON i.film_id = f.film_id \
             WHERE r.customer_id = ? AND (? = 0 OR r.return_date IS NULL) \
             ORDER BY r.rental_date DESC, r.rental_id DESC",
        )
        .bind(customer_id)
        .bind(open_only);

        let rows: Vec<RentalSummaryRow> = self.gateway.fetch_all_as(&statement).await?;
        Ok(rows.into_iter().map(RentalSummary::from).collect())
    }

    /// Number of open rentals across every copy of a film.
    pub async fn count_open_for_film(&self, film_id: i64) -> DbResult<i64> {
        self.gateway
            .fetch_count(
                &Statement::new(
                    "SELECT COUNT(*) FROM rental r \
                     JOIN inventory i ON r.inventory_id = i.inventory_id \
                     WHERE i.film_id = ? AND r.return_date IS NULL",
                )
                .bind(film_id),
            )
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
