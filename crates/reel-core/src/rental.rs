//! # Rental State and Outcomes
//!
//! ## Rental Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rental Lifecycle                                  │
//! │                                                                         │
//! │  (customer, film) has no open rental                                   │
//! │     │                                                                   │
//! │     │  rent() → RentalOutcome::Success                                 │
//! │     ▼                                                                   │
//! │  Open { rented_at }                 ← return_date IS NULL              │
//! │     │                                                                   │
//! │     │  mark_returned(now)                                              │
//! │     ▼                                                                   │
//! │  Returned { rented_at, returned_at } ← terminal, never reopened        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store keeps a nullable `return_date` column. In memory the state is
//! an enum so the only legal transition is the one [`RentalState::mark_returned`]
//! allows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Rental State
// =============================================================================

/// Where a rental is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum RentalState {
    /// Copy is with the customer.
    Open {
        #[ts(type = "string")]
        rented_at: DateTime<Utc>,
    },
    /// Copy came back.
    Returned {
        #[ts(type = "string")]
        rented_at: DateTime<Utc>,
        #[ts(type = "string")]
        returned_at: DateTime<Utc>,
    },
}

impl RentalState {
    /// Builds the state from the persisted columns.
    pub fn from_columns(rented_at: DateTime<Utc>, returned_at: Option<DateTime<Utc>>) -> Self {
        match returned_at {
            None => RentalState::Open { rented_at },
            Some(returned_at) => RentalState::Returned {
                rented_at,
                returned_at,
            },
        }
    }

    /// True while the copy has not been returned.
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, RentalState::Open { .. })
    }

    /// When the rental started.
    pub fn rented_at(&self) -> DateTime<Utc> {
        match *self {
            RentalState::Open { rented_at } | RentalState::Returned { rented_at, .. } => rented_at,
        }
    }

    /// When the copy came back, if it has.
    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match *self {
            RentalState::Open { .. } => None,
            RentalState::Returned { returned_at, .. } => Some(returned_at),
        }
    }

    /// `Open → Returned`. A returned rental stays returned.
    pub fn mark_returned(self, rental_id: i64, at: DateTime<Utc>) -> CoreResult<Self> {
        match self {
            RentalState::Open { rented_at } => Ok(RentalState::Returned {
                rented_at,
                returned_at: at,
            }),
            RentalState::Returned { .. } => Err(CoreError::RentalAlreadyReturned { rental_id }),
        }
    }
}

// =============================================================================
// Rental
// =============================================================================

/// A rental of one inventory item by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rental {
    pub rental_id: i64,
    pub inventory_id: i64,
    pub customer_id: i64,
    pub state: RentalState,
}

impl Rental {
    /// Returns this rental in the returned state, or
    /// [`CoreError::RentalAlreadyReturned`].
    pub fn mark_returned(&self, at: DateTime<Utc>) -> CoreResult<Rental> {
        Ok(Rental {
            state: self.state.mark_returned(self.rental_id, at)?,
            ..self.clone()
        })
    }
}

/// A rental with the rented film, as listed for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalSummary {
    pub rental_id: i64,
    pub inventory_id: i64,
    pub film_id: i64,
    pub title: String,
    pub state: RentalState,
}

// =============================================================================
// Rental Outcome
// =============================================================================

/// Result of a rent request.
///
/// Every variant is a normal business branch. Storage faults are reported
/// separately as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalOutcome {
    /// A rental row was created.
    Success {
        film_id: i64,
        inventory_id: i64,
        customer_id: i64,
        title: String,
    },
    /// The customer already holds an unreturned copy of this film.
    AlreadyRented { rental_id: i64, title: String },
    /// The film has no inventory items at all.
    NoInventory { film_id: i64 },
    /// Eligibility passed but the insert did not go through.
    InsertFailed { film_id: i64, reason: String },
}

/// Wire name of a [`RentalOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OutcomeKind {
    Success,
    AlreadyRented,
    NoInventory,
    InsertFailed,
}

impl RentalOutcome {
    /// The outcome's kind, for responses and logs.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            RentalOutcome::Success { .. } => OutcomeKind::Success,
            RentalOutcome::AlreadyRented { .. } => OutcomeKind::AlreadyRented,
            RentalOutcome::NoInventory { .. } => OutcomeKind::NoInventory,
            RentalOutcome::InsertFailed { .. } => OutcomeKind::InsertFailed,
        }
    }

    /// True only for [`RentalOutcome::Success`].
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, RentalOutcome::Success { .. })
    }

    /// Customer-facing message for this outcome.
    pub fn message(&self) -> String {
        match self {
            RentalOutcome::Success { title, .. } => {
                format!("\"{}\" rented successfully", title)
            }
            RentalOutcome::AlreadyRented { title, .. } => format!(
                "You already have \"{}\" rented. Return it before renting it again.",
                title
            ),
            RentalOutcome::NoInventory { film_id } => {
                format!("No copies of film {} are available for rent", film_id)
            }
            RentalOutcome::InsertFailed { .. } => {
                "The rental could not be recorded. Please try again.".to_string()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn rented_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2005, 5, 24, 22, 53, 30).unwrap()
    }

    #[test]
    fn test_state_from_columns() {
        let open = RentalState::from_columns(rented_at(), None);
        assert!(open.is_open());
        assert_eq!(open.returned_at(), None);

        let back = rented_at() + Duration::days(3);
        let returned = RentalState::from_columns(rented_at(), Some(back));
        assert!(!returned.is_open());
        assert_eq!(returned.rented_at(), rented_at());
        assert_eq!(returned.returned_at(), Some(back));
    }

    #[test]
    fn test_mark_returned_once() {
        let rental = Rental {
            rental_id: 9,
            inventory_id: 3,
            customer_id: 1,
            state: RentalState::Open {
                rented_at: rented_at(),
            },
        };
        let back = rented_at() + Duration::hours(5);

        let returned = rental.mark_returned(back).unwrap();
        assert_eq!(returned.state.returned_at(), Some(back));
        assert_eq!(returned.state.rented_at(), rented_at());

        let err = returned.mark_returned(back + Duration::hours(1)).unwrap_err();
        assert!(matches!(err, CoreError::RentalAlreadyReturned { rental_id: 9 }));
    }

    #[test]
    fn test_outcome_kind_and_message() {
        let held = RentalOutcome::AlreadyRented {
            rental_id: 4,
            title: "ACADEMY DINOSAUR".to_string(),
        };
        assert_eq!(held.kind(), OutcomeKind::AlreadyRented);
        assert!(held.message().contains("ACADEMY DINOSAUR"));
        assert!(!held.is_success());

        let ok = RentalOutcome::Success {
            film_id: 1,
            inventory_id: 2,
            customer_id: 3,
            title: "ACE GOLDFINGER".to_string(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.message(), "\"ACE GOLDFINGER\" rented successfully");
    }

    #[test]
    fn test_state_serializes_tagged() {
        let state = RentalState::Open {
            rented_at: rented_at(),
        };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["status"], "open");
        assert!(json["rented_at"].is_string());

        let kind = serde_json::to_value(OutcomeKind::NoInventory).unwrap();
        assert_eq!(kind, "no_inventory");
    }
}
