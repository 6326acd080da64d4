//! # Domain Types
//!
//! Entity types read from and written to the rental store.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Film       │   │     Actor       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  customer_id    │   │  film_id        │   │  actor_id       │       │
//! │  │  email (unique) │   │  title          │   │  name           │       │
//! │  │  active         │   │  category       │   └─────────────────┘       │
//! │  │  address_id     │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  Customer: written by the resolver and the pass-through operations.    │
//! │  Film / Actor: read-only.                                              │
//! │  Rental: see the `rental` module (tagged state).                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are the store's integer keys.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{validate_email, validate_person_name};

// =============================================================================
// Customer
// =============================================================================

/// A customer of the store.
///
/// `email` is business-unique: the resolver never creates a second customer
/// for an email that already exists. The schema does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub active: bool,
    pub address_id: i64,
}

impl Customer {
    /// "First Last", as shown in listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data needed to create a customer, already checked for completeness.
///
/// Built with [`NewCustomer::from_parts`]; the address is chosen by the
/// store layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewCustomer {
    /// Assembles a new customer from optional request fields.
    ///
    /// ## Rules
    /// - First and last name must be non-empty after trimming, otherwise
    ///   [`CoreError::IncompleteCustomerInfo`] lists what is missing
    /// - Names that are present must fit the column width
    ///
    /// ## Example
    /// ```rust
    /// use reel_core::NewCustomer;
    ///
    /// let err = NewCustomer::from_parts("new@example.com", Some(""), Some("Doe")).unwrap_err();
    /// assert!(err.needs_customer_info());
    ///
    /// let ok = NewCustomer::from_parts("new@example.com", Some(" Jane "), Some("Doe")).unwrap();
    /// assert_eq!(ok.first_name, "Jane");
    /// ```
    pub fn from_parts(
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> CoreResult<Self> {
        let first_name = first_name.map(str::trim).unwrap_or_default();
        let last_name = last_name.map(str::trim).unwrap_or_default();

        let mut missing = Vec::new();
        if first_name.is_empty() {
            missing.push("first_name");
        }
        if last_name.is_empty() {
            missing.push("last_name");
        }
        if !missing.is_empty() {
            return Err(CoreError::IncompleteCustomerInfo {
                email: email.to_string(),
                missing,
            });
        }

        validate_person_name("first_name", first_name)?;
        validate_person_name("last_name", last_name)?;

        Ok(NewCustomer {
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}

/// Partial update of a customer (pass-through from the API).
///
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl CustomerUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.active.is_none()
    }

    /// Checks the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(first_name) = &self.first_name {
            validate_person_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_person_name("last_name", last_name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Applies this update to a customer, returning the new row values.
    pub fn apply_to(&self, customer: &Customer) -> Customer {
        Customer {
            customer_id: customer.customer_id,
            first_name: self
                .first_name
                .as_deref()
                .map(str::trim)
                .map_or_else(|| customer.first_name.clone(), str::to_string),
            last_name: self
                .last_name
                .as_deref()
                .map(str::trim)
                .map_or_else(|| customer.last_name.clone(), str::to_string),
            email: self
                .email
                .as_deref()
                .map(str::trim)
                .map(str::to_string)
                .or_else(|| customer.email.clone()),
            active: self.active.unwrap_or(customer.active),
            address_id: customer.address_id,
        }
    }
}

// =============================================================================
// Catalog (read-only)
// =============================================================================

/// A film with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Film {
    pub film_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<String>,
    pub length: Option<i64>,
    pub category: Option<String>,
}

/// A film ranked by how often it has been rented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RankedFilm {
    pub film_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<String>,
    pub length: Option<i64>,
    pub category: Option<String>,
    pub rental_count: i64,
}

/// An actor, named "First Last".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Actor {
    pub actor_id: i64,
    pub name: String,
}

/// An actor with the number of rentals across all of their films.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActorStats {
    pub actor_id: i64,
    pub name: String,
    pub total_rentals: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            customer_id: 7,
            first_name: "Mary".to_string(),
            last_name: "Smith".to_string(),
            email: Some("mary.smith@example.com".to_string()),
            active: true,
            address_id: 5,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(customer().full_name(), "Mary Smith");
    }

    #[test]
    fn test_new_customer_reports_every_missing_field() {
        let err = NewCustomer::from_parts("x@example.com", None, Some("   ")).unwrap_err();
        match err {
            CoreError::IncompleteCustomerInfo { email, missing } => {
                assert_eq!(email, "x@example.com");
                assert_eq!(missing, vec!["first_name", "last_name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_new_customer_rejects_overlong_name() {
        let long = "A".repeat(100);
        let err = NewCustomer::from_parts("x@example.com", Some(&long), Some("Doe")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::TooLong { .. })));
    }

    #[test]
    fn test_customer_update_apply() {
        let update = CustomerUpdate {
            last_name: Some(" Jones ".to_string()),
            active: Some(false),
            ..Default::default()
        };
        let updated = update.apply_to(&customer());

        assert_eq!(updated.first_name, "Mary");
        assert_eq!(updated.last_name, "Jones");
        assert!(!updated.active);
        assert_eq!(updated.email.as_deref(), Some("mary.smith@example.com"));
        assert_eq!(updated.address_id, 5);
    }

    #[test]
    fn test_customer_update_validate() {
        assert!(CustomerUpdate::default().is_empty());
        assert!(CustomerUpdate::default().validate().is_ok());

        let bad_email = CustomerUpdate {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());

        let blank_name = CustomerUpdate {
            first_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());
    }
}
