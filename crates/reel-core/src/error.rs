//! # Error Types
//!
//! Domain-specific error types for reel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  reel-core errors (this file)                                          │
//! │  ├── CoreError        - Business-rule signals                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  reel-db errors (separate crate)                                       │
//! │  ├── DbError          - Storage failures (never retried)               │
//! │  └── WorkflowError    - Storage OR business rule                       │
//! │                                                                         │
//! │  reel-api errors (in app)                                              │
//! │  └── ApiError         - Status code + JSON envelope                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rent results (`AlreadyRented`, `NoInventory`, ...) are NOT errors. They
//! are [`RentalOutcome`](crate::rental::RentalOutcome) values.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule signals raised by the rental workflow.
///
/// None of these mean something is broken. They tell the caller which
/// branch of normal business logic it hit.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No customer exists for the email and there is not enough data to
    /// create one.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /api/rentals { filmId, email }
    ///      │
    ///      ▼
    /// find_by_email(email) → none
    ///      │
    ///      ▼
    /// IncompleteCustomerInfo { missing: ["first_name", "last_name"] }
    ///      │
    ///      ▼
    /// UI asks for the customer's name, then retries
    /// ```
    #[error("Customer {email} does not exist yet; missing {}", .missing.join(", "))]
    IncompleteCustomerInfo {
        email: String,
        missing: Vec<&'static str>,
    },

    /// The rental has already been returned.
    ///
    /// Returned is terminal: rentals are never reopened.
    #[error("Rental {rental_id} has already been returned")]
    RentalAlreadyReturned { rental_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the caller should collect more customer data.
    pub fn needs_customer_info(&self) -> bool {
        matches!(self, CoreError::IncompleteCustomerInfo { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when input has the wrong shape, before any rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. an email without '@').
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. an email owned by another customer).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_customer_info_message() {
        let err = CoreError::IncompleteCustomerInfo {
            email: "new@example.com".to_string(),
            missing: vec!["first_name"],
        };
        assert_eq!(
            err.to_string(),
            "Customer new@example.com does not exist yet; missing first_name"
        );
        assert!(err.needs_customer_info());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::Duplicate {
            field: "email".to_string(),
            value: "a@b.c".to_string(),
        };
        assert_eq!(err.to_string(), "email 'a@b.c' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.needs_customer_info());
    }
}
