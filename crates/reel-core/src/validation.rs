//! # Validation Module
//!
//! Input shape checks for Reel Rentals.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: reel-api                                                     │
//! │  ├── JSON / path / query deserialization                               │
//! │  └── THIS MODULE: shape checks (ids, email, names, search text)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: reel-db workflows                                            │
//! │  ├── IncompleteCustomerInfo (business rule, not a shape error)         │
//! │  └── Email uniqueness                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_EMAIL_LENGTH, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text search accepted.
const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Exactly one '@' with text on both sides, no whitespace
///
/// Matching against stored emails is exact, so this does NOT normalize case.
///
/// ## Example
/// ```rust
/// use reel_core::validation::validate_email;
///
/// assert!(validate_email("mary.smith@example.com").is_ok());
/// assert!(validate_email("").is_err());
/// assert!(validate_email("nobody").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a first or last name that is present.
///
/// ## Rules
/// - Must not be blank
/// - At most 45 characters after trimming
pub fn validate_person_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns the unfiltered listing)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an entity identifier taken from a path or request body.
///
/// Store keys start at 1, so zero and negatives never match a row.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("  padded@example.com  ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("has space@example.com").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(60))).is_err());
    }

    #[test]
    fn test_email_length_counts_characters() {
        // 37 characters, 67 bytes
        let accented = format!("{}@ex.com", "é".repeat(30));
        assert!(validate_email(&accented).is_ok());

        let too_long = format!("{}@ex.com", "é".repeat(44));
        assert!(matches!(
            validate_email(&too_long),
            Err(ValidationError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("first_name", "Mary").is_ok());
        assert!(validate_person_name("first_name", "").is_err());
        assert!(validate_person_name("last_name", &"B".repeat(46)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  smith ").unwrap(), "smith");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("filmId", 1).is_ok());
        assert!(validate_id("filmId", 0).is_err());
        assert!(validate_id("filmId", -4).is_err());
    }
}
