//! # Error Types
//!
//! Business and form-field errors. Neither carries I/O detail.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cantina-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Form field failures (caller re-prompts)        │
//! │                                                                         │
//! │  cantina-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures, wraps CoreError as Domain    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule rejections.
///
/// None of these leave partial state behind: catalog writes that fail leave
/// the prior row untouched and a rejected sale rolls back completely.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product carries this code.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A cart asks for more units than are on the shelf.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout: Cola x5
    ///      │
    ///      ▼
    /// Stock read inside the sale transaction: 2
    ///      │
    ///      ▼
    /// InsufficientStock { code: "C1", available: 2, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 2 C1 in stock", nothing was written
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Adding (or renaming onto) a code that another product already uses.
    #[error("Product code '{0}' already exists")]
    DuplicateCode(String),

    /// Checkout was attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A form field failed; see [`ValidationError::field`].
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Why a single form field was rejected. Produced before anything reaches
/// storage, so the caller can re-prompt just that field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Counted in characters, not bytes.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Bounds are inclusive.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Cart quantities of zero or less.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Text could not be parsed (e.g. "abc" as a price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Category labels outside the closed list.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
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
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            code: "C1".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for C1: available 2, requested 5"
        );

        let err = CoreError::DuplicateCode("C1".to_string());
        assert_eq!(err.to_string(), "Product code 'C1' already exists");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        };
        assert_eq!(err.to_string(), "name must be at least 2 characters");
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "brand".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
