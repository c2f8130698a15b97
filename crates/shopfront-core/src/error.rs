//! # Error Types
//!
//! Domain-specific error types for shopfront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfront-core errors (this file)                                     │
//! │  ├── CoreError        - Cart / catalog rule violations                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopfront-storage    └── DbError       - Local storage failures       │
//! │  shopfront-api        └── ApiError      - Remote API failures          │
//! │  shopfront-session    └── SessionError  - What views see               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                   │
//! │                         DbError ────┼──► SessionError → view notice     │
//! │                         ApiError ───┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable. Operations that return one of these
//! leave the session exactly as it was before the call.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and catalog rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product is not in the current catalog snapshot.
    ///
    /// ## When This Occurs
    /// - Catalog has not been loaded yet
    /// - Product was delisted upstream since the cart was built
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Adding one more unit would exceed available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Click "Add to cart"  (line already holds 3, stock = 3)
    ///      │
    ///      ▼
    /// OutOfStock { product_id: "p1", size: "default", available: 3 }
    ///      │
    ///      ▼
    /// View shows: "No more units of this item available"
    /// ```
    #[error("Out of stock: {product_id} ({size}), only {available} available")]
    OutOfStock {
        product_id: String,
        size: String,
        available: u32,
    },

    /// A requested quantity is greater than available stock.
    #[error("Quantity {requested} for {product_id} exceeds available stock ({available})")]
    ExceedsStock {
        product_id: String,
        requested: i64,
        available: u32,
    },

    /// Quantity input is negative.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Size is not one of the product's variants.
    #[error("Size '{size}' is not available for {product_id}")]
    UnknownSize { product_id: String, size: String },

    /// Checkout requested with nothing to charge for.
    #[error("Cart is empty")]
    EmptyCart,

    /// Remote catalog could not be fetched.
    ///
    /// The session keeps its previous (possibly empty) catalog and raises
    /// its error flag instead of propagating a crash.
    #[error("Failed to fetch catalog: {0}")]
    CatalogFetchFailed(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
        let err = CoreError::OutOfStock {
            product_id: "p1".to_string(),
            size: "default".to_string(),
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock: p1 (default), only 3 available"
        );

        let err = CoreError::ExceedsStock {
            product_id: "p1".to_string(),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 5 for p1 exceeds available stock (3)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        assert_eq!(err.to_string(), "product_id is required");

        let err = ValidationError::TooLong {
            field: "size".to_string(),
            max: 32,
        };
        assert_eq!(err.to_string(), "size must be at most 32 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
