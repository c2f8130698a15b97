//! # Validation Module
//!
//! Input validation for values that arrive from views or the command line
//! before they reach the cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: View                                                          │
//! │  └── Quantity spinners, size pickers                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Shape checks (empty, length, characters)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart guards (cart.rs)                                         │
//! │  └── Catalog membership, size validity, stock                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_ID_LEN: usize = 64;
const MAX_SIZE_LEN: usize = 32;
const MAX_QUERY_LEN: usize = 100;

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace
///
/// ## Example
/// ```rust
/// use shopfront_core::validation::validate_product_id;
///
/// assert!(validate_product_id("64f1c2a9e4b0").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("a b").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: MAX_ID_LEN,
        });
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a size key.
pub fn validate_size(size: &str) -> ValidationResult<()> {
    if size.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "size".to_string(),
        });
    }

    if size.len() > MAX_SIZE_LEN {
        return Err(ValidationError::TooLong {
            field: "size".to_string(),
            max: MAX_SIZE_LEN,
        });
    }

    Ok(())
}

/// Trims a search query and checks its length.
///
/// ## Returns
/// The trimmed query (possibly empty, which means "show everything").
pub fn validate_search_query(query: &str) -> ValidationResult<&str> {
    let query = query.trim();
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }
    Ok(query)
}

/// Validates a tax rate in basis points (0 – 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate_bps".to_string(),
            min: 0,
            max: 10_000,
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
    fn test_product_id() {
        assert!(validate_product_id("p1").is_ok());
        assert!(validate_product_id(&"x".repeat(65)).is_err());
        assert!(matches!(
            validate_product_id("p\t1"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_size() {
        assert!(validate_size("XL").is_ok());
        assert!(validate_size(" ").is_err());
        assert!(validate_size(&"S".repeat(33)).is_err());
    }

    #[test]
    fn test_search_query_trimmed() {
        assert_eq!(validate_search_query("  shirt ").unwrap(), "shirt");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_tax_rate() {
        assert!(validate_tax_rate_bps(825).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }
}
