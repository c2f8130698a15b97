//! # API Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Payload             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Request        │  │  Decode                 │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  InvalidRecord          │ │
//! │  │                 │  │  Status         │  │  NotFound               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors talking to the remote product API.
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid API configuration.
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),

    /// The origin or an endpoint could not be built into a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (DNS, refused, reset).
    #[error("Request failed: {0}")]
    Request(String),

    /// No response within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status} for {url}")]
    Status { status: u16, url: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// Body was not the JSON shape we expect.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// A record decoded but carries unusable values.
    #[error("Invalid product record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    /// `GET /products/{id}` answered 404.
    #[error("Product '{0}' not found")]
    NotFound(String),
}

impl ApiError {
    /// Creates an InvalidRecord error.
    pub fn invalid_record(id: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::InvalidRecord {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request(_) | ApiError::Timeout(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ApiError::Request("refused".into()).is_retryable());
        assert!(ApiError::Timeout(10).is_retryable());
        assert!(ApiError::Status {
            status: 503,
            url: "http://x/products".into()
        }
        .is_retryable());

        assert!(!ApiError::Status {
            status: 400,
            url: "http://x/products".into()
        }
        .is_retryable());
        assert!(!ApiError::NotFound("p1".into()).is_retryable());
        assert!(!ApiError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::invalid_record("p9", "price is negative");
        assert_eq!(err.to_string(), "Invalid product record 'p9': price is negative");
    }
}
