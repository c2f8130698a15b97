//! # Session Error Type
//!
//! The one error type views handle.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart::add_one ──► CoreError ─────┐                                     │
//! │  CartRepository ─► DbError ───────┼──► SessionError ──► code() + text   │
//! │  CatalogClient ──► ApiError ──────┘         │                           │
//! │                                             ▼                           │
//! │                                  OUT_OF_STOCK: "Out of stock: p1 ..."   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `SessionError` never means the session is broken: every failing
//! operation leaves the cart and catalog as they were.

use serde::Serialize;
use shopfront_api::ApiError;
use shopfront_core::CoreError;
use shopfront_storage::DbError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session operation failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A cart or catalog rule refused the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Local storage failed; the in-memory cart was not changed.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// A direct API call (single product lookup) failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A catalog response arrived after a newer request was issued.
    #[error("Catalog response #{ticket} discarded: request #{latest} is newer")]
    Stale { ticket: u64, latest: u64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

/// Machine-readable error category.
///
/// ## Usage in a Front End
/// ```text
/// OUT_OF_STOCK / EXCEEDS_STOCK  → disable the "+" button, show notice
/// NOT_FOUND                     → drop the stale tile
/// CATALOG_UNAVAILABLE           → retry banner
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    OutOfStock,
    ExceedsStock,
    ValidationError,
    EmptyCart,
    CatalogUnavailable,
    StorageError,
    Stale,
    ConfigError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::OutOfStock => "OUT_OF_STOCK",
            ErrorCode::ExceedsStock => "EXCEEDS_STOCK",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::EmptyCart => "EMPTY_CART",
            ErrorCode::CatalogUnavailable => "CATALOG_UNAVAILABLE",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::Stale => "STALE",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionError {
    /// Categorizes the error for display.
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::Core(err) => match err {
                CoreError::ProductNotFound(_) => ErrorCode::NotFound,
                CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
                CoreError::ExceedsStock { .. } => ErrorCode::ExceedsStock,
                CoreError::InvalidQuantity(_)
                | CoreError::UnknownSize { .. }
                | CoreError::Validation(_) => ErrorCode::ValidationError,
                CoreError::EmptyCart => ErrorCode::EmptyCart,
                CoreError::CatalogFetchFailed(_) => ErrorCode::CatalogUnavailable,
            },
            SessionError::Storage(_) => ErrorCode::StorageError,
            SessionError::Api(ApiError::NotFound(_)) => ErrorCode::NotFound,
            SessionError::Api(ApiError::InvalidConfig(_) | ApiError::InvalidUrl(_)) => {
                ErrorCode::ConfigError
            }
            SessionError::Api(_) => ErrorCode::CatalogUnavailable,
            SessionError::Stale { .. } => ErrorCode::Stale,
            SessionError::InvalidConfig(_)
            | SessionError::ConfigLoadFailed(_)
            | SessionError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
        }
    }

    /// The wrapped core error, if this is a rule violation.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            SessionError::Core(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<shopfront_core::ValidationError> for SessionError {
    fn from(err: shopfront_core::ValidationError) -> Self {
        SessionError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}
