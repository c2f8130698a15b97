//! # shopfront-storage: Local Storage Layer
//!
//! Persistent key-value storage for the shopping session, backed by SQLite
//! through sqlx. It plays the role browser local storage plays for a web
//! storefront: small JSON documents under well-known keys that survive a
//! restart.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionStore::add_item(..)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                shopfront-storage (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐   ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │   │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ KeyValueRepository │   │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ CartRepository     │   │            │  │   │
//! │  │   │               │    │ CheckoutRepository │   │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘   └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  local_storage(key, value, updated_at)                                 │
//! │    "cart"         → {"p1":{"default":2}}                                │
//! │    "checkoutData" → {"lines":[..],"subtotal":4000,..}                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfront_storage::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shopfront.db")).await?;
//! let cart = db.carts().load().await?.unwrap_or_default();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, StorageLocation};

pub use repository::cart::{CartRepository, CART_KEY};
pub use repository::checkout::{CheckoutRepository, CHECKOUT_KEY};
pub use repository::kv::KeyValueRepository;
