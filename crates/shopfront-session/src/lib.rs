//! # shopfront-session: The Shopping Session Store
//!
//! Mediates between views and persisted state: owns the cart, the catalog
//! snapshot and the UI flags for one shopper.
//!
//! ## Module Structure
//! ```text
//! shopfront-session/
//! ├── store.rs     - SessionStore: cart mutations, reads, catalog loads, checkout
//! ├── config.rs    - ShopfrontConfig: TOML + SHOPFRONT_* environment
//! ├── debounce.rs  - Debouncer for search-as-you-type
//! └── error.rs     - SessionError + ErrorCode
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use shopfront_api::CatalogClient;
//! use shopfront_session::{SessionStore, ShopfrontConfig};
//! use shopfront_storage::Database;
//!
//! let config = ShopfrontConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let client = CatalogClient::new(&config.api)?;
//!
//! let mut session = SessionStore::open(db, client, config.checkout_policy()).await?;
//! session.load_catalog().await?;
//! session.add_item("p1", None).await?;
//! println!("{} items, {}", session.item_count(), session.total_amount());
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod store;

pub use config::{CheckoutSettings, SearchSettings, ShopfrontConfig, StorageSettings};
pub use debounce::Debouncer;
pub use error::{ErrorCode, SessionError, SessionResult};
pub use store::{CatalogTicket, SessionStore};
