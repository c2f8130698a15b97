//! # shopfront-core: Pure Storefront Logic
//!
//! Everything the shopping session needs to reason about, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation components (views)                   │   │
//! │  │    Product list ──► Product detail ──► Cart ──► Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            shopfront-session (SessionStore)                     │   │
//! │  └──────┬──────────────────────┬────────────────────────┬──────────┘   │
//! │         │                      │                        │              │
//! │  ┌──────▼──────────────────────▼──────┐   ┌─────────────▼──────────┐   │
//! │  │      ★ shopfront-core (THIS) ★     │   │  shopfront-storage     │   │
//! │  │  cart · catalog · image · money    │   │  shopfront-api         │   │
//! │  │  checkout · validation             │   │  (I/O lives here)      │   │
//! │  └────────────────────────────────────┘   └────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//! ```rust
//! use shopfront_core::{Cart, Catalog, Money, Product, DEFAULT_SIZE};
//!
//! let shirt = Product::new("p1", "Shirt", Money::from_cents(2000), 3);
//! let catalog = Catalog::from_products(vec![shirt]);
//!
//! let mut cart = Cart::new();
//! cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap();
//! cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap();
//!
//! assert_eq!(cart.item_count(), 2);
//! assert_eq!(cart.total_amount(&catalog), Money::from_cents(4000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod image;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use catalog::{Catalog, ProductQuery, SortOrder};
pub use checkout::{CheckoutLine, CheckoutPolicy, CheckoutSnapshot};
pub use error::{CoreError, CoreResult, ValidationError};
pub use image::ImageResolver;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Size key used for products that have no size variants.
///
/// Persisted carts use this literal as the second-level key, so it must
/// never change.
pub const DEFAULT_SIZE: &str = "default";
