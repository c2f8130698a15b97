//! # Domain Types
//!
//! Core domain types shared by the session, storage and API layers.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    TaxRate      │   │    UiFlags      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  bps (u32)      │   │  search_visible │       │
//! │  │  name           │   │  825 = 8.25%    │   │  loading        │       │
//! │  │  price (Money)  │   └─────────────────┘   │  error          │       │
//! │  │  stock          │                         └─────────────────┘       │
//! │  │  image (URL)    │                                                    │
//! │  │  category / sub │   Cart / CatalogLine / Checkout types live in      │
//! │  │  sizes          │   their own modules.                               │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_SIZE;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as the session sees it.
///
/// Built from the remote API's wire record by `shopfront-api`; by the time
/// a `Product` exists its price is in cents and its image is an absolute,
/// resolvable URL. Immutable for the lifetime of a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Backend identifier (`_id` on the wire).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional long description for the detail view.
    #[serde(default)]
    pub description: Option<String>,

    /// Unit price.
    pub price: Money,

    /// Units available. Caps every cart line for this product.
    pub stock: u32,

    /// Normalized absolute image URL (or the placeholder).
    pub image: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub sub_category: String,

    /// Size variants. Empty means the product is sold in [`DEFAULT_SIZE`] only.
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl Product {
    /// Creates a product with no variants, category or image.
    ///
    /// Mostly useful for tests and fixtures; real products come from the API.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            stock,
            image: String::new(),
            category: String::new(),
            sub_category: String::new(),
            sizes: Vec::new(),
        }
    }

    /// Builder-style setter for size variants.
    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style setter for category and sub-category.
    pub fn with_category(mut self, category: impl Into<String>, sub_category: impl Into<String>) -> Self {
        self.category = category.into();
        self.sub_category = sub_category.into();
        self
    }

    /// True when the product is sold in named sizes.
    #[inline]
    pub fn has_variants(&self) -> bool {
        !self.sizes.is_empty()
    }

    /// Checks whether `size` is a valid cart key for this product.
    ///
    /// ## Rules
    /// - No variants: only [`DEFAULT_SIZE`] is accepted
    /// - With variants: the size must be listed (exact match)
    pub fn accepts_size(&self, size: &str) -> bool {
        if self.has_variants() {
            self.sizes.iter().any(|s| s == size)
        } else {
            size == DEFAULT_SIZE
        }
    }

    /// True when at least one unit is available.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// UI Flags
// =============================================================================

/// Transient view flags held by the session. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UiFlags {
    /// Whether the search bar is open.
    pub search_visible: bool,

    /// A catalog fetch is in flight.
    pub loading: bool,

    /// Last catalog error, cleared by the next successful load.
    pub error: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
