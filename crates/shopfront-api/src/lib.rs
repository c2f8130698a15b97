//! # shopfront-api: Remote Product API
//!
//! Fetches the product catalog from the storefront backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionStore::load_catalog()                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  shopfront-api (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   CatalogSource (trait) ◄── CatalogClient (reqwest)             │   │
//! │  │        │                         │                              │   │
//! │  │        │                         ▼                              │   │
//! │  │        │                 protocol::ProductRecord                │   │
//! │  │        │                 (wire JSON, envelopes)                 │   │
//! │  │        ▼                                                        │   │
//! │  │   Vec<shopfront_core::Product>                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {origin}/products     GET {origin}/products/{id}                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use shopfront_api::{ApiConfig, CatalogClient, CatalogSource};
//!
//! let client = CatalogClient::new(&ApiConfig::with_origin("https://shop.example.com"))?;
//! let products = client.fetch_products().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;

pub use client::{CatalogClient, CatalogSource};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use protocol::{ProductListResponse, ProductRecord, ProductResponse, WireId};
