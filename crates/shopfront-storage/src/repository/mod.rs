//! # Repository Module
//!
//! Typed access to local storage.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartRepository        CheckoutRepository                              │
//! │  (key "cart", Cart)    (key "checkoutData", CheckoutSnapshot)          │
//! │        │                        │                                       │
//! │        └───────────┬────────────┘                                       │
//! │                    ▼                                                    │
//! │           KeyValueRepository                                           │
//! │           get / set / remove / keys / clear                            │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │           local_storage table                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`kv::KeyValueRepository`] - raw string values by key
//! - [`cart::CartRepository`] - the persisted cart document
//! - [`checkout::CheckoutRepository`] - the checkout hand-off document

pub mod cart;
pub mod checkout;
pub mod kv;
