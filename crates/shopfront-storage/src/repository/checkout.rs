//! # Checkout Repository
//!
//! Holds the `checkoutData` hand-off document written when the shopper
//! proceeds to checkout. The checkout flow reads it; this session only
//! writes and clears it.

use shopfront_core::CheckoutSnapshot;
use tracing::info;

use super::kv::KeyValueRepository;
use crate::error::{DbError, DbResult};

/// Storage key holding the checkout snapshot.
pub const CHECKOUT_KEY: &str = "checkoutData";

/// Repository for the checkout snapshot.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    kv: KeyValueRepository,
}

impl CheckoutRepository {
    /// Creates a new CheckoutRepository.
    pub fn new(kv: KeyValueRepository) -> Self {
        CheckoutRepository { kv }
    }

    /// Stores the snapshot, replacing any earlier one.
    pub async fn save(&self, snapshot: &CheckoutSnapshot) -> DbResult<()> {
        let json =
            serde_json::to_string(snapshot).map_err(|e| DbError::corrupt(CHECKOUT_KEY, e))?;

        info!(
            checkout_id = %snapshot.id,
            total = %snapshot.total,
            "Stored checkout snapshot"
        );

        self.kv.set(CHECKOUT_KEY, &json).await
    }

    /// Loads the stored snapshot, if any.
    pub async fn load(&self) -> DbResult<Option<CheckoutSnapshot>> {
        match self.kv.get(CHECKOUT_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DbError::corrupt(CHECKOUT_KEY, e)),
            None => Ok(None),
        }
    }

    /// Removes the snapshot.
    pub async fn clear(&self) -> DbResult<()> {
        self.kv.remove(CHECKOUT_KEY).await?;
        Ok(())
    }
}
