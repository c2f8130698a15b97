//! # Cart Repository
//!
//! Persists the cart under the `cart` key as the two-level JSON map
//! `{ productId: { size: quantity } }`.

use shopfront_core::Cart;
use tracing::debug;

use super::kv::KeyValueRepository;
use crate::error::{DbError, DbResult};

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Repository for the persisted cart.
#[derive(Debug, Clone)]
pub struct CartRepository {
    kv: KeyValueRepository,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(kv: KeyValueRepository) -> Self {
        CartRepository { kv }
    }

    /// Loads the stored cart.
    ///
    /// ## Returns
    /// * `Ok(None)` - nothing stored yet
    /// * `Err(DbError::Corrupt)` - the stored JSON is not a cart
    pub async fn load(&self) -> DbResult<Option<Cart>> {
        let Some(raw) = self.kv.get(CART_KEY).await? else {
            return Ok(None);
        };

        let mut cart: Cart =
            serde_json::from_str(&raw).map_err(|e| DbError::corrupt(CART_KEY, e))?;
        cart.normalize();

        debug!(lines = cart.line_count(), "Loaded stored cart");
        Ok(Some(cart))
    }

    /// Writes the whole cart, replacing the previous document.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        let json = serde_json::to_string(cart).map_err(|e| DbError::corrupt(CART_KEY, e))?;
        self.kv.set(CART_KEY, &json).await
    }

    /// Removes the stored cart.
    pub async fn clear(&self) -> DbResult<()> {
        self.kv.remove(CART_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shopfront_core::{Catalog, Money, Product, DEFAULT_SIZE};

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new("p1", "Tee", Money::from_cents(2000), 3),
            Product::new("p2", "Hoodie", Money::from_cents(4500), 5)
                .with_sizes(vec!["M".to_string(), "L".to_string()]),
        ])
    }

    #[tokio::test]
    async fn test_load_empty_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.carts().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = catalog();

        let mut cart = Cart::new();
        cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap();
        cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap();
        cart.add_one(&catalog, "p2", "L").unwrap();

        db.carts().save(&cart).await.unwrap();

        let raw = db.kv().get(CART_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"p1":{"default":2},"p2":{"L":1}}"#);

        let loaded = db.carts().load().await.unwrap().unwrap();
        assert_eq!(loaded, cart);
    }

    #[tokio::test]
    async fn test_corrupt_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().set(CART_KEY, "[1,2,3]").await.unwrap();

        let err = db.carts().load().await.unwrap_err();
        assert!(matches!(err, DbError::Corrupt { ref key, .. } if key == CART_KEY));
    }

    #[tokio::test]
    async fn test_load_drops_zero_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv()
            .set(CART_KEY, r#"{"p1":{"default":0},"p2":{"M":2}}"#)
            .await
            .unwrap();

        let cart = db.carts().load().await.unwrap().unwrap();
        assert_eq!(cart.quantity("p1", DEFAULT_SIZE), 0);
        assert_eq!(cart.line_count(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.carts().save(&Cart::new()).await.unwrap();
        db.carts().clear().await.unwrap();
        assert!(db.carts().load().await.unwrap().is_none());
    }
}
