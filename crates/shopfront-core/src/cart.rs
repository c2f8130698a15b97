//! # Cart
//!
//! The cart is a two-level mapping: product id → size → quantity.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart                                                                   │
//! │                                                                         │
//! │  "p1" ──► { "default": 2 }            (product without variants)        │
//! │  "p2" ──► { "M": 1, "L": 3 }          (one line per size)               │
//! │                                                                         │
//! │  Persisted as exactly that JSON object under storage key `cart`:        │
//! │  {"p1":{"default":2},"p2":{"L":3,"M":1}}                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every stored quantity is ≥ 1 (setting 0 removes the line)
//! - A product entry with no sizes left is removed
//! - Guarded mutations never push a line above the product's stock
//!
//! Guarded mutations (`add_one`, `update_quantity`) validate against a
//! catalog snapshot and leave the cart untouched when they fail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

/// One (product, size, quantity) entry, as handed to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub size: String,
    pub quantity: u32,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Quantity held for one line (0 when absent).
    pub fn quantity(&self, product_id: &str, size: &str) -> u32 {
        self.lines
            .get(product_id)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all quantities across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines
            .values()
            .flat_map(|sizes| sizes.values())
            .map(|&qty| u64::from(qty))
            .sum()
    }

    /// Number of distinct (product, size) lines.
    pub fn line_count(&self) -> usize {
        self.lines.values().map(BTreeMap::len).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over all lines in key order.
    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.lines.iter().flat_map(|(product_id, sizes)| {
            sizes.iter().map(move |(size, &quantity)| CartLine {
                product_id: product_id.clone(),
                size: size.clone(),
                quantity,
            })
        })
    }

    /// Sum of `price × quantity` over all lines, priced from `catalog`.
    ///
    /// A line whose product is missing from the catalog contributes zero.
    /// Use [`Cart::missing_lines`] to find out whether that happened.
    pub fn total_amount(&self, catalog: &Catalog) -> Money {
        self.lines
            .iter()
            .filter_map(|(product_id, sizes)| {
                let product = catalog.get(product_id)?;
                Some(sizes.values().map(|&qty| product.price.multiply_quantity(qty)).sum::<Money>())
            })
            .sum()
    }

    /// Lines whose product is not in `catalog`.
    pub fn missing_lines(&self, catalog: &Catalog) -> Vec<CartLine> {
        self.lines()
            .filter(|line| !catalog.contains(&line.product_id))
            .collect()
    }

    // =========================================================================
    // Guarded mutations
    // =========================================================================

    /// Adds one unit to a line, creating it if absent.
    ///
    /// ## Errors
    /// - `ProductNotFound`: product not in the catalog
    /// - `UnknownSize`: size not valid for the product
    /// - `OutOfStock`: line already holds every available unit
    ///
    /// ## Returns
    /// The new quantity for the line.
    pub fn add_one(&mut self, catalog: &Catalog, product_id: &str, size: &str) -> CoreResult<u32> {
        let product = lookup(catalog, product_id, size)?;

        let current = self.quantity(product_id, size);
        if product.stock <= current {
            return Err(CoreError::OutOfStock {
                product_id: product_id.to_string(),
                size: size.to_string(),
                available: product.stock,
            });
        }

        let next = current + 1;
        self.set_quantity(product_id, size, next);
        Ok(next)
    }

    /// Sets a line to an exact quantity.
    ///
    /// ## Behavior
    /// - Negative: `InvalidQuantity`
    /// - Zero: removes the line; allowed even if the product was delisted
    /// - Positive: product and size must be valid and quantity ≤ stock
    ///   (`ExceedsStock` otherwise); an absent line is created
    pub fn update_quantity(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        size: &str,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity < 0 {
            return Err(CoreError::InvalidQuantity(quantity));
        }
        if quantity == 0 {
            self.remove(product_id, size);
            return Ok(());
        }

        let product = lookup(catalog, product_id, size)?;
        let accepted = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= product.stock)
            .ok_or_else(|| CoreError::ExceedsStock {
                product_id: product_id.to_string(),
                requested: quantity,
                available: product.stock,
            })?;

        self.set_quantity(product_id, size, accepted);
        Ok(())
    }

    // =========================================================================
    // Raw mutations (no catalog checks)
    // =========================================================================

    /// Removes a line. Returns true if it existed.
    pub fn remove(&mut self, product_id: &str, size: &str) -> bool {
        let Some(sizes) = self.lines.get_mut(product_id) else {
            return false;
        };
        let removed = sizes.remove(size).is_some();
        if sizes.is_empty() {
            self.lines.remove(product_id);
        }
        removed
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn set_quantity(&mut self, product_id: &str, size: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id, size);
            return;
        }
        self.lines
            .entry(product_id.to_string())
            .or_default()
            .insert(size.to_string(), quantity);
    }

    /// Drops any zero-quantity lines and empty product entries.
    ///
    /// Rehydrated carts come from storage that other code may have written;
    /// this restores the invariants before the session uses them.
    pub fn normalize(&mut self) {
        for sizes in self.lines.values_mut() {
            sizes.retain(|_, qty| *qty > 0);
        }
        self.lines.retain(|_, sizes| !sizes.is_empty());
    }
}

fn lookup<'a>(catalog: &'a Catalog, product_id: &str, size: &str) -> CoreResult<&'a Product> {
    let product = catalog
        .get(product_id)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    if !product.accepts_size(size) {
        return Err(CoreError::UnknownSize {
            product_id: product_id.to_string(),
            size: size.to_string(),
        });
    }

    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SIZE;

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new("p1", "Shirt", Money::from_cents(2000), 3),
            Product::new("p2", "Hoodie", Money::from_cents(4550), 10).with_sizes(["M", "L"]),
            Product::new("p3", "Sold out", Money::from_cents(500), 0),
        ])
    }

    #[test]
    fn test_add_until_out_of_stock() {
        let catalog = catalog();
        let mut cart = Cart::new();

        for expected in 1..=3 {
            assert_eq!(cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap(), expected);
        }
        assert_eq!(cart.total_amount(&catalog), Money::from_cents(6000));

        let err = cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { available: 3, .. }));
        assert_eq!(cart.quantity("p1", DEFAULT_SIZE), 3);

        cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, 0).unwrap();
        assert_eq!(cart.item_count(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_stock_product() {
        let mut cart = Cart::new();
        let err = cart.add_one(&catalog(), "p3", DEFAULT_SIZE).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { available: 0, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_unknown_product_and_size() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert_eq!(
            cart.add_one(&catalog, "nope", DEFAULT_SIZE).unwrap_err(),
            CoreError::ProductNotFound("nope".to_string())
        );
        assert!(matches!(
            cart.add_one(&catalog, "p2", "XS").unwrap_err(),
            CoreError::UnknownSize { .. }
        ));
        assert!(matches!(
            cart.add_one(&catalog, "p2", DEFAULT_SIZE).unwrap_err(),
            CoreError::UnknownSize { .. }
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_sizes_are_independent_lines() {
        let catalog = catalog();
        let mut cart = Cart::new();

        cart.add_one(&catalog, "p2", "M").unwrap();
        cart.update_quantity(&catalog, "p2", "L", 3).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.item_count(), 4);

        cart.remove("p2", "M");
        assert_eq!(cart.quantity("p2", "L"), 3);

        cart.remove("p2", "L");
        assert!(cart.is_empty(), "product entry must go with its last size");
    }

    #[test]
    fn test_update_quantity_guards() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, 2).unwrap();

        assert_eq!(
            cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, -1).unwrap_err(),
            CoreError::InvalidQuantity(-1)
        );
        assert!(matches!(
            cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, 4).unwrap_err(),
            CoreError::ExceedsStock { requested: 4, available: 3, .. }
        ));
        assert_eq!(cart.quantity("p1", DEFAULT_SIZE), 2);
    }

    #[test]
    fn test_oversized_quantity_is_reported_as_entered() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let huge = i64::from(u32::MAX) + 10;

        let err = cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, huge).unwrap_err();
        assert_eq!(
            err,
            CoreError::ExceedsStock {
                product_id: "p1".to_string(),
                requested: huge,
                available: 3,
            }
        );
        assert!(err.to_string().contains("4294967305"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_reads_back_exactly() {
        let catalog = catalog();
        for quantity in 0..=3 {
            let mut cart = Cart::new();
            cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap();
            cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, quantity).unwrap();
            assert_eq!(i64::from(cart.quantity("p1", DEFAULT_SIZE)), quantity);
            assert_eq!(cart.lines().count(), usize::from(quantity > 0));
        }
    }

    #[test]
    fn test_total_changes_by_price_times_delta() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.update_quantity(&catalog, "p2", "M", 2).unwrap();
        let before = cart.total_amount(&catalog);

        cart.update_quantity(&catalog, "p2", "M", 5).unwrap();
        let after = cart.total_amount(&catalog);

        assert_eq!(after - before, Money::from_cents(4550).multiply_quantity(3));
    }

    #[test]
    fn test_remove_delisted_product_is_allowed() {
        let mut cart = Cart::new();
        cart.update_quantity(&catalog(), "p1", DEFAULT_SIZE, 2).unwrap();

        let empty = Catalog::default();
        assert_eq!(cart.total_amount(&empty), Money::zero());
        assert_eq!(cart.missing_lines(&empty).len(), 1);

        cart.update_quantity(&empty, "p1", DEFAULT_SIZE, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, 2).unwrap();
        cart.update_quantity(&catalog, "p2", "L", 3).unwrap();
        cart.update_quantity(&catalog, "p2", "M", 1).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(json, r#"{"p1":{"default":2},"p2":{"L":3,"M":1}}"#);

        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_normalize_drops_zero_lines() {
        let mut cart: Cart = serde_json::from_str(r#"{"p1":{"default":0},"p2":{"M":2,"L":0}}"#).unwrap();
        cart.normalize();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity("p2", "M"), 2);
    }
}
