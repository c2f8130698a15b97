//! # Checkout Snapshot
//!
//! When the shopper proceeds to checkout, the session freezes the cart into
//! a `CheckoutSnapshot` and writes it to storage key `checkoutData`. The
//! checkout page reads that snapshot; it never re-prices the cart itself.
//!
//! ## Pricing
//! ```text
//! subtotal = Σ unit_price × quantity        (lines still in the catalog)
//! shipping = 0                if subtotal ≥ free_shipping_threshold
//!            flat_rate        otherwise
//! tax      = subtotal × rate  ((cents × bps + 5000) / 10000)
//! total    = subtotal + shipping + tax
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Policy
// =============================================================================

/// Shipping and tax rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    /// Flat shipping charge.
    pub shipping_flat: Money,

    /// Subtotal at or above which shipping is free. `None` disables free
    /// shipping.
    pub free_shipping_threshold: Option<Money>,

    pub tax_rate: TaxRate,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        CheckoutPolicy {
            shipping_flat: Money::from_cents(1000),
            free_shipping_threshold: Some(Money::from_cents(10000)),
            tax_rate: TaxRate::zero(),
        }
    }
}

impl CheckoutPolicy {
    /// Shipping charge for a given subtotal.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if !subtotal.is_positive() {
            return Money::zero();
        }
        match self.free_shipping_threshold {
            Some(threshold) if subtotal >= threshold => Money::zero(),
            _ => self.shipping_flat,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// One priced line of the checkout snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutLine {
    pub product_id: String,
    pub size: String,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

/// The `checkoutData` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutSnapshot {
    pub id: String,
    pub lines: Vec<CheckoutLine>,
    pub item_count: u64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CheckoutSnapshot {
    /// Prices `cart` against `catalog` under `policy`.
    ///
    /// Lines whose product is no longer in the catalog are left out of the
    /// snapshot; nobody can be charged for them.
    ///
    /// ## Errors
    /// `EmptyCart` when there is nothing left to price.
    pub fn build(cart: &Cart, catalog: &Catalog, policy: &CheckoutPolicy) -> CoreResult<Self> {
        let lines: Vec<CheckoutLine> = cart
            .lines()
            .filter_map(|line| {
                let product = catalog.get(&line.product_id)?;
                Some(CheckoutLine {
                    name: product.name.clone(),
                    image: product.image.clone(),
                    unit_price: product.price,
                    line_total: product.price.multiply_quantity(line.quantity),
                    product_id: line.product_id,
                    size: line.size,
                    quantity: line.quantity,
                })
            })
            .collect();

        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
        let shipping = policy.shipping_for(subtotal);
        let tax = subtotal.calculate_tax(policy.tax_rate);

        Ok(CheckoutSnapshot {
            id: Uuid::new_v4().to_string(),
            item_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
            lines,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            created_at: Utc::now(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use crate::DEFAULT_SIZE;

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new("p1", "Shirt", Money::from_cents(2000), 3),
            Product::new("p2", "Coat", Money::from_cents(12000), 1),
        ])
    }

    #[test]
    fn test_flat_shipping_below_threshold() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.update_quantity(&catalog, "p1", DEFAULT_SIZE, 3).unwrap();

        let policy = CheckoutPolicy {
            tax_rate: TaxRate::from_bps(825),
            ..CheckoutPolicy::default()
        };
        let snapshot = CheckoutSnapshot::build(&cart, &catalog, &policy).unwrap();

        assert_eq!(snapshot.subtotal.cents(), 6000);
        assert_eq!(snapshot.shipping.cents(), 1000);
        assert_eq!(snapshot.tax.cents(), 495);
        assert_eq!(snapshot.total.cents(), 7495);
        assert_eq!(snapshot.item_count, 3);
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_one(&catalog, "p2", DEFAULT_SIZE).unwrap();

        let snapshot = CheckoutSnapshot::build(&cart, &catalog, &CheckoutPolicy::default()).unwrap();
        assert!(snapshot.shipping.is_zero());
        assert_eq!(snapshot.total.cents(), 12000);
    }

    #[test]
    fn test_no_free_shipping_when_disabled() {
        let policy = CheckoutPolicy {
            free_shipping_threshold: None,
            ..CheckoutPolicy::default()
        };
        assert_eq!(policy.shipping_for(Money::from_cents(1_000_000)).cents(), 1000);
        assert!(policy.shipping_for(Money::zero()).is_zero());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = CheckoutSnapshot::build(&Cart::new(), &catalog(), &CheckoutPolicy::default()).unwrap_err();
        assert_eq!(err, CoreError::EmptyCart);
    }

    #[test]
    fn test_delisted_lines_are_skipped() {
        let mut cart = Cart::new();
        cart.update_quantity(&catalog(), "p1", DEFAULT_SIZE, 1).unwrap();
        cart.update_quantity(&catalog(), "p2", DEFAULT_SIZE, 1).unwrap();

        let shrunk = Catalog::from_products(vec![Product::new("p1", "Shirt", Money::from_cents(2000), 3)]);
        let snapshot = CheckoutSnapshot::build(&cart, &shrunk, &CheckoutPolicy::default()).unwrap();

        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.subtotal.cents(), 2000);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_one(&catalog, "p1", DEFAULT_SIZE).unwrap();

        let snapshot = CheckoutSnapshot::build(&cart, &catalog, &CheckoutPolicy::default()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["lines"][0]["productId"], "p1");
        assert_eq!(json["lines"][0]["lineTotal"], 2000);
        assert_eq!(json["subtotal"], 2000);
        assert!(json["createdAt"].is_string());
    }
}
