//! # Catalog
//!
//! In-memory snapshot of the products fetched from the remote API, plus
//! the filter/sort used by the product listing.
//!
//! The snapshot keeps fetch order (the backend's "featured" order) and an
//! id index for the cart's price and stock lookups.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Catalog
// =============================================================================

/// Read-only product snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a snapshot, keeping fetch order.
    ///
    /// A repeated id replaces the earlier record in place, so the listing
    /// never shows the same product twice.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut catalog = Catalog::default();
        for product in products {
            match catalog.index.get(&product.id) {
                Some(&pos) => catalog.products[pos] = product,
                None => {
                    catalog.index.insert(product.id.clone(), catalog.products.len());
                    catalog.products.push(product);
                }
            }
        }
        catalog
    }

    /// Looks a product up by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).and_then(|&pos| self.products.get(pos))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in fetch order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Distinct non-empty categories, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Applies a listing query.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::{Catalog, Money, Product, ProductQuery, SortOrder};
    ///
    /// let catalog = Catalog::from_products(vec![
    ///     Product::new("a", "Zip hoodie", Money::from_cents(4500), 2),
    ///     Product::new("b", "Tee", Money::from_cents(1500), 0),
    /// ]);
    ///
    /// let query = ProductQuery {
    ///     sort: SortOrder::PriceAsc,
    ///     ..ProductQuery::default()
    /// };
    /// let ids: Vec<_> = catalog.query(&query).iter().map(|p| p.id.as_str()).collect();
    /// assert_eq!(ids, ["b", "a"]);
    /// ```
    pub fn query(&self, query: &ProductQuery) -> Vec<&Product> {
        let mut matches: Vec<&Product> = self.products.iter().filter(|p| query.matches(p)).collect();

        match query.sort {
            SortOrder::Featured => {}
            SortOrder::NameAsc => matches.sort_by_key(|p| p.name.to_lowercase()),
            SortOrder::NameDesc => {
                matches.sort_by_key(|p| std::cmp::Reverse(p.name.to_lowercase()))
            }
            SortOrder::PriceAsc => matches.sort_by_key(|p| p.price),
            SortOrder::PriceDesc => matches.sort_by_key(|p| std::cmp::Reverse(p.price)),
        }

        matches
    }
}

// =============================================================================
// Listing Query
// =============================================================================

/// Sort order for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Featured,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "featured" | "default" => Ok(SortOrder::Featured),
            "name" | "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            "price" | "price_asc" | "low_high" => Ok(SortOrder::PriceAsc),
            "price_desc" | "high_low" => Ok(SortOrder::PriceDesc),
            other => Err(ValidationError::InvalidFormat {
                field: "sort".to_string(),
                reason: format!(
                    "unknown sort '{}', expected featured, name, name-desc, price or price-desc",
                    other
                ),
            }),
        }
    }
}

/// Filters for the product listing. Every `None`/`false` field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Case-insensitive match on name, category or sub-category.
    pub text: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// Only products sold in this size.
    pub size: Option<String>,
    pub in_stock_only: bool,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ProductQuery {
    /// Query that only matches on text, in featured order.
    pub fn text(text: impl Into<String>) -> Self {
        ProductQuery {
            text: Some(text.into()),
            ..ProductQuery::default()
        }
    }

    fn matches(&self, product: &Product) -> bool {
        if self.in_stock_only && !product.in_stock() {
            return false;
        }
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(sub) = &self.sub_category {
            if !product.sub_category.eq_ignore_ascii_case(sub) {
                return false;
            }
        }
        if let Some(size) = &self.size {
            if !product.sizes.iter().any(|s| s.eq_ignore_ascii_case(size)) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        match self.text.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&product.name, &product.category, &product.sub_category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new("1", "Linen shirt", Money::from_cents(3500), 4)
                .with_category("Men", "Shirts")
                .with_sizes(["S", "M", "L"]),
            Product::new("2", "Denim jacket", Money::from_cents(8900), 0).with_category("Men", "Outerwear"),
            Product::new("3", "Summer dress", Money::from_cents(5400), 2)
                .with_category("Women", "Dresses")
                .with_sizes(["S", "M"]),
            Product::new("4", "Canvas tote", Money::from_cents(1200), 9).with_category("Accessories", "Bags"),
        ])
    }

    fn ids(products: Vec<&Product>) -> Vec<&str> {
        products.into_iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_duplicate_ids_replace_in_place() {
        let catalog = Catalog::from_products(vec![
            Product::new("a", "Old", Money::from_cents(100), 1),
            Product::new("b", "Other", Money::from_cents(100), 1),
            Product::new("a", "New", Money::from_cents(200), 1),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[0].name, "New");
        assert_eq!(catalog.get("a").unwrap().price.cents(), 200);
    }

    #[test]
    fn test_featured_keeps_fetch_order() {
        assert_eq!(ids(catalog().query(&ProductQuery::default())), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_filters() {
        let catalog = catalog();

        let men = ProductQuery {
            category: Some("men".into()),
            ..ProductQuery::default()
        };
        assert_eq!(ids(catalog.query(&men)), ["1", "2"]);

        let in_stock_men = ProductQuery {
            in_stock_only: true,
            ..men
        };
        assert_eq!(ids(catalog.query(&in_stock_men)), ["1"]);

        let size_m = ProductQuery {
            size: Some("M".into()),
            ..ProductQuery::default()
        };
        assert_eq!(ids(catalog.query(&size_m)), ["1", "3"]);

        let mid_price = ProductQuery {
            min_price: Some(Money::from_cents(3000)),
            max_price: Some(Money::from_cents(6000)),
            ..ProductQuery::default()
        };
        assert_eq!(ids(catalog.query(&mid_price)), ["1", "3"]);
    }

    #[test]
    fn test_text_search_matches_name_and_category() {
        let catalog = catalog();
        assert_eq!(ids(catalog.query(&ProductQuery::text("DRESS"))), ["3"]);
        assert_eq!(ids(catalog.query(&ProductQuery::text("bags"))), ["4"]);
        assert_eq!(catalog.query(&ProductQuery::text("   ")).len(), 4);
    }

    #[test]
    fn test_sorting() {
        let catalog = catalog();
        let by = |sort| ProductQuery {
            sort,
            ..ProductQuery::default()
        };
        assert_eq!(ids(catalog.query(&by(SortOrder::PriceAsc))), ["4", "1", "3", "2"]);
        assert_eq!(ids(catalog.query(&by(SortOrder::PriceDesc))), ["2", "3", "1", "4"]);
        assert_eq!(ids(catalog.query(&by(SortOrder::NameAsc))), ["4", "2", "1", "3"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price-desc".parse::<SortOrder>().unwrap(), SortOrder::PriceDesc);
        assert_eq!("name".parse::<SortOrder>().unwrap(), SortOrder::NameAsc);
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_categories() {
        let catalog = catalog();
        let cats: Vec<_> = catalog.categories().into_iter().collect();
        assert_eq!(cats, ["Accessories", "Men", "Women"]);
    }
}
