//! # Wire Protocol
//!
//! JSON shapes the backend sends, and their conversion into core types.
//!
//! ## Product Record
//! ```text
//! {
//!   "_id": "65f0c1...",          ← also accepted as "id"
//!   "name": "Linen Shirt",
//!   "price": 20.0,               ← decimal major units (number or string)
//!   "stock": 3,
//!   "image": "shirt.png",        ← any shape ImageResolver understands
//!   "images": ["a.png", "b.png"],
//!   "category": "Men",
//!   "subCategory": "Topwear",
//!   "sizes": ["S", "M", "L"],
//!   "description": "..."
//! }
//! ```
//!
//! ## Envelopes
//! ```text
//! GET /products        →  [ ... ]  |  { "products": [ ... ] }  |  { "data": [ ... ] }
//! GET /products/{id}   →  { ... }  |  { "product": { ... } }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use shopfront_core::{validation, ImageResolver, Money, Product};

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Product Record
// =============================================================================

/// A product as the backend sends it.
///
/// Optional collections and counts tolerate `null` as well as absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: WireId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub price: Option<WirePrice>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Option<String>>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub sub_category: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<Option<String>>,
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record id: a plain string, or a Mongo extended-JSON `{"$oid": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl WireId {
    pub fn as_str(&self) -> &str {
        match self {
            WireId::Text(id) | WireId::ObjectId { oid: id } => id,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            WireId::Text(id) | WireId::ObjectId { oid: id } => id,
        }
    }
}

impl From<&str> for WireId {
    fn from(id: &str) -> Self {
        WireId::Text(id.to_string())
    }
}

/// Price as it appears on the wire. Some backends quote prices as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePrice {
    Number(f64),
    Text(String),
}

impl WirePrice {
    fn as_f64(&self) -> Option<f64> {
        match self {
            WirePrice::Number(n) => Some(*n),
            WirePrice::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Converts a decimal major-unit price into cents.
///
/// Rounds half away from zero to the nearest cent. Negative, NaN and
/// infinite prices are rejected.
///
/// ## Example
/// ```rust
/// use shopfront_api::protocol::price_to_money;
///
/// assert_eq!(price_to_money(20.0).unwrap().cents(), 2000);
/// assert_eq!(price_to_money(19.999).unwrap().cents(), 2000);
/// assert!(price_to_money(-1.0).is_none());
/// ```
pub fn price_to_money(price: f64) -> Option<Money> {
    if !price.is_finite() || price < 0.0 {
        return None;
    }
    let cents = (price * 100.0).round();
    if cents > i64::MAX as f64 {
        return None;
    }
    Some(Money::from_cents(cents as i64))
}

impl ProductRecord {
    /// Converts the record into a core `Product`.
    ///
    /// ## Normalization
    /// - price: decimal → cents
    /// - stock: negative values clamp to 0
    /// - image: `image`, else the first non-empty `images` entry, resolved
    /// - sizes: trimmed, blanks and duplicates dropped, order kept
    pub fn into_product(self, images: &ImageResolver) -> ApiResult<Product> {
        let id = self.id.into_string();
        validation::validate_product_id(&id).map_err(|e| ApiError::invalid_record(&id, e))?;

        let price = match &self.price {
            None => return Err(ApiError::invalid_record(&id, "missing price")),
            Some(wire) => wire
                .as_f64()
                .and_then(price_to_money)
                .ok_or_else(|| ApiError::invalid_record(&id, format!("unusable price {:?}", wire)))?,
        };

        let stock = u32::try_from(self.stock.max(0)).unwrap_or(u32::MAX);

        let image = images.resolve_first(
            std::iter::once(self.image.as_deref()).chain(self.images.iter().map(|s| s.as_deref())),
        );

        let mut sizes: Vec<String> = Vec::with_capacity(self.sizes.len());
        for size in self.sizes.iter().flatten() {
            let size = size.trim();
            if !size.is_empty() && !sizes.iter().any(|s| s == size) {
                sizes.push(size.to_string());
            }
        }

        Ok(Product {
            id,
            name: self.name,
            description: self.description.filter(|d| !d.trim().is_empty()),
            price,
            stock,
            image,
            category: self.category.unwrap_or_default(),
            sub_category: self.sub_category.unwrap_or_default(),
            sizes,
        })
    }

    /// Decodes one element of a product list.
    pub fn from_value(value: serde_json::Value) -> ApiResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// Body of `GET /products`.
///
/// Elements stay raw JSON so one malformed record cannot sink the list;
/// each is decoded on its own with [`ProductRecord::from_value`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductListResponse {
    Bare(Vec<serde_json::Value>),
    Products { products: Vec<serde_json::Value> },
    Data { data: Vec<serde_json::Value> },
}

impl ProductListResponse {
    pub fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            ProductListResponse::Bare(records)
            | ProductListResponse::Products { products: records }
            | ProductListResponse::Data { data: records } => records,
        }
    }
}

/// Body of `GET /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductResponse {
    Wrapped { product: ProductRecord },
    Bare(ProductRecord),
}

impl ProductResponse {
    pub fn into_record(self) -> ProductRecord {
        match self {
            ProductResponse::Wrapped { product } | ProductResponse::Bare(product) => product,
        }
    }
}
