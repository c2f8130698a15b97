//! # Catalog Client
//!
//! HTTP client for the product endpoints.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch_products()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {origin}/products            (timeout: api.timeout_secs)           │
//! │       │                                                                 │
//! │       ├── transport error   ──► ApiError::Request / Timeout             │
//! │       ├── non-2xx           ──► ApiError::Status                        │
//! │       ├── bad JSON          ──► ApiError::Decode                        │
//! │       ▼                                                                 │
//! │  ProductListResponse (any envelope, elements kept as raw JSON)          │
//! │       │                                                                 │
//! │       ▼  per element                                                    │
//! │  ProductRecord::from_value + into_product  (cents, image URL, sizes)    │
//! │       │   undecodable or unusable ──► skipped, logged at warn           │
//! │       ▼                                                                 │
//! │  Vec<Product>  (backend order)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shopfront_core::{ImageResolver, Product};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::protocol::{ProductListResponse, ProductRecord, ProductResponse};

// =============================================================================
// Catalog Source
// =============================================================================

/// Anything that can produce the product catalog.
///
/// The session depends on this rather than on [`CatalogClient`] directly so
/// it can be driven without a network.
pub trait CatalogSource {
    /// Fetches every listed product, in backend order.
    fn fetch_products(&self) -> impl Future<Output = ApiResult<Vec<Product>>> + Send;

    /// Fetches one product by id.
    fn fetch_product(&self, id: &str) -> impl Future<Output = ApiResult<Product>> + Send;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// reqwest-backed [`CatalogSource`].
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    origin: Url,
    images: ImageResolver,
    timeout_secs: u64,
}

impl CatalogClient {
    /// Builds a client from validated configuration.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        info!(origin = %config.origin, "Catalog client ready");

        Ok(CatalogClient {
            http,
            origin: config.origin_url()?,
            images: config.image_resolver(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// The resolver applied to every fetched product.
    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// Appends path segments to the origin, keeping any path prefix it has.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base URL", self.origin)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET + status check + JSON decode.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<Option<T>> {
        debug!(%url, "GET");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Request(e.to_string())
            }
        })?;

        Ok(Some(serde_json::from_slice(&body)?))
    }
}

impl CatalogSource for CatalogClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> ApiResult<Vec<Product>> {
        let url = self.endpoint(&["products"])?;

        let Some(response) = self.get_json::<ProductListResponse>(url.clone()).await? else {
            return Err(ApiError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                url: url.to_string(),
            });
        };

        let records = response.into_records();
        let received = records.len();

        let products: Vec<Product> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let decoded = ProductRecord::from_value(value)
                    .and_then(|record| record.into_product(&self.images));
                match decoded {
                    Ok(product) => Some(product),
                    Err(e) => {
                        warn!(index, error = %e, "Skipping unusable product record");
                        None
                    }
                }
            })
            .collect();

        info!(received, kept = products.len(), "Fetched product catalog");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn fetch_product(&self, id: &str) -> ApiResult<Product> {
        let url = self.endpoint(&["products", id])?;

        match self.get_json::<ProductResponse>(url).await? {
            Some(response) => response.into_record().into_product(&self.images),
            None => Err(ApiError::NotFound(id.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
