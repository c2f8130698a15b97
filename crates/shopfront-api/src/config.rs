//! # API Configuration
//!
//! Where the backend lives and how product images are addressed on it.
//! Embedded as the `[api]` section of `shopfront.toml`.
//!
//! ```toml
//! [api]
//! origin = "https://shop.example.com"
//! upload_path = "/uploads/"
//! placeholder_image = "/placeholder.png"
//! timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use shopfront_core::ImageResolver;
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; endpoints and root-relative images hang off it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path bare image filenames live under.
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Image shown when a product has none.
    #[serde(default = "default_placeholder")]
    pub placeholder_image: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_origin() -> String {
    "http://localhost:5000".to_string()
}

fn default_upload_path() -> String {
    "/uploads/".to_string()
}

fn default_placeholder() -> String {
    "/placeholder.png".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            origin: default_origin(),
            upload_path: default_upload_path(),
            placeholder_image: default_placeholder(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Creates a config pointing at `origin`, other fields defaulted.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        ApiConfig {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        self.origin_url()?;

        if self.timeout_secs == 0 {
            return Err(ApiError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.placeholder_image.trim().is_empty() {
            return Err(ApiError::InvalidConfig(
                "placeholder_image must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Parses the origin, accepting only http(s).
    pub fn origin_url(&self) -> ApiResult<Url> {
        let url = Url::parse(self.origin.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::InvalidUrl(format!(
                "origin must start with http:// or https://, got scheme '{}'",
                other
            ))),
        }
    }

    /// Builds the image resolver for products fetched from this backend.
    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(
            self.origin.trim(),
            &self.upload_path,
            self.placeholder_image.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::with_origin("ftp://files.example.com");
        assert!(matches!(config.validate(), Err(ApiError::InvalidUrl(_))));

        config.origin = "not a url".into();
        assert!(config.validate().is_err());

        config.origin = "https://shop.example.com".into();
        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn test_image_resolver_uses_origin_and_upload_path() {
        let config = ApiConfig::with_origin("https://shop.example.com/");
        let resolver = config.image_resolver();
        assert_eq!(
            resolver.resolve(Some("shirt.png")),
            "https://shop.example.com/uploads/shirt.png"
        );
        assert_eq!(resolver.resolve(None), "/placeholder.png");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ApiConfig = serde_json::from_str(r#"{"origin":"https://a.example"}"#).unwrap();
        assert_eq!(config.upload_path, "/uploads/");
        assert_eq!(config.timeout_secs, 10);
    }
}
