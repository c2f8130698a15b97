//! # Shopfront Configuration
//!
//! Configuration for the session and everything it talks to.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPFRONT_API_ORIGIN=https://shop.example.com                      │
//! │     SHOPFRONT_DB_PATH=/tmp/shopfront.db                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopfront/shopfront.toml (Linux)                         │
//! │     ~/Library/Application Support/com.shopfront.shopfront/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:5000, $10 shipping, free from $100, no tax        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! origin = "https://shop.example.com"
//! upload_path = "/uploads/"
//! placeholder_image = "/placeholder.png"
//! timeout_secs = 10
//!
//! [storage]
//! db_path = "/var/lib/shopfront/shopfront.db"
//!
//! [checkout]
//! tax_rate_bps = 825
//! shipping_cents = 1000
//! free_shipping = true
//! free_shipping_cents = 10000
//!
//! [search]
//! debounce_ms = 300
//! ```

use serde::{Deserialize, Serialize};
use shopfront_api::ApiConfig;
use shopfront_core::validation::validate_tax_rate_bps;
use shopfront_core::{CheckoutPolicy, Money, TaxRate};
use shopfront_storage::DbConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};

const CONFIG_FILE: &str = "shopfront.toml";
const DB_FILE: &str = "shopfront.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where local storage lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Explicit database file. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

// =============================================================================
// Checkout Settings
// =============================================================================

/// Shipping and tax rules, in integer cents and basis points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Tax rate in basis points (825 = 8.25%).
    #[serde(default)]
    pub tax_rate_bps: u32,

    /// Flat shipping charge.
    #[serde(default = "default_shipping")]
    pub shipping_cents: i64,

    /// Whether orders at or above `free_shipping_cents` ship free.
    /// `SHOPFRONT_FREE_SHIPPING_CENTS=none` switches it off.
    #[serde(default = "default_free_shipping")]
    pub free_shipping: bool,

    /// Subtotal from which shipping is free.
    #[serde(default = "default_free_shipping_cents")]
    pub free_shipping_cents: i64,
}

fn default_shipping() -> i64 {
    1000
}

fn default_free_shipping() -> bool {
    true
}

fn default_free_shipping_cents() -> i64 {
    10000
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            tax_rate_bps: 0,
            shipping_cents: default_shipping(),
            free_shipping: default_free_shipping(),
            free_shipping_cents: default_free_shipping_cents(),
        }
    }
}

impl CheckoutSettings {
    /// The pricing policy these settings describe.
    pub fn policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            shipping_flat: Money::from_cents(self.shipping_cents),
            free_shipping_threshold: self
                .free_shipping
                .then(|| Money::from_cents(self.free_shipping_cents)),
            tax_rate: TaxRate::from_bps(self.tax_rate_bps),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

/// Search-as-you-type behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period before a typed query is run (milliseconds).
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    300
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopfrontConfig {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Checkout pricing.
    #[serde(default)]
    pub checkout: CheckoutSettings,

    /// Search behavior.
    #[serde(default)]
    pub search: SearchSettings,
}

impl ShopfrontConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shopfront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        self.api
            .validate()
            .map_err(|e| SessionError::InvalidConfig(e.to_string()))?;

        validate_tax_rate_bps(self.checkout.tax_rate_bps)
            .map_err(|e| SessionError::InvalidConfig(e.to_string()))?;

        if self.checkout.shipping_cents < 0 {
            return Err(SessionError::InvalidConfig(
                "shipping_cents must not be negative".into(),
            ));
        }

        if self.checkout.free_shipping_cents < 0 {
            return Err(SessionError::InvalidConfig(
                "free_shipping_cents must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHOPFRONT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable numbers are
    /// logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(origin) = lookup("SHOPFRONT_API_ORIGIN") {
            debug!(origin = %origin, "Overriding API origin from environment");
            self.api.origin = origin;
        }

        if let Some(path) = lookup("SHOPFRONT_UPLOAD_PATH") {
            self.api.upload_path = path;
        }

        if let Some(image) = lookup("SHOPFRONT_PLACEHOLDER_IMAGE") {
            self.api.placeholder_image = image;
        }

        if let Some(secs) = lookup("SHOPFRONT_API_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric SHOPFRONT_API_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = lookup("SHOPFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.db_path = Some(PathBuf::from(path));
        }

        if let Some(bps) = lookup("SHOPFRONT_TAX_RATE_BPS") {
            match bps.parse::<u32>() {
                Ok(b) => self.checkout.tax_rate_bps = b,
                Err(_) => warn!(value = %bps, "Ignoring non-numeric SHOPFRONT_TAX_RATE_BPS"),
            }
        }

        if let Some(cents) = lookup("SHOPFRONT_SHIPPING_CENTS") {
            match cents.parse::<i64>() {
                Ok(c) => self.checkout.shipping_cents = c,
                Err(_) => warn!(value = %cents, "Ignoring non-numeric SHOPFRONT_SHIPPING_CENTS"),
            }
        }

        // "none" disables free shipping
        if let Some(cents) = lookup("SHOPFRONT_FREE_SHIPPING_CENTS") {
            if cents.eq_ignore_ascii_case("none") {
                self.checkout.free_shipping = false;
            } else {
                match cents.parse::<i64>() {
                    Ok(c) => {
                        self.checkout.free_shipping = true;
                        self.checkout.free_shipping_cents = c;
                    }
                    Err(_) => {
                        warn!(value = %cents, "Ignoring non-numeric SHOPFRONT_FREE_SHIPPING_CENTS")
                    }
                }
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "shopfront", "shopfront")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database file: explicit path, else the platform data dir,
    /// else the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join(DB_FILE)))
            .unwrap_or_else(|| PathBuf::from(DB_FILE))
    }

    /// Storage pool configuration for [`database_path`](Self::database_path).
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
    }

    /// Checkout pricing policy.
    pub fn checkout_policy(&self) -> CheckoutPolicy {
        self.checkout.policy()
    }
}
