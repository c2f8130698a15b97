//! # Image URL Normalization
//!
//! Backends store product images in several shapes. Views need one thing:
//! an absolute URL they can put in an `<img src>`.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw image reference                                                    │
//! │       │                                                                 │
//! │       ├── "https://cdn/x.png"  ──► unchanged                            │
//! │       ├── "//cdn/x.png"        ──► "https://cdn/x.png"                  │
//! │       ├── "/uploads/x.png"     ──► origin + "/uploads/x.png"            │
//! │       ├── "img/x.png"          ──► origin + "/img/x.png"                │
//! │       ├── "x.png"              ──► origin + upload_path + "x.png"       │
//! │       └── None / "" / "  "     ──► placeholder                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Resolves raw image references against the backend origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResolver {
    origin: String,
    upload_path: String,
    placeholder: String,
}

impl ImageResolver {
    /// Creates a resolver.
    ///
    /// ## Arguments
    /// * `origin` - Backend origin, e.g. `http://localhost:5000` (trailing `/` ignored)
    /// * `upload_path` - Path bare filenames live under, e.g. `/uploads/`
    /// * `placeholder` - Returned when nothing resolves
    pub fn new(
        origin: impl Into<String>,
        upload_path: impl AsRef<str>,
        placeholder: impl Into<String>,
    ) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        let trimmed = upload_path.as_ref().trim_matches('/');
        let upload_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };

        ImageResolver {
            origin,
            upload_path,
            placeholder: placeholder.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Resolves a single optional reference.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::ImageResolver;
    ///
    /// let images = ImageResolver::new("http://api.test", "/uploads/", "/placeholder.png");
    ///
    /// assert_eq!(images.resolve(Some("shirt.png")), "http://api.test/uploads/shirt.png");
    /// assert_eq!(images.resolve(Some("https://x/y.png")), "https://x/y.png");
    /// assert_eq!(images.resolve(None), "/placeholder.png");
    /// ```
    pub fn resolve(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.placeholder.clone();
        };

        if is_absolute(raw) {
            return raw.to_string();
        }
        if let Some(rest) = raw.strip_prefix("//") {
            return format!("https://{}", rest);
        }
        if raw.starts_with('/') {
            return format!("{}{}", self.origin, raw);
        }
        if raw.contains('/') {
            return format!("{}/{}", self.origin, raw);
        }
        format!("{}{}{}", self.origin, self.upload_path, raw)
    }

    /// Resolves the first usable reference out of several candidates.
    ///
    /// Used for records that carry both `image` and an `images` array.
    pub fn resolve_first<'a, I>(&self, candidates: I) -> String
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let first = candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty());
        self.resolve(first)
    }
}

fn is_absolute(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || raw.starts_with("data:")
}

// =============================================================================
// Unit Tests
// =============================================================================
