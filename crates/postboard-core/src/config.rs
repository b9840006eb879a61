//! Board configuration
//!
//! Loaded from TOML; every section and key is optional.
//!
//! ```toml
//! [api]
//! base_url = "https://jsonplaceholder.typicode.com"
//! timeout_secs = 30
//!
//! [comments]
//! placeholder_email = "myUser@mail.com"
//! ```

use crate::error::ConfigError;
use crate::types::PLACEHOLDER_EMAIL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default remote collection root
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Comment workflow settings
    pub comments: CommentConfig,
}

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Collection root, without trailing slash
    pub base_url: String,
    /// Per-request timeout; `None` leaves requests unbounded
    pub timeout_secs: Option<u64>,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: concat!("postboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Base URL with any trailing slash removed
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Comment workflow settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    /// Address stamped on locally authored comments
    pub placeholder_email: String,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            placeholder_email: PLACEHOLDER_EMAIL.to_string(),
        }
    }
}

impl BoardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.api.timeout_secs = Some(secs);
        self
    }

    /// With placeholder comment email
    #[inline]
    #[must_use]
    pub fn with_placeholder_email(mut self, email: impl Into<String>) -> Self {
        self.comments.placeholder_email = email.into();
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` if [`Self::validate`] fails
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be http(s): {url}"
            )));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be positive".to_string(),
            ));
        }
        if self.comments.placeholder_email.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "comments.placeholder_email is empty".to_string(),
            ));
        }
        Ok(())
    }
}
