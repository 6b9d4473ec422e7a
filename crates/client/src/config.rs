//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BIGCOMMERCE_STORE_HASH` - Store hash (e.g., `abc123`)
//! - `BIGCOMMERCE_ACCESS_TOKEN` - API account or app install access token
//!
//! ## Optional
//! - `BIGCOMMERCE_API_URL` - API base (default: `https://api.bigcommerce.com/stores/`)
//! - `BIGCOMMERCE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `BIGCOMMERCE_CHANNEL_ID` - Channel used for carts and accounts (default: 1)
//! - `BIGCOMMERCE_MAX_RETRIES` - Transient page failures tolerated (default: 1)
//! - `BIGCOMMERCE_RETRY_MODE` - `retry` or `stop` (default: retry)
//! - `BIGCOMMERCE_RETRY_BACKOFF_MS` - Base retry delay (default: 500)
//! - `BIGCOMMERCE_PRODUCT_FIELDS` - `include_fields` for product listings
//! - `BIGCOMMERCE_PRODUCT_INCLUDE` - `include` for product listings
//! - `BIGCOMMERCE_CATEGORY_FIELDS` - `include_fields` for category listings

use std::time::Duration;

use bigcommerce_core::{ChannelId, StoreHash};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::pagination::{RetryMode, RetryPolicy};

/// Default API base; the store hash is appended per client.
pub const DEFAULT_API_URL: &str = "https://api.bigcommerce.com/stores/";

/// Default product `include_fields`.
pub const DEFAULT_PRODUCT_FIELDS: &str = "name,sku,custom_url,is_visible,price";

/// Default category `include_fields`.
pub const DEFAULT_CATEGORY_FIELDS: &str = "name,parent_id,is_visible,custom_url";

const DEFAULT_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Sparse field selection for a collection endpoint.
///
/// Both parameters are sent when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilters {
    /// Comma-separated `include_fields`.
    pub include_fields: Option<String>,
    /// Comma-separated `include` (sub-resources such as `images,variants`).
    pub include: Option<String>,
}

impl FieldFilters {
    /// Only `include_fields`.
    #[must_use]
    pub fn fields(fields: impl Into<String>) -> Self {
        Self {
            include_fields: Some(fields.into()),
            include: None,
        }
    }

    /// Add an `include`.
    #[must_use]
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    /// The query pairs to append, skipping unset and empty values.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("include_fields", self.include_fields.as_deref()),
            ("include", self.include.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v)))
    }
}

/// Field filters for catalog listings, per client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilters {
    /// Applied to product listings.
    pub products: FieldFilters,
    /// Applied to category listings.
    pub categories: FieldFilters,
}

impl Default for CatalogFilters {
    fn default() -> Self {
        Self {
            products: FieldFilters::fields(DEFAULT_PRODUCT_FIELDS),
            categories: FieldFilters::fields(DEFAULT_CATEGORY_FIELDS),
        }
    }
}

/// BigCommerce client configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Store the client talks to.
    pub store_hash: StoreHash,
    /// `X-Auth-Token` value.
    pub access_token: SecretString,
    /// API base URL, ending in `/`; `None` means [`DEFAULT_API_URL`].
    pub api_base_url: Option<Url>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Channel used for carts and new accounts.
    pub channel_id: ChannelId,
    /// Retry budget for collection traversals.
    pub retry: RetryPolicy,
    /// Catalog field selection.
    pub catalog: CatalogFilters,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .field(
                "api_base_url",
                &self.api_base_url.as_ref().map_or(DEFAULT_API_URL, Url::as_str),
            )
            .field("timeout", &self.timeout)
            .field("channel_id", &self.channel_id)
            .field("retry", &self.retry)
            .field("catalog", &self.catalog)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the credentials.
    #[must_use]
    pub fn new(store_hash: StoreHash, access_token: SecretString) -> Self {
        Self {
            store_hash,
            access_token,
            api_base_url: None,
            timeout: Duration::from_secs(10),
            channel_id: ChannelId::new(1),
            retry: RetryPolicy::default(),
            catalog: CatalogFilters::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let store_hash = get_required_env("BIGCOMMERCE_STORE_HASH")?
            .parse::<StoreHash>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BIGCOMMERCE_STORE_HASH".to_string(), e.to_string())
            })?;
        let access_token = get_required_secret("BIGCOMMERCE_ACCESS_TOKEN")?;

        let api_base_url = get_optional_env("BIGCOMMERCE_API_URL")
            .map(|url| parse_base_url("BIGCOMMERCE_API_URL", &url))
            .transpose()?;
        let timeout = Duration::from_secs(parse_env(
            "BIGCOMMERCE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let channel_id = ChannelId::new(parse_env("BIGCOMMERCE_CHANNEL_ID", "1")?);

        let retry = RetryPolicy {
            max_retries: parse_env("BIGCOMMERCE_MAX_RETRIES", "1")?,
            mode: get_env_or_default("BIGCOMMERCE_RETRY_MODE", "retry")
                .parse::<RetryMode>()
                .map_err(|e| ConfigError::InvalidEnvVar("BIGCOMMERCE_RETRY_MODE".to_string(), e))?,
            backoff: Duration::from_millis(parse_env("BIGCOMMERCE_RETRY_BACKOFF_MS", "500")?),
        };

        let catalog = CatalogFilters {
            products: FieldFilters {
                include_fields: Some(get_env_or_default(
                    "BIGCOMMERCE_PRODUCT_FIELDS",
                    DEFAULT_PRODUCT_FIELDS,
                )),
                include: get_optional_env("BIGCOMMERCE_PRODUCT_INCLUDE"),
            },
            categories: FieldFilters::fields(get_env_or_default(
                "BIGCOMMERCE_CATEGORY_FIELDS",
                DEFAULT_CATEGORY_FIELDS,
            )),
        };

        Ok(Self {
            store_hash,
            access_token,
            api_base_url,
            timeout,
            channel_id,
            retry,
            catalog,
        })
    }

    /// Point the client at another API base (tests, proxies).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = Some(parse_base_url("BIGCOMMERCE_API_URL", url)?);
        Ok(self)
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the catalog filters.
    #[must_use]
    pub fn with_catalog_filters(mut self, catalog: CatalogFilters) -> Self {
        self.catalog = catalog;
        self
    }

    /// Base URL for this store: `{api_base_url}{store_hash}/`.
    ///
    /// # Errors
    ///
    /// Returns a URL parse error if the joined URL is invalid.
    pub fn store_url(&self) -> Result<Url, url::ParseError> {
        let base = match &self.api_base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_API_URL)?,
        };
        base.join(&format!("{}/", self.store_hash))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable with a default value.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL, forcing a trailing slash so relative joins append.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
