//! App server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BIGCOMMERCE_CLIENT_ID` - App client id from the developer portal
//! - `BIGCOMMERCE_CLIENT_SECRET` - App client secret (high entropy, signs payloads)
//! - `APP_HOSTNAME` - Public hostname the app is served from (redirect URI host)
//!
//! ## Optional
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `BIGCOMMERCE_LOGIN_URL` - OAuth token endpoint (default: BigCommerce login)
//! - `BIGCOMMERCE_API_URL` - REST API base for installed stores

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use bigcommerce_client::auth::DEFAULT_TOKEN_URL;
use bigcommerce_client::config::DEFAULT_API_URL;
use bigcommerce_client::{App, BigCommerceError};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// App server configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public hostname registered with BigCommerce
    pub hostname: String,
    /// App client id
    pub client_id: String,
    /// App client secret
    pub client_secret: SecretString,
    /// OAuth token endpoint
    pub login_url: String,
    /// REST API base for installed stores
    pub api_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("hostname", &self.hostname)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the client secret fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("APP_HOST", "127.0.0.1")
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("APP_PORT", "3000")
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            hostname: get_required_env("APP_HOSTNAME")?,
            client_id: get_required_env("BIGCOMMERCE_CLIENT_ID")?,
            client_secret: get_validated_secret("BIGCOMMERCE_CLIENT_SECRET")?,
            login_url: get_optional_env("BIGCOMMERCE_LOGIN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            api_url: get_env_or_default("BIGCOMMERCE_API_URL", DEFAULT_API_URL),
        })
    }

    /// Get the socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Build the OAuth app these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the token URL or HTTP client are invalid.
    pub fn build_app(&self) -> Result<App, BigCommerceError> {
        App::builder(
            self.hostname.clone(),
            self.client_id.clone(),
            SecretString::from(self.client_secret.expose_secret()),
        )
        .token_url(self.login_url.clone())
        .api_base_url(self.api_url.clone())
        .build()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
