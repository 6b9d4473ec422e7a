//! OAuth install flow for single-click apps.
//!
//! BigCommerce calls the app's `/auth` URL with `code`, `scope` and
//! `context`; [`App::get_auth_context`] trades them for a permanent store
//! access token.

use std::sync::Arc;
use std::time::Duration;

use bigcommerce_core::{ChannelId, StoreHash, UserId};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use url::Url;

use super::signed_payload::{self, SignedPayloadClaims, SignedPayloadError};
use crate::client::Client;
use crate::config::{ClientConfig, DEFAULT_API_URL};
use crate::error::BigCommerceError;
use crate::pagination::RetryPolicy;

/// BigCommerce's OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://login.bigcommerce.com/oauth2/token";

/// Query parameters of the install callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCallback {
    /// One-time authorization code.
    pub code: String,
    /// Space-separated granted scopes.
    pub scope: String,
    /// `stores/{hash}`.
    pub context: String,
}

/// The user who installed the app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// BigCommerce user id.
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
}

/// Result of a successful token exchange.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct AuthContext {
    /// Permanent store access token.
    pub access_token: SecretString,
    /// Granted scopes.
    pub scope: String,
    /// Installing user.
    pub user: AuthUser,
    /// `stores/{hash}`.
    pub context: String,
    /// Account the store belongs to.
    pub account_uuid: Option<String>,
    /// Deep-link path, when BigCommerce sends one.
    pub url: Option<String>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("user", &self.user)
            .field("context", &self.context)
            .field("account_uuid", &self.account_uuid)
            .field("url", &self.url)
            .finish()
    }
}

impl AuthContext {
    /// The store hash encoded in `context`.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::StoreHash` if `context` is not `stores/{hash}`.
    pub fn store_hash(&self) -> Result<StoreHash, BigCommerceError> {
        Ok(StoreHash::from_context(&self.context)?)
    }
}

/// Token request body.
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    scope: &'a str,
    grant_type: &'static str,
    redirect_uri: String,
    context: &'a str,
}

/// Token response body.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    user: AuthUser,
    #[serde(default)]
    context: String,
    #[serde(default)]
    account_uuid: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// A BigCommerce app: the credentials from the developer portal plus the
/// hostname the app is served from.
///
/// Holds no store-specific state; use [`App::client_for`] to talk to an
/// installed store.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    host: String,
    client_id: String,
    client_secret: SecretString,
    http: reqwest::Client,
    token_url: Url,
    api_base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    channel_id: ChannelId,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("host", &self.inner.host)
            .field("client_id", &self.inner.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.inner.token_url.as_str())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an app with BigCommerce's default endpoints.
    ///
    /// # Arguments
    ///
    /// * `host` - Hostname the app is served from (e.g. `app.example.com`)
    /// * `client_id` - App client id
    /// * `client_secret` - App client secret
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the HTTP client cannot be built.
    pub fn new(
        host: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, BigCommerceError> {
        Self::builder(host, client_id, client_secret).build()
    }

    /// Start building an app with non-default endpoints or settings.
    #[must_use]
    pub fn builder(
        host: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> AppBuilder {
        AppBuilder {
            host: host.into(),
            client_id: client_id.into(),
            client_secret,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            channel_id: ChannelId::new(1),
        }
    }

    /// Hostname the app is served from.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// App client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// The redirect URI registered for the install callback.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("https://{}/auth", self.inner.host)
    }

    /// Exchange an install callback for a store access token.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::OAuth` if BigCommerce rejects the code,
    /// `BigCommerceError::Http` if the request fails, or
    /// `BigCommerceError::Decode` if the response is not a token document.
    #[instrument(skip(self, callback), fields(context = %callback.context))]
    pub async fn get_auth_context(
        &self,
        callback: &AuthCallback,
    ) -> Result<AuthContext, BigCommerceError> {
        let request = TokenRequest {
            client_id: &self.inner.client_id,
            client_secret: self.inner.client_secret.expose_secret(),
            code: &callback.code,
            scope: &callback.scope,
            grant_type: "authorization_code",
            redirect_uri: self.redirect_uri(),
            context: &callback.context,
        };

        let response = self
            .inner
            .http
            .post(self.inner.token_url.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        let context = parse_token_response(status, &body)?;
        info!(context = %context.context, user_id = %context.user.id, "App installed");
        Ok(context)
    }

    /// Check a signed payload against the app secret and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns a `SignedPayloadError` if the payload is missing, malformed or
    /// not signed with this app's secret.
    pub fn verify_signed_payload(&self, signed_payload: &str) -> Result<Vec<u8>, SignedPayloadError> {
        signed_payload::verify_signed_payload(signed_payload, &self.inner.client_secret)
    }

    /// Verify a load/uninstall/remove-user callback and decode its claims.
    ///
    /// # Errors
    ///
    /// Returns a `SignedPayloadError` if verification or decoding fails.
    pub fn client_request(&self, signed_payload: &str) -> Result<SignedPayloadClaims, SignedPayloadError> {
        signed_payload::verify_claims(signed_payload, &self.inner.client_secret).inspect_err(|e| {
            warn!(error = %e, "Rejected signed payload");
        })
    }

    /// Sign a payload with this app's secret, in BigCommerce's wire format.
    ///
    /// # Errors
    ///
    /// Returns `SignedPayloadError::InvalidKey` if the secret is unusable.
    pub fn sign_payload(&self, payload: &[u8]) -> Result<String, SignedPayloadError> {
        signed_payload::sign_payload(payload, &self.inner.client_secret)
    }

    /// A client for an installed store, sharing this app's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL or HTTP client are invalid.
    pub fn client_for(
        &self,
        store_hash: StoreHash,
        access_token: SecretString,
    ) -> Result<Client, BigCommerceError> {
        let mut config =
            ClientConfig::new(store_hash, access_token).with_api_base_url(&self.inner.api_base_url)?;
        config.timeout = self.inner.timeout;
        config.retry = self.inner.retry;
        config.channel_id = self.inner.channel_id;
        Client::new(config)
    }
}

/// Builder for [`App`].
#[derive(Debug)]
#[must_use]
pub struct AppBuilder {
    host: String,
    client_id: String,
    client_secret: SecretString,
    token_url: String,
    api_base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    channel_id: ChannelId,
}

impl AppBuilder {
    /// Override the OAuth token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the API base used by [`App::client_for`].
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Per-request timeout.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry policy handed to store clients.
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Channel handed to store clients.
    pub const fn channel_id(mut self, channel_id: ChannelId) -> Self {
        self.channel_id = channel_id;
        self
    }

    /// Build the app.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Url` for an invalid token URL, or
    /// `BigCommerceError::Http` if the HTTP client cannot be built.
    pub fn build(self) -> Result<App, BigCommerceError> {
        let token_url = Url::parse(&self.token_url)?;
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(App {
            inner: Arc::new(AppInner {
                host: self.host,
                client_id: self.client_id,
                client_secret: self.client_secret,
                http,
                token_url,
                api_base_url: self.api_base_url,
                timeout: self.timeout,
                retry: self.retry,
                channel_id: self.channel_id,
            }),
        })
    }
}

/// Turn a token endpoint response into an [`AuthContext`].
///
/// BigCommerce reports some failures with a success status and an
/// `invalid_*` error code in the body.
fn parse_token_response(status: StatusCode, body: &[u8]) -> Result<AuthContext, BigCommerceError> {
    let text = String::from_utf8_lossy(body);
    if !status.is_success() || text.contains("invalid_") {
        return Err(BigCommerceError::OAuth(format!(
            "Token exchange failed ({status}): {text}"
        )));
    }

    let token: TokenResponse = serde_json::from_slice(body)?;
    Ok(AuthContext {
        access_token: SecretString::from(token.access_token),
        scope: token.scope,
        user: token.user,
        context: token.context,
        account_uuid: token.account_uuid,
        url: token.url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(
            "app.example.com",
            "client-id",
            SecretString::from("s3cr3t-9fK2xQ"),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_token_response() {
        let body = br#"{
            "access_token": "ACCESS_TOKEN",
            "scope": "store_v2_orders store_v2_products",
            "user": {"id": 24654, "username": "merchant", "email": "merchant@example.com"},
            "context": "stores/abc123",
            "account_uuid": "a1b2c3"
        }"#;
        let context = parse_token_response(StatusCode::OK, body).unwrap();
        assert_eq!(context.access_token.expose_secret(), "ACCESS_TOKEN");
        assert_eq!(context.user.id, UserId::new(24654));
        assert_eq!(context.store_hash().unwrap().as_str(), "abc123");
        assert_eq!(context.account_uuid.as_deref(), Some("a1b2c3"));
    }

    #[test]
    fn test_invalid_grant_in_success_body() {
        let body = br#"{"error": "invalid_grant", "error_description": "code expired"}"#;
        assert!(matches!(
            parse_token_response(StatusCode::OK, body),
            Err(BigCommerceError::OAuth(_))
        ));
    }

    #[test]
    fn test_error_status() {
        let err = parse_token_response(StatusCode::UNAUTHORIZED, b"nope").unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_redirect_uri() {
        assert_eq!(app().redirect_uri(), "https://app.example.com/auth");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", app());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cr3t-9fK2xQ"));

        let context = parse_token_response(
            StatusCode::OK,
            br#"{"access_token": "TOKEN_VALUE", "context": "stores/abc"}"#,
        )
        .unwrap();
        assert!(!format!("{context:?}").contains("TOKEN_VALUE"));
    }

    #[test]
    fn test_sign_and_verify_with_app_secret() {
        let app = app();
        let signed = app.sign_payload(br#"{"store_hash":"abc123"}"#).unwrap();
        let claims = app.client_request(&signed).unwrap();
        assert_eq!(claims.store_hash.as_str(), "abc123");

        let other = App::new("app.example.com", "client-id", SecretString::from("other")).unwrap();
        assert!(matches!(
            other.verify_signed_payload(&signed),
            Err(SignedPayloadError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_client_for_shares_settings() {
        let app = App::builder("app.example.com", "id", SecretString::from("s3cr3t-9fK2xQ"))
            .api_base_url("http://127.0.0.1:9/stores/")
            .channel_id(ChannelId::new(7))
            .build()
            .unwrap();
        let client = app
            .client_for(StoreHash::parse("abc123").unwrap(), SecretString::from("t"))
            .unwrap();
        assert_eq!(client.config().channel_id, ChannelId::new(7));
        assert_eq!(client.store_hash().as_str(), "abc123");
    }
}
