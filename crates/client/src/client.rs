//! HTTP plumbing shared by every resource.

use std::sync::Arc;

use bigcommerce_core::{Envelope, StoreHash};
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult, Paginator};

/// Page size requested from collection endpoints.
pub(crate) const PAGE_LIMIT: u32 = 250;

const USER_AGENT: &str = concat!("bigcommerce-rs/", env!("CARGO_PKG_VERSION"));

/// BigCommerce REST API client for one store.
///
/// Cheap to clone; clones share the connection pool and cancellation token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    store_url: Url,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::Http` if the HTTP client cannot be built,
    /// or `BigCommerceError::Url` if the store URL is invalid.
    pub fn new(config: ClientConfig) -> Result<Self, BigCommerceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let store_url = config.store_url()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store_url,
            }),
            cancel: CancellationToken::new(),
        })
    }

    /// Share a cancellation token with this client's collection fetches.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts in-flight collection fetches.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The store this client talks to.
    #[must_use]
    pub fn store_hash(&self) -> &StoreHash {
        &self.inner.config.store_hash
    }

    /// A paginator using this client's retry policy and cancellation token.
    #[must_use]
    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.inner.config.retry).with_cancellation(self.cancel.clone())
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    /// Build `{store_url}{path}?{query}`.
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, BigCommerceError> {
        let mut url = self.inner.store_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header("X-Auth-Token", self.inner.config.access_token.expose_secret())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and map non-success statuses to errors.
    pub(crate) async fn send(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Response, BigCommerceError> {
        let path = url.path().to_owned();
        let mut request = self.request(method.clone(), url);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path = %path, status = status.as_u16(), "BigCommerce request");

        if status == StatusCode::NO_CONTENT {
            return Err(BigCommerceError::NoContent);
        }
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        Err(BigCommerceError::from_status(status, &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BigCommerceError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET and decode the raw body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BigCommerceError> {
        let url = self.url(path, query)?;
        let response = self.send(Method::GET, url, None).await?;
        Self::decode(response).await
    }

    /// GET a v3 `{data, meta}` body and return `data`.
    pub(crate) async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BigCommerceError> {
        Ok(self.get_json::<Envelope<T>>(path, query).await?.data)
    }

    /// Send a JSON body and decode the raw response body.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, BigCommerceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, query)?;
        let body = serde_json::to_vec(body)?;
        let response = self.send(method, url, Some(body)).await?;
        Self::decode(response).await
    }

    /// Send a JSON body to a v3 endpoint and return `data`.
    pub(crate) async fn send_data<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, BigCommerceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Ok(self
            .send_json::<B, Envelope<T>>(method, path, query, body)
            .await?
            .data)
    }

    /// Send a request whose response body is irrelevant.
    ///
    /// Both 204 and 2xx-with-body count as success.
    pub(crate) async fn send_empty<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<(), BigCommerceError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path, query)?;
        let body = body.map(serde_json::to_vec).transpose()?;
        match self.send(method, url, body).await {
            Ok(_) | Err(BigCommerceError::NoContent) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// DELETE, accepting 204 or 200.
    pub(crate) async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<(), BigCommerceError> {
        self.send_empty::<()>(Method::DELETE, path, query, None).await
    }

    // =========================================================================
    // Pagination helpers
    // =========================================================================

    /// Fetch one page of a v3 collection.
    ///
    /// A 204 becomes an empty terminal page.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page: u32,
    ) -> Result<PageResult<T>, BigCommerceError> {
        let page = page.to_string();
        let limit = PAGE_LIMIT.to_string();
        let mut query = query.to_vec();
        query.extend([("page", page.as_str()), ("limit", limit.as_str())]);

        match self.get_json::<Envelope<Vec<T>>>(path, &query).await {
            Ok(envelope) => Ok(PageResult::from_envelope(envelope)),
            Err(BigCommerceError::NoContent) => Ok(PageResult::empty()),
            Err(e) => Err(e),
        }
    }

    /// Fetch one page of a v2 collection (bare JSON array, no metadata).
    pub(crate) async fn get_v2_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page: u32,
    ) -> Result<PageResult<T>, BigCommerceError> {
        let page = page.to_string();
        let limit = PAGE_LIMIT.to_string();
        let mut query = query.to_vec();
        query.extend([("page", page.as_str()), ("limit", limit.as_str())]);

        match self.get_json::<Vec<T>>(path, &query).await {
            Ok(items) => Ok(PageResult::from_unpaginated(items)),
            Err(BigCommerceError::NoContent) => Ok(PageResult::empty()),
            Err(e) => Err(e),
        }
    }

    /// Fetch every page of a v3 collection.
    pub(crate) async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, IncompleteFetch<T, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_page(path, query, page))
            .await
    }

    /// Fetch every page of a v2 collection.
    pub(crate) async fn get_all_v2<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, IncompleteFetch<T, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_v2_page(path, query, page))
            .await
    }
}
