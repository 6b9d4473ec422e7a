//! Integration tests for the BigCommerce workspace.
//!
//! # Running Tests
//!
//! ```bash
//! # Mock-backed tests (no network)
//! cargo test -p bigcommerce-integration-tests
//!
//! # Live store tests (needs BIGCOMMERCE_STORE_HASH / BIGCOMMERCE_ACCESS_TOKEN)
//! cargo test -p bigcommerce-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `pagination` - collection fetches against the mock API
//! - `resources` - resource operations against the mock API
//! - `app_routes` - the app router driven with `tower::ServiceExt::oneshot`
//! - `live_store` - read-only checks against a real store (ignored by default)
//!
//! [`MockApi`] serves an axum router on `127.0.0.1:0` and records every
//! request it receives so tests can assert on call counts and query strings.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use bigcommerce_client::{Client, ClientConfig, RetryMode, RetryPolicy};
use bigcommerce_core::StoreHash;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Store hash every mock-backed client talks to.
pub const STORE_HASH: &str = "abc123";

/// A request seen by the mock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: String,
}

impl Recorded {
    /// Value of a query parameter, percent-decoded.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        url_decode_pairs(&self.query)
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

fn url_decode_pairs(query: &str) -> Vec<(String, String)> {
    axum::extract::Query::<Vec<(String, String)>>::try_from_uri(
        &format!("/?{query}").parse().unwrap_or_default(),
    )
    .map(|q| q.0)
    .unwrap_or_default()
}

/// An in-process stand-in for the BigCommerce REST API.
pub struct MockApi {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Serve `router` on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(router: Router) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let router = router.layer(middleware::from_fn(move |request: Request, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(Recorded {
                        method: request.method().clone(),
                        path: request.uri().path().to_string(),
                        query: request.uri().query().unwrap_or_default().to_string(),
                    });
                next.run(request).await
            }
        }));

        #[allow(clippy::unwrap_used)]
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        #[allow(clippy::unwrap_used)]
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            server,
        }
    }

    /// `http://127.0.0.1:{port}`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The API base a client should use (`{base}/stores/`).
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/stores/", self.base_url)
    }

    /// A client for [`STORE_HASH`] with no retry backoff.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn client(&self, max_retries: u32, mode: RetryMode) -> Client {
        let config = ClientConfig::new(
            StoreHash::parse(STORE_HASH).unwrap(),
            SecretString::from("tok_mock_8Hq2"),
        )
        .with_api_base_url(&self.api_url())
        .unwrap()
        .with_retry(RetryPolicy {
            max_retries,
            mode,
            backoff: Duration::ZERO,
        });
        Client::new(config).unwrap()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests whose path ends with `suffix`.
    #[must_use]
    pub fn requests_to(&self, suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Path of a store endpoint as the mock sees it.
#[must_use]
pub fn store_path(endpoint: &str) -> String {
    format!("/stores/{STORE_HASH}/{}", endpoint.trim_start_matches('/'))
}

/// A v3 collection envelope for one page.
#[must_use]
pub fn envelope(items: &[Value], current_page: u32, total_pages: u32, total: usize) -> Value {
    json!({
        "data": items,
        "meta": {
            "pagination": {
                "total": total,
                "count": items.len(),
                "per_page": 250,
                "current_page": current_page,
                "total_pages": total_pages,
                "links": {"current": format!("?page={current_page}&limit=250")}
            }
        }
    })
}

/// Split `items` into v3 envelopes of `per_page`.
#[must_use]
pub fn pages(items: &[Value], per_page: usize) -> Vec<Value> {
    let chunks: Vec<&[Value]> = items.chunks(per_page.max(1)).collect();
    let total_pages = u32::try_from(chunks.len().max(1)).unwrap_or(u32::MAX);
    if chunks.is_empty() {
        return vec![envelope(&[], 1, 1, 0)];
    }
    chunks
        .iter()
        .zip(1..)
        .map(|(chunk, page)| envelope(chunk, page, total_pages, items.len()))
        .collect()
}

/// The `page` query parameter of a request, defaulting to 1.
#[must_use]
pub fn page_of(query: &[(String, String)]) -> u32 {
    query
        .iter()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(1)
}
