//! Errors returned by the BigCommerce client.

use std::collections::BTreeMap;

use bigcommerce_core::StoreHashError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::pagination::RetryClassify;

/// Errors that can occur when interacting with the BigCommerce API.
#[derive(Debug, Error)]
pub enum BigCommerceError {
    /// HTTP request failed (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body did not match the expected JSON shape.
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API answered 404.
    #[error("Not found")]
    NotFound,

    /// The API answered 204 where a body was expected.
    #[error("No content")]
    NoContent,

    /// The API answered 422 with field-level validation errors.
    #[error("Unprocessable entity: {0}")]
    Unprocessable(String),

    /// Any other non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        /// Response status.
        status: StatusCode,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// Data was well-formed JSON but violated an invariant (e.g. a
    /// category parent cycle, an empty create response).
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// A required input field was not set.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The OAuth token exchange was rejected.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The operation was cancelled before it completed.
    #[error("Cancelled")]
    Cancelled,

    /// Client settings were invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A store hash failed validation.
    #[error("Invalid store hash: {0}")]
    StoreHash(#[from] StoreHashError),
}

impl BigCommerceError {
    /// Build the error for a non-success response.
    ///
    /// 404 and 204 map to their dedicated variants; 422 bodies are parsed
    /// into a readable list of field errors.
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::NO_CONTENT => Self::NoContent,
            StatusCode::UNPROCESSABLE_ENTITY => Self::Unprocessable(
                serde_json::from_slice::<ErrorResult>(body)
                    .map_or_else(|_| String::from_utf8_lossy(body).into_owned(), |e| e.summary()),
            ),
            _ => Self::Api {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::NoContent => Some(StatusCode::NO_CONTENT),
            Self::Unprocessable(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl RetryClassify for BigCommerceError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Self::Api { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// Error body BigCommerce returns for validation failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorResult {
    /// Echoed HTTP status.
    pub status: u16,
    /// Short description.
    pub title: String,
    /// Documentation link for the error type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Field name → message.
    pub errors: BTreeMap<String, String>,
}

impl ErrorResult {
    /// Field errors joined with `", "`, falling back to the title.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            if self.title.is_empty() {
                return "unknown error".to_string();
            }
            return self.title.clone();
        }
        self.errors.values().cloned().collect::<Vec<_>>().join(", ")
    }
}
