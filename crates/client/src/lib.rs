//! BigCommerce REST API client.
//!
//! Typed access to a store's v2/v3 REST API plus the authentication pieces a
//! BigCommerce single-click app needs.
//!
//! # Architecture
//!
//! - [`Client`] wraps one `reqwest::Client` per store (`Arc` inner, cheap to clone)
//! - [`pagination`] turns any "fetch page N" closure into "fetch everything"
//!   with a bounded retry budget and cooperative cancellation
//! - [`auth`] verifies `signed_payload` callbacks and exchanges OAuth codes
//! - [`capabilities`] groups operations into narrow traits so callers can
//!   depend on (and test against) only what they use
//! - [`resources`] holds the per-endpoint request/response types
//!
//! # Example
//!
//! ```rust,ignore
//! use bigcommerce_client::{Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig::from_env()?)?;
//!
//! // Every page, in order, retried on transient failures
//! let products = client.get_all_products().await?;
//!
//! // Category names like "Shoes > Running > Trail"
//! let tree = client.get_category_tree().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod capabilities;
mod client;
pub mod config;
mod error;
pub mod mock;
pub mod pagination;
pub mod resources;

pub use auth::{
    App, AuthCallback, AuthContext, SignedPayloadClaims, SignedPayloadError, sign_payload,
    verify_signed_payload,
};
pub use capabilities::{
    AddressClient, BlogClient, CartClient, CatalogClient, CustomerClient, StoreClient,
    WebhookClient,
};
pub use client::Client;
pub use config::{CatalogFilters, ClientConfig, ConfigError, FieldFilters};
pub use error::{BigCommerceError, ErrorResult};
pub use pagination::{
    FetchFailure, IncompleteFetch, PageResult, Paginator, RetryClassify, RetryMode, RetryPolicy,
};
pub use resources::*;

pub use bigcommerce_core as core;
