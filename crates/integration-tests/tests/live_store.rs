//! Read-only checks against a real store.
//!
//! These tests require `BIGCOMMERCE_STORE_HASH` and
//! `BIGCOMMERCE_ACCESS_TOKEN` for a store with catalog read scope.
//!
//! Run with: cargo test -p bigcommerce-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use bigcommerce_client::{Client, ClientConfig};

fn client() -> Client {
    Client::new(ClientConfig::from_env().expect("BIGCOMMERCE_* credentials not set")).unwrap()
}

#[tokio::test]
#[ignore = "Requires BigCommerce store credentials"]
async fn test_store_info() {
    let info = client().get_store_info().await.unwrap();
    assert!(!info.domain.is_empty());
}

#[tokio::test]
#[ignore = "Requires BigCommerce store credentials"]
async fn test_products_sequential_and_buffered_agree() {
    let client = client();
    let sequential = client.get_all_products().await.unwrap();
    let buffered = client
        .paginator()
        .fetch_all_buffered(4, |page| client.get_products(page))
        .await
        .unwrap();

    let ids = |items: &[bigcommerce_client::Product]| items.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids(&sequential), ids(&buffered));
}

#[tokio::test]
#[ignore = "Requires BigCommerce store credentials"]
async fn test_category_tree_resolves() {
    let tree = client().get_category_tree().await.unwrap();
    for node in tree.iter() {
        assert!(node.full_name.ends_with(&node.category.name));
    }
}

#[tokio::test]
#[ignore = "Requires BigCommerce store credentials"]
async fn test_channels_include_default() {
    let channels = client().get_all_channels().await.unwrap();
    assert!(channels.iter().any(|c| c.id.as_i64() == 1));
}
