//! Collection fetches against the mock API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bigcommerce_client::config::DEFAULT_PRODUCT_FIELDS;
use bigcommerce_client::{FetchFailure, RetryMode};
use bigcommerce_integration_tests::{MockApi, page_of, pages, store_path};
use serde_json::{Value, json};

fn products(n: i64) -> Vec<Value> {
    (1..=n)
        .map(|id| json!({"id": id, "name": format!("Product {id}"), "is_visible": true}))
        .collect()
}

/// Products served `per_page` at a time; `failing_page` answers `fail_status`
/// for its first `fail_times` requests.
fn catalog(
    items: Vec<Value>,
    per_page: usize,
    failing_page: u32,
    fail_status: StatusCode,
    fail_times: u32,
) -> Router {
    let pages = Arc::new(pages(&items, per_page));
    let failures = Arc::new(AtomicU32::new(fail_times));
    Router::new().route(
        &store_path("v3/catalog/products"),
        get(move |Query(query): Query<Vec<(String, String)>>| {
            let pages = Arc::clone(&pages);
            let failures = Arc::clone(&failures);
            async move {
                let page = page_of(&query);
                if page == failing_page
                    && failures
                        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                        .is_ok()
                {
                    return (fail_status, "try again").into_response();
                }
                let index = usize::try_from(page - 1).unwrap();
                pages.get(index).map_or_else(
                    || StatusCode::NOT_FOUND.into_response(),
                    |body| axum::Json(body.clone()).into_response(),
                )
            }
        }),
    )
}

fn ids(items: &[bigcommerce_client::Product]) -> Vec<i64> {
    items.iter().map(|p| p.id.as_i64()).collect()
}

#[tokio::test]
async fn test_all_pages_in_order() {
    let api = MockApi::start(catalog(products(5), 2, 0, StatusCode::OK, 0)).await;
    let client = api.client(1, RetryMode::RetrySamePage);

    let all = client.get_all_products().await.unwrap();
    assert_eq!(ids(&all), vec![1, 2, 3, 4, 5]);

    let requests = api.requests_to("/v3/catalog/products");
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].param("page").as_deref(), Some("1"));
    assert_eq!(requests[0].param("limit").as_deref(), Some("250"));
    assert_eq!(
        requests[0].param("include_fields").as_deref(),
        Some(DEFAULT_PRODUCT_FIELDS)
    );
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let api = MockApi::start(catalog(products(5), 2, 2, StatusCode::SERVICE_UNAVAILABLE, 1)).await;
    let client = api.client(1, RetryMode::RetrySamePage);

    let all = client.get_all_products().await.unwrap();
    assert_eq!(ids(&all), vec![1, 2, 3, 4, 5]);
    assert_eq!(api.requests_to("/v3/catalog/products").len(), 4);
}

#[tokio::test]
async fn test_exhausted_budget_returns_earlier_pages() {
    let api = MockApi::start(catalog(products(5), 2, 2, StatusCode::BAD_GATEWAY, u32::MAX)).await;
    let client = api.client(1, RetryMode::RetrySamePage);

    let err = client.get_all_products().await.unwrap_err();
    assert_eq!(ids(&err.items), vec![1, 2]);
    assert_eq!(err.page, 2);
    assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));

    let page_two = api
        .requests_to("/v3/catalog/products")
        .into_iter()
        .filter(|r| r.param("page").as_deref() == Some("2"))
        .count();
    assert_eq!(page_two, 2);
}

#[tokio::test]
async fn test_zero_budget_gives_up_after_one_failure() {
    let api = MockApi::start(catalog(products(5), 2, 2, StatusCode::SERVICE_UNAVAILABLE, u32::MAX)).await;
    let client = api.client(0, RetryMode::RetrySamePage);

    let err = client.get_all_products().await.unwrap_err();
    assert_eq!(err.items.len(), 2);
    assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
    assert_eq!(api.requests_to("/v3/catalog/products").len(), 2);
}

#[tokio::test]
async fn test_stop_mode_interrupts_on_first_failure() {
    let api = MockApi::start(catalog(products(5), 2, 2, StatusCode::SERVICE_UNAVAILABLE, 1)).await;
    let client = api.client(1, RetryMode::StopOnFirstFailure);

    let err = client.get_all_products().await.unwrap_err();
    assert_eq!(ids(&err.items), vec![1, 2]);
    assert!(matches!(err.kind, FetchFailure::Interrupted(_)));
    assert_eq!(api.requests_to("/v3/catalog/products").len(), 2);
}

#[tokio::test]
async fn test_fatal_status_is_not_retried() {
    let api = MockApi::start(catalog(products(5), 2, 2, StatusCode::FORBIDDEN, 1)).await;
    let client = api.client(3, RetryMode::RetrySamePage);

    let err = client.get_all_products().await.unwrap_err();
    assert_eq!(err.items.len(), 2);
    assert!(matches!(err.kind, FetchFailure::Fatal(_)));
    assert_eq!(err.error().and_then(bigcommerce_client::BigCommerceError::status), Some(StatusCode::FORBIDDEN));
    assert_eq!(api.requests_to("/v3/catalog/products").len(), 2);
}

#[tokio::test]
async fn test_buffered_fetch_keeps_page_order() {
    let api = MockApi::start(catalog(products(9), 2, 3, StatusCode::SERVICE_UNAVAILABLE, 1)).await;
    let client = api.client(1, RetryMode::RetrySamePage);

    let all = client
        .paginator()
        .fetch_all_buffered(3, |page| client.get_products(page))
        .await
        .unwrap();
    assert_eq!(ids(&all), (1..=9).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_empty_collection() {
    let api = MockApi::start(catalog(Vec::new(), 2, 0, StatusCode::OK, 0)).await;
    let client = api.client(1, RetryMode::RetrySamePage);

    assert!(client.get_all_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_content_page_ends_the_collection() {
    let router = Router::new().route(
        &store_path("v3/catalog/brands"),
        get(|| async { Response::builder().status(StatusCode::NO_CONTENT).body(axum::body::Body::empty()).unwrap() }),
    );
    let api = MockApi::start(router).await;
    let client = api.client(1, RetryMode::RetrySamePage);

    assert!(client.get_all_brands().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_fetch_reports_cancellation() {
    let api = MockApi::start(catalog(products(5), 2, 0, StatusCode::OK, 0)).await;
    let client = api.client(1, RetryMode::RetrySamePage);
    client.cancellation_token().cancel();

    let err = client.get_all_products().await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(err.items.is_empty());
}
