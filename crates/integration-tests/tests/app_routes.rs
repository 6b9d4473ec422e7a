//! The app router driven with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use bigcommerce_app::routes::LoadResponse;
use bigcommerce_app::{AppConfig, AppState};
use bigcommerce_client::sign_payload;
use bigcommerce_core::StoreHash;
use bigcommerce_integration_tests::MockApi;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

const CLIENT_SECRET: &str = "kT9#vQ2$wL7!pZ4@";

fn config(mock: &MockApi) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        hostname: "app.example.test".to_string(),
        client_id: "client-id".to_string(),
        client_secret: SecretString::from(CLIENT_SECRET),
        login_url: format!("{}/oauth2/token", mock.base_url()),
        api_url: mock.api_url(),
    }
}

/// A login server that accepts code `good` only.
fn login_server() -> Router {
    Router::new().route(
        "/oauth2/token",
        post(|Json(body): Json<Value>| async move {
            if body["code"] != "good" {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"})));
            }
            assert_eq!(body["grant_type"], "authorization_code");
            assert_eq!(body["redirect_uri"], "https://app.example.test/auth");
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": "tok_live_7Gk2",
                    "scope": "store_v2_products",
                    "user": {"id": 24654, "username": "owner", "email": "owner@example.test"},
                    "context": body["context"]
                })),
            )
        }),
    )
}

async fn setup() -> (MockApi, AppState) {
    let mock = MockApi::start(login_server()).await;
    let state = AppState::new(config(&mock)).unwrap();
    (mock, state)
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
    let response = bigcommerce_app::router(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, String) {
    send(state, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn signed(claims: &Value, secret: &str) -> String {
    let payload = serde_json::to_vec(claims).unwrap();
    let signed = sign_payload(&payload, &SecretString::from(secret)).unwrap();
    url::form_urlencoded::byte_serialize(signed.as_bytes()).collect()
}

fn claims() -> Value {
    json!({
        "user": {"id": 24654, "email": "owner@example.test"},
        "owner": {"id": 24654, "email": "owner@example.test"},
        "context": "stores/abc123",
        "store_hash": "abc123",
        "timestamp": 1_700_000_000.0
    })
}

#[tokio::test]
async fn test_health() {
    let (_mock, state) = setup().await;
    assert_eq!(get(&state, "/health").await, (StatusCode::OK, "ok".to_string()));
}

#[tokio::test]
async fn test_install_then_load_then_uninstall() {
    let (_mock, state) = setup().await;

    let (status, body) = get(&state, "/auth?code=good&scope=store_v2_products&context=stores%2Fabc123").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains("abc123"));

    let store = StoreHash::parse("abc123").unwrap();
    assert!(state.installs().contains(&store).await);
    assert!(state.client_for(&store).await.unwrap().is_some());

    let (status, body) = get(&state, &format!("/load?signed_payload={}", signed(&claims(), CLIENT_SECRET))).await;
    assert_eq!(status, StatusCode::OK);
    let load: LoadResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(
        load,
        LoadResponse {
            store_hash: "abc123".to_string(),
            user_email: "owner@example.test".to_string(),
            installed: true,
        }
    );

    let (status, _) = get(&state, &format!("/uninstall?signed_payload={}", signed(&claims(), CLIENT_SECRET))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.installs().is_empty().await);
}

#[tokio::test]
async fn test_rejected_code_is_bad_gateway() {
    let (_mock, state) = setup().await;

    let (status, body) = get(&state, "/auth?code=stale&scope=x&context=stores%2Fabc123").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "External service error");
    assert!(state.installs().is_empty().await);
}

#[tokio::test]
async fn test_install_without_code_is_bad_request() {
    let (_mock, state) = setup().await;

    let (status, body) = get(&state, "/auth?scope=x&context=stores%2Fabc123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("missing code"));
}

#[tokio::test]
async fn test_load_rejects_bad_signatures() {
    let (_mock, state) = setup().await;

    for uri in [
        "/load".to_string(),
        "/load?signed_payload=".to_string(),
        "/load?signed_payload=no-dot-here".to_string(),
        format!("/load?signed_payload={}", signed(&claims(), "a-different-secret")),
        format!("/remove_user?signed_payload={}", signed(&claims(), "a-different-secret")),
    ] {
        let (status, body) = get(&state, &uri).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, "Not Authenticated");
    }
}

#[tokio::test]
async fn test_remove_user() {
    let (_mock, state) = setup().await;

    let (status, _) = get(&state, &format!("/remove_user?signed_payload={}", signed(&claims(), CLIENT_SECRET))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_webhook_delivery() {
    let (_mock, state) = setup().await;

    let payload = json!({
        "scope": "store/order/statusUpdated",
        "store_id": "1025646",
        "data": {"type": "order", "id": 250, "status": {"previous_status_id": 0, "new_status_id": 11}},
        "hash": "dd70c0976e06b67aaf671e73f49dcb79230ebf9d",
        "created_at": 1_561_482_670,
        "producer": "stores/abc123"
    });
    let request = Request::post("/webhooks")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    assert_eq!(send(&state, request).await.0, StatusCode::NO_CONTENT);

    let request = Request::post("/webhooks").body(Body::from("not json")).unwrap();
    assert_eq!(send(&state, request).await.0, StatusCode::BAD_REQUEST);
}
