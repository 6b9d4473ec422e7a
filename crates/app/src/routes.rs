//! HTTP routes for the app's BigCommerce callbacks.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /health` | Liveness |
//! | `GET /auth` | Install: exchange the OAuth code for a store token |
//! | `GET /load` | App opened in the control panel |
//! | `GET /uninstall` | App removed from a store |
//! | `GET /remove_user` | A store user lost access |
//! | `POST /webhooks` | Webhook deliveries |

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use bigcommerce_client::{AuthCallback, WebhookPayload};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::extract::SignedPayload;
use crate::state::{AppState, Install};

/// Build the router for all callback routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth", get(auth))
        .route("/load", get(load))
        .route("/uninstall", get(uninstall))
        .route("/remove_user", get(remove_user))
        .route("/webhooks", post(webhook))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Query parameters of the install callback; all are required.
#[derive(Debug, Deserialize)]
struct AuthQuery {
    code: Option<String>,
    scope: Option<String>,
    context: Option<String>,
}

impl AuthQuery {
    fn into_callback(self) -> Result<AuthCallback> {
        let missing = |name: &str| AppError::BadRequest(format!("missing {name}"));
        Ok(AuthCallback {
            code: self.code.filter(|v| !v.is_empty()).ok_or_else(|| missing("code"))?,
            scope: self.scope.unwrap_or_default(),
            context: self
                .context
                .filter(|v| !v.is_empty())
                .ok_or_else(|| missing("context"))?,
        })
    }
}

#[instrument(skip(state, query))]
async fn auth(State(state): State<AppState>, Query(query): Query<AuthQuery>) -> Result<String> {
    let callback = query.into_callback()?;
    let context = state.app().get_auth_context(&callback).await?;
    let install = Install::from_auth_context(&context)?;
    let store_hash = install.store_hash.clone();

    if state.installs().insert(install).await.is_some() {
        info!(%store_hash, "Store re-installed the app");
    } else {
        info!(%store_hash, "Store installed the app");
    }

    Ok(format!("App installed for store {store_hash}"))
}

/// Response body of `GET /load`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadResponse {
    pub store_hash: String,
    pub user_email: String,
    pub installed: bool,
}

#[instrument(skip_all, fields(store_hash = %claims.store_hash))]
async fn load(State(state): State<AppState>, SignedPayload(claims): SignedPayload) -> Json<LoadResponse> {
    let installed = state.installs().contains(&claims.store_hash).await;
    Json(LoadResponse {
        store_hash: claims.store_hash.to_string(),
        user_email: claims.user.email,
        installed,
    })
}

#[instrument(skip_all, fields(store_hash = %claims.store_hash))]
async fn uninstall(State(state): State<AppState>, SignedPayload(claims): SignedPayload) -> StatusCode {
    if state.installs().remove(&claims.store_hash).await.is_some() {
        info!("Store uninstalled the app");
    } else {
        info!("Uninstall for a store that was not installed");
    }
    StatusCode::NO_CONTENT
}

#[instrument(skip_all, fields(store_hash = %claims.store_hash, user_id = %claims.user.id))]
async fn remove_user(SignedPayload(claims): SignedPayload) -> StatusCode {
    info!(email = %claims.user.email, "User removed from app");
    StatusCode::NO_CONTENT
}

#[instrument(skip_all)]
async fn webhook(body: Bytes) -> Result<StatusCode> {
    let payload = WebhookPayload::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid webhook payload: {e}")))?;

    info!(
        scope = %payload.scope,
        producer = %payload.producer,
        store_hash = payload.store_hash().map(|h| h.to_string()).unwrap_or_default(),
        resource_id = payload.data.id,
        "Webhook received"
    );
    Ok(StatusCode::NO_CONTENT)
}
