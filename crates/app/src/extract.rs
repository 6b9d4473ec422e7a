//! Extractor for BigCommerce `signed_payload` callbacks.

use axum::{
    extract::{FromRequestParts, Query},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use bigcommerce_client::SignedPayloadClaims;
use serde::Deserialize;

use crate::state::AppState;

/// Extractor that requires a valid `signed_payload` query parameter.
///
/// The payload is verified against the app's client secret before the
/// handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn load(SignedPayload(claims): SignedPayload) -> impl IntoResponse {
///     format!("Hello, {}!", claims.user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SignedPayload(pub SignedPayloadClaims);

/// Returned when the payload is absent or fails verification.
#[derive(Debug)]
pub struct NotAuthenticated;

impl IntoResponse for NotAuthenticated {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "Not Authenticated").into_response()
    }
}

#[derive(Deserialize)]
struct SignedPayloadQuery {
    #[serde(default)]
    signed_payload: String,
}

impl FromRequestParts<AppState> for SignedPayload {
    type Rejection = NotAuthenticated;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<SignedPayloadQuery>::try_from_uri(&parts.uri).map_err(|_| NotAuthenticated)?;

        // `client_request` logs the rejection reason
        state
            .app()
            .client_request(&query.signed_payload)
            .map(Self)
            .map_err(|_| NotAuthenticated)
    }
}
