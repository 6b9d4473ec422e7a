//! Authentication for BigCommerce single-click apps.
//!
//! - [`signed_payload`] verifies the `signed_payload` BigCommerce sends to
//!   the load, uninstall and remove-user callbacks
//! - [`oauth`] exchanges the install callback's code for a store token

pub mod oauth;
pub mod signed_payload;

pub use oauth::{App, AppBuilder, AuthCallback, AuthContext, AuthUser, DEFAULT_TOKEN_URL};
pub use signed_payload::{
    PayloadUser, Segment, SignedPayloadClaims, SignedPayloadError, sign_payload, verify_claims,
    verify_signed_payload,
};
