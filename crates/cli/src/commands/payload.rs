//! Signed payload tools for app developers.

use bigcommerce_client::{sign_payload, verify_signed_payload};
use secrecy::SecretString;

use super::CliResult;
use crate::output;

fn client_secret() -> Result<SecretString, Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    std::env::var("BIGCOMMERCE_CLIENT_SECRET")
        .map(SecretString::from)
        .map_err(|_| "BIGCOMMERCE_CLIENT_SECRET not set".into())
}

/// Verify a signed payload and print the JSON it carries.
///
/// # Errors
///
/// Returns an error if the secret is missing or verification fails.
pub fn verify(signed_payload: &str) -> CliResult {
    let payload = verify_signed_payload(signed_payload, &client_secret()?)?;
    let json: serde_json::Value = serde_json::from_slice(&payload)?;
    output::print_one(&json)?;
    Ok(())
}

/// Sign a JSON document and print the signed payload.
///
/// The document is re-serialised compactly before signing.
///
/// # Errors
///
/// Returns an error if the secret is missing or `json` does not parse.
pub fn sign(json: &str) -> CliResult {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let payload = serde_json::to_vec(&value)?;
    output::print_raw(&sign_payload(&payload, &client_secret()?)?);
    Ok(())
}
