//! Webhook registration.

use std::collections::BTreeMap;

use bigcommerce_core::WebhookId;
use tracing::info;

use super::{CliResult, client, emit_all};
use crate::FetchArgs;
use crate::output;

/// Parse a `name=value` header argument.
///
/// # Errors
///
/// Returns a message if there is no `=` or the name is empty.
pub fn parse_header(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got {arg:?}")),
    }
}

/// Print every registered webhook.
///
/// # Errors
///
/// Returns an error if the fetch is incomplete (after printing what was fetched).
pub async fn list(args: FetchArgs) -> CliResult {
    let client = client(args)?;
    emit_all(client.get_all_webhooks().await)
}

/// Register a webhook and print it.
///
/// # Errors
///
/// Returns an error if the client cannot be configured or BigCommerce
/// rejects the hook.
pub async fn create(scope: &str, destination: &str, headers: Vec<(String, String)>) -> CliResult {
    let client = client(FetchArgs::default())?;
    let headers: BTreeMap<_, _> = headers.into_iter().collect();
    let webhook = client.create_webhook(scope, destination, &headers).await?;
    output::print_one(&webhook)?;
    Ok(())
}

/// Delete a webhook.
///
/// # Errors
///
/// Returns an error if the client cannot be configured or the delete fails.
pub async fn delete(id: i64) -> CliResult {
    let client = client(FetchArgs::default())?;
    client.delete_webhook(WebhookId::new(id)).await?;
    info!(webhook_id = id, "webhook deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Custom=a=b"),
            Ok(("X-Custom".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_header("X-Empty="), Ok(("X-Empty".to_string(), String::new())));
        assert!(parse_header("no-equals").is_err());
        assert!(parse_header("=value").is_err());
    }
}
