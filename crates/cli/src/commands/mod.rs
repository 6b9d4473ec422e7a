//! Subcommand implementations.

pub mod catalog;
pub mod orders;
pub mod payload;
pub mod webhooks;

use std::future::Future;

use bigcommerce_client::{
    BigCommerceError, Client, ClientConfig, IncompleteFetch, PageResult, RetryPolicy,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::FetchArgs;
use crate::output;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Apply command-line overrides to an environment-derived retry policy.
fn retry_policy(base: RetryPolicy, args: FetchArgs) -> RetryPolicy {
    RetryPolicy {
        max_retries: args.max_retries.unwrap_or(base.max_retries),
        mode: args.retry_mode.unwrap_or(base.mode),
        ..base
    }
}

/// Build a client from `BIGCOMMERCE_*` environment variables.
fn client(args: FetchArgs) -> Result<Client, Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let retry = retry_policy(config.retry, args);
    Ok(Client::new(config.with_retry(retry))?)
}

/// Fetch every page, concurrently when `--concurrency` is above 1.
async fn fetch_all<T, F, Fut>(
    client: &Client,
    args: FetchArgs,
    fetch_page: F,
) -> Result<Vec<T>, IncompleteFetch<T, BigCommerceError>>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<PageResult<T>, BigCommerceError>>,
{
    let paginator = client.paginator();
    match args.concurrency {
        Some(concurrency) if concurrency > 1 => {
            paginator.fetch_all_buffered(concurrency, fetch_page).await
        }
        _ => paginator.fetch_all(fetch_page).await,
    }
}

/// Print a collection, including the partial result of a failed fetch.
///
/// A partial result still fails the command after printing.
fn emit_all<T: Serialize>(result: Result<Vec<T>, IncompleteFetch<T, BigCommerceError>>) -> CliResult {
    match result {
        Ok(items) => {
            info!(count = items.len(), "fetched");
            output::print_lines(&items)?;
            Ok(())
        }
        Err(IncompleteFetch {
            items,
            page,
            failures,
            kind,
        }) => {
            warn!(count = items.len(), page, failures, "printing partial result");
            output::print_lines(&items)?;
            Err(format!("fetch stopped at page {page} after {failures} failed attempt(s): {kind}").into())
        }
    }
}
