//! Order listings.

use bigcommerce_client::OrderFilters;
use bigcommerce_core::CustomerId;

use super::{CliResult, client, emit_all, fetch_all};
use crate::FetchArgs;

/// Print every order, or one customer's orders.
///
/// Order pages carry no page count, so `--concurrency` falls back to
/// sequential fetching.
///
/// # Errors
///
/// Returns an error if the fetch is incomplete (after printing what was fetched).
pub async fn list(args: FetchArgs, customer_id: Option<i64>) -> CliResult {
    let client = client(args)?;
    let filters = customer_id
        .map(|id| OrderFilters::for_customer(CustomerId::new(id)))
        .unwrap_or_default();
    emit_all(fetch_all(&client, args, |page| client.get_orders_page(&filters, page)).await)
}
