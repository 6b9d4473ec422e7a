//! Store, catalog and channel listings.

use bigcommerce_client::CategoryTree;
use serde::Serialize;

use super::{CliResult, client, emit_all, fetch_all};
use crate::FetchArgs;
use crate::output;

/// Print store settings.
///
/// # Errors
///
/// Returns an error if the client cannot be configured or the request fails.
pub async fn store() -> CliResult {
    let client = client(FetchArgs::default())?;
    output::print_one(&client.get_store_info().await?)?;
    Ok(())
}

/// Print every product.
///
/// # Errors
///
/// Returns an error if the fetch is incomplete (after printing what was fetched).
pub async fn products(args: FetchArgs) -> CliResult {
    let client = client(args)?;
    emit_all(fetch_all(&client, args, |page| client.get_products(page)).await)
}

/// A category with its resolved name.
#[derive(Serialize)]
struct CategoryLine<'a> {
    id: i64,
    parent_id: i64,
    depth: usize,
    full_name: &'a str,
    url: &'a str,
    is_visible: bool,
}

/// Print every category, optionally with full names.
///
/// # Errors
///
/// Returns an error if the fetch is incomplete or the tree is malformed.
pub async fn categories(args: FetchArgs, tree: bool) -> CliResult {
    let client = client(args)?;
    let result = fetch_all(&client, args, |page| client.get_categories(page)).await;
    if !tree {
        return emit_all(result);
    }

    // A partial tree would print wrong names
    let categories = match result {
        Ok(categories) => categories,
        Err(incomplete) => return emit_all(Err(incomplete)),
    };
    let tree = CategoryTree::build(categories)?;
    let lines: Vec<_> = tree
        .iter()
        .map(|node| CategoryLine {
            id: node.category.id.as_i64(),
            parent_id: node.category.parent_id.as_i64(),
            depth: node.depth,
            full_name: &node.full_name,
            url: &node.category.custom_url.url,
            is_visible: node.category.is_visible,
        })
        .collect();
    output::print_lines(&lines)?;
    Ok(())
}

/// Print every brand.
///
/// # Errors
///
/// Returns an error if the fetch is incomplete (after printing what was fetched).
pub async fn brands(args: FetchArgs) -> CliResult {
    let client = client(args)?;
    emit_all(fetch_all(&client, args, |page| client.get_brands(page)).await)
}

/// Print every channel.
///
/// # Errors
///
/// Returns an error if the fetch is incomplete (after printing what was fetched).
pub async fn channels(args: FetchArgs) -> CliResult {
    let client = client(args)?;
    emit_all(fetch_all(&client, args, |page| client.get_channels(page)).await)
}
