//! BigCommerce CLI - read and manage a store from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Every product, one JSON document per line
//! bc-cli products
//!
//! # Categories with their full names, fetching 4 pages at a time
//! bc-cli --concurrency 4 categories --tree
//!
//! # A customer's orders, giving up after the first failed page
//! bc-cli --retry-mode stop orders --customer-id 42
//!
//! # Register a webhook (returns the existing one if already registered)
//! bc-cli webhooks create --scope 'store/order/*' --destination https://app.example.com/webhooks
//!
//! # Check a signed payload against BIGCOMMERCE_CLIENT_SECRET
//! bc-cli payload verify 'eyJ1c2VyIj...'
//! ```
//!
//! Store credentials come from `BIGCOMMERCE_STORE_HASH` and
//! `BIGCOMMERCE_ACCESS_TOKEN` (see `bigcommerce_client::config`). When a
//! collection cannot be fetched completely, the items that were fetched are
//! still printed and the command exits non-zero.

#![cfg_attr(not(test), forbid(unsafe_code))]

use bigcommerce_client::RetryMode;
use clap::{Args, Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "bc-cli")]
#[command(author, version, about = "BigCommerce store CLI")]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for how collections are fetched.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FetchArgs {
    /// Transient page failures tolerated per collection (env: `BIGCOMMERCE_MAX_RETRIES`)
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// After a transient failure: `retry` the same page or `stop`
    #[arg(long, global = true)]
    pub retry_mode: Option<RetryMode>,

    /// Fetch pages after the first this many at a time
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print store settings
    Store,
    /// List products
    Products,
    /// List categories
    Categories {
        /// Resolve full names ("Shoes > Running")
        #[arg(long)]
        tree: bool,
    },
    /// List brands
    Brands,
    /// List sales channels
    Channels,
    /// List orders
    Orders {
        /// Only this customer's orders
        #[arg(long)]
        customer_id: Option<i64>,
    },
    /// Manage webhooks
    Webhooks {
        #[command(subcommand)]
        action: WebhookAction,
    },
    /// Sign or verify app payloads
    Payload {
        #[command(subcommand)]
        action: PayloadAction,
    },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// List registered webhooks
    List,
    /// Register a webhook, reusing an identical one if present
    Create {
        /// Event scope, e.g. `store/order/created`
        #[arg(short, long)]
        scope: String,

        /// HTTPS URL receiving the events
        #[arg(short, long)]
        destination: String,

        /// Extra header sent with each delivery (`name=value`, repeatable)
        #[arg(long = "header", value_parser = commands::webhooks::parse_header)]
        headers: Vec<(String, String)>,
    },
    /// Delete a webhook
    Delete {
        /// Webhook id
        id: i64,
    },
}

#[derive(Subcommand)]
enum PayloadAction {
    /// Verify a signed payload and print its JSON
    Verify {
        /// `base64(json).base64(hex(hmac))`
        signed_payload: String,
    },
    /// Sign a JSON document
    Sign {
        /// JSON document to sign
        json: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the JSON lines
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bigcommerce_client=warn,bigcommerce_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let fetch = cli.fetch;
    match cli.command {
        Commands::Store => commands::catalog::store().await?,
        Commands::Products => commands::catalog::products(fetch).await?,
        Commands::Categories { tree } => commands::catalog::categories(fetch, tree).await?,
        Commands::Brands => commands::catalog::brands(fetch).await?,
        Commands::Channels => commands::catalog::channels(fetch).await?,
        Commands::Orders { customer_id } => commands::orders::list(fetch, customer_id).await?,
        Commands::Webhooks { action } => match action {
            WebhookAction::List => commands::webhooks::list(fetch).await?,
            WebhookAction::Create {
                scope,
                destination,
                headers,
            } => commands::webhooks::create(&scope, &destination, headers).await?,
            WebhookAction::Delete { id } => commands::webhooks::delete(id).await?,
        },
        Commands::Payload { action } => match action {
            PayloadAction::Verify { signed_payload } => commands::payload::verify(&signed_payload)?,
            PayloadAction::Sign { json } => commands::payload::sign(&json)?,
        },
    }
    Ok(())
}
