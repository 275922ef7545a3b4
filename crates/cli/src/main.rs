//! Shopfront CLI - browse the catalog, price a cart, and list orders.
//!
//! # Usage
//!
//! ```bash
//! # First page of perfumes, cheapest first
//! shopfront catalog --category Perfumes --sort low
//!
//! # Price a cart: two red tees in M plus a 100ml bottle
//! shopfront quote "66a1:red:M*2" "66b7:::100ml"
//!
//! # Order history for an account
//! SHOPFRONT_PASSWORD=... shopfront orders -e ada@example.com
//! ```
//!
//! # Commands
//!
//! - `catalog` - Search, filter, sort and page through products
//! - `quote` - Resolve prices for cart lines and show totals
//! - `orders` - Log in and list orders, newest first

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::catalog::{CatalogQuery, SortOrder};
use shopfront_storefront::config::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::quote::QuoteLine;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Catalog {
        /// Case-insensitive match on product name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only show these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Sort order (`relevant`, `low`, `high`, `newest`)
        #[arg(long, default_value = "relevant")]
        sort: SortOrder,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Price cart lines against the live catalog
    Quote {
        /// Lines as `ID[:COLOR[:SIZE[:VOLUME]]][*QTY]`
        #[arg(required = true)]
        lines: Vec<QuoteLine>,
    },
    /// List an account's orders
    Orders {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info,shopfront_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog {
            search,
            categories,
            sort,
            page,
        } => {
            let query = CatalogQuery {
                search,
                categories,
                sort,
                page,
                per_page: config.page_size,
            };
            commands::catalog::list(config, &query).await?;
        }
        Commands::Quote { lines } => commands::quote::price(config, &lines).await?,
        Commands::Orders { email, password } => {
            commands::orders::list(config, &email, password.into()).await?;
        }
    }
    Ok(())
}
