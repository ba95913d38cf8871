//! woostore CLI - drive the storefront screens from a terminal.
//!
//! Each command builds the screen a shopper would open, waits for its
//! slots to settle, prints them as JSON and tears the screen down.
//!
//! # Usage
//!
//! ```bash
//! # Home screen rows and special offers
//! woostore home
//!
//! # Full "best sellers" listing, second page of 20
//! woostore products best --page 2 --per-page 20
//!
//! # Filtered search
//! woostore filter shoe --sort price --max-price 50 --category 15
//!
//! # Cart projected from a pending order
//! woostore cart 727
//! ```
//!
//! # Environment Variables
//!
//! See `woostore_storefront::config`. `RUST_LOG` controls log output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use woostore_storefront::config::StoreConfig;
use woostore_storefront::repository::Repository;
use woostore_storefront::screens::LISTING_PAGE_SIZE;
use woostore_storefront::source::{ProductFacet, RemoteDataSource};

mod commands;
mod output;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "woostore")]
#[command(author, version, about = "Browse a WooCommerce store through the storefront screens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest, best selling and favourite rows plus the special offer
    Home,
    /// A full ranked product listing
    Products {
        /// `latest`, `best` or `favourite`
        facet: ProductFacet,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = LISTING_PAGE_SIZE)]
        per_page: u32,
    },
    /// All product categories
    Categories,
    /// Products in one category
    Category {
        id: i64,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search products
    Search { query: String },
    /// Search with ranking, a price band and a category
    Filter {
        query: String,

        /// `orderby` key: date, price, popularity, rating, title...
        #[arg(short, long, default_value = "date")]
        sort: String,

        #[arg(long, default_value = "")]
        min_price: String,

        #[arg(long, default_value = "")]
        max_price: String,

        #[arg(long)]
        category: Option<i64>,
    },
    /// One product and its reviews
    Product { id: i64 },
    /// The cart projected from a pending order
    Cart { order_id: i64 },
    /// Look up a coupon by code
    Coupon { code: String },
    /// Look up a customer by email
    Customer { email: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
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

    // Configuration is needed before tracing for the Sentry DSN
    let config = StoreConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "woostore_storefront=info,woostore_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StoreConfig) -> Result<(), CommandError> {
    let source = Arc::new(RemoteDataSource::from_config(config)?);
    let repository = Repository::shared(source);
    tracing::debug!(base_url = %config.woo.base_url, "Store client ready");

    match cli.command {
        Commands::Home => commands::browse::home(repository, config.per_page).await,
        Commands::Products {
            facet,
            page,
            per_page,
        } => commands::browse::products(repository, facet, page, per_page).await,
        Commands::Categories => commands::browse::categories(repository).await,
        Commands::Category { id, page } => {
            commands::browse::category(repository, id, page).await
        }
        Commands::Search { query } => commands::search::search(repository, &query).await,
        Commands::Filter {
            query,
            sort,
            min_price,
            max_price,
            category,
        } => {
            commands::search::filter(repository, &query, &sort, &max_price, &min_price, category)
                .await
        }
        Commands::Product { id } => commands::shop::product(repository, id).await,
        Commands::Cart { order_id } => commands::shop::cart(repository, order_id).await,
        Commands::Coupon { code } => commands::shop::coupon(repository, &code).await,
        Commands::Customer { email } => commands::shop::customer(repository, &email).await,
    }
}
