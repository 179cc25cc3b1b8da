//! Emporium CLI - Database migrations, seeding, and reports.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending schema migrations
//! emporium migrate
//!
//! # Load a catalog fixture, replacing the current catalog
//! emporium seed fixtures/catalog.yaml --clear
//!
//! # Row counts per table
//! emporium stats
//!
//! # Products with their effective prices as JSON
//! emporium catalog --category 3
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog from a YAML file
//! - `stats` - Log row counts for every table
//! - `catalog` - Print products as JSON
//!
//! Configuration comes from the environment (see `emporium_store::config`).
//! `RUST_LOG` overrides the default `emporium=info` log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emporium_store::StoreConfig;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "emporium")]
#[command(author, version, about = "Emporium storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the YAML fixture
        file: PathBuf,

        /// Delete existing products, discounts, and categories first
        #[arg(long)]
        clear: bool,
    },
    /// Show row counts for every table
    Stats,
    /// Print products with effective prices as JSON
    Catalog {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<i32>,

        /// Maximum number of products
        #[arg(short, long, default_value_t = 100)]
        limit: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "emporium=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration first (needed for Sentry init)
    let config = StoreConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(CommandError::Config(e)),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StoreConfig) -> Result<(), CommandError> {
    let pool = emporium_store::create_pool(config).await?;
    tracing::debug!(?config, "Connected to database");

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed { file, clear } => commands::seed::catalog(&pool, &file, clear).await?,
        Commands::Stats => commands::stats::run(&pool).await?,
        Commands::Catalog { category, limit } => {
            commands::catalog::run(&pool, category, limit).await?;
        }
    }
    Ok(())
}
