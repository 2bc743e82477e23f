//! Sports feed gateway - Main Application Entry Point
//!
//! Mirrors an upstream sports feed (soccer and basketball) into PostgreSQL and
//! serves the stored matches to tenants through an API-key gateway with
//! per-sport scopes and per-key rate limits.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Upstream**: Goalserve JSON feed via reqwest
//! - **Authentication**: API key with SHA-256 hashing, token-bucket rate limits
//!
//! # Commands
//!
//! - `serve` - HTTP read API
//! - `sync` - periodic reconciliation with the feed
//! - `apikey create|list|revoke` - credential provisioning
//!
//! Every command loads configuration, opens the pool and runs migrations first.

mod commands;
mod config;
mod db;
mod error;
mod goalserve;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;
mod sync;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::apikey::ApiKeyCommand;
use storage::PgStore;

#[derive(Parser, Debug)]
#[command(name = "sports-feed-gateway")]
#[command(about = "Sports feed mirror and tenant API gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the read API
    Serve {
        /// Overrides SERVER_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Reconcile the match tables with the feed
    Sync {
        /// Run one cycle per sport and exit
        #[arg(long)]
        once: bool,

        /// Re-read the past seven days before the first cycle
        #[arg(long)]
        backfill: bool,
    },

    /// Manage tenant API keys
    Apikey {
        #[command(subcommand)]
        action: ApiKeyCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");
    if config.goalserve_api_key.trim().is_empty() {
        tracing::warn!("GOALSERVE_API_KEY is not set; feed sync is unavailable");
    }

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let store = Arc::new(PgStore::new(pool.clone()));

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server_port);
            commands::serve::run(&config, pool, store, port).await
        }
        Command::Sync { once, backfill } => {
            commands::sync::run(&config, store, once, backfill).await
        }
        Command::Apikey { action } => commands::apikey::run(store.as_ref(), action).await,
    }
}
