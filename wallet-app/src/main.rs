//! # Wallet Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the ledger adapter (SQLite)
//! - Build the rate service and its cache sweeper
//! - Create the wallet service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_ledger::build_ledger;
use wallet_rates::{ExchangeRateService, HttpRateProvider, RateCache, RateCacheConfig};
use wallet_service::{
    WalletService,
    inbound::{AuthKeys, HttpServer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wallet_app=debug,wallet_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting wallet server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);

    // Build ledger (handles connection and migration)
    let ledger = Arc::new(build_ledger(&config.database_url).await?);

    // Rate resolution: HTTP provider behind a TTL cache with a background sweeper
    let cache_config =
        RateCacheConfig::new(config.rate_cache_ttl, config.rate_cache_sweep_interval)?;
    let cache = RateCache::new();
    cache.spawn_sweeper(cache_config.sweep_interval);

    let provider = HttpRateProvider::new(config.rate_provider_url.clone());
    let rates = ExchangeRateService::new(provider, cache, cache_config);

    // Create the wallet service
    let service = WalletService::new(ledger, rates);

    // Create and run the HTTP server
    let auth = AuthKeys::new(&config.jwt_secret, config.token_ttl);
    let server = HttpServer::new(service, auth);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
