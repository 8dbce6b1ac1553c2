mod api;
mod classifier;
mod collection;
mod config;
mod error;
mod fetcher;
mod market_refresh;
mod scorer;
mod state;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::RefreshLatency;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{listings_client, SocialFetcher};
use crate::market_refresh::ListingRefresher;
use crate::state::RecordStore;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        "Starting: listings_limit={} social_symbols={} refresh={}s",
        cfg.listings_limit, cfg.social_symbol_limit, cfg.refresh_interval_secs,
    );

    let store = RecordStore::new();
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(RefreshLatency::new());

    let refresher = ListingRefresher::new(
        cfg.clone(),
        Arc::clone(&store),
        listings_client()?,
        SocialFetcher::new(&cfg)?,
        Arc::clone(&health),
        Arc::clone(&latency),
    );

    // --- Bootstrap: serve whatever the first cycle produced, even nothing ---
    match refresher.refresh().await {
        Ok(()) => info!("Bootstrap complete: {} records", store.record_count()),
        Err(e) => warn!("Bootstrap refresh failed, serving empty snapshot until next cycle: {e}"),
    }

    // Listing refresher (background, every refresh_interval_secs)
    tokio::spawn(async move { refresher.run().await });

    // HTTP API server
    let app = router(ApiState { store, health, latency });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
