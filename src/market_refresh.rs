use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::time::interval;
use tracing::{error, info};

use crate::api::health::HealthState;
use crate::api::latency::RefreshLatency;
use crate::collection::group_by_risk_level;
use crate::config::Config;
use crate::fetcher::{fetch_listings, ProviderBatch, SocialFetcher};
use crate::scorer::enrich_batch;
use crate::state::RecordStore;
use crate::types::{RawMarketRecord, SocialMetrics};

/// Periodically pulls listings and community data, enriches them and publishes
/// the result to the store. A failed cycle leaves the previous snapshot in place.
pub struct ListingRefresher {
    cfg: Config,
    store: Arc<RecordStore>,
    client: reqwest::Client,
    social: SocialFetcher,
    health: Arc<HealthState>,
    latency: Arc<RefreshLatency>,
}

impl ListingRefresher {
    pub fn new(
        cfg: Config,
        store: Arc<RecordStore>,
        client: reqwest::Client,
        social: SocialFetcher,
        health: Arc<HealthState>,
        latency: Arc<RefreshLatency>,
    ) -> Self {
        Self { cfg, store, client, social, health, latency }
    }

    pub async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.refresh_interval_secs));
        ticker.tick().await; // bootstrap already ran

        loop {
            ticker.tick().await;
            if let Err(e) = self.refresh().await {
                error!("Listing refresh failed, keeping previous snapshot: {e}");
            }
        }
    }

    /// One full cycle. Health and latency are updated whatever the outcome.
    pub async fn refresh(&self) -> crate::error::Result<()> {
        let started = Instant::now();
        let result = self.refresh_inner().await;
        self.latency.record(started.elapsed());
        match &result {
            Ok(()) => self.health.record_success(now_ns()),
            Err(_) => self.health.record_failure(now_ns()),
        }
        result
    }

    async fn refresh_inner(&self) -> crate::error::Result<()> {
        let listings = fetch_listings(&self.client, &self.cfg).await?;

        let symbols = social_targets(&listings, self.cfg.social_symbol_limit);
        let fetched = if symbols.is_empty() {
            ProviderBatch::default()
        } else {
            self.social.fetch_batch(&symbols).await
        };

        let mut social = embedded_social(&listings);
        let enriched = enrich_batch(listings, Some(&fetched));
        social.extend(fetched.social);
        let total = enriched.len();
        let dist = group_by_risk_level(&enriched).distribution();
        let with_social = enriched.iter().filter(|r| r.community_metrics.is_some()).count();

        self.store.publish(enriched, social, now_ns());

        info!(
            total,
            with_social,
            low = dist.low,
            medium = dist.medium,
            high = dist.high,
            "Listing refresh complete: {total} records ({} low, {} medium, {} high)",
            dist.low,
            dist.medium,
            dist.high,
        );
        Ok(())
    }
}

/// Symbols of the first `limit` listings whose community data should be pulled.
fn social_targets(listings: &[RawMarketRecord], limit: usize) -> Vec<String> {
    listings
        .iter()
        .filter(|r| r.social_metrics.is_none())
        .take(limit)
        .map(|r| r.symbol.to_lowercase())
        .collect()
}

/// Lowercased-symbol lookup for records that carry their own community block.
pub fn embedded_social(listings: &[RawMarketRecord]) -> HashMap<String, SocialMetrics> {
    listings
        .iter()
        .filter_map(|r| r.social_metrics.clone().map(|m| (r.symbol.to_lowercase(), m)))
        .collect()
}

pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
