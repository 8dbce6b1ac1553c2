use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{Config, COIN_LIST_CACHE_SECS, SOCIAL_BATCH_DELAY_MS};
use crate::error::{AppError, Result};
use crate::scorer::enricher::SocialSource;
use crate::types::SocialMetrics;

#[derive(Debug, Clone, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    community_data: Option<SocialMetrics>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

impl CoinDetail {
    /// First listed category, unless it is blank.
    fn primary_category(&self) -> Option<&str> {
        self.categories
            .as_deref()?
            .first()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}

/// What one batch learned from the provider, keyed by lowercased symbol.
#[derive(Debug, Clone, Default)]
pub struct ProviderBatch {
    pub social: HashMap<String, SocialMetrics>,
    pub categories: HashMap<String, String>,
}

impl SocialSource for ProviderBatch {
    fn social_for(&self, symbol: &str) -> Option<&SocialMetrics> {
        self.social.get(&symbol.to_lowercase())
    }

    fn category_for(&self, symbol: &str) -> Option<&str> {
        self.categories.get(&symbol.to_lowercase()).map(String::as_str)
    }
}

/// Community-data client. The coin list (symbol -> provider id) is cached for
/// an hour; every per-coin failure, rate limiting included, degrades to "no data".
pub struct SocialFetcher {
    client: reqwest::Client,
    base_url: String,
    coin_list: Cache<(), Arc<Vec<CoinListEntry>>>,
}

impl SocialFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_ttl(
            cfg.coingecko_api_url.clone(),
            Duration::from_secs(COIN_LIST_CACHE_SECS),
        )
    }

    pub fn with_ttl(base_url: String, ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base_url,
            coin_list: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        })
    }

    /// Cached coin list. A failed fetch yields an empty list and caches nothing,
    /// so the next batch tries again.
    async fn coin_list(&self) -> Arc<Vec<CoinListEntry>> {
        match self.coin_list.try_get_with((), self.fetch_coin_list()).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Coin list fetch failed: {e}");
                Arc::default()
            }
        }
    }

    async fn fetch_coin_list(&self) -> Result<Arc<Vec<CoinListEntry>>> {
        let url = format!("{}/coins/list?include_platform=false", self.base_url);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!("coin list returned {}", resp.status())));
        }
        let entries: Vec<CoinListEntry> = resp.json().await?;
        info!("Coin list refreshed: {} entries", entries.len());
        Ok(Arc::new(entries))
    }

    /// Community and category data for one coin id. `Ok(None)` when rate limited.
    async fn fetch_detail(&self, coin_id: &str) -> Result<Option<CoinDetail>> {
        let url = format!(
            "{}/coins/{}?localization=false&tickers=false&market_data=false&community_data=true&developer_data=false",
            self.base_url, coin_id
        );
        let resp = self.client.get(&url).send().await?;
        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(coin_id, "Rate limited fetching community data");
                Ok(None)
            }
            s if !s.is_success() => Err(AppError::Upstream(format!("coin {coin_id} returned {s}"))),
            _ => Ok(Some(resp.json::<CoinDetail>().await?)),
        }
    }

    /// Sequential batch with a fixed pause between requests. Symbols without
    /// data are simply missing from the result.
    pub async fn fetch_batch(&self, symbols: &[String]) -> ProviderBatch {
        let list = self.coin_list().await;
        let mut out = ProviderBatch::default();
        if list.is_empty() {
            return out;
        }

        let targets = resolve_batch(&list, symbols);
        let delay = Duration::from_millis(SOCIAL_BATCH_DELAY_MS);

        for (i, (symbol, coin_id)) in targets.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(delay).await;
            }
            match self.fetch_detail(coin_id).await {
                Ok(Some(detail)) => out.absorb(symbol, detail),
                Ok(None) => debug!(symbol = %symbol, "No community data"),
                Err(e) => warn!(symbol = %symbol, "Community data fetch failed: {e}"),
            }
        }

        info!(
            "Community data: {}/{} symbols resolved, {} with data, {} with a category",
            targets.len(),
            symbols.len(),
            out.social.len(),
            out.categories.len()
        );
        out
    }
}

impl ProviderBatch {
    fn absorb(&mut self, symbol: &str, detail: CoinDetail) {
        if let Some(category) = detail.primary_category() {
            self.categories.insert(symbol.to_string(), category.to_string());
        }
        if let Some(metrics) = detail.community_data {
            self.social.insert(symbol.to_string(), metrics);
        }
    }
}

/// First coin whose symbol matches case-insensitively.
pub fn resolve_coin_id<'a>(list: &'a [CoinListEntry], symbol: &str) -> Option<&'a str> {
    list.iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
        .map(|c| c.id.as_str())
}

/// Lowercased symbol -> coin id, deduplicated, in first-seen order.
pub fn resolve_batch(list: &[CoinListEntry], symbols: &[String]) -> Vec<(String, String)> {
    let mut seen = std::collections::HashSet::new();
    symbols
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| seen.insert(s.clone()))
        .filter_map(|s| resolve_coin_id(list, &s).map(|id| (s, id.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, symbol: &str) -> CoinListEntry {
        CoinListEntry {
            id: id.to_string(),
            symbol: symbol.to_string(),
        }
    }

    fn list() -> Vec<CoinListEntry> {
        vec![
            entry("bitcoin", "btc"),
            entry("ethereum", "eth"),
            entry("ethereum-wormhole", "eth"),
            entry("tether", "usdt"),
        ]
    }

    #[test]
    fn resolves_first_match_case_insensitively() {
        let l = list();
        assert_eq!(resolve_coin_id(&l, "BTC"), Some("bitcoin"));
        assert_eq!(resolve_coin_id(&l, "eth"), Some("ethereum"));
        assert_eq!(resolve_coin_id(&l, "nope"), None);
    }

    #[test]
    fn batch_dedupes_and_skips_unknown() {
        let l = list();
        let symbols: Vec<String> = ["BTC", "btc", "XYZ", "USDT"].iter().map(|s| s.to_string()).collect();
        let resolved = resolve_batch(&l, &symbols);
        assert_eq!(
            resolved,
            vec![
                ("btc".to_string(), "bitcoin".to_string()),
                ("usdt".to_string(), "tether".to_string()),
            ]
        );
    }

    // nothing listens on the discard port, so every fetch fails fast
    fn offline(ttl: Duration) -> SocialFetcher {
        SocialFetcher::with_ttl("http://127.0.0.1:9".to_string(), ttl).unwrap()
    }

    #[tokio::test]
    async fn cached_list_is_served_without_refetching() {
        let f = offline(Duration::from_secs(COIN_LIST_CACHE_SECS));
        f.coin_list.insert((), Arc::new(list())).await;
        assert_eq!(f.coin_list().await.len(), 4);
    }

    #[tokio::test]
    async fn failed_fetch_returns_empty_and_caches_nothing() {
        let f = offline(Duration::from_secs(COIN_LIST_CACHE_SECS));
        assert!(f.coin_list().await.is_empty());
        assert!(f.coin_list.get(&()).await.is_none());

        let batch = f.fetch_batch(&["btc".to_string()]).await;
        assert!(batch.social.is_empty());
        assert!(batch.categories.is_empty());
    }

    #[tokio::test]
    async fn cached_list_expires_after_ttl() {
        let f = offline(Duration::from_millis(50));
        f.coin_list.insert((), Arc::new(list())).await;
        assert!(f.coin_list.get(&()).await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(f.coin_list.get(&()).await.is_none());
        // expired and unreachable: empty, not the stale list
        assert!(f.coin_list().await.is_empty());
    }

    #[test]
    fn community_block_parses_sparse_fields() {
        let detail: CoinDetail = serde_json::from_str(
            r#"{"id": "bitcoin", "community_data": {"facebook_likes": null, "reddit_subscribers": 6000000,
                "reddit_average_posts_48h": 5.2, "telegram_channel_user_count": null}}"#,
        )
        .unwrap();
        let m = detail.community_data.unwrap();
        assert_eq!(m.reddit_subscribers, Some(6_000_000.0));
        assert_eq!(m.facebook_likes, None);

        let none: CoinDetail = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(none.community_data.is_none());
        assert_eq!(none.primary_category(), None);
    }

    #[test]
    fn detail_keeps_first_category() {
        let detail: CoinDetail = serde_json::from_str(
            r#"{"id": "uniswap", "categories": ["Decentralized Exchange (DEX)", "Governance"],
                "community_data": null}"#,
        )
        .unwrap();
        assert_eq!(detail.primary_category(), Some("Decentralized Exchange (DEX)"));

        let blank: CoinDetail =
            serde_json::from_str(r#"{"id": "x", "categories": [" ", "Meme"]}"#).unwrap();
        assert_eq!(blank.primary_category(), None);

        let empty: CoinDetail = serde_json::from_str(r#"{"id": "x", "categories": []}"#).unwrap();
        assert_eq!(empty.primary_category(), None);
    }

    #[test]
    fn batch_absorbs_categories_without_community_data() {
        let mut batch = ProviderBatch::default();
        let detail: CoinDetail =
            serde_json::from_str(r#"{"id": "pepe", "categories": ["Meme"]}"#).unwrap();
        batch.absorb("pepe", detail);

        assert_eq!(batch.category_for("PEPE"), Some("Meme"));
        assert!(batch.social_for("PEPE").is_none());
    }
}
