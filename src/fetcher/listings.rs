use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{Config, LISTINGS_PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::types::RawMarketRecord;

#[derive(Debug, Deserialize)]
struct ListingsStatus {
    #[serde(default)]
    error_code: i64,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    status: Option<ListingsStatus>,
    #[serde(default)]
    data: Vec<RawMarketRecord>,
}

pub fn listings_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Fetch the top `cfg.listings_limit` listings by market cap, in USD.
/// Pages through the provider in chunks of at most `LISTINGS_PAGE_SIZE` and
/// stops early on a short page.
pub async fn fetch_listings(client: &reqwest::Client, cfg: &Config) -> Result<Vec<RawMarketRecord>> {
    let mut records = Vec::with_capacity(cfg.listings_limit);

    for (start, limit) in page_plan(cfg.listings_limit) {
        let url = format!("{}?start={}&limit={}&convert=USD", cfg.cmc_api_url, start, limit);
        let resp = client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", &cfg.cmc_api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "listings returned {status}: {}",
                error_message(&body).unwrap_or_else(|| status.to_string())
            )));
        }

        let page = parse_listings_body(&body)?;
        let page_len = page.len();
        debug!(start, limit, received = page_len, "listings page");
        records.extend(page);

        if page_len < limit {
            break;
        }
    }

    info!("Fetched {} listings (limit {})", records.len(), cfg.listings_limit);
    Ok(records)
}

/// `(start, limit)` pairs; `start` is 1-based like the provider expects.
pub fn page_plan(total: usize) -> Vec<(usize, usize)> {
    let mut plan = Vec::new();
    let mut start = 1usize;
    let mut remaining = total;
    while remaining > 0 {
        let limit = remaining.min(LISTINGS_PAGE_SIZE);
        plan.push((start, limit));
        start += limit;
        remaining -= limit;
    }
    plan
}

/// Parses a listings body. A non-zero provider `error_code` is an upstream error
/// even on HTTP 200.
pub fn parse_listings_body(body: &str) -> Result<Vec<RawMarketRecord>> {
    let resp: ListingsResponse = serde_json::from_str(body)?;
    if let Some(status) = resp.status {
        if status.error_code != 0 {
            return Err(AppError::Upstream(format!(
                "listings error {}: {}",
                status.error_code,
                status.error_message.unwrap_or_default()
            )));
        }
    }
    Ok(resp.data)
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ListingsResponse>(body)
        .ok()
        .and_then(|r| r.status)
        .and_then(|s| s.error_message)
}
