use crate::error::{AppError, Result};

pub const CMC_API_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Largest page the listings endpoint accepts in one request.
pub const LISTINGS_PAGE_SIZE: usize = 5000;

/// Coin-list lookup cache lifetime (seconds).
pub const COIN_LIST_CACHE_SECS: u64 = 3600;

/// Pause between per-symbol community-data requests to stay under the free-tier rate limit.
pub const SOCIAL_BATCH_DELAY_MS: u64 = 200;

/// Default seconds between listing refresh cycles.
pub const REFRESH_INTERVAL_SECS: u64 = 300;

/// Label used for records without a primary category when grouping.
pub const OTHER_CATEGORY: &str = "Other";

/// Risk level breakpoints on the 0–100 risk score.
pub mod risk_thresholds {
    pub const HIGH_MIN: u8 = 67;
    pub const MEDIUM_MIN: u8 = 34;
}

/// Component weights for the composite risk score. Sum to 1.0.
pub mod risk_weights {
    pub const MARKET_CAP: f64 = 0.25;
    pub const LIQUIDITY: f64 = 0.25;
    pub const SUPPLY_RATIO: f64 = 0.20;
    pub const COMMUNITY: f64 = 0.20;
    pub const VOLATILITY: f64 = 0.10;
}

/// Platform weights for the social community score. Sum to 1.0.
pub mod community_weights {
    pub const REDDIT: f64 = 0.50;
    pub const TELEGRAM: f64 = 0.35;
    pub const FACEBOOK: f64 = 0.15;

    /// Inside the reddit score.
    pub const REDDIT_SUBSCRIBERS: f64 = 0.5;
    pub const REDDIT_ACTIVITY: f64 = 0.3;
    pub const REDDIT_ACCOUNTS: f64 = 0.2;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub cmc_api_url: String,
    /// Listings provider key (CMC_API_KEY). Required.
    pub cmc_api_key: String,
    pub coingecko_api_url: String,
    pub log_level: String,
    pub api_port: u16,
    /// Number of listings to fetch per refresh (LISTINGS_LIMIT)
    pub listings_limit: usize,
    /// Only the first N symbols get community data, to respect rate limits (SOCIAL_SYMBOL_LIMIT)
    pub social_symbol_limit: usize,
    /// Seconds between refresh cycles (REFRESH_INTERVAL_SECS)
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let cmc_api_key = std::env::var("CMC_API_KEY")
            .map_err(|_| AppError::Config("CMC_API_KEY must be set".to_string()))?;

        let listings_limit = std::env::var("LISTINGS_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<usize>()
            .unwrap_or(100);
        if listings_limit == 0 {
            return Err(AppError::Config("LISTINGS_LIMIT must be at least 1".to_string()));
        }

        Ok(Self {
            cmc_api_url: std::env::var("CMC_API_URL").unwrap_or_else(|_| CMC_API_URL.to_string()),
            cmc_api_key,
            coingecko_api_url: std::env::var("COINGECKO_API_URL")
                .unwrap_or_else(|_| COINGECKO_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            listings_limit,
            social_symbol_limit: std::env::var("SOCIAL_SYMBOL_LIMIT")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<usize>()
                .unwrap_or(30),
            refresh_interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| REFRESH_INTERVAL_SECS.to_string())
                .parse::<u64>()
                .unwrap_or(REFRESH_INTERVAL_SECS)
                .max(10),
        })
    }
}
