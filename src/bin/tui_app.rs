use serde::de::DeserializeOwned;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct UsdRow {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub volume_24h: f64,
    #[serde(default)]
    pub percent_change_24h: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct QuoteRow {
    #[serde(rename = "USD", default)]
    pub usd: UsdRow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CryptoRow {
    pub name: String,
    pub symbol: String,
    #[serde(rename = "cmc_rank", default)]
    pub cmc_rank: u32,
    #[serde(default)]
    pub quote: QuoteRow,
    pub risk_score: u8,
    pub risk_level: String,
    pub supply_ratio: f64,
    pub community_score: u8,
    pub volatility: u8,
    pub primary_category: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
#[allow(dead_code)]
pub struct SummaryResponse {
    pub total_records: usize,
    pub avg_community_score: u8,
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    pub risk_distribution: RiskDistribution,
    pub refreshed_at_ns: u64,
    pub social_coverage: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub category: String,
    pub count: usize,
    pub total_market_cap: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
#[allow(dead_code)]
pub struct HealthResponse {
    pub status: String,
    pub consecutive_failures: u64,
    pub records: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
#[allow(dead_code)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_ms: Option<u64>,
    pub p95_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

/// Sort keys in the order the `s` key cycles through them; values are query params.
pub const SORT_KEYS: [&str; 4] = ["riskScore", "marketCap", "volume", "name"];
pub const RISK_FILTERS: [&str; 4] = ["all", "low", "medium", "high"];

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub summary: SummaryResponse,
    pub cryptos: Vec<CryptoRow>,
    pub categories: Vec<CategoryRow>,
    pub health: HealthResponse,
    pub latency: LatencyResponse,
    pub sort_idx: usize,
    pub descending: bool,
    pub risk_idx: usize,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            summary: SummaryResponse::default(),
            cryptos: Vec::new(),
            categories: Vec::new(),
            health: HealthResponse::default(),
            latency: LatencyResponse::default(),
            sort_idx: 1,
            descending: true,
            risk_idx: 0,
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    pub fn sort_key(&self) -> &'static str {
        SORT_KEYS[self.sort_idx % SORT_KEYS.len()]
    }

    pub fn risk_filter(&self) -> &'static str {
        RISK_FILTERS[self.risk_idx % RISK_FILTERS.len()]
    }

    pub fn cycle_sort(&mut self) {
        self.sort_idx = (self.sort_idx + 1) % SORT_KEYS.len();
    }

    pub fn toggle_order(&mut self) {
        self.descending = !self.descending;
    }

    pub fn cycle_risk_filter(&mut self) {
        self.risk_idx = (self.risk_idx + 1) % RISK_FILTERS.len();
    }

    /// Query string for GET /cryptos.
    pub fn cryptos_query(&self) -> String {
        let order = if self.descending { "desc" } else { "asc" };
        let mut q = format!("sortBy={}&sortOrder={order}", self.sort_key());
        if self.risk_filter() != "all" {
            q.push_str("&riskLevel=");
            q.push_str(self.risk_filter());
        }
        q
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let summary_url = format!("{}/stats/summary", self.base_url);
        let cryptos_url = format!("{}/cryptos?{}", self.base_url, self.cryptos_query());
        let categories_url = format!("{}/groups/category", self.base_url);
        let health_url = format!("{}/health", self.base_url);
        let latency_url = format!("{}/stats/latency", self.base_url);

        let (summary, cryptos, categories, health, latency) = tokio::join!(
            get_json::<SummaryResponse>(client, &summary_url),
            get_json::<Vec<CryptoRow>>(client, &cryptos_url),
            get_json::<Vec<CategoryRow>>(client, &categories_url),
            get_json::<HealthResponse>(client, &health_url),
            get_json::<LatencyResponse>(client, &latency_url),
        );

        match (summary, cryptos) {
            (Ok(s), Ok(c)) => {
                self.summary = s;
                self.cryptos = c;
                self.status = ConnectionStatus::Connected;
                self.last_refresh = std::time::Instant::now();

                if let Ok(cats) = categories {
                    self.categories = cats;
                }
                if let Ok(h) = health {
                    self.health = h;
                }
                if let Ok(l) = latency {
                    self.latency = l;
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                self.status = ConnectionStatus::Error(e);
            }
        }
    }
}

async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T, String> {
    let resp = client.get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<T>().await.map_err(|e| format!("parse error: {e}"))
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Sub-cent prices keep enough digits to be readable.
pub fn format_price(v: f64) -> String {
    if v >= 1.0 {
        format!("${v:.2}")
    } else if v >= 0.01 {
        format!("${v:.4}")
    } else {
        format!("${v:.8}")
    }
}

pub fn format_market_cap(v: f64) -> String {
    if v >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else if v >= 1e3 {
        format!("${:.1}K", v / 1e3)
    } else {
        format!("${v:.0}")
    }
}

pub fn format_change(pct: f64) -> String {
    format!("{pct:+.2}%")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[allow(dead_code)]
fn main() {
    // entry point lives in src/bin/tui.rs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_tracks_sort_order_and_filter() {
        let mut app = AppState::new("http://x".to_string());
        assert_eq!(app.cryptos_query(), "sortBy=marketCap&sortOrder=desc");

        app.cycle_sort();
        app.toggle_order();
        app.cycle_risk_filter();
        assert_eq!(app.cryptos_query(), "sortBy=volume&sortOrder=asc&riskLevel=low");

        for _ in 0..3 {
            app.cycle_risk_filter();
        }
        assert_eq!(app.risk_filter(), "all");
    }

    #[test]
    fn market_cap_suffixes() {
        assert_eq!(format_market_cap(1.23e12), "$1.23T");
        assert_eq!(format_market_cap(4.5e9), "$4.50B");
        assert_eq!(format_market_cap(12_300_000.0), "$12.30M");
        assert_eq!(format_market_cap(950.0), "$950");
    }

    #[test]
    fn price_precision_scales_down() {
        assert_eq!(format_price(65_000.0), "$65000.00");
        assert_eq!(format_price(0.5), "$0.5000");
        assert_eq!(format_price(0.000012), "$0.00001200");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("Bitcoin", 10), "Bitcoin");
        assert_eq!(truncate("Ætherium", 4), "Æth…");
    }

    #[test]
    fn crypto_row_reads_enriched_json() {
        let row: CryptoRow = serde_json::from_str(
            r#"{"id": 1, "name": "Bitcoin", "symbol": "BTC", "cmc_rank": 1,
                "quote": {"USD": {"price": 60000.0, "market_cap": 1.2e12, "volume_24h": 3e10,
                    "percent_change_24h": -1.5}},
                "riskScore": 100, "riskLevel": "high", "supplyRatio": 0.95, "communityScore": 100,
                "volatility": 100, "primaryCategory": "Bitcoin", "communityMetrics": null}"#,
        )
        .unwrap();
        assert_eq!(row.cmc_rank, 1);
        assert_eq!(row.risk_level, "high");
        assert_eq!(row.quote.usd.percent_change_24h, -1.5);
    }
}
