use serde::{Deserialize, Deserializer, Serialize};

/// Listings occasionally carry `null` for numeric fields on freshly listed assets.
fn null_as_zero<'de, D>(d: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(0.0))
}

// ---------------------------------------------------------------------------
// Raw market data (listings provider shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsdQuote {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub market_cap_dominance: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub volume_24h: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub percent_change_24h: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub percent_change_7d: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub percent_change_30d: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "USD", default)]
    pub usd: UsdQuote,
}

/// One listing as returned by the market-data provider. Immutable once fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMarketRecord {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub cmc_rank: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub circulating_supply: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_supply: f64,
    /// None = uncapped or unknown.
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub quote: Quote,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_metrics: Option<SocialMetrics>,
}

/// Community data for one asset. Every field is independently optional:
/// None means the provider did not report it, which is distinct from a reported 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMetrics {
    pub reddit_subscribers: Option<f64>,
    pub reddit_average_posts_48h: Option<f64>,
    pub reddit_average_comments_48h: Option<f64>,
    pub reddit_accounts_active_48h: Option<f64>,
    pub telegram_channel_user_count: Option<f64>,
    pub facebook_likes: Option<f64>,
    pub twitter_followers: Option<f64>,
}

// ---------------------------------------------------------------------------
// Risk classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Step function over the 0–100 risk score.
    pub fn from_score(score: u8) -> Self {
        use crate::config::risk_thresholds::*;
        if score >= HIGH_MIN {
            RiskLevel::High
        } else if score >= MEDIUM_MIN {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScoreComponents {
    pub market_cap_score: u8,
    pub liquidity_score: u8,
    pub supply_ratio_score: u8,
    /// Rank-derived, never social-derived.
    pub community_score: u8,
    pub volatility_score: u8,
}

// ---------------------------------------------------------------------------
// Community strength
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMetrics {
    pub reddit_score: u8,
    pub telegram_score: u8,
    pub facebook_score: u8,
    pub overall_community_score: u8,
}

impl CommunityMetrics {
    pub fn tier(&self) -> CommunityTier {
        CommunityTier::from_score(self.overall_community_score)
    }
}

/// Five descriptive tiers over the overall community score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityTier {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CommunityTier {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            CommunityTier::VeryStrong
        } else if score >= 60 {
            CommunityTier::Strong
        } else if score >= 40 {
            CommunityTier::Moderate
        } else if score >= 20 {
            CommunityTier::Weak
        } else {
            CommunityTier::VeryWeak
        }
    }

    /// 0 = very weak … 4 = very strong. Presentation keys colors off this.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            CommunityTier::VeryStrong => "Very strong",
            CommunityTier::Strong => "Strong",
            CommunityTier::Moderate => "Moderate",
            CommunityTier::Weak => "Weak",
            CommunityTier::VeryWeak => "Very weak",
        }
    }
}

impl std::fmt::Display for CommunityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Supply ratio tier (dilution risk bands shown next to the ratio)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyTier {
    /// >= 90% circulating
    Safe,
    /// 70–90%
    Healthy,
    /// 50–70%
    Moderate,
    /// 30–50%
    Elevated,
    /// < 30%: most of the supply is still to be unlocked
    Risky,
}

impl SupplyTier {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.9 {
            SupplyTier::Safe
        } else if ratio >= 0.7 {
            SupplyTier::Healthy
        } else if ratio >= 0.5 {
            SupplyTier::Moderate
        } else if ratio >= 0.3 {
            SupplyTier::Elevated
        } else {
            SupplyTier::Risky
        }
    }
}

// ---------------------------------------------------------------------------
// Enriched record
// ---------------------------------------------------------------------------

/// A raw listing plus every derived score. Held in memory for one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub raw: RawMarketRecord,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_components: RiskScoreComponents,
    /// circulating / total, 0 when total supply is unknown.
    pub supply_ratio: f64,
    pub supply_tier: SupplyTier,
    pub community_score: u8,
    pub volatility: u8,
    pub primary_category: Option<String>,
    pub community_metrics: Option<CommunityMetrics>,
}

impl EnrichedRecord {
    pub fn market_cap(&self) -> f64 {
        self.raw.quote.usd.market_cap
    }

    pub fn volume_24h(&self) -> f64 {
        self.raw.quote.usd.volume_24h
    }

    pub fn name(&self) -> &str {
        &self.raw.name
    }
}

// ---------------------------------------------------------------------------
// Filter / sort parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevelFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl RiskLevelFilter {
    pub fn matches(self, level: RiskLevel) -> bool {
        match self {
            RiskLevelFilter::All => true,
            RiskLevelFilter::Low => level == RiskLevel::Low,
            RiskLevelFilter::Medium => level == RiskLevel::Medium,
            RiskLevelFilter::High => level == RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    RiskScore,
    MarketCap,
    Volume,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// All bounds are inclusive; None disables that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub risk_level: Option<RiskLevelFilter>,
    pub min_market_cap: Option<f64>,
    pub max_market_cap: Option<f64>,
    pub min_supply_ratio: Option<f64>,
    pub max_supply_ratio: Option<f64>,
    pub min_volume_24h: Option<f64>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

// ---------------------------------------------------------------------------
// Aggregates served to the dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapEntry {
    pub name: String,
    pub symbol: String,
    pub market_cap: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_records: usize,
    /// Mean of the rank-based community score, rounded.
    pub avg_community_score: u8,
    pub total_market_cap: f64,
    pub total_volume_24h: f64,
    pub risk_distribution: RiskDistribution,
    pub top_market_cap: Vec<MarketCapEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_edges() {
        assert_eq!(RiskLevel::from_score(33), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(34), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(66), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(67), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn community_tier_has_five_bands() {
        assert_eq!(CommunityTier::from_score(80), CommunityTier::VeryStrong);
        assert_eq!(CommunityTier::from_score(79), CommunityTier::Strong);
        assert_eq!(CommunityTier::from_score(60), CommunityTier::Strong);
        assert_eq!(CommunityTier::from_score(40), CommunityTier::Moderate);
        assert_eq!(CommunityTier::from_score(20), CommunityTier::Weak);
        assert_eq!(CommunityTier::from_score(19), CommunityTier::VeryWeak);
        assert_eq!(CommunityTier::VeryWeak.index(), 0);
        assert_eq!(CommunityTier::VeryStrong.index(), 4);
    }

    #[test]
    fn supply_tier_bands() {
        assert_eq!(SupplyTier::from_ratio(1.0), SupplyTier::Safe);
        assert_eq!(SupplyTier::from_ratio(0.75), SupplyTier::Healthy);
        assert_eq!(SupplyTier::from_ratio(0.5), SupplyTier::Moderate);
        assert_eq!(SupplyTier::from_ratio(0.3), SupplyTier::Elevated);
        assert_eq!(SupplyTier::from_ratio(0.0), SupplyTier::Risky);
    }

    #[test]
    fn listing_with_nulls_deserializes() {
        let json = r#"{
            "id": 1, "name": "Bitcoin", "symbol": "BTC", "slug": "bitcoin",
            "cmc_rank": 1, "circulating_supply": 19000000, "total_supply": null,
            "max_supply": null, "tags": ["mineable", "pow"],
            "quote": {"USD": {"price": 60000.5, "market_cap": 1.2e12, "volume_24h": 3e10,
                "percent_change_24h": null, "percent_change_7d": 1.5, "percent_change_30d": -4.0,
                "market_cap_dominance": 52.1}}
        }"#;
        let raw: RawMarketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.total_supply, 0.0);
        assert_eq!(raw.max_supply, None);
        assert_eq!(raw.quote.usd.percent_change_24h, 0.0);
        assert_eq!(raw.tags.as_deref().map(|t| t.len()), Some(2));
        assert!(raw.social_metrics.is_none());
    }

    #[test]
    fn social_metrics_keep_zero_distinct_from_absent() {
        let m: SocialMetrics =
            serde_json::from_str(r#"{"facebook_likes": 0, "telegram_channel_user_count": null}"#).unwrap();
        assert_eq!(m.facebook_likes, Some(0.0));
        assert_eq!(m.telegram_channel_user_count, None);
        assert_eq!(m.reddit_subscribers, None);
    }

    #[test]
    fn filter_spec_reads_camel_case() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"riskLevel": "high", "minMarketCap": 1e8, "sortBy": "marketCap", "sortOrder": "desc"}"#,
        )
        .unwrap();
        assert_eq!(spec.risk_level, Some(RiskLevelFilter::High));
        assert_eq!(spec.min_market_cap, Some(1e8));
        assert_eq!(spec.sort_by, Some(SortBy::MarketCap));
        assert_eq!(spec.sort_order, Some(SortOrder::Desc));
        assert_eq!(spec.max_supply_ratio, None);
    }
}
