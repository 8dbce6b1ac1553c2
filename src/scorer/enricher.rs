use std::collections::HashMap;

use crate::classifier::primary_category;
use crate::config::risk_weights;
use crate::scorer::community::community_metrics;
use crate::scorer::functions::{
    liquidity_score, market_cap_score, rank_community_score, supply_ratio, supply_ratio_score,
    to_score, volatility_score,
};
use crate::types::{
    EnrichedRecord, RawMarketRecord, RiskLevel, RiskScoreComponents, SocialMetrics, SupplyTier,
};

/// Resolves a symbol to community data. Absence means "no data", never an error.
/// Implementations decide their own caching; the scorer only reads.
pub trait SocialSource {
    fn social_for(&self, symbol: &str) -> Option<&SocialMetrics>;

    /// Provider-assigned category. When present it replaces the tag/name result.
    fn category_for(&self, _symbol: &str) -> Option<&str> {
        None
    }
}

/// Keys are lowercased symbols.
impl SocialSource for HashMap<String, SocialMetrics> {
    fn social_for(&self, symbol: &str) -> Option<&SocialMetrics> {
        self.get(&symbol.to_lowercase())
    }
}

pub fn risk_components(raw: &RawMarketRecord) -> RiskScoreComponents {
    let q = &raw.quote.usd;
    RiskScoreComponents {
        market_cap_score: market_cap_score(q.market_cap),
        liquidity_score: liquidity_score(q.volume_24h, q.market_cap),
        supply_ratio_score: supply_ratio_score(raw.circulating_supply, raw.total_supply),
        community_score: rank_community_score(raw.cmc_rank),
        volatility_score: volatility_score(
            q.percent_change_24h,
            q.percent_change_7d,
            q.percent_change_30d,
        ),
    }
}

/// Weighted composite of all five components, rounded.
pub fn risk_score(c: &RiskScoreComponents) -> u8 {
    to_score(
        f64::from(c.market_cap_score) * risk_weights::MARKET_CAP
            + f64::from(c.liquidity_score) * risk_weights::LIQUIDITY
            + f64::from(c.supply_ratio_score) * risk_weights::SUPPLY_RATIO
            + f64::from(c.community_score) * risk_weights::COMMUNITY
            + f64::from(c.volatility_score) * risk_weights::VOLATILITY,
    )
}

/// Derives the full score profile for one listing. Total: degenerate inputs
/// fall to neutral or floor scores. Community metrics are attached only when
/// the listing carries a social block.
pub fn enrich(raw: RawMarketRecord) -> EnrichedRecord {
    let components = risk_components(&raw);
    let risk_score = risk_score(&components);
    let supply_ratio = supply_ratio(raw.circulating_supply, raw.total_supply);
    let primary_category = primary_category(raw.tags.as_deref(), &raw.name, &raw.symbol);
    let community_metrics = raw.social_metrics.as_ref().map(|s| community_metrics(Some(s)));

    EnrichedRecord {
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        risk_components: components,
        supply_ratio,
        supply_tier: SupplyTier::from_ratio(supply_ratio),
        community_score: components.community_score,
        volatility: components.volatility_score,
        primary_category,
        community_metrics,
        raw,
    }
}

/// Enriches a whole listing page, attaching social data by lowercased symbol
/// where the listing itself carries none. A category from the source overrides
/// the one derived from tags and name. Input order is preserved.
pub fn enrich_batch<S>(raws: Vec<RawMarketRecord>, social: Option<&S>) -> Vec<EnrichedRecord>
where
    S: SocialSource + ?Sized,
{
    raws.into_iter()
        .map(|mut raw| {
            if raw.social_metrics.is_none() {
                raw.social_metrics = social.and_then(|s| s.social_for(&raw.symbol)).cloned();
            }
            let mut e = enrich(raw);
            if let Some(category) = social.and_then(|s| s.category_for(&e.raw.symbol)) {
                e.primary_category = Some(category.to_string());
            }
            e
        })
        .collect()
}
