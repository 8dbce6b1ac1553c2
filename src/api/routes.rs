use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::health::{HealthSnapshot, HealthState};
use crate::api::latency::{LatencySummary, RefreshLatency};
use crate::collection::{filter_and_sort, group_by_category, group_by_risk_level, summarize};
use crate::error::AppError;
use crate::scorer::community_metrics;
use crate::state::RecordStore;
use crate::types::{
    CommunityMetrics, CommunityTier, DashboardSummary, EnrichedRecord, FilterSpec, RiskDistribution,
};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<RecordStore>,
    pub health: Arc<HealthState>,
    pub latency: Arc<RefreshLatency>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/cryptos", get(get_cryptos))
        .route("/cryptos/:symbol", get(get_crypto))
        .route("/groups/category", get(get_category_groups))
        .route("/groups/risk", get(get_risk_groups))
        .route("/community/:symbol", get(get_community))
        .route("/stats/summary", get(get_stats_summary))
        .route("/stats/latency", get(get_stats_latency))
        .route("/health", get(get_health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: String,
    pub count: usize,
    pub total_market_cap: f64,
    pub records: Vec<EnrichedRecord>,
}

#[derive(Debug, Serialize)]
pub struct RiskGroupsResponse {
    pub distribution: RiskDistribution,
    pub low: Vec<EnrichedRecord>,
    pub medium: Vec<EnrichedRecord>,
    pub high: Vec<EnrichedRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub symbol: String,
    /// False when no provider returned community data; metrics are then all zero.
    pub has_data: bool,
    pub metrics: CommunityMetrics,
    pub tier: CommunityTier,
    pub tier_index: u8,
    pub tier_label: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: DashboardSummary,
    pub refreshed_at_ns: u64,
    pub social_coverage: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub refresh: HealthSnapshot,
    pub records: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_cryptos(
    State(state): State<ApiState>,
    Query(spec): Query<FilterSpec>,
) -> Json<Vec<EnrichedRecord>> {
    let snapshot = state.store.snapshot();
    let records = filter_and_sort(&snapshot, &spec).into_iter().cloned().collect();
    Json(records)
}

async fn get_crypto(
    State(state): State<ApiState>,
    Path(symbol): Path<String>,
) -> Result<Json<EnrichedRecord>, AppError> {
    state
        .store
        .get_by_symbol(&symbol)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("symbol {symbol}")))
}

/// Groups sorted by name; "Other" collects uncategorized records.
async fn get_category_groups(State(state): State<ApiState>) -> Json<Vec<CategoryGroup>> {
    let snapshot = state.store.snapshot();
    let groups: BTreeMap<String, Vec<&EnrichedRecord>> = group_by_category(&snapshot);
    let out = groups
        .into_iter()
        .map(|(category, records)| CategoryGroup {
            category,
            count: records.len(),
            total_market_cap: records.iter().map(|r| r.market_cap()).sum(),
            records: records.into_iter().cloned().collect(),
        })
        .collect();
    Json(out)
}

async fn get_risk_groups(State(state): State<ApiState>) -> Json<RiskGroupsResponse> {
    let snapshot = state.store.snapshot();
    let groups = group_by_risk_level(&snapshot);
    Json(RiskGroupsResponse {
        distribution: groups.distribution(),
        low: groups.low.into_iter().cloned().collect(),
        medium: groups.medium.into_iter().cloned().collect(),
        high: groups.high.into_iter().cloned().collect(),
    })
}

/// Community strength for one symbol. A listed symbol without community data
/// still answers (all zeros, very weak); an unknown symbol is 404.
async fn get_community(
    State(state): State<ApiState>,
    Path(symbol): Path<String>,
) -> Result<Json<CommunityResponse>, AppError> {
    let record = state.store.get_by_symbol(&symbol);
    let metrics = record
        .as_ref()
        .and_then(|r| r.community_metrics)
        .or_else(|| state.store.social_for(&symbol).map(|m| community_metrics(Some(&m))));

    if record.is_none() && metrics.is_none() {
        return Err(AppError::NotFound(format!("symbol {symbol}")));
    }

    let has_data = metrics.is_some();
    let metrics = metrics.unwrap_or_default();
    let tier = metrics.tier();
    Ok(Json(CommunityResponse {
        symbol: record.map_or(symbol, |r| r.raw.symbol),
        has_data,
        metrics,
        tier,
        tier_index: tier.index(),
        tier_label: tier.label(),
    }))
}

async fn get_stats_summary(State(state): State<ApiState>) -> Json<SummaryResponse> {
    let snapshot = state.store.snapshot();
    Json(SummaryResponse {
        summary: summarize(&snapshot),
        refreshed_at_ns: state.store.refreshed_at_ns(),
        social_coverage: state.store.social_count(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencySummary> {
    Json(state.latency.summary())
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        refresh: state.health.snapshot(),
        records: state.store.record_count(),
    })
}
