//! Filter, sort and group operations over enriched records.
//! Everything borrows from the caller's snapshot; nothing is cloned.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::OTHER_CATEGORY;
use crate::scorer::functions::to_score;
use crate::types::{
    DashboardSummary, EnrichedRecord, FilterSpec, MarketCapEntry, RiskDistribution, RiskLevel,
    SortBy, SortOrder,
};

const TOP_MARKET_CAP_LEN: usize = 10;

/// Applies every present bound (inclusive) in a fixed order. Relative order is preserved.
pub fn filter<'a>(records: &'a [EnrichedRecord], spec: &FilterSpec) -> Vec<&'a EnrichedRecord> {
    let level = spec.risk_level.unwrap_or_default();
    records
        .iter()
        .filter(|r| level.matches(r.risk_level))
        .filter(|r| spec.min_market_cap.map_or(true, |min| r.market_cap() >= min))
        .filter(|r| spec.max_market_cap.map_or(true, |max| r.market_cap() <= max))
        .filter(|r| spec.min_supply_ratio.map_or(true, |min| r.supply_ratio >= min))
        .filter(|r| spec.max_supply_ratio.map_or(true, |max| r.supply_ratio <= max))
        .filter(|r| spec.min_volume_24h.map_or(true, |min| r.volume_24h() >= min))
        .collect()
}

/// Stable sort; equal keys keep their input order in both directions.
pub fn sort(records: &mut [&EnrichedRecord], sort_by: SortBy, order: SortOrder) {
    records.sort_by(|a, b| {
        let ord = compare(a, b, sort_by);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Filter then sort. Missing sort fields default to risk score, ascending.
pub fn filter_and_sort<'a>(
    records: &'a [EnrichedRecord],
    spec: &FilterSpec,
) -> Vec<&'a EnrichedRecord> {
    let mut out = filter(records, spec);
    sort(
        &mut out,
        spec.sort_by.unwrap_or_default(),
        spec.sort_order.unwrap_or_default(),
    );
    out
}

fn compare(a: &EnrichedRecord, b: &EnrichedRecord, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::RiskScore => a.risk_score.cmp(&b.risk_score),
        SortBy::MarketCap => a.market_cap().total_cmp(&b.market_cap()),
        SortBy::Volume => a.volume_24h().total_cmp(&b.volume_24h()),
        SortBy::Name => compare_names(a.name(), b.name()),
    }
}

/// Accent-folded and case-insensitive first, so `Ébène` sorts among the `e`s.
/// Ties fall back to the lowercased text, then the raw text, so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold_name(a)
        .cmp(&fold_name(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn fold_name(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Partitions records by a derived key, preserving input order inside each group.
pub fn group_by<'a, K, F>(records: &'a [EnrichedRecord], key_fn: F) -> BTreeMap<K, Vec<&'a EnrichedRecord>>
where
    K: Ord,
    F: Fn(&EnrichedRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a EnrichedRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(key_fn(r)).or_default().push(r);
    }
    groups
}

/// Records without a category land under "Other".
pub fn group_by_category(records: &[EnrichedRecord]) -> BTreeMap<String, Vec<&EnrichedRecord>> {
    group_by(records, |r| {
        r.primary_category
            .clone()
            .unwrap_or_else(|| OTHER_CATEGORY.to_string())
    })
}

#[derive(Debug, Default, Serialize)]
pub struct RiskGroups<'a> {
    pub low: Vec<&'a EnrichedRecord>,
    pub medium: Vec<&'a EnrichedRecord>,
    pub high: Vec<&'a EnrichedRecord>,
}

impl RiskGroups<'_> {
    pub fn distribution(&self) -> RiskDistribution {
        RiskDistribution {
            low: self.low.len(),
            medium: self.medium.len(),
            high: self.high.len(),
        }
    }
}

pub fn group_by_risk_level(records: &[EnrichedRecord]) -> RiskGroups<'_> {
    let mut groups = RiskGroups::default();
    for r in records {
        match r.risk_level {
            RiskLevel::Low => groups.low.push(r),
            RiskLevel::Medium => groups.medium.push(r),
            RiskLevel::High => groups.high.push(r),
        }
    }
    groups
}

/// Headline numbers for the dashboard cards and the top-10 market cap chart.
pub fn summarize(records: &[EnrichedRecord]) -> DashboardSummary {
    let total = records.len();
    let avg_community_score = if total == 0 {
        0
    } else {
        let sum: f64 = records.iter().map(|r| f64::from(r.community_score)).sum();
        to_score(sum / total as f64)
    };

    let mut by_cap: Vec<&EnrichedRecord> = records.iter().collect();
    sort(&mut by_cap, SortBy::MarketCap, SortOrder::Desc);
    let top_market_cap = by_cap
        .into_iter()
        .take(TOP_MARKET_CAP_LEN)
        .map(|r| MarketCapEntry {
            name: r.raw.name.clone(),
            symbol: r.raw.symbol.clone(),
            market_cap: r.market_cap(),
        })
        .collect();

    DashboardSummary {
        total_records: total,
        avg_community_score,
        total_market_cap: records.iter().map(EnrichedRecord::market_cap).sum(),
        total_volume_24h: records.iter().map(EnrichedRecord::volume_24h).sum(),
        risk_distribution: group_by_risk_level(records).distribution(),
        top_market_cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::enrich;
    use crate::types::{Quote, RawMarketRecord, RiskLevelFilter, UsdQuote};

    fn record(name: &str, cap: f64, vol: f64, circ: f64, total: f64, rank: u32) -> EnrichedRecord {
        enrich(RawMarketRecord {
            id: u64::from(rank),
            name: name.to_string(),
            symbol: name.to_uppercase(),
            cmc_rank: rank,
            circulating_supply: circ,
            total_supply: total,
            quote: Quote {
                usd: UsdQuote {
                    market_cap: cap,
                    volume_24h: vol,
                    ..Default::default()
                },
            },
            ..Default::default()
        })
    }

    fn names(rs: &[&EnrichedRecord]) -> Vec<String> {
        rs.iter().map(|r| r.raw.name.clone()).collect()
    }

    fn sample() -> Vec<EnrichedRecord> {
        vec![
            record("gamma", 5e8, 1e7, 50.0, 100.0, 40),
            record("Alpha", 5e6, 1e3, 95.0, 100.0, 700),
            record("beta", 2e9, 4e8, 100.0, 100.0, 2),
        ]
    }

    #[test]
    fn min_market_cap_keeps_order() {
        let rs = sample();
        let spec = FilterSpec {
            min_market_cap: Some(1e8),
            ..Default::default()
        };
        assert_eq!(names(&filter(&rs, &spec)), vec!["gamma", "beta"]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let rs = sample();
        let spec = FilterSpec {
            min_market_cap: Some(5e6),
            max_market_cap: Some(5e8),
            min_supply_ratio: Some(0.5),
            max_supply_ratio: Some(0.95),
            min_volume_24h: Some(1e3),
            ..Default::default()
        };
        assert_eq!(names(&filter(&rs, &spec)), vec!["gamma", "Alpha"]);
    }

    #[test]
    fn risk_level_filter() {
        let rs = sample();
        let all = FilterSpec {
            risk_level: Some(RiskLevelFilter::All),
            ..Default::default()
        };
        assert_eq!(filter(&rs, &all).len(), 3);
        assert_eq!(filter(&rs, &FilterSpec::default()).len(), 3);

        let high = FilterSpec {
            risk_level: Some(RiskLevelFilter::High),
            ..Default::default()
        };
        let kept = filter(&rs, &high);
        assert!(kept.iter().all(|r| r.risk_level == RiskLevel::High));
        assert!(names(&kept).contains(&"beta".to_string()));
    }

    #[test]
    fn sort_by_name_is_case_insensitive_and_idempotent() {
        let rs = sample();
        let mut v: Vec<&EnrichedRecord> = rs.iter().collect();
        sort(&mut v, SortBy::Name, SortOrder::Asc);
        assert_eq!(names(&v), vec!["Alpha", "beta", "gamma"]);
        let once = names(&v);
        sort(&mut v, SortBy::Name, SortOrder::Asc);
        assert_eq!(names(&v), once);

        sort(&mut v, SortBy::Name, SortOrder::Desc);
        assert_eq!(names(&v), vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn sort_by_name_folds_accents() {
        let rs: Vec<EnrichedRecord> = ["Zeta", "Ébène", "apple", "Øre", "Ethereum"]
            .iter()
            .enumerate()
            .map(|(i, n)| record(n, 1e6, 1e3, 1.0, 1.0, i as u32 + 1))
            .collect();
        let mut v: Vec<&EnrichedRecord> = rs.iter().collect();
        sort(&mut v, SortBy::Name, SortOrder::Asc);
        assert_eq!(names(&v), vec!["apple", "Ébène", "Ethereum", "Øre", "Zeta"]);
    }

    #[test]
    fn accented_and_plain_names_still_order_totally() {
        assert_eq!(compare_names("Ebene", "Ébène"), Ordering::Less);
        assert_eq!(compare_names("Ébène", "Ebene"), Ordering::Greater);
        assert_eq!(compare_names("éclair", "Eclair"), Ordering::Greater);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn numeric_sorts() {
        let rs = sample();
        let spec = FilterSpec {
            sort_by: Some(SortBy::MarketCap),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert_eq!(names(&filter_and_sort(&rs, &spec)), vec!["beta", "gamma", "Alpha"]);

        let spec = FilterSpec {
            sort_by: Some(SortBy::Volume),
            ..Default::default()
        };
        assert_eq!(names(&filter_and_sort(&rs, &spec)), vec!["Alpha", "gamma", "beta"]);
    }

    #[test]
    fn default_sort_is_risk_score_ascending() {
        let rs = sample();
        let out = filter_and_sort(&rs, &FilterSpec::default());
        assert!(out.windows(2).all(|w| w[0].risk_score <= w[1].risk_score));
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let rs = vec![
            record("first", 1e9, 1e8, 1.0, 1.0, 1),
            record("second", 1e9, 1e8, 1.0, 1.0, 1),
            record("third", 1e9, 1e8, 1.0, 1.0, 1),
        ];
        let mut v: Vec<&EnrichedRecord> = rs.iter().collect();
        sort(&mut v, SortBy::RiskScore, SortOrder::Asc);
        assert_eq!(names(&v), vec!["first", "second", "third"]);
        sort(&mut v, SortBy::MarketCap, SortOrder::Desc);
        assert_eq!(names(&v), vec!["first", "second", "third"]);
    }

    #[test]
    fn group_by_category_partitions_everything() {
        let mut rs = sample();
        rs[0].primary_category = Some("DeFi".to_string());
        rs[2].primary_category = Some("DeFi".to_string());
        rs[1].primary_category = None;

        let groups = group_by_category(&rs);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, rs.len());
        assert_eq!(names(&groups["DeFi"]), vec!["gamma", "beta"]);
        assert_eq!(names(&groups[OTHER_CATEGORY]), vec!["Alpha"]);
    }

    #[test]
    fn group_by_risk_level_covers_all_levels() {
        let rs = sample();
        let groups = group_by_risk_level(&rs);
        let d = groups.distribution();
        assert_eq!(d.low + d.medium + d.high, rs.len());
    }

    #[test]
    fn summary_totals() {
        let rs = sample();
        let s = summarize(&rs);
        assert_eq!(s.total_records, 3);
        assert_eq!(s.total_market_cap, 5e8 + 5e6 + 2e9);
        assert_eq!(s.top_market_cap.first().map(|e| e.name.as_str()), Some("beta"));
        // ranks 40, 700, 2 -> 90, 40, 100 -> 76.67 -> 77
        assert_eq!(s.avg_community_score, 77);
    }

    #[test]
    fn empty_summary() {
        let s = summarize(&[]);
        assert_eq!(s.total_records, 0);
        assert_eq!(s.avg_community_score, 0);
        assert!(s.top_market_cap.is_empty());
    }
}
