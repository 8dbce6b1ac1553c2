//! Threshold scoring functions. Each maps raw metrics onto a 0–100 integer
//! score through fixed bands; every band is closed on its lower bound.
//!
//! All functions are total: zero, negative and NaN inputs land on the floor
//! band instead of failing.

/// `(minimum, score)` pairs, highest band first.
type Bands<T> = &'static [(T, u8)];

const MARKET_CAP_BANDS: Bands<f64> = &[
    (1_000_000_000.0, 100),
    (100_000_000.0, 80),
    (10_000_000.0, 60),
    (1_000_000.0, 40),
];

/// Applied to volume_24h / market_cap.
const LIQUIDITY_BANDS: Bands<f64> = &[(0.1, 100), (0.05, 80), (0.01, 60), (0.005, 40)];

/// Applied to circulating / total.
const SUPPLY_RATIO_BANDS: Bands<f64> = &[(0.9, 100), (0.7, 80), (0.5, 60), (0.3, 40)];

/// Upper bounds: rank <= bound.
const RANK_BANDS: Bands<u32> = &[(10, 100), (50, 90), (100, 80), (500, 60), (1000, 40)];

/// Upper bounds on the mean absolute percent change.
const VOLATILITY_BANDS: Bands<f64> = &[(5.0, 100), (10.0, 80), (20.0, 60), (50.0, 40)];

const AUDIENCE_BANDS: Bands<f64> = &[
    (500_000.0, 100),
    (100_000.0, 90),
    (50_000.0, 80),
    (10_000.0, 70),
    (1_000.0, 50),
];

/// Reddit posts + comments over 48h.
const REDDIT_ACTIVITY_BANDS: Bands<f64> = &[(100.0, 100), (50.0, 80), (20.0, 60), (5.0, 40)];

const REDDIT_ACCOUNT_BANDS: Bands<f64> = &[(1_000.0, 100), (500.0, 80), (100.0, 60), (10.0, 40)];

const FACEBOOK_BANDS: Bands<f64> = &[
    (1_000_000.0, 100),
    (500_000.0, 90),
    (100_000.0, 80),
    (50_000.0, 70),
    (10_000.0, 50),
];

/// Neutral score when total supply is unknown.
const UNKNOWN_SUPPLY_SCORE: u8 = 50;
const FLOOR_SCORE: u8 = 20;
/// Any positive social count scores at least this much.
const PRESENT_SOCIAL_SCORE: u8 = 20;

fn at_least<T: PartialOrd + Copy>(value: T, bands: Bands<T>, floor: u8) -> u8 {
    bands
        .iter()
        .find(|&&(min, _)| value >= min)
        .map_or(floor, |&(_, score)| score)
}

fn at_most<T: PartialOrd + Copy>(value: T, bands: Bands<T>, floor: u8) -> u8 {
    bands
        .iter()
        .find(|&&(max, _)| value <= max)
        .map_or(floor, |&(_, score)| score)
}

/// Social counts: banded when large, 20 when merely positive, 0 otherwise.
fn social_tier(value: f64, bands: Bands<f64>) -> u8 {
    let floor = if value > 0.0 { PRESENT_SOCIAL_SCORE } else { 0 };
    at_least(value, bands, floor)
}

/// Rounds half away from zero and clamps to the score range.
pub(crate) fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

pub fn market_cap_score(market_cap: f64) -> u8 {
    at_least(market_cap, MARKET_CAP_BANDS, FLOOR_SCORE)
}

/// 0 when market cap is zero, else banded on the volume-to-cap ratio.
pub fn liquidity_score(volume_24h: f64, market_cap: f64) -> u8 {
    if market_cap == 0.0 {
        return 0;
    }
    at_least(volume_24h / market_cap, LIQUIDITY_BANDS, FLOOR_SCORE)
}

/// circulating / total, or 0 when total supply is not positive. Clamped to [0, 1].
pub fn supply_ratio(circulating: f64, total: f64) -> f64 {
    if !(total > 0.0) {
        return 0.0;
    }
    let ratio = circulating / total;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

pub fn supply_ratio_score(circulating: f64, total: f64) -> u8 {
    if !(total > 0.0) {
        return UNKNOWN_SUPPLY_SCORE;
    }
    at_least(circulating / total, SUPPLY_RATIO_BANDS, FLOOR_SCORE)
}

/// Market-cap rank as a proxy for community size. Lower rank, stronger community.
pub fn rank_community_score(rank: u32) -> u8 {
    at_most(rank, RANK_BANDS, FLOOR_SCORE)
}

/// Mean absolute price change across the three windows, in percent.
pub fn mean_abs_change(p24h: f64, p7d: f64, p30d: f64) -> f64 {
    (p24h.abs() + p7d.abs() + p30d.abs()) / 3.0
}

/// Stepped inverse of price-change magnitude: calmer assets score higher.
pub fn volatility_score(p24h: f64, p7d: f64, p30d: f64) -> u8 {
    at_most(mean_abs_change(p24h, p7d, p30d), VOLATILITY_BANDS, FLOOR_SCORE)
}

pub fn reddit_score(
    subscribers: Option<f64>,
    avg_posts_48h: Option<f64>,
    avg_comments_48h: Option<f64>,
    active_accounts_48h: Option<f64>,
) -> u8 {
    use crate::config::community_weights::*;

    let subscriber_score = social_tier(subscribers.unwrap_or(0.0), AUDIENCE_BANDS);
    let activity = avg_posts_48h.unwrap_or(0.0) + avg_comments_48h.unwrap_or(0.0);
    let activity_score = social_tier(activity, REDDIT_ACTIVITY_BANDS);
    let account_score = social_tier(active_accounts_48h.unwrap_or(0.0), REDDIT_ACCOUNT_BANDS);

    to_score(
        f64::from(subscriber_score) * REDDIT_SUBSCRIBERS
            + f64::from(activity_score) * REDDIT_ACTIVITY
            + f64::from(account_score) * REDDIT_ACCOUNTS,
    )
}

pub fn telegram_score(channel_users: Option<f64>) -> u8 {
    social_tier(channel_users.unwrap_or(0.0), AUDIENCE_BANDS)
}

pub fn facebook_score(likes: Option<f64>) -> u8 {
    social_tier(likes.unwrap_or(0.0), FACEBOOK_BANDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn market_cap_bands() {
        assert_eq!(market_cap_score(2e9), 100);
        assert_eq!(market_cap_score(1e9), 100);
        assert_eq!(market_cap_score(999_999_999.0), 80);
        assert_eq!(market_cap_score(1e8), 80);
        assert_eq!(market_cap_score(1e7), 60);
        assert_eq!(market_cap_score(1e6), 40);
        assert_eq!(market_cap_score(999_999.0), 20);
        assert_eq!(market_cap_score(0.0), 20);
        assert_eq!(market_cap_score(-5.0), 20);
    }

    #[test]
    fn liquidity_zero_cap_is_zero() {
        assert_eq!(liquidity_score(1_000_000.0, 0.0), 0);
    }

    #[test]
    fn liquidity_bands() {
        assert_eq!(liquidity_score(15.0, 100.0), 100);
        assert_eq!(liquidity_score(10.0, 100.0), 100);
        assert_eq!(liquidity_score(5.0, 100.0), 80);
        assert_eq!(liquidity_score(1.0, 100.0), 60);
        assert_eq!(liquidity_score(0.5, 100.0), 40);
        assert_eq!(liquidity_score(0.1, 100.0), 20);
        assert_eq!(liquidity_score(0.0, 100.0), 20);
    }

    #[test]
    fn supply_ratio_handles_unknown_total() {
        assert_eq!(supply_ratio(1_000.0, 0.0), 0.0);
        assert_eq!(supply_ratio(0.0, 0.0), 0.0);
        assert_eq!(supply_ratio(500.0, 1_000.0), 0.5);
        // circulating above total is an upstream glitch; keep the ratio bounded
        assert_eq!(supply_ratio(1_200.0, 1_000.0), 1.0);
        assert_eq!(supply_ratio_score(1_000.0, 0.0), 50);
    }

    #[test]
    fn supply_ratio_score_bands() {
        assert_eq!(supply_ratio_score(900.0, 1_000.0), 100);
        assert_eq!(supply_ratio_score(700.0, 1_000.0), 80);
        assert_eq!(supply_ratio_score(500.0, 1_000.0), 60);
        assert_eq!(supply_ratio_score(300.0, 1_000.0), 40);
        assert_eq!(supply_ratio_score(299.0, 1_000.0), 20);
    }

    #[test]
    fn rank_bands() {
        assert_eq!(rank_community_score(1), 100);
        assert_eq!(rank_community_score(10), 100);
        assert_eq!(rank_community_score(11), 90);
        assert_eq!(rank_community_score(50), 90);
        assert_eq!(rank_community_score(100), 80);
        assert_eq!(rank_community_score(500), 60);
        assert_eq!(rank_community_score(1000), 40);
        assert_eq!(rank_community_score(1001), 20);
    }

    #[test]
    fn volatility_is_stepped_on_mean_abs_change() {
        assert_eq!(volatility_score(2.0, -3.0, 10.0), 100);
        assert_eq!(volatility_score(10.0, -10.0, 10.0), 80);
        assert_eq!(volatility_score(-20.0, 20.0, 20.0), 60);
        assert_eq!(volatility_score(50.0, 50.0, -50.0), 40);
        assert_eq!(volatility_score(60.0, 0.0, 100.0), 20);
        assert_eq!(volatility_score(0.0, 0.0, 0.0), 100);
    }

    #[test]
    fn reddit_weighted_example() {
        // 150k subscribers -> 90, 110 posts+comments -> 100, 1200 active -> 100
        let s = reddit_score(Some(150_000.0), Some(60.0), Some(50.0), Some(1_200.0));
        assert_eq!(s, 95);
    }

    #[test]
    fn reddit_absent_is_zero() {
        assert_eq!(reddit_score(None, None, None, None), 0);
        assert_eq!(reddit_score(Some(0.0), Some(0.0), Some(0.0), Some(0.0)), 0);
    }

    #[test]
    fn reddit_rounds_partial_weights() {
        // 20*0.5 + 20*0.3 + 20*0.2 = 20
        assert_eq!(reddit_score(Some(5.0), Some(1.0), None, Some(1.0)), 20);
        // 50*0.5 + 0 + 40*0.2 = 33
        assert_eq!(reddit_score(Some(1_000.0), None, None, Some(10.0)), 33);
    }

    #[test]
    fn telegram_and_facebook_tiers() {
        assert_eq!(telegram_score(Some(500_000.0)), 100);
        assert_eq!(telegram_score(Some(1_000.0)), 50);
        assert_eq!(telegram_score(Some(1.0)), 20);
        assert_eq!(telegram_score(None), 0);
        assert_eq!(facebook_score(Some(1_000_000.0)), 100);
        assert_eq!(facebook_score(Some(50_000.0)), 70);
        assert_eq!(facebook_score(Some(9_999.0)), 20);
        assert_eq!(facebook_score(Some(0.0)), 0);
    }

    #[test]
    fn to_score_rounds_not_truncates() {
        assert_eq!(to_score(32.5), 33);
        assert_eq!(to_score(32.4), 32);
        assert_eq!(to_score(140.0), 100);
        assert_eq!(to_score(-3.0), 0);
        assert_eq!(to_score(f64::NAN), 0);
    }

    proptest! {
        #[test]
        fn market_cap_score_is_banded_and_monotonic(a in 0.0f64..1e13, b in 0.0f64..1e13) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!([20, 40, 60, 80, 100].contains(&market_cap_score(lo)));
            prop_assert!(market_cap_score(lo) <= market_cap_score(hi));
        }

        #[test]
        fn rank_score_is_non_increasing(a in 1u32..5_000, b in 1u32..5_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rank_community_score(lo) >= rank_community_score(hi));
        }

        #[test]
        fn scores_stay_in_range(
            cap in -1e12f64..1e13,
            vol in -1e12f64..1e13,
            circ in -1e9f64..1e12,
            total in -1e9f64..1e12,
            p24 in -500.0f64..500.0,
            p7 in -500.0f64..500.0,
            p30 in -500.0f64..500.0,
        ) {
            prop_assert!(liquidity_score(vol, cap) <= 100);
            prop_assert!(supply_ratio_score(circ, total) <= 100);
            prop_assert!(volatility_score(p24, p7, p30) <= 100);
            let ratio = supply_ratio(circ, total);
            prop_assert!((0.0..=1.0).contains(&ratio));
        }
    }
}
