use crate::config::community_weights::{FACEBOOK, REDDIT, TELEGRAM};
use crate::scorer::functions::{facebook_score, reddit_score, telegram_score, to_score};
use crate::types::{CommunityMetrics, SocialMetrics};

/// Weighted community strength from the social platforms.
/// Absent metrics (or absent sub-fields) contribute zero.
pub fn community_metrics(social: Option<&SocialMetrics>) -> CommunityMetrics {
    let Some(s) = social else {
        return CommunityMetrics::default();
    };

    let reddit = reddit_score(
        s.reddit_subscribers,
        s.reddit_average_posts_48h,
        s.reddit_average_comments_48h,
        s.reddit_accounts_active_48h,
    );
    let telegram = telegram_score(s.telegram_channel_user_count);
    let facebook = facebook_score(s.facebook_likes);

    let overall = to_score(
        f64::from(reddit) * REDDIT + f64::from(telegram) * TELEGRAM + f64::from(facebook) * FACEBOOK,
    );

    CommunityMetrics {
        reddit_score: reddit,
        telegram_score: telegram,
        facebook_score: facebook,
        overall_community_score: overall,
    }
}
