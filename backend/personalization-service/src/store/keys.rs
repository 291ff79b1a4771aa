//! Fast-store key schema
//!
//! Format: {entity}:{user_id}. Prefixes never share a suffix, so arbitrary
//! user ids cannot collide across entities.

pub struct StoreKey;

impl StoreKey {
    /// Hash of topic -> interest score
    /// Format: user_interest:{user_id}
    pub fn interests(user_id: &str) -> String {
        format!("user_interest:{}", user_id)
    }

    /// Sorted set of content ids scored by rank position (0 = top)
    /// Format: feed:{user_id}
    pub fn feed(user_id: &str) -> String {
        format!("feed:{}", user_id)
    }

    /// Hash of content id -> predictive score for the current ranking
    /// Format: feed_scores:{user_id}
    pub fn feed_scores(user_id: &str) -> String {
        format!("feed_scores:{}", user_id)
    }
}
