//! Fast-store accessors
//!
//! Two per-user structures live here:
//! - interest scores: topic -> unbounded f64, only ever changed by atomic increments
//! - feed rankings: the materialized, ordered (content id, predictive score) list
//!   served to paginated feed reads; safe to drop and rebuild at any time
//!
//! Both are reached through traits so the ranking engine can run against Redis
//! in production and against [`MemoryStore`] in tests and local development.

mod keys;
mod memory;
mod redis_store;

pub use keys::StoreKey;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One position of a user's feed ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub content_id: Uuid,
    pub score: f64,
}

impl RankedEntry {
    pub fn new(content_id: Uuid, score: f64) -> Self {
        Self { content_id, score }
    }
}

/// Per-user topic interest scores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterestStore: Send + Sync {
    /// Atomically add `delta` to the (user, topic) score, creating it at `delta`
    /// when absent. Returns the score after the increment.
    async fn update_interest(&self, user_id: &str, topic: &str, delta: f64) -> Result<f64>;

    /// Full topic -> score mapping; empty for users with no recorded interest.
    async fn get_interests(&self, user_id: &str) -> Result<HashMap<String, f64>>;
}

/// Per-user materialized feed ranking.
///
/// Entries are stored in the order given to [`replace_ranking`], which callers
/// supply sorted by descending score; reads return that order unchanged, so
/// equal scores keep their insertion order.
///
/// [`replace_ranking`]: FeedRankingStore::replace_ranking
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedRankingStore: Send + Sync {
    /// Replace the whole ranking. An empty slice leaves no ranking behind.
    async fn replace_ranking(&self, user_id: &str, entries: &[RankedEntry]) -> Result<()>;

    /// Up to `limit` entries starting at rank `offset` (zero-based).
    async fn read_range(&self, user_id: &str, offset: usize, limit: usize)
        -> Result<Vec<RankedEntry>>;

    async fn score_of(&self, user_id: &str, content_id: Uuid) -> Result<Option<f64>>;

    async fn has_ranking(&self, user_id: &str) -> Result<bool>;

    async fn ranking_len(&self, user_id: &str) -> Result<usize>;
}
