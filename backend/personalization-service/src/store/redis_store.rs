use super::{FeedRankingStore, InterestStore, RankedEntry, StoreKey};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

lazy_static! {
    /// Reads a rank window and the matching scores in one atomic step, so a
    /// concurrent replace can never pair ids from one ranking with scores
    /// from another.
    static ref READ_RANGE_SCRIPT: redis::Script = redis::Script::new(
        r#"
        local ids = redis.call('ZRANGE', KEYS[1], ARGV[1], ARGV[2])
        local result = {}
        for _, id in ipairs(ids) do
            local score = redis.call('HGET', KEYS[2], id)
            if score then
                table.insert(result, id)
                table.insert(result, score)
            end
        end
        return result
        "#,
    );
}

/// Redis-backed fast store.
///
/// - interests: hash `user_interest:{user}`, mutated only with `HINCRBYFLOAT`
/// - ranking:   sorted set `feed:{user}` (member = content id, score = rank
///   position) plus hash `feed_scores:{user}` (content id -> predictive score)
///
/// Positions rather than predictive scores order the sorted set because Redis
/// breaks score ties by member text, and equal scores must keep catalog order.
#[derive(Clone)]
pub struct RedisStore {
    redis: ConnectionManager,
}

impl RedisStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(manager))
    }

    /// Round-trip to Redis; used by readiness checks.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis PING failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}

fn parse_content_id(member: &str) -> Option<Uuid> {
    match Uuid::parse_str(member) {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(member = %member, "Skipping malformed content id in feed ranking");
            None
        }
    }
}

#[async_trait]
impl InterestStore for RedisStore {
    async fn update_interest(&self, user_id: &str, topic: &str, delta: f64) -> Result<f64> {
        let key = StoreKey::interests(user_id);
        let mut conn = self.redis.clone();

        let score: f64 = redis::cmd("HINCRBYFLOAT")
            .arg(&key)
            .arg(topic)
            .arg(delta)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "Redis HINCRBYFLOAT failed");
                AppError::from(e)
            })?;

        debug!(user_id = %user_id, topic = %topic, delta, score, "Interest updated");
        Ok(score)
    }

    async fn get_interests(&self, user_id: &str) -> Result<HashMap<String, f64>> {
        let key = StoreKey::interests(user_id);
        let mut conn = self.redis.clone();

        conn.hgetall::<_, HashMap<String, f64>>(&key)
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "Redis HGETALL failed");
                AppError::from(e)
            })
    }
}

#[async_trait]
impl FeedRankingStore for RedisStore {
    async fn replace_ranking(&self, user_id: &str, entries: &[RankedEntry]) -> Result<()> {
        let feed_key = StoreKey::feed(user_id);
        let scores_key = StoreKey::feed_scores(user_id);

        // MULTI/EXEC: readers see the previous ranking or the new one, never a gap
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(&feed_key)
            .ignore()
            .del(&scores_key)
            .ignore();

        if !entries.is_empty() {
            let positions: Vec<(usize, String)> = entries
                .iter()
                .enumerate()
                .map(|(position, entry)| (position, entry.content_id.to_string()))
                .collect();
            let scores: Vec<(String, f64)> = entries
                .iter()
                .map(|entry| (entry.content_id.to_string(), entry.score))
                .collect();

            pipe.zadd_multiple(&feed_key, &positions)
                .ignore()
                .hset_multiple(&scores_key, &scores)
                .ignore();
        }

        let mut conn = self.redis.clone();
        pipe.query_async::<_, ()>(&mut conn).await.map_err(|e| {
            warn!(key = %feed_key, error = %e, "Redis feed ranking replace failed");
            AppError::from(e)
        })?;

        debug!(user_id = %user_id, entries = entries.len(), "Feed ranking replaced");
        Ok(())
    }

    async fn read_range(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RankedEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let feed_key = StoreKey::feed(user_id);
        let mut conn = self.redis.clone();

        let rows: Vec<(String, f64)> = READ_RANGE_SCRIPT
            .key(&feed_key)
            .key(StoreKey::feed_scores(user_id))
            .arg(offset)
            .arg(offset.saturating_add(limit - 1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(key = %feed_key, error = %e, "Redis feed range read failed");
                AppError::from(e)
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|(member, score)| {
                parse_content_id(&member).map(|content_id| RankedEntry::new(content_id, score))
            })
            .collect())
    }

    async fn score_of(&self, user_id: &str, content_id: Uuid) -> Result<Option<f64>> {
        let mut conn = self.redis.clone();
        let score: Option<f64> = conn
            .hget(StoreKey::feed_scores(user_id), content_id.to_string())
            .await?;
        Ok(score)
    }

    async fn has_ranking(&self, user_id: &str) -> Result<bool> {
        let mut conn = self.redis.clone();
        let exists: bool = conn.exists(StoreKey::feed(user_id)).await?;
        Ok(exists)
    }

    async fn ranking_len(&self, user_id: &str) -> Result<usize> {
        let mut conn = self.redis.clone();
        let len: usize = conn.zcard(StoreKey::feed(user_id)).await?;
        Ok(len)
    }
}
