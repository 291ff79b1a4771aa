use super::{FeedRankingStore, InterestStore, RankedEntry};
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Process-local fast store.
///
/// Interest increments hold the user's map entry lock for the whole
/// read-add-write, so concurrent increments never lose updates. A ranking is
/// swapped in as one `Arc`, so readers see either the old or the new list.
#[derive(Clone, Default)]
pub struct MemoryStore {
    interests: Arc<DashMap<String, HashMap<String, f64>>>,
    feeds: Arc<DashMap<String, Arc<Vec<RankedEntry>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn feed(&self, user_id: &str) -> Option<Arc<Vec<RankedEntry>>> {
        self.feeds.get(user_id).map(|feed| Arc::clone(feed.value()))
    }
}

#[async_trait]
impl InterestStore for MemoryStore {
    async fn update_interest(&self, user_id: &str, topic: &str, delta: f64) -> Result<f64> {
        let mut topics = self.interests.entry(user_id.to_string()).or_default();
        let score = topics.entry(topic.to_string()).or_insert(0.0);
        *score += delta;
        Ok(*score)
    }

    async fn get_interests(&self, user_id: &str) -> Result<HashMap<String, f64>> {
        Ok(self
            .interests
            .get(user_id)
            .map(|topics| topics.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl FeedRankingStore for MemoryStore {
    async fn replace_ranking(&self, user_id: &str, entries: &[RankedEntry]) -> Result<()> {
        if entries.is_empty() {
            self.feeds.remove(user_id);
        } else {
            self.feeds
                .insert(user_id.to_string(), Arc::new(entries.to_vec()));
        }
        Ok(())
    }

    async fn read_range(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RankedEntry>> {
        Ok(self
            .feed(user_id)
            .map(|feed| feed.iter().skip(offset).take(limit).copied().collect())
            .unwrap_or_default())
    }

    async fn score_of(&self, user_id: &str, content_id: Uuid) -> Result<Option<f64>> {
        Ok(self.feed(user_id).and_then(|feed| {
            feed.iter()
                .find(|entry| entry.content_id == content_id)
                .map(|entry| entry.score)
        }))
    }

    async fn has_ranking(&self, user_id: &str) -> Result<bool> {
        Ok(self.feeds.contains_key(user_id))
    }

    async fn ranking_len(&self, user_id: &str) -> Result<usize> {
        Ok(self.feed(user_id).map(|feed| feed.len()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_creates_then_accumulates() {
        let store = MemoryStore::new();

        assert!(store.get_interests("u1").await.unwrap().is_empty());

        let score = store.update_interest("u1", "python", 0.05).await.unwrap();
        assert!((score - 0.05).abs() < 1e-12);

        let score = store.update_interest("u1", "python", -0.04).await.unwrap();
        assert!((score - 0.01).abs() < 1e-12);

        let interests = store.get_interests("u1").await.unwrap();
        assert_eq!(interests.len(), 1);
        assert!(store.get_interests("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_increments_both_land() {
        let store = MemoryStore::new();

        let mut handles = Vec::new();
        for i in 0..100 {
            let store = store.clone();
            let delta = if i % 2 == 0 { 0.05 } else { 0.03 };
            handles.push(tokio::spawn(async move {
                store.update_interest("u1", "ml", delta).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let interests = store.get_interests("u1").await.unwrap();
        assert!((interests["ml"] - (50.0 * 0.05 + 50.0 * 0.03)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ranking_replace_and_range() {
        let store = MemoryStore::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let entries: Vec<RankedEntry> = ids
            .iter()
            .zip([0.3, 0.2, 0.2, 0.0, 0.0])
            .map(|(id, score)| RankedEntry::new(*id, score))
            .collect();

        assert!(!store.has_ranking("u1").await.unwrap());
        store.replace_ranking("u1", &entries).await.unwrap();

        assert!(store.has_ranking("u1").await.unwrap());
        assert_eq!(store.ranking_len("u1").await.unwrap(), 5);
        assert_eq!(store.read_range("u1", 1, 2).await.unwrap(), entries[1..3].to_vec());
        assert!(store.read_range("u1", 5, 10).await.unwrap().is_empty());
        assert_eq!(store.score_of("u1", ids[0]).await.unwrap(), Some(0.3));
        assert_eq!(store.score_of("u1", Uuid::new_v4()).await.unwrap(), None);

        store.replace_ranking("u1", &entries[..1]).await.unwrap();
        assert_eq!(store.ranking_len("u1").await.unwrap(), 1);

        store.replace_ranking("u1", &[]).await.unwrap();
        assert!(!store.has_ranking("u1").await.unwrap());
    }
}
