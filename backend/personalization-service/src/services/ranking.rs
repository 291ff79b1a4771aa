//! Ranking engine
//!
//! Turns interaction telemetry into topic interest updates, scores the whole
//! catalog against a user's interests, and serves paginated slices of the
//! resulting ranking.
//!
//! Interest scores only ever move through atomic increments in the
//! [`InterestStore`]; the feed ranking is a derived view that can be dropped
//! and rebuilt at any time.

use crate::db::ContentCatalog;
use crate::error::Result;
use crate::jobs::feed_refresher::{FeedRefresher, ScheduleOutcome};
use crate::metrics::{
    FEED_GENERATION_DURATION_SECONDS, FEED_REFRESH_EVENTS_TOTAL, FEED_REQUESTS_TOTAL,
    INTERACTIONS_PROCESSED_TOTAL,
};
use crate::models::{Content, FeedPage, ScoredContent};
use crate::services::scoring;
use crate::store::{FeedRankingStore, InterestStore, RankedEntry};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of grading one interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Interest for `topic` moved by `delta`, ending at `new_interest`.
    Applied {
        topic: String,
        delta: f64,
        new_interest: f64,
    },
    /// The content id is not in the catalog; nothing was changed.
    UnknownContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedStatus {
    pub user_id: String,
    pub ranked_items: usize,
}

#[derive(Clone)]
pub struct RankingEngine {
    interests: Arc<dyn InterestStore>,
    feeds: Arc<dyn FeedRankingStore>,
    catalog: Arc<dyn ContentCatalog>,
    refresher: Option<FeedRefresher>,
}

impl RankingEngine {
    /// Engine that rebuilds the feed inline after every applied interaction.
    pub fn new(
        interests: Arc<dyn InterestStore>,
        feeds: Arc<dyn FeedRankingStore>,
        catalog: Arc<dyn ContentCatalog>,
    ) -> Self {
        Self {
            interests,
            feeds,
            catalog,
            refresher: None,
        }
    }

    /// Hand post-interaction rebuilds to a background refresher instead.
    pub fn with_refresher(mut self, refresher: FeedRefresher) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Grade one interaction and fold it into the user's topic interest.
    ///
    /// Unknown content ids are a no-op. Otherwise the user's feed ranking is
    /// rebuilt (or queued for rebuild) before returning.
    pub async fn process_interaction(
        &self,
        user_id: &str,
        content_id: Uuid,
        time_spent: i64,
        scroll_depth: i32,
    ) -> Result<InteractionOutcome> {
        let content = match self.catalog.get_content(content_id).await? {
            Some(content) => content,
            None => {
                debug!(user_id, %content_id, "Interaction on unknown content ignored");
                INTERACTIONS_PROCESSED_TOTAL
                    .with_label_values(&["unknown_content"])
                    .inc();
                return Ok(InteractionOutcome::UnknownContent);
            }
        };

        let completion = scoring::completion_rate(scroll_depth);
        let norm_time = scoring::normalized_time(time_spent, content.read_time_secs());

        let interests = self.interests.get_interests(user_id).await?;
        let current = interests
            .get(&content.topic)
            .copied()
            .unwrap_or(scoring::NEUTRAL_TOPIC_INTEREST);

        let score = scoring::interaction_score(completion, norm_time, current);
        let delta = scoring::interest_delta(score);

        // Concurrent interactions for the same (user, topic) each land exactly once.
        let new_interest = self
            .interests
            .update_interest(user_id, &content.topic, delta)
            .await?;

        info!(
            user_id,
            topic = %content.topic,
            score,
            delta,
            new_interest,
            "Updated topic interest"
        );
        INTERACTIONS_PROCESSED_TOTAL
            .with_label_values(&["applied"])
            .inc();

        self.refresh_feed(user_id).await?;

        Ok(InteractionOutcome::Applied {
            topic: content.topic,
            delta,
            new_interest,
        })
    }

    /// Score every catalog item against the user's interests and replace the
    /// stored ranking. Returns the number of ranked items.
    pub async fn generate_feed(&self, user_id: &str) -> Result<usize> {
        let timer = Instant::now();

        let catalog = self.catalog.list_all_content().await?;
        let interests = self.interests.get_interests(user_id).await?;
        let ranking = rank_catalog(&catalog, &interests);

        self.feeds.replace_ranking(user_id, &ranking).await?;

        let elapsed = timer.elapsed();
        FEED_GENERATION_DURATION_SECONDS.observe(elapsed.as_secs_f64());
        debug!(
            user_id,
            ranked = ranking.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Feed ranking rebuilt"
        );

        Ok(ranking.len())
    }

    /// One page of the user's feed, starting at rank `offset`.
    ///
    /// A user without any stored ranking gets one generated on first read.
    /// Ranked ids missing from the catalog are skipped, so a page may hold
    /// fewer than `limit` items.
    pub async fn get_feed(&self, user_id: &str, limit: usize, offset: usize) -> Result<FeedPage> {
        if limit == 0 {
            return Ok(FeedPage::empty());
        }

        let mut entries = self.feeds.read_range(user_id, offset, limit).await?;
        let mut source = "ranking";

        // A past-the-end read on an existing ranking is a normal empty page.
        if entries.is_empty() && !self.feeds.has_ranking(user_id).await? {
            self.generate_feed(user_id).await?;
            entries = self.feeds.read_range(user_id, offset, limit).await?;
            source = "regenerated";
        }
        FEED_REQUESTS_TOTAL.with_label_values(&[source]).inc();

        if entries.is_empty() {
            return Ok(FeedPage::empty());
        }

        let ids: Vec<Uuid> = entries.iter().map(|entry| entry.content_id).collect();
        let mut contents: HashMap<Uuid, Content> = self
            .catalog
            .get_contents_by_ids(&ids)
            .await?
            .into_iter()
            .map(|content| (content.id, content))
            .collect();

        let items: Vec<ScoredContent> = entries
            .into_iter()
            .filter_map(|entry| match contents.remove(&entry.content_id) {
                Some(content) => Some(ScoredContent {
                    content,
                    score: entry.score,
                }),
                None => {
                    debug!(
                        user_id,
                        content_id = %entry.content_id,
                        "Ranked content no longer in catalog"
                    );
                    None
                }
            })
            .collect();

        Ok(FeedPage::from_items(items, offset))
    }

    /// Raw topic interest scores for the dashboard.
    pub async fn get_interests(&self, user_id: &str) -> Result<HashMap<String, f64>> {
        self.interests.get_interests(user_id).await
    }

    /// Predictive score of one item in the user's current ranking.
    pub async fn feed_score(&self, user_id: &str, content_id: Uuid) -> Result<Option<f64>> {
        self.feeds.score_of(user_id, content_id).await
    }

    pub async fn feed_status(&self, user_id: &str) -> Result<FeedStatus> {
        Ok(FeedStatus {
            user_id: user_id.to_string(),
            ranked_items: self.feeds.ranking_len(user_id).await?,
        })
    }

    async fn refresh_feed(&self, user_id: &str) -> Result<()> {
        let Some(refresher) = &self.refresher else {
            self.generate_feed(user_id).await?;
            return Ok(());
        };

        match refresher.schedule(user_id).await {
            ScheduleOutcome::Queued | ScheduleOutcome::Coalesced => Ok(()),
            ScheduleOutcome::Closed => {
                warn!(user_id, "Feed refresher stopped; rebuilding inline");
                FEED_REFRESH_EVENTS_TOTAL
                    .with_label_values(&["fallback"])
                    .inc();
                self.generate_feed(user_id).await?;
                Ok(())
            }
        }
    }
}

/// Score each catalog item by the user's interest in its topic and sort by
/// descending score.
///
/// Topics without a recorded interest score [`scoring::UNSEEN_TOPIC_SCORE`].
/// The sort is stable, so equal scores keep catalog order.
pub fn rank_catalog(catalog: &[Content], interests: &HashMap<String, f64>) -> Vec<RankedEntry> {
    let mut ranking: Vec<RankedEntry> = catalog
        .iter()
        .map(|content| {
            let score = interests
                .get(&content.topic)
                .copied()
                .unwrap_or(scoring::UNSEEN_TOPIC_SCORE);
            RankedEntry::new(content.id, score)
        })
        .collect();

    ranking.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockContentCatalog;
    use crate::error::AppError;
    use crate::store::{MockFeedRankingStore, MockInterestStore};
    use chrono::Utc;

    fn content(topic: &str) -> Content {
        Content {
            id: Uuid::new_v4(),
            title: format!("{} article", topic),
            url: format!("https://example.com/{}", topic),
            topic: topic.to_string(),
            estimated_read_time: Some(60),
            created_at: Utc::now(),
        }
    }

    fn engine(
        interests: MockInterestStore,
        feeds: MockFeedRankingStore,
        catalog: MockContentCatalog,
    ) -> RankingEngine {
        RankingEngine::new(Arc::new(interests), Arc::new(feeds), Arc::new(catalog))
    }

    #[test]
    fn test_rank_catalog_orders_by_interest_and_keeps_ties_stable() {
        let catalog = vec![
            content("python"),
            content("ml"),
            content("backend"),
            content("ml"),
            content("frontend"),
        ];
        let interests = HashMap::from([
            ("ml".to_string(), 0.2),
            ("backend".to_string(), 0.3),
            ("frontend".to_string(), -0.1),
        ]);

        let ranking = rank_catalog(&catalog, &interests);
        let order: Vec<Uuid> = ranking.iter().map(|e| e.content_id).collect();

        assert_eq!(
            order,
            vec![catalog[2].id, catalog[1].id, catalog[3].id, catalog[0].id, catalog[4].id]
        );
        assert_eq!(ranking[3].score, 0.0);
        assert_eq!(ranking[4].score, -0.1);
    }

    #[test]
    fn test_rank_catalog_cold_start_is_catalog_order() {
        let catalog: Vec<Content> = ["a", "b", "c"].into_iter().map(content).collect();
        let ranking = rank_catalog(&catalog, &HashMap::new());

        assert!(ranking.iter().all(|e| e.score == 0.0));
        assert_eq!(
            ranking.iter().map(|e| e.content_id).collect::<Vec<_>>(),
            catalog.iter().map(|c| c.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_unknown_content_touches_nothing() {
        let mut catalog = MockContentCatalog::new();
        catalog.expect_get_content().returning(|_| Ok(None));

        let engine = engine(MockInterestStore::new(), MockFeedRankingStore::new(), catalog);
        let outcome = engine
            .process_interaction("u1", Uuid::new_v4(), 30, 50)
            .await
            .unwrap();

        assert_eq!(outcome, InteractionOutcome::UnknownContent);
    }

    #[tokio::test]
    async fn test_interest_store_failure_propagates_before_update() {
        let item = content("python");
        let mut catalog = MockContentCatalog::new();
        catalog
            .expect_get_content()
            .returning(move |_| Ok(Some(item.clone())));

        let mut interests = MockInterestStore::new();
        interests
            .expect_get_interests()
            .returning(|_| Err(AppError::Cache("connection refused".to_string())));
        interests.expect_update_interest().times(0);

        let engine = engine(interests, MockFeedRankingStore::new(), catalog);
        let err = engine
            .process_interaction("u1", Uuid::new_v4(), 30, 50)
            .await
            .unwrap_err();

        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn test_unscored_topic_grades_from_neutral_interest() {
        let item = content("python");
        let topic = item.topic.clone();
        let mut catalog = MockContentCatalog::new();
        catalog
            .expect_get_content()
            .returning(move |_| Ok(Some(item.clone())));
        catalog.expect_list_all_content().returning(|| Ok(Vec::new()));

        let mut interests = MockInterestStore::new();
        interests
            .expect_get_interests()
            .returning(|_| Ok(HashMap::new()));
        interests
            .expect_update_interest()
            .withf(|user, topic, delta| {
                user == "u1" && topic == "python" && (delta - 0.04).abs() < 1e-12
            })
            .times(1)
            .returning(|_, _, delta| Ok(delta));

        let mut feeds = MockFeedRankingStore::new();
        feeds
            .expect_replace_ranking()
            .withf(|user, entries| user == "u1" && entries.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let engine = engine(interests, feeds, catalog);
        let outcome = engine
            .process_interaction("u1", Uuid::new_v4(), 60, 100)
            .await
            .unwrap();

        match outcome {
            InteractionOutcome::Applied {
                topic: applied,
                delta,
                new_interest,
            } => {
                assert_eq!(applied, topic);
                assert!((delta - 0.04).abs() < 1e-12);
                assert_eq!(new_interest, delta);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_limit_reads_nothing() {
        let engine = engine(
            MockInterestStore::new(),
            MockFeedRankingStore::new(),
            MockContentCatalog::new(),
        );

        let page = engine.get_feed("u1", 0, 0).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_get_feed_skips_content_missing_from_catalog() {
        let kept = content("python");
        let missing = Uuid::new_v4();
        let entries = vec![RankedEntry::new(missing, 0.4), RankedEntry::new(kept.id, 0.1)];

        let mut feeds = MockFeedRankingStore::new();
        feeds
            .expect_read_range()
            .returning(move |_, _, _| Ok(entries.clone()));

        let mut catalog = MockContentCatalog::new();
        let returned = kept.clone();
        catalog
            .expect_get_contents_by_ids()
            .returning(move |_| Ok(vec![returned.clone()]));

        let engine = engine(MockInterestStore::new(), feeds, catalog);
        let page = engine.get_feed("u1", 2, 4).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].content, kept);
        assert_eq!(page.items[0].score, 0.1);
        assert_eq!(page.next_cursor, Some(5));
    }

    #[tokio::test]
    async fn test_past_end_of_existing_ranking_does_not_regenerate() {
        let mut feeds = MockFeedRankingStore::new();
        feeds.expect_read_range().returning(|_, _, _| Ok(Vec::new()));
        feeds.expect_has_ranking().returning(|_| Ok(true));
        feeds.expect_replace_ranking().times(0);

        let engine = engine(MockInterestStore::new(), feeds, MockContentCatalog::new());
        let page = engine.get_feed("u1", 5, 100).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_feed_store_failure_on_read_propagates() {
        let mut feeds = MockFeedRankingStore::new();
        feeds
            .expect_read_range()
            .returning(|_, _, _| Err(AppError::Cache("timeout".to_string())));

        let engine = engine(MockInterestStore::new(), feeds, MockContentCatalog::new());
        let err = engine.get_feed("u1", 5, 0).await.unwrap_err();

        assert!(err.is_store_unavailable());
    }
}
