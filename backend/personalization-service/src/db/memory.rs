use super::{ContentCatalog, InteractionLog};
use crate::error::Result;
use crate::models::{ActivityRecord, Content, Interaction, NewContent, NewInteraction};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local catalog and interaction log.
///
/// Content is kept in insertion order, which is its catalog iteration order.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    contents: Arc<RwLock<Vec<Content>>>,
    interactions: Arc<RwLock<Vec<Interaction>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: Vec<Content>) -> Self {
        Self {
            contents: Arc::new(RwLock::new(contents)),
            interactions: Arc::default(),
        }
    }

    /// Drop a catalog entry, as if the content had been deleted upstream.
    pub async fn remove_content(&self, id: Uuid) -> bool {
        let mut contents = self.contents.write().await;
        let before = contents.len();
        contents.retain(|c| c.id != id);
        contents.len() != before
    }
}

#[async_trait]
impl ContentCatalog for MemoryCatalog {
    async fn get_content(&self, id: Uuid) -> Result<Option<Content>> {
        let contents = self.contents.read().await;
        Ok(contents.iter().find(|c| c.id == id).cloned())
    }

    async fn get_contents_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Content>> {
        let contents = self.contents.read().await;
        Ok(contents
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_all_content(&self) -> Result<Vec<Content>> {
        Ok(self.contents.read().await.clone())
    }

    async fn insert_content(&self, content: NewContent) -> Result<Content> {
        let created = Content {
            id: Uuid::new_v4(),
            title: content.title,
            url: content.url,
            topic: content.topic,
            estimated_read_time: content.estimated_read_time,
            created_at: Utc::now(),
        };
        self.contents.write().await.push(created.clone());
        Ok(created)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.contents.read().await.len() as i64)
    }
}

#[async_trait]
impl InteractionLog for MemoryCatalog {
    async fn record(&self, interaction: NewInteraction) -> Result<Interaction> {
        let recorded = Interaction {
            id: Uuid::new_v4(),
            user_id: interaction.user_id,
            content_id: interaction.content_id,
            time_spent: interaction.time_spent,
            scroll_depth: interaction.scroll_depth,
            completion_rate: interaction.completion_rate,
            timestamp: Utc::now(),
        };
        self.interactions.write().await.push(recorded.clone());
        Ok(recorded)
    }

    async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityRecord>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let contents = self.contents.read().await;
        let interactions = self.interactions.read().await;

        Ok(interactions
            .iter()
            .rev()
            .filter_map(|interaction| {
                contents
                    .iter()
                    .find(|c| c.id == interaction.content_id)
                    .map(|content| ActivityRecord {
                        id: interaction.id,
                        user_id: interaction.user_id.clone(),
                        content_title: content.title.clone(),
                        topic: content.topic.clone(),
                        time_spent: interaction.time_spent,
                        scroll_depth: interaction.scroll_depth,
                        timestamp: interaction.timestamp,
                    })
            })
            .take(limit)
            .collect())
    }
}
