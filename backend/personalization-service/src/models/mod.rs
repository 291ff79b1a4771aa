use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read time assumed for content whose catalog entry has none.
pub const DEFAULT_READ_TIME_SECS: i32 = 60;

/// Catalog entry. Immutable once seeded; the ranking engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub topic: String,
    /// Seconds. `None` or non-positive values fall back to [`DEFAULT_READ_TIME_SECS`].
    pub estimated_read_time: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Content {
    pub fn read_time_secs(&self) -> i32 {
        match self.estimated_read_time {
            Some(secs) if secs > 0 => secs,
            _ => DEFAULT_READ_TIME_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    pub title: String,
    pub url: String,
    pub topic: String,
    pub estimated_read_time: Option<i32>,
}

/// Content hydrated for a feed page, carrying its transient predictive score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredContent {
    #[serde(flatten)]
    pub content: Content,
    pub score: f64,
}

/// One page of a user's feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub items: Vec<ScoredContent>,
    /// `offset + items.len()`, or `None` when the page is empty.
    pub next_cursor: Option<usize>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn from_items(items: Vec<ScoredContent>, offset: usize) -> Self {
        let next_cursor = if items.is_empty() {
            None
        } else {
            Some(offset + items.len())
        };
        Self { items, next_cursor }
    }
}

/// Raw interaction telemetry as appended to the interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInteraction {
    pub user_id: String,
    pub content_id: Uuid,
    pub time_spent: i64,
    pub scroll_depth: i32,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: String,
    pub content_id: Uuid,
    pub time_spent: i64,
    pub scroll_depth: i32,
    pub completion_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// Interaction joined with its content, for the activity dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: String,
    pub content_title: String,
    pub topic: String,
    pub time_spent: i64,
    pub scroll_depth: i32,
    pub timestamp: DateTime<Utc>,
}

/// Events fanned out to live dashboard subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActivityEvent {
    NewInteraction(InteractionActivity),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionActivity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub topic: String,
    pub content_title: String,
    pub time_spent: i64,
    pub scroll_depth: i32,
}

impl InteractionActivity {
    const UNKNOWN: &'static str = "unknown";

    pub fn new(interaction: &Interaction, content: Option<&Content>) -> Self {
        Self {
            id: interaction.id.to_string(),
            timestamp: interaction.timestamp,
            topic: content
                .map(|c| c.topic.clone())
                .unwrap_or_else(|| Self::UNKNOWN.to_string()),
            content_title: content
                .map(|c| c.title.clone())
                .unwrap_or_else(|| Self::UNKNOWN.to_string()),
            time_spent: interaction.time_spent,
            scroll_depth: interaction.scroll_depth,
        }
    }
}
