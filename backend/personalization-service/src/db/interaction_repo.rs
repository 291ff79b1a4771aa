use super::InteractionLog;
use crate::error::Result;
use crate::models::{ActivityRecord, Interaction, NewInteraction};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

/// Append-only interaction log backed by the `interactions` table.
#[derive(Clone)]
pub struct PgInteractionLog {
    pool: PgPool,
}

impl PgInteractionLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionLog for PgInteractionLog {
    async fn record(&self, interaction: NewInteraction) -> Result<Interaction> {
        let recorded = sqlx::query_as::<_, Interaction>(
            r#"
            INSERT INTO interactions (user_id, content_id, time_spent, scroll_depth, completion_rate)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, content_id, time_spent, scroll_depth, completion_rate, timestamp
            "#,
        )
        .bind(&interaction.user_id)
        .bind(interaction.content_id)
        .bind(interaction.time_spent)
        .bind(interaction.scroll_depth)
        .bind(interaction.completion_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(user_id = %interaction.user_id, "Failed to record interaction: {}", e);
            e
        })?;

        Ok(recorded)
    }

    async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityRecord>> {
        let records = sqlx::query_as::<_, ActivityRecord>(
            r#"
            SELECT i.id, i.user_id, c.title AS content_title, c.topic,
                   i.time_spent, i.scroll_depth, i.timestamp
            FROM interactions i
            JOIN content c ON c.id = i.content_id
            ORDER BY i.timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
