use super::ContentCatalog;
use crate::error::Result;
use crate::models::{Content, NewContent};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

/// Content catalog backed by the `content` table.
#[derive(Clone)]
pub struct PgContentCatalog {
    pool: PgPool,
}

impl PgContentCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentCatalog for PgContentCatalog {
    async fn get_content(&self, id: Uuid) -> Result<Option<Content>> {
        let content = sqlx::query_as::<_, Content>(
            r#"
            SELECT id, title, url, topic, estimated_read_time, created_at
            FROM content
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(content_id = %id, "Failed to fetch content: {}", e);
            e
        })?;

        Ok(content)
    }

    async fn get_contents_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Content>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let contents = sqlx::query_as::<_, Content>(
            r#"
            SELECT id, title, url, topic, estimated_read_time, created_at
            FROM content
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(count = ids.len(), "Failed to fetch contents by ids: {}", e);
            e
        })?;

        Ok(contents)
    }

    async fn list_all_content(&self) -> Result<Vec<Content>> {
        let contents = sqlx::query_as::<_, Content>(
            r#"
            SELECT id, title, url, topic, estimated_read_time, created_at
            FROM content
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list content catalog: {}", e);
            e
        })?;

        Ok(contents)
    }

    async fn insert_content(&self, content: NewContent) -> Result<Content> {
        let created = sqlx::query_as::<_, Content>(
            r#"
            INSERT INTO content (title, url, topic, estimated_read_time)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, url, topic, estimated_read_time, created_at
            "#,
        )
        .bind(&content.title)
        .bind(&content.url)
        .bind(&content.topic)
        .bind(content.estimated_read_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM content")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
