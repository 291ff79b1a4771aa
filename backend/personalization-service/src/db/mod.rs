//! Relational collaborators: the content catalog and the interaction log.
//!
//! The ranking engine only reads the catalog; the interaction log is written
//! by the tracking endpoint and read back by the activity dashboard.

pub mod content_repo;
pub mod interaction_repo;
pub mod memory;

pub use content_repo::PgContentCatalog;
pub use interaction_repo::PgInteractionLog;
pub use memory::MemoryCatalog;

use crate::error::Result;
use crate::models::{ActivityRecord, Content, Interaction, NewContent, NewInteraction};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Embedded schema migrations (`migrations/`).
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| crate::error::AppError::Database(format!("migration failed: {}", e)))?;
    Ok(())
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn get_content(&self, id: Uuid) -> Result<Option<Content>>;

    /// Contents for the given ids, in no particular order. Unknown ids are
    /// left out.
    async fn get_contents_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Content>>;

    /// Whole catalog in its stable iteration order (creation time, then id).
    async fn list_all_content(&self) -> Result<Vec<Content>>;

    async fn insert_content(&self, content: NewContent) -> Result<Content>;

    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// Append one interaction. Rows are never updated afterwards.
    async fn record(&self, interaction: NewInteraction) -> Result<Interaction>;

    /// Latest interactions across all users, newest first, joined with their
    /// content. Interactions on content missing from the catalog are omitted.
    async fn recent_activity(&self, limit: i64) -> Result<Vec<ActivityRecord>>;
}
