//! Wiring of stores, engine and background workers.

use crate::config::{Config, FeedRefreshMode, RankingConfig, StorageBackend};
use crate::db::{
    self, ContentCatalog, InteractionLog, MemoryCatalog, PgContentCatalog, PgInteractionLog,
};
use crate::handlers::AppState;
use crate::jobs::feed_refresher::FeedRefresher;
use crate::services::{ActivityHub, RankingEngine};
use crate::store::{FeedRankingStore, InterestStore, MemoryStore, RedisStore};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// The four collaborators the service runs against.
#[derive(Clone)]
pub struct Backends {
    pub interests: Arc<dyn InterestStore>,
    pub feeds: Arc<dyn FeedRankingStore>,
    pub catalog: Arc<dyn ContentCatalog>,
    pub interactions: Arc<dyn InteractionLog>,
}

impl Backends {
    /// Connect to the configured backends. Postgres migrations run here.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        match config.storage.backend {
            StorageBackend::Memory => {
                warn!("Using in-process storage; state is lost on restart");
                Ok(Self::in_memory(MemoryStore::new(), MemoryCatalog::new()))
            }
            StorageBackend::Redis => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .acquire_timeout(DB_ACQUIRE_TIMEOUT)
                    .connect(&config.database.url)
                    .await
                    .context("failed to connect to Postgres")?;
                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;
                info!(
                    max_connections = config.database.max_connections,
                    "Postgres pool ready"
                );

                let redis = RedisStore::connect(&config.redis.url)
                    .await
                    .context("failed to connect to Redis")?;
                redis.ping().await.context("Redis ping failed")?;
                info!("Redis connection ready");

                let redis = Arc::new(redis);
                Ok(Self {
                    interests: redis.clone(),
                    feeds: redis,
                    catalog: Arc::new(PgContentCatalog::new(pool.clone())),
                    interactions: Arc::new(PgInteractionLog::new(pool)),
                })
            }
        }
    }

    pub fn in_memory(store: MemoryStore, catalog: MemoryCatalog) -> Self {
        let store = Arc::new(store);
        let catalog = Arc::new(catalog);
        Self {
            interests: store.clone(),
            feeds: store,
            catalog: catalog.clone(),
            interactions: catalog,
        }
    }
}

/// Build handler state. In deferred mode this spawns the feed refresher and
/// returns its worker handle; must run inside a Tokio runtime.
pub fn build_state(
    backends: Backends,
    ranking: &RankingConfig,
) -> (AppState, Option<JoinHandle<()>>) {
    let engine = RankingEngine::new(
        backends.interests,
        backends.feeds,
        backends.catalog.clone(),
    );

    let (engine, worker) = match ranking.refresh_mode {
        FeedRefreshMode::Sync => (engine, None),
        FeedRefreshMode::Deferred => {
            let (refresher, worker) =
                FeedRefresher::spawn(engine.clone(), ranking.refresh_queue_capacity);
            (engine.with_refresher(refresher), Some(worker))
        }
    };

    let state = AppState {
        engine,
        catalog: backends.catalog,
        interactions: backends.interactions,
        activity: ActivityHub::new(ranking.activity_channel_capacity),
    };

    (state, worker)
}
