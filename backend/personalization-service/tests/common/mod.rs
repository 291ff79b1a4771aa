#![allow(dead_code)]

use personalization_service::db::{ContentCatalog, MemoryCatalog};
use personalization_service::models::Content;
use personalization_service::services::seed_catalog;
use personalization_service::store::MemoryStore;
use personalization_service::RankingEngine;
use std::sync::Arc;

pub struct Fixture {
    pub store: MemoryStore,
    pub catalog: MemoryCatalog,
    pub engine: RankingEngine,
    /// Seeded catalog in catalog order.
    pub contents: Vec<Content>,
}

/// Engine over in-process backends with the ten sample items seeded.
pub async fn seeded_fixture() -> Fixture {
    let store = MemoryStore::new();
    let catalog = MemoryCatalog::new();
    seed_catalog(&catalog).await.unwrap();
    let contents = catalog.list_all_content().await.unwrap();

    let engine = RankingEngine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(catalog.clone()),
    );

    Fixture {
        store,
        catalog,
        engine,
        contents,
    }
}

impl Fixture {
    /// Catalog positions of the items with `topic`.
    pub fn positions_of(&self, topic: &str) -> Vec<usize> {
        self.contents
            .iter()
            .enumerate()
            .filter(|(_, c)| c.topic == topic)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_of(&self, topic: &str) -> &Content {
        self.contents
            .iter()
            .find(|c| c.topic == topic)
            .unwrap()
    }

    pub fn ids_at(&self, positions: &[usize]) -> Vec<uuid::Uuid> {
        positions.iter().map(|&i| self.contents[i].id).collect()
    }
}
