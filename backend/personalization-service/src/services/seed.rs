use crate::db::ContentCatalog;
use crate::error::Result;
use crate::models::NewContent;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadySeeded,
    Seeded { count: usize },
}

/// Demo catalog inserted into an empty deployment.
pub fn sample_catalog() -> Vec<NewContent> {
    [
        ("Intro to Python FastApi", "python", 300, "https://fastapi.tiangolo.com/"),
        ("Advanced React Hooks", "react", 450, "https://reactjs.org/docs/hooks-intro.html"),
        ("Machine Learning Basics", "ml", 600, "https://scikit-learn.org/stable/"),
        ("Redis for Caching", "backend", 200, "https://redis.io/"),
        ("Docker Compose Guide", "devops", 400, "https://docs.docker.com/compose/"),
        ("Asyncio in Python", "python", 500, "https://docs.python.org/3/library/asyncio.html"),
        (
            "Postgres Indexing",
            "database",
            350,
            "https://www.postgresql.org/docs/current/indexes.html",
        ),
        ("Tailwind CSS Tips", "frontend", 180, "https://tailwindcss.com/"),
        (
            "Understanding Neural Networks",
            "ml",
            900,
            "https://en.wikipedia.org/wiki/Neural_network",
        ),
        (
            "FastAPI Dependency Injection",
            "python",
            320,
            "https://fastapi.tiangolo.com/tutorial/dependencies/",
        ),
    ]
    .into_iter()
    .map(|(title, topic, read_time, url)| NewContent {
        title: title.to_string(),
        url: url.to_string(),
        topic: topic.to_string(),
        estimated_read_time: Some(read_time),
    })
    .collect()
}

/// Insert [`sample_catalog`] unless the catalog already holds content.
pub async fn seed_catalog(catalog: &dyn ContentCatalog) -> Result<SeedOutcome> {
    if catalog.count().await? > 0 {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let samples = sample_catalog();
    let count = samples.len();
    for item in samples {
        catalog.insert_content(item).await?;
    }

    info!(count, "Seeded content catalog");
    Ok(SeedOutcome::Seeded { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCatalog;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let catalog = MemoryCatalog::new();

        assert_eq!(
            seed_catalog(&catalog).await.unwrap(),
            SeedOutcome::Seeded { count: 10 }
        );
        assert_eq!(seed_catalog(&catalog).await.unwrap(), SeedOutcome::AlreadySeeded);
        assert_eq!(catalog.count().await.unwrap(), 10);
    }

    #[test]
    fn test_sample_catalog_topics() {
        let samples = sample_catalog();
        let python = samples.iter().filter(|c| c.topic == "python").count();
        let ml = samples.iter().filter(|c| c.topic == "ml").count();

        assert_eq!(samples.len(), 10);
        assert_eq!(python, 3);
        assert_eq!(ml, 2);
        assert!(samples.iter().all(|c| c.estimated_read_time.unwrap_or(0) > 0));
    }
}
