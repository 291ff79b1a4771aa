use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use super::{require_user_id, AppState};
use crate::error::Result;

const DEFAULT_PAGE_SIZE: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    #[serde(default)]
    pub user_id: String,
    /// Rank offset of the first item to return.
    #[serde(default)]
    pub cursor: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

impl FeedQueryParams {
    fn page_size(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

#[get("/feed")]
pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user_id(&query.user_id)?;
    let limit = query.page_size();

    let page = state.engine.get_feed(user_id, limit, query.cursor).await?;
    debug!(
        user_id,
        cursor = query.cursor,
        limit,
        returned = page.items.len(),
        "Served feed page"
    );

    Ok(HttpResponse::Ok().json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamped() {
        let params = |limit| FeedQueryParams {
            user_id: "u1".to_string(),
            cursor: 0,
            limit,
        };

        assert_eq!(params(0).page_size(), 1);
        assert_eq!(params(5).page_size(), 5);
        assert_eq!(params(10_000).page_size(), MAX_PAGE_SIZE);
    }
}
