//! Read-only introspection endpoints backing the live dashboard.

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use super::{parse_content_id, require_user_id, AppState};
use crate::error::Result;

const DEFAULT_ACTIVITY_LIMIT: u32 = 10;
const MAX_ACTIVITY_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct RecentActivityParams {
    #[serde(default = "default_activity_limit")]
    pub limit: u32,
}

fn default_activity_limit() -> u32 {
    DEFAULT_ACTIVITY_LIMIT
}

/// Raw topic -> interest score map for one user.
#[get("/dashboard/interests/{user_id}")]
pub async fn get_interests(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user_id(&path)?;
    let interests = state.engine.get_interests(user_id).await?;
    Ok(HttpResponse::Ok().json(interests))
}

/// Latest interactions across all users, newest first.
#[get("/dashboard/recent-activity")]
pub async fn get_recent_activity(
    query: web::Query<RecentActivityParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = query.limit.min(MAX_ACTIVITY_LIMIT);
    let activity = state.interactions.recent_activity(i64::from(limit)).await?;
    Ok(HttpResponse::Ok().json(activity))
}

#[get("/dashboard/feed/{user_id}")]
pub async fn get_feed_status(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user_id(&path)?;
    let status = state.engine.feed_status(user_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Predictive score of one item in the user's stored ranking.
#[get("/dashboard/feed/{user_id}/{content_id}")]
pub async fn get_feed_score(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (user_id, content_id) = path.into_inner();
    let user_id = require_user_id(&user_id)?;
    let content_id = parse_content_id(&content_id)?;

    let score = state.engine.feed_score(user_id, content_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": user_id,
        "content_id": content_id,
        "score": score,
    })))
}
