//! HTTP transport for the ranking engine.

pub mod dashboard;
pub mod feed;
pub mod interactions;
pub mod seed;
pub mod ws;

use crate::db::{ContentCatalog, InteractionLog};
use crate::error::{AppError, Result};
use crate::services::{ActivityHub, RankingEngine};
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: RankingEngine,
    pub catalog: Arc<dyn ContentCatalog>,
    pub interactions: Arc<dyn InteractionLog>,
    pub activity: ActivityHub,
}

/// Register every route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(feed::get_feed)
        .service(interactions::track_interaction)
        .service(seed::seed_content)
        .service(dashboard::get_interests)
        .service(dashboard::get_recent_activity)
        .service(dashboard::get_feed_status)
        .service(dashboard::get_feed_score)
        .service(ws::activity_socket);
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub(crate) fn require_user_id(user_id: &str) -> Result<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    Ok(user_id)
}

pub(crate) fn parse_content_id(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid content_id: {}", raw)))
}
