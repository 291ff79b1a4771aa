use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use tracing::{info, warn};

use super::{parse_content_id, require_user_id, AppState};
use crate::error::Result;
use crate::models::{ActivityEvent, InteractionActivity, NewInteraction};
use crate::services::scoring;
use crate::services::InteractionOutcome;

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub user_id: String,
    pub content_id: String,
    /// Seconds spent on the content.
    pub time_spent: i64,
    /// Percent of the content scrolled through.
    pub scroll_depth: i32,
    /// Client-side skip heuristic. Accepted for compatibility, not used in scoring.
    #[serde(default)]
    pub skipped: bool,
}

/// Record an interaction, fan it out to live dashboards, then fold it into the
/// user's interests.
#[post("/track")]
pub async fn track_interaction(
    body: web::Json<TrackRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = require_user_id(&body.user_id)?;
    let content_id = parse_content_id(&body.content_id)?;

    let interaction = state
        .interactions
        .record(NewInteraction {
            user_id: user_id.to_string(),
            content_id,
            time_spent: body.time_spent,
            scroll_depth: body.scroll_depth,
            completion_rate: scoring::completion_rate(body.scroll_depth),
        })
        .await?;

    let content = state.catalog.get_content(content_id).await?;
    let delivered = state.activity.publish(ActivityEvent::NewInteraction(
        InteractionActivity::new(&interaction, content.as_ref()),
    ));

    let outcome = state
        .engine
        .process_interaction(user_id, content_id, body.time_spent, body.scroll_depth)
        .await?;

    match outcome {
        InteractionOutcome::Applied { topic, delta, .. } => {
            info!(
                user_id,
                %content_id,
                topic = %topic,
                delta,
                skipped = body.skipped,
                delivered,
                "Interaction tracked"
            );
        }
        InteractionOutcome::UnknownContent => {
            warn!(user_id, %content_id, "Tracked interaction on unknown content");
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "tracked" })))
}
