use actix_web::{post, web, HttpResponse};

use super::AppState;
use crate::error::Result;
use crate::services::{seed_catalog, SeedOutcome};

#[post("/seed")]
pub async fn seed_content(state: web::Data<AppState>) -> Result<HttpResponse> {
    let body = match seed_catalog(state.catalog.as_ref()).await? {
        SeedOutcome::AlreadySeeded => serde_json::json!({ "message": "Already seeded" }),
        SeedOutcome::Seeded { count } => {
            serde_json::json!({ "message": "Seeded content", "count": count })
        }
    };

    Ok(HttpResponse::Ok().json(body))
}
