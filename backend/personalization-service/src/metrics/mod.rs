//! Prometheus metrics for the personalization service.
//!
//! Collectors register against the default registry; `/metrics` renders them.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Interactions handed to the ranking engine, by outcome (applied, unknown_content).
    pub static ref INTERACTIONS_PROCESSED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "personalization_interactions_processed_total",
        "Interactions processed by the ranking engine segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register personalization_interactions_processed_total");

    /// Full feed rebuilds.
    pub static ref FEED_GENERATION_DURATION_SECONDS: Histogram = register_histogram!(
        "personalization_feed_generation_duration_seconds",
        "Time spent scoring the catalog and replacing a user's feed ranking"
    )
    .expect("failed to register personalization_feed_generation_duration_seconds");

    /// Feed page reads, by how the page was produced (ranking, regenerated).
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "personalization_feed_requests_total",
        "Feed page reads segmented by source",
        &["source"]
    )
    .expect("failed to register personalization_feed_requests_total");

    /// Deferred refresh requests, by result (queued, coalesced, fallback, failed).
    pub static ref FEED_REFRESH_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "personalization_feed_refresh_events_total",
        "Deferred feed refresh events segmented by result",
        &["result"]
    )
    .expect("failed to register personalization_feed_refresh_events_total");

    pub static ref ACTIVITY_EVENTS_PUBLISHED_TOTAL: IntCounter = register_int_counter!(
        "personalization_activity_events_published_total",
        "Activity events published to live dashboard subscribers"
    )
    .expect("failed to register personalization_activity_events_published_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
