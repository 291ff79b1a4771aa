//! Deferred feed refresh
//!
//! With `FEED_REFRESH_MODE=deferred`, interaction tracking only queues the
//! user's feed rebuild. A single background worker drains the queue.
//!
//! Requests coalesce per user: while a rebuild for a user is queued and not
//! yet started, further requests for that user are dropped. The pending mark
//! is cleared when the worker picks the user up, so an interaction landing
//! during a rebuild still gets a later one.

use crate::metrics::FEED_REFRESH_EVENTS_TOTAL;
use crate::services::ranking::RankingEngine;
use dashmap::DashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Queued,
    /// A rebuild for this user was already pending.
    Coalesced,
    /// The worker is gone; the caller must rebuild itself.
    Closed,
}

/// Handle for queueing feed rebuilds. Cheap to clone.
#[derive(Clone)]
pub struct FeedRefresher {
    sender: mpsc::Sender<String>,
    pending: Arc<DashSet<String>>,
}

impl FeedRefresher {
    /// Start the worker. `engine` must rebuild inline (no refresher of its own).
    ///
    /// The worker exits once every handle has been dropped and the queue is
    /// drained.
    pub fn spawn(engine: RankingEngine, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let pending = Arc::new(DashSet::new());

        let handle = tokio::spawn(run_worker(engine, receiver, pending.clone()));
        tracing::info!(capacity, "Feed refresher started");

        (Self { sender, pending }, handle)
    }

    /// Queue a rebuild of `user_id`'s feed. Waits for queue space when full.
    pub async fn schedule(&self, user_id: &str) -> ScheduleOutcome {
        if !self.pending.insert(user_id.to_string()) {
            FEED_REFRESH_EVENTS_TOTAL
                .with_label_values(&["coalesced"])
                .inc();
            return ScheduleOutcome::Coalesced;
        }

        if self.sender.send(user_id.to_string()).await.is_err() {
            self.pending.remove(user_id);
            return ScheduleOutcome::Closed;
        }

        FEED_REFRESH_EVENTS_TOTAL.with_label_values(&["queued"]).inc();
        ScheduleOutcome::Queued
    }

    /// Users with a rebuild queued but not yet started.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

async fn run_worker(
    engine: RankingEngine,
    mut receiver: mpsc::Receiver<String>,
    pending: Arc<DashSet<String>>,
) {
    while let Some(user_id) = receiver.recv().await {
        pending.remove(&user_id);

        let started = Instant::now();
        match engine.generate_feed(&user_id).await {
            Ok(ranked) => {
                tracing::debug!(
                    user_id = %user_id,
                    ranked,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Deferred feed refresh completed"
                );
            }
            Err(e) => {
                FEED_REFRESH_EVENTS_TOTAL.with_label_values(&["failed"]).inc();
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Deferred feed refresh failed"
                );
            }
        }
    }

    tracing::info!("Feed refresher stopped");
}
