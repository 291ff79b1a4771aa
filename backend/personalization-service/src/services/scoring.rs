//! Interaction quality scoring
//!
//! ```text
//! completion_rate   = clamp(scroll_depth / 100, 0, 1)
//! norm_time         = min(min(time_spent / read_time, 1.5), 1.0)
//! interaction_score = 0.5 * completion_rate + 0.3 * norm_time + 0.2 * topic_interest
//! delta             = (interaction_score - 0.5) * 0.1
//! ```
//!
//! Weights and learning rate are tunable constants, fixed for this model
//! version. The 0.5 midpoint makes the update signed: engagement above it
//! raises the topic's interest, engagement below it lowers it.

/// Weight of scroll completion in the interaction score.
pub const COMPLETION_WEIGHT: f64 = 0.5;
/// Weight of normalized dwell time in the interaction score.
pub const TIME_WEIGHT: f64 = 0.3;
/// Weight of the user's current interest in the content's topic.
pub const INTEREST_WEIGHT: f64 = 0.2;

/// Interaction score that leaves interest unchanged.
pub const NEUTRAL_SCORE: f64 = 0.5;
pub const LEARNING_RATE: f64 = 0.1;

/// Interest assumed for a topic the user has never been scored on, when
/// grading an interaction.
pub const NEUTRAL_TOPIC_INTEREST: f64 = 0.5;
/// Predictive score of content whose topic the user has never been scored on.
/// Unseen topics rank below every topic with positive interest.
pub const UNSEEN_TOPIC_SCORE: f64 = 0.0;

/// Dwell time beyond 1.5x the read time counts as idling.
pub const IDLE_TIME_CAP: f64 = 1.5;
pub const MAX_NORM_TIME: f64 = 1.0;

/// Fraction of the content scrolled through, in [0, 1].
pub fn completion_rate(scroll_depth: i32) -> f64 {
    (f64::from(scroll_depth) / 100.0).clamp(0.0, 1.0)
}

/// Dwell time relative to the content's read time, in [0, 1].
///
/// Capped at [`IDLE_TIME_CAP`] first, then at [`MAX_NORM_TIME`]. The second
/// cap currently dominates; the first keeps the anti-idling bound in place if
/// the final cap is ever relaxed.
pub fn normalized_time(time_spent: i64, read_time_secs: i32) -> f64 {
    let read_time = if read_time_secs > 0 {
        f64::from(read_time_secs)
    } else {
        f64::from(crate::models::DEFAULT_READ_TIME_SECS)
    };
    let time_spent = time_spent.max(0) as f64;

    let norm_time = (time_spent / read_time).min(IDLE_TIME_CAP);
    norm_time.min(MAX_NORM_TIME)
}

pub fn interaction_score(completion_rate: f64, norm_time: f64, topic_interest: f64) -> f64 {
    COMPLETION_WEIGHT * completion_rate + TIME_WEIGHT * norm_time + INTEREST_WEIGHT * topic_interest
}

pub fn interest_delta(interaction_score: f64) -> f64 {
    (interaction_score - NEUTRAL_SCORE) * LEARNING_RATE
}
