pub mod activity;
pub mod ranking;
pub mod scoring;
pub mod seed;

pub use activity::ActivityHub;
pub use ranking::{FeedStatus, InteractionOutcome, RankingEngine};
pub use seed::{seed_catalog, SeedOutcome};
