//! Spaced repetition scheduling.

pub mod step;

pub use step::StepScheduler;

use crate::types::ReviewStats;
use chrono::{DateTime, Utc};

/// Result of scheduling a word after an answer.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub new_stats: ReviewStats,
    pub next_due: DateTime<Utc>,
    /// True when this answer moved the word into the learned state.
    pub became_learned: bool,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next review state after a binary outcome.
    fn schedule(&self, stats: &ReviewStats, correct: bool, now: DateTime<Utc>) -> SchedulingResult;

    /// Initial stats for a word created at `now`.
    fn initial_stats(&self, now: DateTime<Utc>) -> ReviewStats;
}
