//! Three-tier step scheduler.
//!
//! New material graduates quickly through two fixed intervals, after which
//! the interval grows geometrically by the word's ease factor. A wrong answer
//! drops the interval back to one day and makes the word harder.
//!
//! Days are 24-hour UTC days: the next review keeps the time of day of the
//! answer, and due checks compare full timestamps.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::ReviewStats;
use chrono::{DateTime, Duration, Utc};

/// Step scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct StepScheduler {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub ease_bonus: f64,
    pub ease_penalty: f64,
    pub first_interval: u32,
    pub second_interval: u32,
    /// Consecutive correct answers that mark a word as learned.
    pub learned_streak: u32,
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            ease_bonus: 0.1,
            ease_penalty: 0.2,
            first_interval: 3,
            second_interval: 7,
            learned_streak: 3,
        }
    }
}

impl SpacedRepetitionAlgorithm for StepScheduler {
    fn name(&self) -> &'static str {
        "step"
    }

    fn initial_stats(&self, now: DateTime<Utc>) -> ReviewStats {
        ReviewStats {
            ease_factor: self.initial_ease,
            ..ReviewStats::new(now)
        }
    }

    fn schedule(&self, stats: &ReviewStats, correct: bool, now: DateTime<Utc>) -> SchedulingResult {
        let mut next = stats.clone();
        next.times_shown = next.times_shown.saturating_add(1);
        next.last_practiced_at = Some(now);

        if correct {
            next.times_correct = next.times_correct.saturating_add(1);
            next.current_streak = next.current_streak.saturating_add(1);
            next.ease_factor = (stats.ease_factor + self.ease_bonus).max(self.minimum_ease);
            next.interval_days = self.next_interval(stats.interval_days, next.ease_factor);
        } else {
            next.current_streak = 0;
            next.interval_days = 1;
            next.ease_factor = (stats.ease_factor - self.ease_penalty).max(self.minimum_ease);
        }

        // Never cleared by a later wrong answer.
        let became_learned = !stats.learned
            && stats.current_streak < self.learned_streak
            && next.current_streak >= self.learned_streak;
        if became_learned {
            next.learned = true;
        }

        let next_due = now + Duration::days(i64::from(next.interval_days));
        next.next_review_at = next_due;

        SchedulingResult {
            new_stats: next,
            next_due,
            became_learned,
        }
    }
}

impl StepScheduler {
    fn next_interval(&self, current: u32, ease: f64) -> u32 {
        if current <= 1 {
            self.first_interval
        } else if current <= 3 {
            self.second_interval
        } else {
            ((f64::from(current) * ease).round() as u32).max(1)
        }
    }
}
