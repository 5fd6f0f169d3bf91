//! Session pool selection.

use crate::collaborators::Capabilities;
use crate::error::{Result, SessionError};
use crate::settings::SessionConfig;
use crate::types::{Direction, ExerciseKind, PoolFilter, Word};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Words and exercise kinds a session will run with.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Fixed, shuffled snapshot of the session's words.
    pub words: Vec<Word>,
    /// Non-empty, deduplicated, device-supported kinds.
    pub kinds: Vec<ExerciseKind>,
    pub direction: Direction,
}

/// Drop duplicates and kinds the device cannot run.
pub fn resolve_kinds(kinds: &[ExerciseKind], capabilities: &Capabilities) -> Result<Vec<ExerciseKind>> {
    let mut resolved = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if capabilities.supports(kind) && !resolved.contains(&kind) {
            resolved.push(kind);
        }
    }

    if resolved.is_empty() {
        return Err(SessionError::NoUsableExerciseKind);
    }
    Ok(resolved)
}

/// Whether a word passes the pool filter at `now`.
pub fn matches_filter(word: &Word, filter: PoolFilter, now: DateTime<Utc>) -> bool {
    match filter {
        PoolFilter::All | PoolFilter::Shuffled => true,
        PoolFilter::Learning => !word.stats.learned,
        PoolFilter::Due => word.stats.is_due(now),
    }
}

/// Build the session plan from the store's words.
///
/// Kinds are resolved before filtering, so an unusable configuration is
/// reported even when no word would qualify.
pub fn build_pool<R: Rng + ?Sized>(
    words: &[Word],
    config: &SessionConfig,
    capabilities: &Capabilities,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<SessionPlan> {
    let kinds = resolve_kinds(&config.exercise_kinds, capabilities)?;

    let mut pool: Vec<Word> = words
        .iter()
        .filter(|word| matches_filter(word, config.filter, now))
        .cloned()
        .collect();

    if pool.is_empty() {
        return Err(SessionError::EmptyPool);
    }

    pool.shuffle(rng);
    pool.truncate(config.count.resolve(pool.len()));

    debug!(
        eligible = words.len(),
        selected = pool.len(),
        kinds = kinds.len(),
        "Built session pool"
    );

    Ok(SessionPlan {
        words: pool,
        kinds,
        direction: config.direction,
    })
}
