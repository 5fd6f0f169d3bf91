//! Learner settings and the per-session configuration derived from them.

use crate::matching::DEFAULT_FUZZY_THRESHOLD;
use crate::types::{CountSpec, Direction, ExerciseKind, PoolFilter};
use serde::{Deserialize, Serialize};

/// Global settings configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub count: CountSpec,
    pub filter: PoolFilter,
    pub exercise_kinds: Vec<ExerciseKind>,
    pub direction: Direction,
    /// Speak the source term when a new exercise shows it.
    pub auto_pronounce: bool,
    pub fuzzy_threshold: f64,
    /// Hour of day (0-23, UTC) when a new study day begins.
    pub daily_reset_hour: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            count: CountSpec::default(),
            filter: PoolFilter::default(),
            exercise_kinds: vec![
                ExerciseKind::Flash,
                ExerciseKind::MultipleChoice,
                ExerciseKind::Typed,
            ],
            direction: Direction::default(),
            auto_pronounce: true,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            daily_reset_hour: 0,
        }
    }
}

impl GlobalSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Per-session settings (all fields optional for overrides).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<CountSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<PoolFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_kinds: Option<Vec<ExerciseKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl SessionOverrides {
    pub fn count(mut self, count: CountSpec) -> Self {
        self.count = Some(count);
        self
    }

    pub fn filter(mut self, filter: PoolFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn kinds(mut self, kinds: impl Into<Vec<ExerciseKind>>) -> Self {
        self.exercise_kinds = Some(kinds.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Configuration a session runs with (global merged with session overrides).
///
/// Frozen at session start; "repeat" reuses it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub count: CountSpec,
    pub filter: PoolFilter,
    pub exercise_kinds: Vec<ExerciseKind>,
    pub direction: Direction,
    pub fuzzy_threshold: f64,
}

impl SessionConfig {
    /// Merge global settings with optional session overrides.
    pub fn merge(global: &GlobalSettings, overrides: Option<&SessionOverrides>) -> Self {
        match overrides {
            Some(o) => Self {
                count: o.count.unwrap_or(global.count),
                filter: o.filter.unwrap_or(global.filter),
                exercise_kinds: o
                    .exercise_kinds
                    .clone()
                    .unwrap_or_else(|| global.exercise_kinds.clone()),
                direction: o.direction.unwrap_or(global.direction),
                fuzzy_threshold: global.fuzzy_threshold,
            },
            None => Self {
                count: global.count,
                filter: global.filter,
                exercise_kinds: global.exercise_kinds.clone(),
                direction: global.direction,
                fuzzy_threshold: global.fuzzy_threshold,
            },
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::merge(&GlobalSettings::default(), None)
    }
}
