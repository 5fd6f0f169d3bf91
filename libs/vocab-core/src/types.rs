//! Core types for the vocabulary trainer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable, opaque word identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(String);

impl WordId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Review statistics for a single word.
///
/// Only the scheduler changes these values; see
/// [`WordStore::record_answer`](crate::store::WordStore::record_answer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub times_shown: u32,
    pub times_correct: u32,
    pub current_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_practiced_at: Option<DateTime<Utc>>,
    /// Latches once the streak first reaches the learned threshold.
    pub learned: bool,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewStats {
    /// Stats for a word created at `now`. New words are due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            times_shown: 0,
            times_correct: 0,
            current_streak: 0,
            last_practiced_at: None,
            learned: false,
            interval_days: 1,
            ease_factor: 2.5,
            next_review_at: now,
        }
    }

    /// Whether the word is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Share of correct answers, or `None` if never practiced.
    pub fn accuracy(&self) -> Option<f64> {
        if self.times_shown == 0 {
            None
        } else {
            Some(self.times_correct as f64 / self.times_shown as f64)
        }
    }
}

/// Which side of a word pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }
}

/// A word pair with its review statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub example: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stats: ReviewStats,
}

impl Word {
    /// Build a word from a draft, assigning a fresh id and default stats.
    pub fn new(draft: &WordDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: WordId::generate(),
            source: draft.source.trim().to_string(),
            target: draft.target.trim().to_string(),
            example: clean_example(draft.example.as_deref()),
            tags: normalize_tags(&draft.tags),
            created_at: now,
            updated_at: now,
            stats: ReviewStats::new(now),
        }
    }

    /// Text on the given side.
    pub fn text(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// Replace the content fields, keeping id, creation time and stats.
    pub(crate) fn apply_draft(&mut self, draft: &WordDraft, now: DateTime<Utc>) {
        self.source = draft.source.trim().to_string();
        self.target = draft.target.trim().to_string();
        self.example = clean_example(draft.example.as_deref());
        self.tags = normalize_tags(&draft.tags);
        self.updated_at = now;
    }
}

/// User-supplied word content, used for both adding and editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDraft {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WordDraft {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            example: None,
            tags: Vec::new(),
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Set tags from a comma-separated list.
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }
}

fn clean_example(example: Option<&str>) -> Option<String> {
    example
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

/// Normalize a tag list.
///
/// Tags are lowercased, inner whitespace becomes `-`, and anything other than
/// alphanumerics, `-` and `_` is dropped. Empty tags and repeats are removed,
/// keeping the first occurrence.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let normalized = normalize_tag(tag.as_ref());
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

fn normalize_tag(tag: &str) -> String {
    tag.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Split a comma-separated tag string and normalize it.
pub fn parse_tags(input: &str) -> Vec<String> {
    let parts: Vec<&str> = input.split(',').collect();
    normalize_tags(&parts)
}

/// Exercise kinds a session can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Flash,
    MultipleChoice,
    Typed,
    Dictation,
    Pairing,
    SpeakAloud,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 6] = [
        Self::Flash,
        Self::MultipleChoice,
        Self::Typed,
        Self::Dictation,
        Self::Pairing,
        Self::SpeakAloud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "flash",
            Self::MultipleChoice => "multiple_choice",
            Self::Typed => "typed",
            Self::Dictation => "dictation",
            Self::Pairing => "pairing",
            Self::SpeakAloud => "speak_aloud",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Kinds that present a single word and take a single response.
    pub fn is_single_word(&self) -> bool {
        !matches!(self, Self::Pairing)
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side is shown as the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
    /// Pick per item with equal probability.
    Mixed,
}

impl Default for Direction {
    fn default() -> Self {
        Self::Mixed
    }
}

/// Word filter applied when building a session pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolFilter {
    All,
    /// Excludes learned words.
    Learning,
    /// Only words whose next review is at or before now.
    Due,
    Shuffled,
}

impl Default for PoolFilter {
    fn default() -> Self {
        Self::All
    }
}

/// How many words a session should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSpec {
    All,
    Limit(usize),
}

impl Default for CountSpec {
    fn default() -> Self {
        Self::Limit(10)
    }
}

impl CountSpec {
    /// Resolve against a pool size. A zero limit is treated as one.
    pub fn resolve(self, pool_size: usize) -> usize {
        match self {
            Self::All => pool_size,
            Self::Limit(n) => n.max(1).min(pool_size),
        }
    }
}
