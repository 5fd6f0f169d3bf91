//! In-memory word store.
//!
//! The store owns every [`Word`] and is the only place review statistics
//! change: [`WordStore::record_answer`] runs the configured scheduling
//! algorithm and writes the result back.

use crate::algorithm::{SpacedRepetitionAlgorithm, StepScheduler};
use crate::error::StoreError;
use crate::types::{Word, WordDraft, WordId};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Result type for word management.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Number of words listed as hardest and easiest in the overview.
const OVERVIEW_RANKING_SIZE: usize = 5;

/// Outcome of recording one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAnswer {
    pub word_id: WordId,
    pub correct: bool,
    /// True only on the answer that first marked the word learned.
    pub became_learned: bool,
    pub interval_days: u32,
    pub next_review_at: DateTime<Utc>,
}

/// Learned status filter for word listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Learning,
    Learned,
}

/// Sort order for word listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSort {
    DateAsc,
    #[default]
    DateDesc,
    AlphaAsc,
    AlphaDesc,
    /// Lowest accuracy first. Unpracticed words count as fully accurate.
    ProgressAsc,
    ProgressDesc,
}

/// Word listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordQuery {
    pub status: StatusFilter,
    /// Case-insensitive substring of the source, target or any tag.
    pub search: Option<String>,
    /// Exact tag, compared after normalization.
    pub tag: Option<String>,
    pub sort: WordSort,
}

/// Words added on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAdditions {
    pub day: NaiveDate,
    pub count: usize,
}

/// Accuracy of one practiced word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAccuracy {
    pub word_id: WordId,
    pub source: String,
    pub target: String,
    pub accuracy: f64,
}

/// Vocabulary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyStats {
    pub total_words: usize,
    pub learned_words: usize,
    pub due_words: usize,
    /// Learned share, rounded to a whole percent.
    pub learned_percent: u32,
    pub added_last_7_days: usize,
    /// Oldest day first, ending today.
    pub daily_additions: Vec<DailyAdditions>,
    pub hardest: Vec<WordAccuracy>,
    pub easiest: Vec<WordAccuracy>,
}

/// Collection of words plus the algorithm that schedules them.
pub struct WordStore {
    words: Vec<Word>,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
}

impl fmt::Debug for WordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordStore")
            .field("words", &self.words.len())
            .field("algorithm", &self.algorithm.name())
            .finish()
    }
}

impl Default for WordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WordStore {
    /// Empty store using the step scheduler.
    pub fn new() -> Self {
        Self::with_algorithm(Box::new(StepScheduler::default()))
    }

    pub fn with_algorithm(algorithm: Box<dyn SpacedRepetitionAlgorithm>) -> Self {
        Self {
            words: Vec::new(),
            algorithm,
        }
    }

    /// Store pre-loaded with persisted words.
    pub fn from_words(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Self::new()
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, id: &WordId) -> Option<&Word> {
        self.words.iter().find(|w| &w.id == id)
    }

    /// Add a word. The source term must be unique, ignoring case.
    pub fn add(&mut self, draft: &WordDraft, now: DateTime<Utc>) -> StoreResult<&Word> {
        self.validate(draft, None)?;

        let mut word = Word::new(draft, now);
        word.stats = self.algorithm.initial_stats(now);
        debug!(id = %word.id, source = %word.source, "Added word");

        self.words.push(word);
        let index = self.words.len() - 1;
        Ok(&self.words[index])
    }

    /// Replace a word's content, keeping its id and review statistics.
    pub fn update(
        &mut self,
        id: &WordId,
        draft: &WordDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<&Word> {
        let index = self.index_of(id)?;
        self.validate(draft, Some(id))?;

        self.words[index].apply_draft(draft, now);
        Ok(&self.words[index])
    }

    pub fn remove(&mut self, id: &WordId) -> StoreResult<Word> {
        let index = self.index_of(id)?;
        debug!(id = %id, "Removed word");
        Ok(self.words.remove(index))
    }

    /// Run the scheduler for one answer and store the new statistics.
    pub fn record_answer(
        &mut self,
        id: &WordId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<ScheduledAnswer> {
        let index = self.index_of(id)?;
        let word = &mut self.words[index];

        let result = self.algorithm.schedule(&word.stats, correct, now);
        word.stats = result.new_stats;
        word.updated_at = now;

        debug!(
            id = %word.id,
            correct,
            interval_days = word.stats.interval_days,
            streak = word.stats.current_streak,
            "Recorded answer"
        );

        Ok(ScheduledAnswer {
            word_id: word.id.clone(),
            correct,
            became_learned: result.became_learned,
            interval_days: word.stats.interval_days,
            next_review_at: result.next_due,
        })
    }

    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        self.words.iter().filter(|w| w.stats.is_due(now)).count()
    }

    pub fn learned_count(&self) -> usize {
        self.words.iter().filter(|w| w.stats.learned).count()
    }

    /// Filter and sort words for display.
    pub fn query(&self, query: &WordQuery) -> Vec<&Word> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let tag = query
            .tag
            .as_deref()
            .map(|t| crate::types::normalize_tags(&[t]))
            .and_then(|mut tags| tags.pop());

        let mut list: Vec<&Word> = self
            .words
            .iter()
            .filter(|w| match query.status {
                StatusFilter::All => true,
                StatusFilter::Learning => !w.stats.learned,
                StatusFilter::Learned => w.stats.learned,
            })
            .filter(|w| match &search {
                Some(q) => {
                    w.source.to_lowercase().contains(q)
                        || w.target.to_lowercase().contains(q)
                        || w.tags.iter().any(|t| t.contains(q.as_str()))
                }
                None => true,
            })
            .filter(|w| match &tag {
                Some(tag) => w.tags.contains(tag),
                None => true,
            })
            .collect();

        match query.sort {
            WordSort::DateAsc => list.sort_by_key(|w| w.created_at),
            WordSort::DateDesc => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            WordSort::AlphaAsc => list.sort_by(|a, b| alphabetical(a, b)),
            WordSort::AlphaDesc => list.sort_by(|a, b| alphabetical(b, a)),
            WordSort::ProgressAsc => list.sort_by(|a, b| progress(a).total_cmp(&progress(b))),
            WordSort::ProgressDesc => list.sort_by(|a, b| progress(b).total_cmp(&progress(a))),
        }
        list
    }

    /// Totals and rankings for the statistics view.
    pub fn overview(&self, now: DateTime<Utc>) -> VocabularyStats {
        let total_words = self.words.len();
        let learned_words = self.learned_count();
        let learned_percent = if total_words == 0 {
            0
        } else {
            (learned_words as f64 / total_words as f64 * 100.0).round() as u32
        };

        let week_ago = now - Duration::days(7);
        let added_last_7_days = self
            .words
            .iter()
            .filter(|w| w.created_at > week_ago)
            .count();

        let today = now.date_naive();
        let daily_additions = (0..7)
            .rev()
            .map(|back| {
                let day = today - Duration::days(back);
                let count = self
                    .words
                    .iter()
                    .filter(|w| w.created_at.date_naive() == day)
                    .count();
                DailyAdditions { day, count }
            })
            .collect();

        let mut practiced: Vec<WordAccuracy> = self
            .words
            .iter()
            .filter_map(|w| {
                w.stats.accuracy().map(|accuracy| WordAccuracy {
                    word_id: w.id.clone(),
                    source: w.source.clone(),
                    target: w.target.clone(),
                    accuracy,
                })
            })
            .collect();

        practiced.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
        let hardest = practiced.iter().take(OVERVIEW_RANKING_SIZE).cloned().collect();
        practiced.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
        let easiest = practiced.into_iter().take(OVERVIEW_RANKING_SIZE).collect();

        VocabularyStats {
            total_words,
            learned_words,
            due_words: self.due_count(now),
            learned_percent,
            added_last_7_days,
            daily_additions,
            hardest,
            easiest,
        }
    }

    /// Deterministic pick for the given day; the same day always yields the
    /// same word while the store is unchanged.
    pub fn word_of_the_day(&self, day: NaiveDate) -> Option<&Word> {
        if self.words.is_empty() {
            return None;
        }

        let stamp = day.format("%a %b %d %Y").to_string();
        let seed = stamp
            .bytes()
            .fold(0u32, |seed, b| (seed * 31 + u32::from(b)) & 0xffff);
        self.words.get(seed as usize % self.words.len())
    }

    /// Drop every word, e.g. on logout.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    fn index_of(&self, id: &WordId) -> StoreResult<usize> {
        self.words
            .iter()
            .position(|w| &w.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn validate(&self, draft: &WordDraft, editing: Option<&WordId>) -> StoreResult<()> {
        let source = draft.source.trim();
        if source.is_empty() {
            return Err(StoreError::EmptyField { field: "source" });
        }
        if draft.target.trim().is_empty() {
            return Err(StoreError::EmptyField { field: "target" });
        }

        let folded = source.to_lowercase();
        let duplicate = self
            .words
            .iter()
            .filter(|w| Some(&w.id) != editing)
            .any(|w| w.source.to_lowercase() == folded);
        if duplicate {
            return Err(StoreError::DuplicateWord {
                term: source.to_string(),
            });
        }
        Ok(())
    }
}

fn alphabetical(a: &Word, b: &Word) -> Ordering {
    a.source.to_lowercase().cmp(&b.source.to_lowercase())
}

fn progress(word: &Word) -> f64 {
    word.stats.accuracy().unwrap_or(1.0)
}
