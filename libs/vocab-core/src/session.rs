//! Practice session state machine.
//!
//! A session walks a fixed pool of words. Each step generates one exercise
//! (or a pairing batch covering several words), takes the learner's
//! response, records it through [`LearnerState`] and advances the cursor.
//!
//! ```text
//! Advancing --next_question--> AwaitingAnswer --submit_answer--> Advancing
//! Advancing --next_question--> Matching --last pair matched--> Advancing
//! Advancing (cursor at end) == Complete
//! ```

use crate::collaborators::Capabilities;
use crate::error::{Result, SessionError};
use crate::exercise::{build_basic, build_multiple_choice, Exercise, Response};
use crate::matching::evaluate;
use crate::pairing::{PairFeedback, PairMatchBatch, MIN_PAIR_BATCH, PAIR_BATCH_SIZE};
use crate::pool::{build_pool, SessionPlan};
use crate::progress::PERFECT_SESSION_MIN_ITEMS;
use crate::settings::SessionConfig;
use crate::state::LearnerState;
use crate::store::ScheduledAnswer;
use crate::types::{ExerciseKind, Word, WordId};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No exercise has been generated for the cursor yet.
    Advancing,
    AwaitingAnswer,
    Matching,
    Complete,
}

/// Result of answering one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub word_id: WordId,
    pub correct: bool,
    /// Answer to show the learner.
    pub expected: String,
    pub similarity: f64,
    pub became_learned: bool,
    /// `None` when the word was deleted mid-session and nothing was scheduled.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_review_at: Option<DateTime<Utc>>,
    pub session_complete: bool,
}

/// Result of picking a target tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairOutcome {
    pub feedback: PairFeedback,
    /// Present when the pick recorded an answer (match or mismatch).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub answer: Option<AnswerOutcome>,
}

/// A word as listed in the session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub id: WordId,
    pub source: String,
    pub target: String,
}

/// Final score of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub correct: usize,
    pub wrong: usize,
    /// Words answered at least once.
    pub total: usize,
    /// Correct share rounded to a whole percent; 0 when nothing was answered.
    pub percentage: u32,
    /// At least five answered and none wrong.
    pub perfect: bool,
    pub correct_words: Vec<WordPair>,
    pub wrong_words: Vec<WordPair>,
}

#[derive(Debug, Clone)]
enum LiveExercise {
    Single(Exercise),
    Pairing(PairMatchBatch),
}

/// One run through a pool of words.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    config: SessionConfig,
    plan: SessionPlan,
    cursor: usize,
    live: Option<LiveExercise>,
    /// Each word sits in at most one list, per its last attempt.
    correct: Vec<WordId>,
    wrong: Vec<WordId>,
}

impl PracticeSession {
    /// Build the pool and start a session.
    ///
    /// Fails with `NoUsableExerciseKind` or `EmptyPool`; no session is
    /// created in either case.
    pub fn start<R: Rng + ?Sized>(
        words: &[Word],
        config: SessionConfig,
        capabilities: &Capabilities,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self> {
        let plan = build_pool(words, &config, capabilities, now, rng)?;
        info!(
            words = plan.words.len(),
            kinds = ?plan.kinds,
            filter = ?config.filter,
            "Starting practice session"
        );

        Ok(Self {
            config,
            plan,
            cursor: 0,
            live: None,
            correct: Vec::new(),
            wrong: Vec::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    /// Pool entries already finished.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.plan.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.words.is_empty()
    }

    pub fn state(&self) -> SessionState {
        match &self.live {
            Some(LiveExercise::Single(_)) => SessionState::AwaitingAnswer,
            Some(LiveExercise::Pairing(_)) => SessionState::Matching,
            None if self.cursor >= self.plan.words.len() => SessionState::Complete,
            None => SessionState::Advancing,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == SessionState::Complete
    }

    /// The exercise awaiting a response, generating one if needed.
    ///
    /// Calling again before answering returns the same exercise. Returns
    /// `None` once the pool is exhausted. `universe` is every stored word and
    /// supplies multiple-choice distractors.
    pub fn next_question<R: Rng + ?Sized>(
        &mut self,
        universe: &[Word],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<Exercise> {
        if let Some(live) = &self.live {
            return Some(live.exercise());
        }
        if self.cursor >= self.plan.words.len() {
            return None;
        }

        let kind = self
            .plan
            .kinds
            .choose(rng)
            .copied()
            .unwrap_or(ExerciseKind::Flash);
        let live = self.generate(kind, universe, now, rng);
        let exercise = live.exercise();
        debug!(kind = %exercise.kind(), cursor = self.cursor, "Generated exercise");

        self.live = Some(live);
        Some(exercise)
    }

    /// Judge a response to the live single-word exercise.
    ///
    /// A response that does not fit the exercise is rejected and nothing
    /// changes.
    pub fn submit_answer(
        &mut self,
        learner: &mut LearnerState,
        response: &Response,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        let exercise = match &self.live {
            Some(LiveExercise::Single(exercise)) => exercise,
            Some(LiveExercise::Pairing(_)) => {
                return Err(SessionError::UnexpectedResponse {
                    kind: ExerciseKind::Pairing,
                })
            }
            None if self.is_complete() => return Err(SessionError::SessionComplete),
            None => return Err(SessionError::NoActiveExercise),
        };

        let result = evaluate(exercise, response, self.config.fuzzy_threshold)?;
        let word_id = exercise
            .word_id()
            .cloned()
            .ok_or(SessionError::NoActiveExercise)?;

        self.live = None;
        self.cursor += 1;

        let scheduled = learner.record_answer(&word_id, result.is_correct, now);
        self.tally(&word_id, result.is_correct);

        Ok(self.outcome(word_id, result.is_correct, result.expected, result.similarity, scheduled))
    }

    /// Select a source tile in the live pairing batch.
    pub fn select_pair_source(&mut self, word_id: &WordId) -> Result<PairFeedback> {
        self.live_batch()?.select_source(word_id)
    }

    /// Pick a target tile in the live pairing batch.
    ///
    /// A match records a correct answer for that word immediately. A
    /// mismatch records a wrong answer for the selected source word only.
    pub fn select_pair_target(
        &mut self,
        learner: &mut LearnerState,
        word_id: &WordId,
        now: DateTime<Utc>,
    ) -> Result<PairOutcome> {
        let batch = self.live_batch()?;
        let feedback = batch.select_target(word_id, now)?;

        let judged = match &feedback {
            PairFeedback::Matched { word_id, .. } | PairFeedback::Completed { word_id, .. } => {
                Some((word_id.clone(), true))
            }
            PairFeedback::Mismatch { source, .. } => Some((source.clone(), false)),
            _ => None,
        };
        let expected = judged.as_ref().and_then(|(id, _)| {
            batch
                .words()
                .iter()
                .find(|w| &w.id == id)
                .map(|w| w.target.clone())
        });

        if let PairFeedback::Completed {
            total, elapsed_ms, ..
        } = &feedback
        {
            debug!(total, elapsed_ms, "Pairing batch complete");
            self.cursor += *total;
            self.live = None;
        }

        let answer = judged.map(|(id, correct)| {
            let scheduled = learner.record_answer(&id, correct, now);
            self.tally(&id, correct);
            let similarity = if correct { 1.0 } else { 0.0 };
            self.outcome(id, correct, expected.unwrap_or_default(), similarity, scheduled)
        });

        Ok(PairOutcome { feedback, answer })
    }

    /// Score so far; final once the session is complete.
    pub fn summary(&self) -> SessionSummary {
        let correct = self.correct.len();
        let wrong = self.wrong.len();
        let total = correct + wrong;
        let percentage = if total == 0 {
            0
        } else {
            (correct as f64 / total as f64 * 100.0).round() as u32
        };

        SessionSummary {
            correct,
            wrong,
            total,
            percentage,
            perfect: total >= PERFECT_SESSION_MIN_ITEMS && wrong == 0,
            correct_words: self.pairs(&self.correct),
            wrong_words: self.pairs(&self.wrong),
        }
    }

    /// Close a completed session and apply its progress rewards.
    pub fn finish(self, learner: &mut LearnerState, now: DateTime<Utc>) -> Result<SessionSummary> {
        if !self.is_complete() {
            return Err(SessionError::SessionInProgress);
        }

        let summary = self.summary();
        info!(
            correct = summary.correct,
            wrong = summary.wrong,
            percentage = summary.percentage,
            "Practice session complete"
        );
        learner.complete_session(&summary, now);
        Ok(summary)
    }

    fn generate<R: Rng + ?Sized>(
        &self,
        kind: ExerciseKind,
        universe: &[Word],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> LiveExercise {
        let word = &self.plan.words[self.cursor];
        let direction = self.plan.direction;

        match kind {
            ExerciseKind::Pairing => {
                let remaining = self.plan.words.len() - self.cursor;
                let size = remaining.min(PAIR_BATCH_SIZE);
                if size >= MIN_PAIR_BATCH {
                    let words = self.plan.words[self.cursor..self.cursor + size].to_vec();
                    return LiveExercise::Pairing(PairMatchBatch::new(words, now, rng));
                }
                LiveExercise::Single(build_basic(ExerciseKind::Flash, word, direction, rng))
            }
            ExerciseKind::MultipleChoice => {
                match build_multiple_choice(word, universe, direction, rng) {
                    Ok(exercise) => LiveExercise::Single(exercise),
                    Err(e) => {
                        let fallback = self.substitute_kind(rng);
                        debug!(error = %e, fallback = %fallback, "Substituting multiple choice");
                        LiveExercise::Single(build_basic(fallback, word, direction, rng))
                    }
                }
            }
            _ => LiveExercise::Single(build_basic(kind, word, direction, rng)),
        }
    }

    /// Another enabled single-word kind, or flash.
    fn substitute_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> ExerciseKind {
        let candidates: Vec<ExerciseKind> = self
            .plan
            .kinds
            .iter()
            .copied()
            .filter(|k| k.is_single_word() && *k != ExerciseKind::MultipleChoice)
            .collect();
        candidates.choose(rng).copied().unwrap_or(ExerciseKind::Flash)
    }

    fn live_batch(&mut self) -> Result<&mut PairMatchBatch> {
        let complete = self.is_complete();
        match &mut self.live {
            Some(LiveExercise::Pairing(batch)) => Ok(batch),
            Some(LiveExercise::Single(exercise)) => Err(SessionError::UnexpectedResponse {
                kind: exercise.kind(),
            }),
            None if complete => Err(SessionError::SessionComplete),
            None => Err(SessionError::NoActiveExercise),
        }
    }

    fn tally(&mut self, word_id: &WordId, correct: bool) {
        self.correct.retain(|id| id != word_id);
        self.wrong.retain(|id| id != word_id);
        if correct {
            self.correct.push(word_id.clone());
        } else {
            self.wrong.push(word_id.clone());
        }
    }

    fn outcome(
        &self,
        word_id: WordId,
        correct: bool,
        expected: String,
        similarity: f64,
        scheduled: Option<ScheduledAnswer>,
    ) -> AnswerOutcome {
        AnswerOutcome {
            word_id,
            correct,
            expected,
            similarity,
            became_learned: scheduled.as_ref().is_some_and(|s| s.became_learned),
            next_review_at: scheduled.map(|s| s.next_review_at),
            session_complete: self.is_complete(),
        }
    }

    fn pairs(&self, ids: &[WordId]) -> Vec<WordPair> {
        ids.iter()
            .filter_map(|id| self.plan.words.iter().find(|w| &w.id == id))
            .map(|w| WordPair {
                id: w.id.clone(),
                source: w.source.clone(),
                target: w.target.clone(),
            })
            .collect()
    }
}

impl LiveExercise {
    fn exercise(&self) -> Exercise {
        match self {
            Self::Single(exercise) => exercise.clone(),
            Self::Pairing(batch) => Exercise::Pairing(batch.board()),
        }
    }
}
