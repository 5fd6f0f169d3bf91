//! Core library for a personal vocabulary trainer.
//!
//! Provides:
//! - Spaced repetition scheduling (three-tier step scheduler)
//! - Session pool selection and the practice-session state machine
//! - Exercise payloads, including the pair-matching game
//! - Answer evaluation (exact, selection, fuzzy for spoken answers)
//! - XP, levels, day streak and badges
//! - A synchronous [`Trainer`] façade over storage, audio and speech traits

pub mod algorithm;
pub mod collaborators;
pub mod date_utils;
pub mod error;
pub mod exercise;
pub mod matching;
pub mod pairing;
pub mod pool;
pub mod progress;
pub mod session;
pub mod settings;
pub mod state;
pub mod store;
pub mod trainer;
pub mod types;

pub use algorithm::{SchedulingResult, SpacedRepetitionAlgorithm, StepScheduler};
pub use collaborators::{AudioOutput, Capabilities, NoAudio, NoSpeech, SpeechInput, WordRepository};
pub use error::{PersistenceError, Result, SessionError, StoreError};
pub use exercise::{Exercise, Response};
pub use matching::{check_similarity, levenshtein_distance, normalized_similarity, MatchResult};
pub use pairing::{PairFeedback, PairingBoard};
pub use progress::{Badge, Progress, ProgressEvent};
pub use session::{AnswerOutcome, PairOutcome, PracticeSession, SessionState, SessionSummary};
pub use settings::{GlobalSettings, SessionConfig, SessionOverrides};
pub use state::LearnerState;
pub use store::{ScheduledAnswer, WordQuery, WordStore};
pub use trainer::{PersistenceNotice, Trainer};
pub use types::{
    CountSpec, Direction, ExerciseKind, PoolFilter, ReviewStats, Side, Word, WordDraft, WordId,
};
