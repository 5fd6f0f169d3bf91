//! Error types for vocab-core.

use crate::types::{ExerciseKind, WordId};
use thiserror::Error;

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised while starting or driving a practice session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Every requested exercise kind is unsupported on this device.
    #[error("no usable exercise type")]
    NoUsableExerciseKind,

    #[error("no eligible words")]
    EmptyPool,

    #[error("no practice session in progress")]
    NoActiveSession,

    #[error("no earlier session to repeat")]
    NoPreviousSession,

    #[error("no exercise is awaiting an answer")]
    NoActiveExercise,

    #[error("response does not fit a {kind} exercise")]
    UnexpectedResponse { kind: ExerciseKind },

    #[error("word {0} is not part of the current pairing batch")]
    UnknownWord(WordId),

    #[error("session is already complete")]
    SessionComplete,

    #[error("session still has unanswered exercises")]
    SessionInProgress,
}

/// Errors raised by word management operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("word \"{term}\" already exists")]
    DuplicateWord { term: String },

    #[error("word not found: {0}")]
    NotFound(WordId),
}

/// Errors reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    Rejected(String),
}
