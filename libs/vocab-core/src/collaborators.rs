//! Contracts for the subsystems the trainer delegates to.
//!
//! Storage, speech synthesis and speech recognition live outside this crate.
//! The trainer only talks to them through these traits and never lets their
//! failures interrupt scheduling.

use crate::error::PersistenceError;
use crate::progress::Progress;
use crate::types::{ExerciseKind, Word, WordId};
use serde::{Deserialize, Serialize};

/// Result type for persistence calls.
pub type PersistResult<T> = std::result::Result<T, PersistenceError>;

/// Repository for word and progress storage.
pub trait WordRepository {
    fn load_words(&self) -> PersistResult<Vec<Word>>;
    fn save_word(&mut self, word: &Word) -> PersistResult<()>;
    fn delete_word(&mut self, id: &WordId) -> PersistResult<()>;

    fn load_progress(&self) -> PersistResult<Option<Progress>> {
        Ok(None)
    }

    fn save_progress(&mut self, _progress: &Progress) -> PersistResult<()> {
        Ok(())
    }
}

/// Best-effort text-to-speech.
pub trait AudioOutput {
    fn is_available(&self) -> bool;
    fn speak(&mut self, text: &str);
}

/// Speech recognition. Transcripts reach the trainer as
/// [`Response::Spoken`](crate::exercise::Response::Spoken).
pub trait SpeechInput {
    fn is_available(&self) -> bool;
}

/// Audio output for devices without speech synthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAudio;

impl AudioOutput for NoAudio {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str) {}
}

/// Speech input for devices without a recognizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechInput for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }
}

/// Device capabilities that gate exercise kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub audio_output: bool,
    pub speech_input: bool,
}

impl Capabilities {
    /// Every capability present.
    pub const FULL: Self = Self {
        audio_output: true,
        speech_input: true,
    };

    pub fn detect(audio: &dyn AudioOutput, speech: &dyn SpeechInput) -> Self {
        Self {
            audio_output: audio.is_available(),
            speech_input: speech.is_available(),
        }
    }

    /// Whether `kind` can run on this device.
    pub fn supports(&self, kind: ExerciseKind) -> bool {
        match kind {
            ExerciseKind::Dictation => self.audio_output,
            ExerciseKind::SpeakAloud => self.speech_input,
            ExerciseKind::Flash
            | ExerciseKind::MultipleChoice
            | ExerciseKind::Typed
            | ExerciseKind::Pairing => true,
        }
    }
}
