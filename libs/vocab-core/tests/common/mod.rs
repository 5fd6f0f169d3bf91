//! Common test utilities for integration tests.
//!
//! Provides in-memory stand-ins for the storage, audio and speech
//! collaborators, plus a [`TestContext`] that wires them into a seeded
//! [`Trainer`] and keeps handles for inspecting what the trainer did.

#![allow(dead_code)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_core::collaborators::{AudioOutput, PersistResult, SpeechInput, WordRepository};
use vocab_core::{
    Exercise, GlobalSettings, PersistenceError, Progress, Response, Trainer, Word, WordDraft,
    WordId,
};

/// Fixed "now" so scheduling results are predictable.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

/// What the fake repository holds and how it should behave.
#[derive(Debug, Default)]
pub struct RepoState {
    pub words: Vec<Word>,
    pub progress: Option<Progress>,
    pub saved: Vec<WordId>,
    pub deleted: Vec<WordId>,
    pub progress_saves: usize,
    pub fail_loads: bool,
    pub fail_writes: bool,
}

/// Repository backed by shared memory.
pub struct MemoryRepository {
    state: Rc<RefCell<RepoState>>,
}

impl WordRepository for MemoryRepository {
    fn load_words(&self) -> PersistResult<Vec<Word>> {
        let state = self.state.borrow();
        if state.fail_loads {
            return Err(PersistenceError::Unavailable("offline".to_string()));
        }
        Ok(state.words.clone())
    }

    fn save_word(&mut self, word: &Word) -> PersistResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(PersistenceError::Rejected("quota exceeded".to_string()));
        }
        state.saved.push(word.id.clone());
        match state.words.iter_mut().find(|w| w.id == word.id) {
            Some(stored) => *stored = word.clone(),
            None => state.words.push(word.clone()),
        }
        Ok(())
    }

    fn delete_word(&mut self, id: &WordId) -> PersistResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(PersistenceError::Rejected("quota exceeded".to_string()));
        }
        state.deleted.push(id.clone());
        state.words.retain(|w| &w.id != id);
        Ok(())
    }

    fn load_progress(&self) -> PersistResult<Option<Progress>> {
        let state = self.state.borrow();
        if state.fail_loads {
            return Err(PersistenceError::Unavailable("offline".to_string()));
        }
        Ok(state.progress.clone())
    }

    fn save_progress(&mut self, progress: &Progress) -> PersistResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(PersistenceError::Rejected("quota exceeded".to_string()));
        }
        state.progress_saves += 1;
        state.progress = Some(progress.clone());
        Ok(())
    }
}

/// Audio output that records what it was asked to say.
pub struct RecordingAudio {
    available: bool,
    spoken: Rc<RefCell<Vec<String>>>,
}

impl AudioOutput for RecordingAudio {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, text: &str) {
        self.spoken.borrow_mut().push(text.to_string());
    }
}

pub struct FakeSpeech {
    available: bool,
}

impl SpeechInput for FakeSpeech {
    fn is_available(&self) -> bool {
        self.available
    }
}

/// Builder for a [`TestContext`].
pub struct TestContextBuilder {
    settings: GlobalSettings,
    repo: RepoState,
    audio: bool,
    speech: bool,
    seed: u64,
}

impl TestContextBuilder {
    pub fn settings(mut self, settings: GlobalSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn stored_words(mut self, words: Vec<Word>) -> Self {
        self.repo.words = words;
        self
    }

    pub fn stored_progress(mut self, progress: Progress) -> Self {
        self.repo.progress = Some(progress);
        self
    }

    pub fn failing_loads(mut self) -> Self {
        self.repo.fail_loads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.repo.fail_writes = true;
        self
    }

    pub fn audio(mut self, available: bool) -> Self {
        self.audio = available;
        self
    }

    pub fn speech(mut self, available: bool) -> Self {
        self.speech = available;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> TestContext {
        let repo = Rc::new(RefCell::new(self.repo));
        let spoken = Rc::new(RefCell::new(Vec::new()));

        let trainer = Trainer::with_rng(
            self.settings,
            Box::new(MemoryRepository {
                state: Rc::clone(&repo),
            }),
            Box::new(RecordingAudio {
                available: self.audio,
                spoken: Rc::clone(&spoken),
            }),
            Box::new(FakeSpeech {
                available: self.speech,
            }),
            StdRng::seed_from_u64(self.seed),
        );

        TestContext {
            trainer,
            repo,
            spoken,
        }
    }
}

/// Trainer under test plus handles to its fake collaborators.
pub struct TestContext {
    pub trainer: Trainer<StdRng>,
    pub repo: Rc<RefCell<RepoState>>,
    pub spoken: Rc<RefCell<Vec<String>>>,
}

impl TestContext {
    pub fn builder() -> TestContextBuilder {
        TestContextBuilder {
            settings: GlobalSettings::default(),
            repo: RepoState::default(),
            audio: false,
            speech: false,
            seed: 7,
        }
    }

    /// Default trainer with no audio and no speech input.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Add word pairs through the trainer.
    pub fn add_words(&mut self, pairs: &[(&str, &str)]) {
        for (source, target) in pairs {
            self.trainer
                .add_word(&WordDraft::new(*source, *target), fixed_now())
                .expect("fixture word should be valid");
        }
    }

    pub fn word(&self, source: &str) -> Word {
        self.trainer
            .learner()
            .store
            .words()
            .iter()
            .find(|w| w.source == source)
            .cloned()
            .unwrap_or_else(|| panic!("no word {source}"))
    }

    pub fn id(&self, source: &str) -> WordId {
        self.word(source).id
    }
}

/// The response that answers `exercise` correctly.
pub fn correct_response(exercise: &Exercise) -> Response {
    match exercise {
        Exercise::Flash(_) => Response::SelfReport(true),
        Exercise::MultipleChoice(mc) => {
            let index = mc
                .options
                .iter()
                .position(|o| *o == mc.answer)
                .expect("answer is among the options");
            Response::Choice(index)
        }
        Exercise::Typed(typed) => Response::Typed(typed.expected.clone()),
        Exercise::Dictation(dictation) => Response::Typed(dictation.term.clone()),
        Exercise::SpeakAloud(speak) => Response::Spoken {
            transcript: speak.expected.clone(),
            confidence: 0.9,
        },
        Exercise::Pairing(_) => panic!("pairing boards are answered tile by tile"),
    }
}
