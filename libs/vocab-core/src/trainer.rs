//! Trainer façade.
//!
//! [`Trainer`] is the synchronous API an app embeds. It owns the learner's
//! state and the collaborators, runs at most one practice session at a time
//! and persists every mutation. Persistence failures never interrupt the
//! learner: they are logged and queued as [`PersistenceNotice`]s for display.

use crate::collaborators::{AudioOutput, Capabilities, SpeechInput, WordRepository};
use crate::date_utils::study_day;
use crate::error::{PersistenceError, Result, SessionError};
use crate::exercise::{Exercise, Response};
use crate::pairing::PairFeedback;
use crate::progress::{Progress, ProgressEvent};
use crate::session::{AnswerOutcome, PairOutcome, PracticeSession, SessionState, SessionSummary};
use crate::settings::{GlobalSettings, SessionConfig, SessionOverrides};
use crate::state::LearnerState;
use crate::store::{StoreResult, VocabularyStats, WordQuery, WordStore};
use crate::types::{ExerciseKind, Word, WordDraft, WordId};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Persistence call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOp {
    LoadWords,
    LoadProgress,
    SaveWord,
    DeleteWord,
    SaveProgress,
}

/// A persistence failure surfaced for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceNotice {
    pub op: PersistOp,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub word_id: Option<WordId>,
    pub message: String,
}

/// The vocabulary trainer.
pub struct Trainer<R: Rng = StdRng> {
    learner: LearnerState,
    settings: GlobalSettings,
    repository: Box<dyn WordRepository>,
    audio: Box<dyn AudioOutput>,
    speech: Box<dyn SpeechInput>,
    session: Option<PracticeSession>,
    last_config: Option<SessionConfig>,
    notices: Vec<PersistenceNotice>,
    rng: R,
}

impl Trainer<StdRng> {
    /// Load persisted state and seed randomness from the OS.
    pub fn open(
        settings: GlobalSettings,
        repository: Box<dyn WordRepository>,
        audio: Box<dyn AudioOutput>,
        speech: Box<dyn SpeechInput>,
    ) -> Self {
        Self::with_rng(settings, repository, audio, speech, StdRng::from_entropy())
    }
}

impl<R: Rng> Trainer<R> {
    /// Load persisted state using the given random source.
    ///
    /// A repository that fails to load leaves the trainer empty but usable.
    pub fn with_rng(
        settings: GlobalSettings,
        repository: Box<dyn WordRepository>,
        audio: Box<dyn AudioOutput>,
        speech: Box<dyn SpeechInput>,
        rng: R,
    ) -> Self {
        let mut notices = Vec::new();

        let words = repository.load_words().unwrap_or_else(|e| {
            notices.push(notice(PersistOp::LoadWords, None, &e));
            Vec::new()
        });
        let progress = repository
            .load_progress()
            .unwrap_or_else(|e| {
                notices.push(notice(PersistOp::LoadProgress, None, &e));
                None
            })
            .unwrap_or_default();

        notices.iter().for_each(log_notice);
        info!(words = words.len(), level = progress.level, "Opened trainer");

        let learner = LearnerState::from_parts(
            WordStore::from_words(words),
            progress,
            settings.daily_reset_hour,
        );

        Self {
            learner,
            settings,
            repository,
            audio,
            speech,
            session: None,
            last_config: None,
            notices,
            rng,
        }
    }

    pub fn learner(&self) -> &LearnerState {
        &self.learner
    }

    pub fn progress(&self) -> &Progress {
        &self.learner.progress
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Replace the settings. A running session keeps its frozen config.
    pub fn update_settings(&mut self, settings: GlobalSettings) {
        self.learner.set_daily_reset_hour(settings.daily_reset_hour);
        self.settings = settings;
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::detect(self.audio.as_ref(), self.speech.as_ref())
    }

    pub fn add_word(&mut self, draft: &WordDraft, now: DateTime<Utc>) -> StoreResult<Word> {
        let word = self.learner.add_word(draft, now)?;
        self.persist_word(&word.id);
        self.persist_progress();
        Ok(word)
    }

    pub fn update_word(
        &mut self,
        id: &WordId,
        draft: &WordDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Word> {
        let word = self.learner.update_word(id, draft, now)?;
        self.persist_word(&word.id);
        Ok(word)
    }

    /// Delete a word. A running session keeps its snapshot of the word, but
    /// answers for it are no longer scheduled.
    pub fn delete_word(&mut self, id: &WordId) -> StoreResult<Word> {
        let word = self.learner.delete_word(id)?;
        if let Err(e) = self.repository.delete_word(id) {
            self.report(notice(PersistOp::DeleteWord, Some(id), &e));
        }
        Ok(word)
    }

    pub fn words(&self, query: &WordQuery) -> Vec<&Word> {
        self.learner.store.query(query)
    }

    pub fn overview(&self, now: DateTime<Utc>) -> VocabularyStats {
        self.learner.store.overview(now)
    }

    pub fn word_of_the_day(&self, now: DateTime<Utc>) -> Option<&Word> {
        let today = study_day(now, self.learner.daily_reset_hour());
        self.learner.store.word_of_the_day(today)
    }

    /// Start a session from the global settings plus `overrides`.
    ///
    /// Replaces any running session. Returns the number of pooled words.
    pub fn start_session(
        &mut self,
        overrides: Option<&SessionOverrides>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let config = SessionConfig::merge(&self.settings, overrides);
        self.begin(config, now)
    }

    /// Start a fresh session with the last session's configuration.
    pub fn repeat_session(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let config = self
            .last_config
            .clone()
            .ok_or(SessionError::NoPreviousSession)?;
        self.begin(config, now)
    }

    pub fn session(&self) -> Option<&PracticeSession> {
        self.session.as_ref()
    }

    /// The exercise awaiting a response, or `None` once the pool is done.
    ///
    /// A newly generated exercise is pronounced when audio is available:
    /// dictation always, others only with auto-pronounce on and the source
    /// side showing.
    pub fn next_question(&mut self, now: DateTime<Utc>) -> Result<Option<Exercise>> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let fresh = session.state() == SessionState::Advancing;
        let exercise = session.next_question(self.learner.store.words(), now, &mut self.rng);

        if let Some(exercise) = exercise.as_ref().filter(|_| fresh) {
            let wanted = exercise.kind() == ExerciseKind::Dictation || self.settings.auto_pronounce;
            if let Some(text) = exercise.pronunciation().filter(|_| wanted) {
                self.pronounce(text);
            }
        }
        Ok(exercise)
    }

    pub fn submit_answer(&mut self, response: &Response, now: DateTime<Utc>) -> Result<AnswerOutcome> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let outcome = session.submit_answer(&mut self.learner, response, now)?;
        self.persist_word(&outcome.word_id);
        self.persist_progress();
        Ok(outcome)
    }

    pub fn select_pair_source(&mut self, word_id: &WordId) -> Result<PairFeedback> {
        self.session
            .as_mut()
            .ok_or(SessionError::NoActiveSession)?
            .select_pair_source(word_id)
    }

    pub fn select_pair_target(&mut self, word_id: &WordId, now: DateTime<Utc>) -> Result<PairOutcome> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let outcome = session.select_pair_target(&mut self.learner, word_id, now)?;
        if let Some(answer) = &outcome.answer {
            self.persist_word(&answer.word_id);
            self.persist_progress();
        }
        Ok(outcome)
    }

    /// Close the completed session and apply its rewards.
    ///
    /// An unfinished session is left running and `SessionInProgress` is
    /// returned.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Result<SessionSummary> {
        let session = self.session.take().ok_or(SessionError::NoActiveSession)?;
        if !session.is_complete() {
            self.session = Some(session);
            return Err(SessionError::SessionInProgress);
        }

        let summary = session.finish(&mut self.learner, now)?;
        self.persist_progress();
        Ok(summary)
    }

    /// Abandon the running session. Answers already given stay recorded.
    pub fn exit_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                answered = session.position(),
                words = session.len(),
                "Exited practice session"
            );
        }
    }

    /// Drain progress notifications.
    pub fn take_events(&mut self) -> Vec<ProgressEvent> {
        self.learner.take_events()
    }

    /// Drain persistence failures.
    pub fn take_notices(&mut self) -> Vec<PersistenceNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Speak `text` if audio output is available.
    pub fn pronounce(&mut self, text: &str) {
        if self.audio.is_available() {
            self.audio.speak(text);
        }
    }

    /// Forget the learner, e.g. on logout. Nothing is deleted from storage.
    pub fn clear(&mut self) {
        self.session = None;
        self.last_config = None;
        self.notices.clear();
        self.learner.clear();
    }

    fn begin(&mut self, config: SessionConfig, now: DateTime<Utc>) -> Result<usize> {
        let capabilities = self.capabilities();
        let session = PracticeSession::start(
            self.learner.store.words(),
            config.clone(),
            &capabilities,
            now,
            &mut self.rng,
        )?;

        let size = session.len();
        self.last_config = Some(config);
        self.session = Some(session);
        Ok(size)
    }

    fn persist_word(&mut self, id: &WordId) {
        let result = match self.learner.store.get(id) {
            Some(word) => self.repository.save_word(word),
            None => return,
        };
        if let Err(e) = result {
            self.report(notice(PersistOp::SaveWord, Some(id), &e));
        }
    }

    fn persist_progress(&mut self) {
        if let Err(e) = self.repository.save_progress(&self.learner.progress) {
            self.report(notice(PersistOp::SaveProgress, None, &e));
        }
    }

    fn report(&mut self, notice: PersistenceNotice) {
        log_notice(&notice);
        self.notices.push(notice);
    }
}

fn notice(op: PersistOp, word_id: Option<&WordId>, error: &PersistenceError) -> PersistenceNotice {
    PersistenceNotice {
        op,
        word_id: word_id.cloned(),
        message: error.to_string(),
    }
}

fn log_notice(notice: &PersistenceNotice) {
    warn!(
        op = ?notice.op,
        word_id = ?notice.word_id,
        message = %notice.message,
        "Persistence failed"
    );
}
