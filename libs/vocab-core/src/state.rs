//! Learner state: the word store plus account progress.

use crate::date_utils::study_day;
use crate::error::StoreError;
use crate::progress::{
    BadgeContext, Progress, ProgressEvent, XpReason, XP_CORRECT_ANSWER, XP_NEW_WORD, XP_PERFECT_SESSION, XP_WORD_LEARNED,
};
use crate::session::SessionSummary;
use crate::store::{ScheduledAnswer, StoreResult, WordStore};
use crate::types::{Word, WordDraft, WordId};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Everything the trainer knows about one learner.
///
/// Built once from persisted data and cleared on logout. Every mutation that
/// touches progress queues [`ProgressEvent`]s, drained with
/// [`LearnerState::take_events`].
#[derive(Debug, Default)]
pub struct LearnerState {
    pub store: WordStore,
    pub progress: Progress,
    daily_reset_hour: u32,
    events: Vec<ProgressEvent>,
}

impl LearnerState {
    pub fn new(daily_reset_hour: u32) -> Self {
        Self::from_parts(WordStore::new(), Progress::default(), daily_reset_hour)
    }

    pub fn from_parts(store: WordStore, progress: Progress, daily_reset_hour: u32) -> Self {
        Self {
            store,
            progress,
            daily_reset_hour,
            events: Vec::new(),
        }
    }

    pub fn daily_reset_hour(&self) -> u32 {
        self.daily_reset_hour
    }

    pub fn set_daily_reset_hour(&mut self, hour: u32) {
        self.daily_reset_hour = hour;
    }

    /// Add a word and award the new-word XP.
    pub fn add_word(&mut self, draft: &WordDraft, now: DateTime<Utc>) -> StoreResult<Word> {
        let word = self.store.add(draft, now)?.clone();
        let events = self.progress.gain_xp(XP_NEW_WORD, XpReason::NewWord);
        self.events.extend(events);
        self.check_badges(false);
        Ok(word)
    }

    pub fn update_word(
        &mut self,
        id: &WordId,
        draft: &WordDraft,
        now: DateTime<Utc>,
    ) -> StoreResult<Word> {
        self.store.update(id, draft, now).cloned()
    }

    pub fn delete_word(&mut self, id: &WordId) -> StoreResult<Word> {
        self.store.remove(id)
    }

    /// Schedule one answer and apply its progress effects.
    ///
    /// Returns `None` when the word has been deleted since the session
    /// started; the answer is dropped and nothing else changes.
    pub fn record_answer(
        &mut self,
        id: &WordId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Option<ScheduledAnswer> {
        let scheduled = match self.store.record_answer(id, correct, now) {
            Ok(scheduled) => scheduled,
            Err(StoreError::NotFound(_)) => {
                warn!(id = %id, "Answer for a word that is no longer stored");
                return None;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to record answer");
                return None;
            }
        };

        self.record_activity(now);

        if scheduled.became_learned {
            info!(id = %id, "Word learned");
            self.events.push(ProgressEvent::WordLearned {
                word_id: id.clone(),
            });
            let events = self.progress.gain_xp(XP_WORD_LEARNED, XpReason::WordLearned);
            self.events.extend(events);
            self.check_badges(false);
        }

        Some(scheduled)
    }

    /// Award session XP, count the study day and check badges.
    pub fn complete_session(&mut self, summary: &SessionSummary, now: DateTime<Utc>) {
        if summary.correct > 0 {
            let amount = (summary.correct as u32).saturating_mul(XP_CORRECT_ANSWER);
            let events = self.progress.gain_xp(amount, XpReason::SessionAnswers);
            self.events.extend(events);
        }

        if summary.perfect {
            let events = self
                .progress
                .gain_xp(XP_PERFECT_SESSION, XpReason::PerfectSession);
            self.events.extend(events);
        }

        self.record_activity(now);
        self.check_badges(summary.perfect);
    }

    /// Drain queued progress events in the order they happened.
    pub fn take_events(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forget everything, e.g. on logout.
    pub fn clear(&mut self) {
        self.store.clear();
        self.progress = Progress::default();
        self.events.clear();
    }

    fn record_activity(&mut self, now: DateTime<Utc>) {
        let today = study_day(now, self.daily_reset_hour);
        if self.progress.record_activity(today) {
            self.check_badges(false);
        }
    }

    fn check_badges(&mut self, perfect_session: bool) {
        let ctx = BadgeContext {
            total_words: self.store.len(),
            learned_words: self.store.learned_count(),
        };
        let events = self.progress.check_badges(&ctx, perfect_session);
        self.events.extend(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Badge;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn adding_a_word_awards_xp_and_first_badge() {
        let mut state = LearnerState::new(0);
        state.add_word(&WordDraft::new("cat", "кот"), now()).unwrap();

        assert_eq!(state.progress.xp, XP_NEW_WORD);
        let events = state.take_events();
        assert_eq!(
            events,
            vec![
                ProgressEvent::XpGained {
                    amount: XP_NEW_WORD,
                    reason: XpReason::NewWord
                },
                ProgressEvent::BadgeUnlocked {
                    badge: Badge::FirstWord
                },
            ]
        );
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn duplicate_word_awards_nothing() {
        let mut state = LearnerState::new(0);
        state.add_word(&WordDraft::new("cat", "кот"), now()).unwrap();
        state.take_events();
        assert!(state.add_word(&WordDraft::new("CAT", "кошка"), now()).is_err());
        assert!(state.take_events().is_empty());
        assert_eq!(state.progress.xp, XP_NEW_WORD);
    }

    #[test]
    fn third_correct_answer_emits_word_learned_once() {
        let mut state = LearnerState::new(0);
        let id = state.add_word(&WordDraft::new("cat", "кот"), now()).unwrap().id;
        state.take_events();

        state.record_answer(&id, true, now());
        state.record_answer(&id, true, now());
        let scheduled = state.record_answer(&id, true, now()).unwrap();
        assert!(scheduled.became_learned);

        let events = state.take_events();
        let learned: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::WordLearned { .. }))
            .collect();
        assert_eq!(learned.len(), 1);
        assert!(events.contains(&ProgressEvent::BadgeUnlocked {
            badge: Badge::Learned1
        }));

        state.record_answer(&id, true, now());
        assert!(!state
            .take_events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::WordLearned { .. })));
    }

    #[test]
    fn answers_count_towards_the_day_streak() {
        let mut state = LearnerState::new(0);
        let id = state.add_word(&WordDraft::new("cat", "кот"), now()).unwrap().id;

        state.record_answer(&id, false, now());
        state.record_answer(&id, false, now() + Duration::days(1));
        assert_eq!(state.progress.streak.count, 2);
        state.record_answer(&id, false, now() + Duration::days(3));
        assert_eq!(state.progress.streak.count, 1);
    }

    #[test]
    fn answer_for_deleted_word_is_dropped() {
        let mut state = LearnerState::new(0);
        let id = state.add_word(&WordDraft::new("cat", "кот"), now()).unwrap().id;
        state.delete_word(&id).unwrap();
        assert!(state.record_answer(&id, true, now()).is_none());
        assert_eq!(state.progress.streak.count, 0);
    }

    fn summary(correct: usize, wrong: usize, perfect: bool) -> SessionSummary {
        SessionSummary {
            correct,
            wrong,
            total: correct + wrong,
            percentage: 0,
            perfect,
            correct_words: Vec::new(),
            wrong_words: Vec::new(),
        }
    }

    #[test]
    fn session_bonus_follows_the_summary_flag() {
        let mut state = LearnerState::new(0);
        state.complete_session(&summary(2, 0, true), now());
        assert_eq!(state.progress.lifetime_xp, 2 * XP_CORRECT_ANSWER + XP_PERFECT_SESSION);
        assert!(state.progress.has_badge(Badge::Perfect));

        let mut other = LearnerState::new(0);
        other.complete_session(&summary(6, 0, false), now());
        assert_eq!(other.progress.lifetime_xp, 6 * XP_CORRECT_ANSWER);
        assert!(!other.progress.has_badge(Badge::Perfect));
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = LearnerState::new(4);
        state.add_word(&WordDraft::new("cat", "кот"), now()).unwrap();
        state.clear();
        assert!(state.store.is_empty());
        assert_eq!(state.progress, Progress::default());
        assert!(state.take_events().is_empty());
        assert_eq!(state.daily_reset_hour(), 4);
    }
}
