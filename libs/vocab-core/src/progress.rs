//! Experience points, levels, the study-day streak and badges.

use crate::date_utils::is_day_after;
use crate::types::WordId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// XP needed per level step: level `n` needs `n * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 100;
pub const XP_CORRECT_ANSWER: u32 = 10;
pub const XP_PERFECT_SESSION: u32 = 30;
pub const XP_WORD_LEARNED: u32 = 50;
pub const XP_NEW_WORD: u32 = 15;

/// Fewest answered items for a session to count as perfect.
pub const PERFECT_SESSION_MIN_ITEMS: usize = 5;

/// Why XP was awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpReason {
    SessionAnswers,
    PerfectSession,
    WordLearned,
    NewWord,
}

/// Notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    XpGained { amount: u32, reason: XpReason },
    LevelUp { level: u32 },
    BadgeUnlocked { badge: Badge },
    WordLearned { word_id: WordId },
}

/// Consecutive study days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStreak {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_day: Option<NaiveDate>,
}

impl DayStreak {
    /// Count activity on `today`. Returns true if the streak changed.
    pub fn record(&mut self, today: NaiveDate) -> bool {
        match self.last_day {
            Some(last) if last == today => return false,
            Some(last) if is_day_after(last, today) => self.count += 1,
            _ => self.count = 1,
        }
        self.last_day = Some(today);
        true
    }
}

/// Achievement catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstWord,
    #[serde(rename = "words_10")]
    Words10,
    #[serde(rename = "words_50")]
    Words50,
    #[serde(rename = "words_100")]
    Words100,
    #[serde(rename = "learned_1")]
    Learned1,
    #[serde(rename = "learned_10")]
    Learned10,
    #[serde(rename = "learned_50")]
    Learned50,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "xp_500")]
    Xp500,
    #[serde(rename = "xp_1000")]
    Xp1000,
    Perfect,
    #[serde(rename = "level_5")]
    Level5,
    #[serde(rename = "level_10")]
    Level10,
}

impl Badge {
    pub const ALL: [Badge; 15] = [
        Self::FirstWord,
        Self::Words10,
        Self::Words50,
        Self::Words100,
        Self::Learned1,
        Self::Learned10,
        Self::Learned50,
        Self::Streak3,
        Self::Streak7,
        Self::Streak30,
        Self::Xp500,
        Self::Xp1000,
        Self::Perfect,
        Self::Level5,
        Self::Level10,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::FirstWord => "first_word",
            Self::Words10 => "words_10",
            Self::Words50 => "words_50",
            Self::Words100 => "words_100",
            Self::Learned1 => "learned_1",
            Self::Learned10 => "learned_10",
            Self::Learned50 => "learned_50",
            Self::Streak3 => "streak_3",
            Self::Streak7 => "streak_7",
            Self::Streak30 => "streak_30",
            Self::Xp500 => "xp_500",
            Self::Xp1000 => "xp_1000",
            Self::Perfect => "perfect",
            Self::Level5 => "level_5",
            Self::Level10 => "level_10",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::FirstWord => "First Word",
            Self::Words10 => "Beginner",
            Self::Words50 => "Reader",
            Self::Words100 => "Dictionary",
            Self::Learned1 => "First Success",
            Self::Learned10 => "Diligent",
            Self::Learned50 => "Word Master",
            Self::Streak3 => "On Fire",
            Self::Streak7 => "Week of Practice",
            Self::Streak30 => "Legend",
            Self::Xp500 => "Diamond",
            Self::Xp1000 => "Veteran",
            Self::Perfect => "Sharpshooter",
            Self::Level5 => "Levelled Up",
            Self::Level10 => "Eagle",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstWord => "Add 1 word",
            Self::Words10 => "10 words in the dictionary",
            Self::Words50 => "50 words in the dictionary",
            Self::Words100 => "100 words in the dictionary",
            Self::Learned1 => "Learn 1 word",
            Self::Learned10 => "Learn 10 words",
            Self::Learned50 => "Learn 50 words",
            Self::Streak3 => "3 days in a row",
            Self::Streak7 => "7 days in a row",
            Self::Streak30 => "30 days in a row",
            Self::Xp500 => "Earn 500 XP",
            Self::Xp1000 => "Earn 1000 XP",
            Self::Perfect => "A session without mistakes (5+ words)",
            Self::Level5 => "Reach level 5",
            Self::Level10 => "Reach level 10",
        }
    }

    fn earned(&self, progress: &Progress, ctx: &BadgeContext, perfect_session: bool) -> bool {
        match self {
            Self::FirstWord => ctx.total_words >= 1,
            Self::Words10 => ctx.total_words >= 10,
            Self::Words50 => ctx.total_words >= 50,
            Self::Words100 => ctx.total_words >= 100,
            Self::Learned1 => ctx.learned_words >= 1,
            Self::Learned10 => ctx.learned_words >= 10,
            Self::Learned50 => ctx.learned_words >= 50,
            Self::Streak3 => progress.streak.count >= 3,
            Self::Streak7 => progress.streak.count >= 7,
            Self::Streak30 => progress.streak.count >= 30,
            Self::Xp500 => progress.lifetime_xp >= 500,
            Self::Xp1000 => progress.lifetime_xp >= 1000,
            Self::Perfect => perfect_session,
            Self::Level5 => progress.level >= 5,
            Self::Level10 => progress.level >= 10,
        }
    }
}

/// Store-derived counts that badge predicates read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeContext {
    pub total_words: usize,
    pub learned_words: usize,
}

/// Account-level progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    /// XP toward the next level.
    pub xp: u32,
    pub level: u32,
    /// Every XP point ever earned.
    pub lifetime_xp: u32,
    /// Unlocked badges, in unlock order.
    pub badges: Vec<Badge>,
    pub streak: DayStreak,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            lifetime_xp: 0,
            badges: Vec::new(),
            streak: DayStreak::default(),
        }
    }
}

impl Progress {
    /// XP needed to leave `level`.
    pub fn xp_needed(level: u32) -> u32 {
        level.saturating_mul(XP_PER_LEVEL)
    }

    /// Add XP, levelling up as many times as it covers.
    pub fn gain_xp(&mut self, amount: u32, reason: XpReason) -> Vec<ProgressEvent> {
        let mut events = vec![ProgressEvent::XpGained { amount, reason }];
        if amount == 0 {
            return events;
        }

        self.xp = self.xp.saturating_add(amount);
        self.lifetime_xp = self.lifetime_xp.saturating_add(amount);

        while self.xp >= Self::xp_needed(self.level) {
            self.xp -= Self::xp_needed(self.level);
            self.level += 1;
            info!(level = self.level, "Level up");
            events.push(ProgressEvent::LevelUp { level: self.level });
        }
        events
    }

    /// Count activity on a study day. Returns true if the streak changed.
    pub fn record_activity(&mut self, today: NaiveDate) -> bool {
        self.streak.record(today)
    }

    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// Unlock every badge whose predicate now holds.
    ///
    /// Already-unlocked badges are skipped, so repeated checks are no-ops.
    /// The perfect-session badge only unlocks from `perfect_session`.
    pub fn check_badges(&mut self, ctx: &BadgeContext, perfect_session: bool) -> Vec<ProgressEvent> {
        let unlocked: Vec<Badge> = Badge::ALL
            .into_iter()
            .filter(|badge| !self.has_badge(*badge))
            .filter(|badge| badge.earned(self, ctx, perfect_session))
            .collect();

        unlocked
            .into_iter()
            .map(|badge| {
                info!(badge = badge.id(), "Badge unlocked");
                self.badges.push(badge);
                ProgressEvent::BadgeUnlocked { badge }
            })
            .collect()
    }

    /// Progress through the current level, 0-100.
    pub fn level_percent(&self) -> u32 {
        let needed = Self::xp_needed(self.level).max(1);
        (u64::from(self.xp) * 100 / u64::from(needed)) as u32
    }
}
