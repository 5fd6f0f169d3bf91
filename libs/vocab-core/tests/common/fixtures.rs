//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Duration, Utc};

use vocab_core::{Word, WordDraft};

/// The four-animal vocabulary used by the end-to-end scenario.
pub const ANIMALS: [(&str, &str); 4] = [
    ("cat", "кот"),
    ("dog", "собака"),
    ("bird", "птица"),
    ("fish", "рыба"),
];

pub const SKY: [(&str, &str); 2] = [("sun", "солнце"), ("moon", "луна")];

/// Generate `count` distinct word pairs.
///
/// # Arguments
/// * `count` - Number of pairs to generate
pub fn numbered_pairs(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|i| (format!("word{}", i + 1), format!("слово{}", i + 1)))
        .collect()
}

/// Build a stored word whose next review is `due_in` from `now`.
///
/// A negative offset makes the word overdue.
pub fn word_due_in(source: &str, target: &str, now: DateTime<Utc>, due_in: Duration) -> Word {
    let mut word = Word::new(&WordDraft::new(source, target), now - Duration::days(30));
    word.stats.next_review_at = now + due_in;
    word
}
