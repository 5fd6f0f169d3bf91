//! Answer evaluation for practice exercises.
//!
//! Typed answers and multiple-choice selections are judged by exact equality.
//! Only spoken answers (speech-recognition transcripts) go through the fuzzy
//! path, which forgives articles, partial phrases and small recognition
//! errors.

use crate::error::SessionError;
use crate::exercise::{Exercise, Response};
use serde::{Deserialize, Serialize};

/// Similarity a spoken answer must exceed to count as correct.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Words ignored when comparing spoken answers.
const FILLER_WORDS: [&str; 5] = ["a", "an", "the", "to", "of"];

/// How a response was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    SelfReport,
    Selection,
    Exact,
    Fuzzy,
}

/// Result of judging a response against the expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    pub method: MatchMethod,
    /// The expected answer (for display).
    pub expected: String,
}

impl MatchResult {
    fn decided(is_correct: bool, method: MatchMethod, expected: &str) -> Self {
        Self {
            is_correct,
            similarity: if is_correct { 1.0 } else { 0.0 },
            method,
            expected: expected.to_string(),
        }
    }
}

/// Judge a response to an exercise.
///
/// Returns `UnexpectedResponse` when the response shape does not fit the
/// exercise, e.g. a choice index for a flash card.
pub fn evaluate(
    exercise: &Exercise,
    response: &Response,
    fuzzy_threshold: f64,
) -> Result<MatchResult, SessionError> {
    let mismatch = || SessionError::UnexpectedResponse {
        kind: exercise.kind(),
    };

    match (exercise, response) {
        (Exercise::Flash(card), Response::SelfReport(knew)) => Ok(MatchResult::decided(
            *knew,
            MatchMethod::SelfReport,
            &card.answer,
        )),
        (Exercise::MultipleChoice(mc), Response::Choice(index)) => {
            let selected = mc.options.get(*index).ok_or_else(mismatch)?;
            Ok(MatchResult::decided(
                *selected == mc.answer,
                MatchMethod::Selection,
                &mc.answer,
            ))
        }
        (Exercise::Typed(typed), Response::Typed(text)) => Ok(typed_match(text, &typed.expected)),
        (Exercise::Typed(typed), Response::Spoken { transcript, .. }) => {
            Ok(spoken_match(transcript, &typed.expected, fuzzy_threshold))
        }
        (Exercise::Dictation(dictation), Response::Typed(text)) => {
            Ok(typed_match(text, &dictation.term))
        }
        (Exercise::Dictation(dictation), Response::Spoken { transcript, .. }) => {
            Ok(spoken_match(transcript, &dictation.term, fuzzy_threshold))
        }
        (Exercise::SpeakAloud(speak), Response::Spoken { transcript, .. }) => {
            Ok(spoken_match(transcript, &speak.expected, fuzzy_threshold))
        }
        _ => Err(mismatch()),
    }
}

/// Case-insensitive, trimmed equality for typed answers.
pub fn check_typed(typed: &str, expected: &str) -> bool {
    typed.trim().to_lowercase() == expected.trim().to_lowercase()
}

fn typed_match(typed: &str, expected: &str) -> MatchResult {
    MatchResult::decided(check_typed(typed, expected), MatchMethod::Exact, expected)
}

/// Fuzzy check for a spoken answer using the default threshold.
pub fn check_similarity(spoken: &str, expected: &str) -> bool {
    spoken_match(spoken, expected, DEFAULT_FUZZY_THRESHOLD).is_correct
}

/// Judge a speech transcript against the expected text.
///
/// Filler words are stripped from both sides first. Equal or contained
/// strings are correct; otherwise the normalized similarity must exceed
/// `threshold`. An empty transcript is never correct.
pub fn spoken_match(spoken: &str, expected: &str, threshold: f64) -> MatchResult {
    let heard = strip_fillers(spoken);
    let wanted = strip_fillers(expected);

    // Checked before containment: "" is a substring of every answer.
    let (is_correct, similarity) = if heard.is_empty() || wanted.is_empty() {
        (false, 0.0)
    } else if heard == wanted || heard.contains(&wanted) || wanted.contains(&heard) {
        (true, 1.0)
    } else {
        let similarity = normalized_similarity(&heard, &wanted);
        (similarity > threshold, similarity)
    };

    MatchResult {
        is_correct,
        similarity,
        method: MatchMethod::Fuzzy,
        expected: expected.to_string(),
    }
}

/// Lowercase, drop punctuation and filler words, collapse whitespace.
fn strip_fillers(s: &str) -> String {
    let cleaned: String = s
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !FILLER_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Calculate normalized similarity (0.0 to 1.0) based on Levenshtein distance.
///
/// Lengths are counted in characters, so Cyrillic and other multi-byte text
/// scores the same as ASCII.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}
