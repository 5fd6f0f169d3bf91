//! Exercise payloads and the learner responses they accept.

use crate::pairing::PairingBoard;
use crate::types::{Direction, ExerciseKind, Side, Word, WordId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of wrong options shown next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

/// A question ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exercise {
    Flash(FlashCard),
    MultipleChoice(MultipleChoice),
    Typed(TypedTranslation),
    Dictation(Dictation),
    SpeakAloud(SpeakAloud),
    Pairing(PairingBoard),
}

/// Show one side, reveal the other, learner self-reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashCard {
    pub word_id: WordId,
    pub prompt_side: Side,
    pub prompt: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub word_id: WordId,
    pub prompt_side: Side,
    pub prompt: String,
    /// Exactly four distinct options, one of which is `answer`.
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedTranslation {
    pub word_id: WordId,
    pub prompt_side: Side,
    pub prompt: String,
    pub expected: String,
}

/// The source term is played aloud and typed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dictation {
    pub word_id: WordId,
    pub term: String,
}

/// The translation is shown and the learner says the source term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakAloud {
    pub word_id: WordId,
    pub prompt: String,
    pub expected: String,
}

impl Exercise {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Self::Flash(_) => ExerciseKind::Flash,
            Self::MultipleChoice(_) => ExerciseKind::MultipleChoice,
            Self::Typed(_) => ExerciseKind::Typed,
            Self::Dictation(_) => ExerciseKind::Dictation,
            Self::SpeakAloud(_) => ExerciseKind::SpeakAloud,
            Self::Pairing(_) => ExerciseKind::Pairing,
        }
    }

    /// The word asked about, for single-word exercises.
    pub fn word_id(&self) -> Option<&WordId> {
        match self {
            Self::Flash(e) => Some(&e.word_id),
            Self::MultipleChoice(e) => Some(&e.word_id),
            Self::Typed(e) => Some(&e.word_id),
            Self::Dictation(e) => Some(&e.word_id),
            Self::SpeakAloud(e) => Some(&e.word_id),
            Self::Pairing(_) => None,
        }
    }

    /// Source-language text to pronounce when the exercise appears.
    ///
    /// Only exercises that already show the source term qualify, plus
    /// dictation, which exists to be heard.
    pub fn pronunciation(&self) -> Option<&str> {
        match self {
            Self::Flash(e) if e.prompt_side == Side::Source => Some(&e.prompt),
            Self::MultipleChoice(e) if e.prompt_side == Side::Source => Some(&e.prompt),
            Self::Typed(e) if e.prompt_side == Side::Source => Some(&e.prompt),
            Self::Dictation(e) => Some(&e.term),
            _ => None,
        }
    }
}

/// A learner's answer to a single-word exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Response {
    /// "Knew it" / "did not know" for flash cards.
    SelfReport(bool),
    /// Index into the multiple-choice options.
    Choice(usize),
    Typed(String),
    /// Transcript from the speech-input collaborator.
    Spoken { transcript: String, confidence: f32 },
}

/// Fewer distinct distractor texts exist than a multiple-choice item needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("only {available} distinct distractors available")]
pub(crate) struct InsufficientDistractors {
    available: usize,
}

/// Choose which side to show, honoring the session direction.
pub(crate) fn prompt_side<R: Rng + ?Sized>(direction: Direction, rng: &mut R) -> Side {
    match direction {
        Direction::SourceToTarget => Side::Source,
        Direction::TargetToSource => Side::Target,
        Direction::Mixed => {
            if rng.gen_bool(0.5) {
                Side::Source
            } else {
                Side::Target
            }
        }
    }
}

/// Build a single-word exercise that needs no other words.
///
/// Multiple choice and pairing are not handled here and degrade to a flash
/// card.
pub(crate) fn build_basic<R: Rng + ?Sized>(
    kind: ExerciseKind,
    word: &Word,
    direction: Direction,
    rng: &mut R,
) -> Exercise {
    match kind {
        ExerciseKind::Typed => {
            let side = prompt_side(direction, rng);
            Exercise::Typed(TypedTranslation {
                word_id: word.id.clone(),
                prompt_side: side,
                prompt: word.text(side).to_string(),
                expected: word.text(side.opposite()).to_string(),
            })
        }
        ExerciseKind::Dictation => Exercise::Dictation(Dictation {
            word_id: word.id.clone(),
            term: word.source.clone(),
        }),
        ExerciseKind::SpeakAloud => Exercise::SpeakAloud(SpeakAloud {
            word_id: word.id.clone(),
            prompt: word.target.clone(),
            expected: word.source.clone(),
        }),
        ExerciseKind::Flash | ExerciseKind::MultipleChoice | ExerciseKind::Pairing => {
            let side = prompt_side(direction, rng);
            Exercise::Flash(FlashCard {
                word_id: word.id.clone(),
                prompt_side: side,
                prompt: word.text(side).to_string(),
                answer: word.text(side.opposite()).to_string(),
                // The example is in the source language, so it would give
                // away the answer when the target side is shown.
                example: word.example.clone().filter(|_| side == Side::Source),
            })
        }
    }
}

/// Build a multiple-choice exercise with distractors from `universe`.
pub(crate) fn build_multiple_choice<R: Rng + ?Sized>(
    word: &Word,
    universe: &[Word],
    direction: Direction,
    rng: &mut R,
) -> Result<Exercise, InsufficientDistractors> {
    let side = prompt_side(direction, rng);
    let answer_side = side.opposite();
    let options = multiple_choice_options(word, universe, answer_side, rng)?;

    Ok(Exercise::MultipleChoice(MultipleChoice {
        word_id: word.id.clone(),
        prompt_side: side,
        prompt: word.text(side).to_string(),
        options,
        answer: word.text(answer_side).to_string(),
    }))
}

/// Correct answer plus distinct distractors, shuffled.
///
/// Distractors are other words' `answer_side` text, sampled without
/// replacement. Texts equal to the answer or to each other are skipped so the
/// options never repeat.
pub(crate) fn multiple_choice_options<R: Rng + ?Sized>(
    word: &Word,
    universe: &[Word],
    answer_side: Side,
    rng: &mut R,
) -> Result<Vec<String>, InsufficientDistractors> {
    let correct = word.text(answer_side);

    let mut candidates: Vec<&str> = Vec::new();
    for other in universe.iter().filter(|other| other.id != word.id) {
        let text = other.text(answer_side);
        if text != correct && !candidates.contains(&text) {
            candidates.push(text);
        }
    }

    if candidates.len() < DISTRACTOR_COUNT {
        return Err(InsufficientDistractors {
            available: candidates.len(),
        });
    }

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, DISTRACTOR_COUNT)
        .map(|text| text.to_string())
        .collect();
    options.push(correct.to_string());
    options.shuffle(rng);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordDraft;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(pairs: &[(&str, &str)]) -> Vec<Word> {
        let now = Utc::now();
        pairs
            .iter()
            .map(|(source, target)| Word::new(&WordDraft::new(*source, *target), now))
            .collect()
    }

    #[test]
    fn options_are_distinct_and_contain_answer_once() {
        let universe = words(&[
            ("cat", "кот"),
            ("dog", "собака"),
            ("bird", "птица"),
            ("fish", "рыба"),
            ("horse", "лошадь"),
            ("cow", "корова"),
        ]);
        let mut rng = StdRng::seed_from_u64(7);

        for seed_word in &universe {
            for _ in 0..20 {
                let options =
                    multiple_choice_options(seed_word, &universe, Side::Target, &mut rng).unwrap();
                assert_eq!(options.len(), 4);
                let mut unique = options.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), 4);
                let hits = options.iter().filter(|o| **o == seed_word.target).count();
                assert_eq!(hits, 1);
            }
        }
    }

    #[test]
    fn duplicate_translations_do_not_count_as_distractors() {
        let universe = words(&[
            ("cat", "кот"),
            ("tomcat", "кот"),
            ("dog", "собака"),
            ("hound", "собака"),
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = multiple_choice_options(&universe[0], &universe, Side::Target, &mut rng);
        assert!(err.is_err());
    }

    #[test]
    fn too_few_words_for_multiple_choice() {
        let universe = words(&[("cat", "кот"), ("dog", "собака"), ("bird", "птица")]);
        let mut rng = StdRng::seed_from_u64(1);
        let result = build_multiple_choice(&universe[0], &universe, Direction::Mixed, &mut rng);
        assert!(result.is_err());
    }

    #[test]
    fn fixed_direction_controls_the_prompt_side() {
        let universe = words(&[("cat", "кот")]);
        let mut rng = StdRng::seed_from_u64(3);

        let forward = build_basic(ExerciseKind::Typed, &universe[0], Direction::SourceToTarget, &mut rng);
        let Exercise::Typed(forward) = forward else {
            panic!("expected typed exercise");
        };
        assert_eq!(forward.prompt, "cat");
        assert_eq!(forward.expected, "кот");

        let backward = build_basic(ExerciseKind::Typed, &universe[0], Direction::TargetToSource, &mut rng);
        let Exercise::Typed(backward) = backward else {
            panic!("expected typed exercise");
        };
        assert_eq!(backward.prompt, "кот");
        assert_eq!(backward.expected, "cat");
    }

    #[test]
    fn dictation_always_uses_the_source_term() {
        let universe = words(&[("cat", "кот")]);
        let mut rng = StdRng::seed_from_u64(3);
        let exercise = build_basic(ExerciseKind::Dictation, &universe[0], Direction::TargetToSource, &mut rng);
        assert_eq!(exercise.pronunciation(), Some("cat"));
        let Exercise::Dictation(dictation) = exercise else {
            panic!("expected dictation");
        };
        assert_eq!(dictation.term, "cat");
    }

    #[test]
    fn flash_hides_example_when_prompting_with_translation() {
        let now = Utc::now();
        let word = Word::new(&WordDraft::new("cat", "кот").with_example("The cat sleeps."), now);
        let mut rng = StdRng::seed_from_u64(5);

        let Exercise::Flash(card) = build_basic(ExerciseKind::Flash, &word, Direction::TargetToSource, &mut rng) else {
            panic!("expected flash card");
        };
        assert_eq!(card.example, None);

        let Exercise::Flash(card) = build_basic(ExerciseKind::Flash, &word, Direction::SourceToTarget, &mut rng) else {
            panic!("expected flash card");
        };
        assert_eq!(card.example.as_deref(), Some("The cat sleeps."));
    }

    #[test]
    fn exercise_serializes_with_kind_tag() {
        let universe = words(&[("cat", "кот")]);
        let mut rng = StdRng::seed_from_u64(3);
        let exercise = build_basic(ExerciseKind::Flash, &universe[0], Direction::SourceToTarget, &mut rng);
        let json = serde_json::to_value(&exercise).unwrap();
        assert_eq!(json["kind"], "flash");
        assert_eq!(json["prompt"], "cat");
        assert_eq!(json["prompt_side"], "source");
    }
}
