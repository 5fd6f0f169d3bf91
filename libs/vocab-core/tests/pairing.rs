//! Pair-matching game tests.

mod common;

use pretty_assertions::assert_eq;

use common::fixtures::SKY;
use common::{fixed_now, TestContext};
use vocab_core::pairing::MISMATCH_FLASH_MS;
use vocab_core::{
    CountSpec, Exercise, ExerciseKind, PairFeedback, SessionError, SessionOverrides, SessionState,
};

fn pairing_session(ctx: &mut TestContext) {
    let overrides = SessionOverrides::default()
        .count(CountSpec::All)
        .kinds([ExerciseKind::Pairing]);
    ctx.trainer.start_session(Some(&overrides), fixed_now()).unwrap();
}

#[test]
fn test_sun_and_moon_scenario() {
    let mut ctx = TestContext::new();
    ctx.add_words(&SKY);
    pairing_session(&mut ctx);

    let Some(Exercise::Pairing(board)) = ctx.trainer.next_question(fixed_now()).unwrap() else {
        panic!("expected a pairing board");
    };
    assert_eq!(board.total, 2);
    assert_eq!(board.matched, 0);

    let sun = ctx.id("sun");
    let moon = ctx.id("moon");

    // sun -> луна is wrong
    ctx.trainer.select_pair_source(&sun).unwrap();
    let miss = ctx.trainer.select_pair_target(&moon, fixed_now()).unwrap();
    assert_eq!(
        miss.feedback,
        PairFeedback::Mismatch {
            source: sun.clone(),
            target: moon.clone(),
            flash_ms: MISMATCH_FLASH_MS,
        }
    );
    let wrong = miss.answer.expect("mismatch records an answer");
    assert_eq!(wrong.word_id, sun);
    assert!(!wrong.correct);
    assert_eq!(ctx.word("sun").stats.times_shown, 1);
    assert_eq!(ctx.word("moon").stats.times_shown, 0);

    // sun -> солнце matches
    ctx.trainer.select_pair_source(&sun).unwrap();
    let hit = ctx.trainer.select_pair_target(&sun, fixed_now()).unwrap();
    assert!(matches!(
        hit.feedback,
        PairFeedback::Matched {
            matched: 1,
            total: 2,
            ..
        }
    ));
    assert!(hit.answer.unwrap().correct);
    assert_eq!(ctx.word("sun").stats.times_correct, 1);
    assert_eq!(
        ctx.trainer.session().unwrap().state(),
        SessionState::Matching
    );

    // moon -> луна completes the batch
    ctx.trainer.select_pair_source(&moon).unwrap();
    let done = ctx.trainer.select_pair_target(&moon, fixed_now()).unwrap();
    let PairFeedback::Completed {
        total, elapsed_ms, ..
    } = done.feedback
    else {
        panic!("expected the batch to complete");
    };
    assert_eq!(total, 2);
    assert!(elapsed_ms >= 0);
    assert!(done.answer.unwrap().session_complete);

    let summary = ctx.trainer.end_session(fixed_now()).unwrap();
    assert_eq!(summary.correct, 2);
    assert_eq!(summary.wrong, 0);
    assert_eq!(summary.percentage, 100);
}

#[test]
fn test_target_without_source_is_a_no_op() {
    let mut ctx = TestContext::new();
    ctx.add_words(&SKY);
    pairing_session(&mut ctx);
    ctx.trainer.next_question(fixed_now()).unwrap();

    let moon = ctx.id("moon");
    let outcome = ctx.trainer.select_pair_target(&moon, fixed_now()).unwrap();
    assert_eq!(outcome.feedback, PairFeedback::NoSelection);
    assert!(outcome.answer.is_none());
    assert_eq!(ctx.word("moon").stats.times_shown, 0);
}

#[test]
fn test_matched_tiles_cannot_be_reused() {
    let mut ctx = TestContext::new();
    ctx.add_words(&[("sun", "солнце"), ("moon", "луна"), ("star", "звезда")]);
    pairing_session(&mut ctx);
    ctx.trainer.next_question(fixed_now()).unwrap();

    let sun = ctx.id("sun");
    ctx.trainer.select_pair_source(&sun).unwrap();
    ctx.trainer.select_pair_target(&sun, fixed_now()).unwrap();

    let again = ctx.trainer.select_pair_source(&sun).unwrap();
    assert_eq!(again, PairFeedback::AlreadyMatched { word_id: sun });
    assert_eq!(ctx.word("sun").stats.times_shown, 1);
}

#[test]
fn test_pairing_rejects_single_word_responses() {
    let mut ctx = TestContext::new();
    ctx.add_words(&SKY);
    pairing_session(&mut ctx);
    ctx.trainer.next_question(fixed_now()).unwrap();

    let err = ctx
        .trainer
        .submit_answer(&vocab_core::Response::SelfReport(true), fixed_now())
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::UnexpectedResponse {
            kind: ExerciseKind::Pairing
        }
    );
}

#[test]
fn test_board_serializes_for_the_presentation_layer() {
    let mut ctx = TestContext::new();
    ctx.add_words(&SKY);
    pairing_session(&mut ctx);
    let exercise = ctx.trainer.next_question(fixed_now()).unwrap().unwrap();

    let json = serde_json::to_value(&exercise).unwrap();
    assert_eq!(json["kind"], "pairing");
    assert_eq!(json["sources"].as_array().unwrap().len(), 2);
    assert_eq!(json["targets"].as_array().unwrap().len(), 2);
}
