//! Pair matching: two columns of tiles, matched by selecting one of each.

use crate::error::SessionError;
use crate::types::{Word, WordId};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Words per pairing batch.
pub const PAIR_BATCH_SIZE: usize = 6;

/// Smallest batch worth presenting as a pairing exercise.
pub const MIN_PAIR_BATCH: usize = 2;

/// How long a wrong pair stays highlighted before it is released.
pub const MISMATCH_FLASH_MS: u64 = 400;

/// One tile in a pairing column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTile {
    pub word_id: WordId,
    pub text: String,
    pub matched: bool,
}

/// Snapshot of a pairing batch for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingBoard {
    pub sources: Vec<PairTile>,
    pub targets: Vec<PairTile>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub selected: Option<WordId>,
    pub matched: usize,
    pub total: usize,
}

/// What happened after a tile was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PairFeedback {
    /// A source tile is now selected, replacing any earlier selection.
    Selected { word_id: WordId },
    /// A target was picked with no source selected.
    NoSelection,
    /// The picked tile belongs to a pair that is already matched.
    AlreadyMatched { word_id: WordId },
    Matched {
        word_id: WordId,
        matched: usize,
        total: usize,
    },
    /// Both tiles flash as wrong for `flash_ms`, then the selection clears.
    Mismatch {
        source: WordId,
        target: WordId,
        flash_ms: u64,
    },
    /// The last pair was matched.
    Completed {
        word_id: WordId,
        total: usize,
        elapsed_ms: i64,
    },
}

/// Live state of one pairing batch.
#[derive(Debug, Clone)]
pub struct PairMatchBatch {
    words: Vec<Word>,
    source_order: Vec<usize>,
    target_order: Vec<usize>,
    matched: Vec<bool>,
    selected: Option<usize>,
    matched_count: usize,
    started_at: DateTime<Utc>,
}

impl PairMatchBatch {
    /// Lay out a batch with both columns shuffled independently.
    pub fn new<R: Rng + ?Sized>(words: Vec<Word>, now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut source_order: Vec<usize> = (0..words.len()).collect();
        let mut target_order = source_order.clone();
        source_order.shuffle(rng);
        target_order.shuffle(rng);

        Self {
            matched: vec![false; words.len()],
            words,
            source_order,
            target_order,
            selected: None,
            matched_count: 0,
            started_at: now,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn total(&self) -> usize {
        self.words.len()
    }

    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    pub fn is_complete(&self) -> bool {
        self.matched_count == self.words.len()
    }

    pub fn board(&self) -> PairingBoard {
        let tile = |index: usize, text: &str| PairTile {
            word_id: self.words[index].id.clone(),
            text: text.to_string(),
            matched: self.matched[index],
        };

        PairingBoard {
            sources: self
                .source_order
                .iter()
                .map(|&i| tile(i, &self.words[i].source))
                .collect(),
            targets: self
                .target_order
                .iter()
                .map(|&i| tile(i, &self.words[i].target))
                .collect(),
            selected: self.selected.map(|i| self.words[i].id.clone()),
            matched: self.matched_count,
            total: self.words.len(),
        }
    }

    /// Select a source tile.
    pub fn select_source(&mut self, word_id: &WordId) -> Result<PairFeedback, SessionError> {
        let index = self.position(word_id)?;
        if self.matched[index] {
            return Ok(PairFeedback::AlreadyMatched {
                word_id: word_id.clone(),
            });
        }

        self.selected = Some(index);
        Ok(PairFeedback::Selected {
            word_id: word_id.clone(),
        })
    }

    /// Pick a target tile against the current source selection.
    ///
    /// The selection is cleared after both a match and a mismatch.
    pub fn select_target(
        &mut self,
        word_id: &WordId,
        now: DateTime<Utc>,
    ) -> Result<PairFeedback, SessionError> {
        let index = self.position(word_id)?;
        if self.matched[index] {
            return Ok(PairFeedback::AlreadyMatched {
                word_id: word_id.clone(),
            });
        }

        let Some(selected) = self.selected.take() else {
            return Ok(PairFeedback::NoSelection);
        };

        if selected != index {
            return Ok(PairFeedback::Mismatch {
                source: self.words[selected].id.clone(),
                target: word_id.clone(),
                flash_ms: MISMATCH_FLASH_MS,
            });
        }

        self.matched[index] = true;
        self.matched_count += 1;

        if self.is_complete() {
            Ok(PairFeedback::Completed {
                word_id: word_id.clone(),
                total: self.words.len(),
                elapsed_ms: (now - self.started_at).num_milliseconds(),
            })
        } else {
            Ok(PairFeedback::Matched {
                word_id: word_id.clone(),
                matched: self.matched_count,
                total: self.words.len(),
            })
        }
    }

    fn position(&self, word_id: &WordId) -> Result<usize, SessionError> {
        self.words
            .iter()
            .position(|w| &w.id == word_id)
            .ok_or_else(|| SessionError::UnknownWord(word_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordDraft;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn batch() -> (PairMatchBatch, Vec<WordId>, DateTime<Utc>) {
        let now = Utc::now();
        let words: Vec<Word> = [("sun", "солнце"), ("moon", "луна"), ("star", "звезда")]
            .iter()
            .map(|(s, t)| Word::new(&WordDraft::new(*s, *t), now))
            .collect();
        let ids = words.iter().map(|w| w.id.clone()).collect();
        let mut rng = StdRng::seed_from_u64(11);
        (PairMatchBatch::new(words, now, &mut rng), ids, now)
    }

    #[test]
    fn board_lists_every_word_in_both_columns() {
        let (batch, ids, _) = batch();
        let board = batch.board();
        assert_eq!(board.total, 3);
        assert_eq!(board.matched, 0);

        let mut sources: Vec<_> = board.sources.iter().map(|t| t.word_id.clone()).collect();
        let mut targets: Vec<_> = board.targets.iter().map(|t| t.word_id.clone()).collect();
        let mut expected = ids.clone();
        sources.sort();
        targets.sort();
        expected.sort();
        assert_eq!(sources, expected);
        assert_eq!(targets, expected);
    }

    #[test]
    fn target_without_selection_is_ignored() {
        let (mut batch, ids, now) = batch();
        assert_eq!(
            batch.select_target(&ids[0], now).unwrap(),
            PairFeedback::NoSelection
        );
        assert_eq!(batch.matched_count(), 0);
    }

    #[test]
    fn mismatch_flashes_and_clears_selection() {
        let (mut batch, ids, now) = batch();
        batch.select_source(&ids[0]).unwrap();
        let feedback = batch.select_target(&ids[1], now).unwrap();
        assert_eq!(
            feedback,
            PairFeedback::Mismatch {
                source: ids[0].clone(),
                target: ids[1].clone(),
                flash_ms: MISMATCH_FLASH_MS,
            }
        );
        assert_eq!(batch.board().selected, None);
        assert_eq!(
            batch.select_target(&ids[0], now).unwrap(),
            PairFeedback::NoSelection
        );
    }

    #[test]
    fn reselecting_a_source_replaces_the_selection() {
        let (mut batch, ids, now) = batch();
        batch.select_source(&ids[0]).unwrap();
        batch.select_source(&ids[2]).unwrap();
        assert_eq!(batch.board().selected, Some(ids[2].clone()));
        assert!(matches!(
            batch.select_target(&ids[2], now).unwrap(),
            PairFeedback::Matched { matched: 1, total: 3, .. }
        ));
    }

    #[test]
    fn matched_tiles_are_locked() {
        let (mut batch, ids, now) = batch();
        batch.select_source(&ids[1]).unwrap();
        batch.select_target(&ids[1], now).unwrap();

        assert_eq!(
            batch.select_source(&ids[1]).unwrap(),
            PairFeedback::AlreadyMatched {
                word_id: ids[1].clone()
            }
        );
        batch.select_source(&ids[0]).unwrap();
        assert_eq!(
            batch.select_target(&ids[1], now).unwrap(),
            PairFeedback::AlreadyMatched {
                word_id: ids[1].clone()
            }
        );
        assert_eq!(batch.matched_count(), 1);
    }

    #[test]
    fn last_match_completes_with_elapsed_time() {
        let (mut batch, ids, now) = batch();
        for (step, id) in ids.iter().enumerate() {
            batch.select_source(id).unwrap();
            let later = now + Duration::seconds(step as i64 + 1);
            let feedback = batch.select_target(id, later).unwrap();
            if step == 2 {
                assert_eq!(
                    feedback,
                    PairFeedback::Completed {
                        word_id: id.clone(),
                        total: 3,
                        elapsed_ms: 3000,
                    }
                );
            }
        }
        assert!(batch.is_complete());
    }

    #[test]
    fn unknown_word_is_an_error() {
        let (mut batch, _, _) = batch();
        let stranger = WordId::from("nope");
        assert_eq!(
            batch.select_source(&stranger).unwrap_err(),
            SessionError::UnknownWord(stranger)
        );
    }
}
