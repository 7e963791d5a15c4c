use std::collections::HashSet;

use serde::Serialize;

use crate::tokenizer::{self, Scan};

/// Base points for a word seen for the first time this session
pub const NEW_WORD_POINTS: u64 = 10;
/// Upper bound of the length bonus added to new words
pub const LENGTH_BONUS_CAP: usize = 10;
/// Points for a word that was already seen this session
pub const REPEAT_WORD_POINTS: u64 = 1;

/// Every distinct scoring token seen during a session.
///
/// Insert-only: words are never removed, so deleting and retyping a word
/// does not make it novel again.
#[derive(Debug, Clone, Default)]
pub struct SeenWords {
    words: HashSet<String>,
}

impl SeenWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Returns true if the word was not seen before
    pub fn insert(&mut self, word: &str) -> bool {
        if self.words.contains(word) {
            false
        } else {
            self.words.insert(word.to_owned());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Live numbers shown while writing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreDetails {
    pub score: u64,
    pub words: usize,
    pub unique_words: usize,
    pub multiplier: f64,
}

impl Default for ScoreDetails {
    fn default() -> Self {
        Self {
            score: 0,
            words: 0,
            unique_words: 0,
            multiplier: 1.0,
        }
    }
}

/// Outcome of one scoring pass over the full text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    pub raw_points: u64,
    pub score: u64,
    pub words: usize,
    pub unique_words: usize,
    pub new_unique_words: usize,
}

/// Points a word earns on first sight
pub fn novel_word_points(word: &str) -> u64 {
    NEW_WORD_POINTS + word.len().min(LENGTH_BONUS_CAP) as u64
}

/// Recomputes the score from the whole text on every update.
///
/// Only the novelty set carries over between passes.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    seen: SeenWords,
    score: u64,
    words: usize,
    unique_words: usize,
    new_unique_words: usize,
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `text` under `multiplier`. Returns `None` when the mashing gate
    /// suppressed the pass, in which case nothing changes.
    pub fn score_pass(&mut self, text: &str, multiplier: f64) -> Option<Pass> {
        let tokens = match tokenizer::scan(text) {
            Scan::Mashing => return None,
            Scan::Words(tokens) => tokens,
        };

        let mut raw_points = 0;
        let mut new_unique_words = 0;
        let mut in_pass: HashSet<&str> = HashSet::new();

        for token in tokens.iter().filter(|t| tokenizer::is_scoring_token(t)) {
            if self.seen.insert(token) {
                raw_points += novel_word_points(token);
                new_unique_words += 1;
            } else {
                raw_points += REPEAT_WORD_POINTS;
            }
            in_pass.insert(token.as_str());
        }

        self.score = (raw_points as f64 * multiplier).floor() as u64;
        self.words = tokens.len();
        self.unique_words = in_pass.len();
        self.new_unique_words = new_unique_words;

        Some(Pass {
            raw_points,
            score: self.score,
            words: self.words,
            unique_words: self.unique_words,
            new_unique_words,
        })
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn words(&self) -> usize {
        self.words
    }

    pub fn unique_words(&self) -> usize {
        self.unique_words
    }

    /// Words that were novel in the most recent pass
    pub fn new_unique_words(&self) -> usize {
        self.new_unique_words
    }

    pub fn seen(&self) -> &SeenWords {
        &self.seen
    }

    pub fn details(&self, multiplier: f64) -> ScoreDetails {
        ScoreDetails {
            score: self.score,
            words: self.words,
            unique_words: self.unique_words,
            multiplier,
        }
    }
}
