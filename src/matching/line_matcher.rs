//! Sequential line matching: how much of an expected line has been spoken.
//!
//! The matcher walks the expected tokens in order and, for each one, scans
//! forward through the spoken tokens from a cursor. A hit moves the cursor
//! just past the spoken token; a miss leaves the cursor where it was so the
//! next expected token gets the same chance. The cursor never moves back,
//! so words are only ever credited in script order.
//!
//! This greedy pass is O(expected × spoken) and cheap enough to run on
//! every interim transcript. A full alignment would tolerate reordering
//! but costs far more per update.

use crate::defaults::{COMPLETION_THRESHOLD, TOKEN_TOLERANCE};
use crate::matching::normalize::{ExpectedLine, Token, tokenize};
use crate::matching::substitutions::{SubstitutionTable, tokens_match_with_substitutions};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of matching one transcript against one expected line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Number of expected tokens credited so far.
    pub matched_words: usize,
    /// Number of tokens in the expected line.
    pub total_words: usize,
    /// `matched_words / total_words * 100`, or 100 for an empty line.
    pub match_percentage: f64,
    /// Positions of matched expected tokens, strictly increasing.
    pub matched_indices: Vec<usize>,
    /// Whether `match_percentage` reached the completion threshold.
    pub is_complete: bool,
}

impl MatchResult {
    /// Nothing heard yet.
    pub fn empty(total_words: usize) -> Self {
        Self {
            matched_words: 0,
            total_words,
            match_percentage: 0.0,
            matched_indices: Vec::new(),
            is_complete: false,
        }
    }

    /// The result for a line with no words: trivially complete.
    pub fn vacuous() -> Self {
        Self {
            matched_words: 0,
            total_words: 0,
            match_percentage: 100.0,
            matched_indices: Vec::new(),
            is_complete: true,
        }
    }

    fn from_indices(matched_indices: Vec<usize>, total_words: usize, threshold: f64) -> Self {
        let matched_words = matched_indices.len();
        let match_percentage = matched_words as f64 / total_words as f64 * 100.0;
        Self {
            matched_words,
            total_words,
            match_percentage,
            matched_indices,
            is_complete: match_percentage >= threshold * 100.0,
        }
    }

    /// Match percentage as a 0–1 fraction.
    pub fn confidence(&self) -> f64 {
        self.match_percentage / 100.0
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched_indices.binary_search(&index).is_ok()
    }
}

/// Matching parameters shared by every line of a performance.
///
/// Cheap to clone: the substitution table is shared.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    completion_threshold: f64,
    tolerance: f64,
    substitutions: Arc<SubstitutionTable>,
}

impl Default for LineMatcher {
    fn default() -> Self {
        Self::new(COMPLETION_THRESHOLD)
    }
}

impl LineMatcher {
    /// Default tolerance and built-in substitutions with the given threshold.
    pub fn new(completion_threshold: f64) -> Self {
        Self {
            completion_threshold,
            tolerance: TOKEN_TOLERANCE,
            substitutions: Arc::new(SubstitutionTable::default()),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_substitutions(mut self, table: SubstitutionTable) -> Self {
        self.substitutions = Arc::new(table);
        self
    }

    pub fn completion_threshold(&self) -> f64 {
        self.completion_threshold
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.substitutions
    }

    /// Match a raw transcript against a prepared expected line.
    pub fn match_line(&self, transcript: &str, expected: &ExpectedLine) -> MatchResult {
        self.match_tokens(&tokenize(transcript), expected.tokens())
    }

    /// Match already-tokenized speech against expected tokens.
    pub fn match_tokens(&self, spoken: &[Token], expected: &[Token]) -> MatchResult {
        if expected.is_empty() {
            return MatchResult::vacuous();
        }

        let mut matched_indices = Vec::new();
        let mut spoken_index = 0;

        for (expected_index, expected_token) in expected.iter().enumerate() {
            let hit = spoken[spoken_index..].iter().position(|spoken_token| {
                tokens_match_with_substitutions(
                    spoken_token.as_str(),
                    expected_token.as_str(),
                    self.tolerance,
                    &self.substitutions,
                )
            });

            if let Some(offset) = hit {
                matched_indices.push(expected_index);
                spoken_index += offset + 1;
            }
        }

        MatchResult::from_indices(matched_indices, expected.len(), self.completion_threshold)
    }
}

/// Match a transcript against a line of script text with default tolerance
/// and the built-in substitution table.
pub fn match_line(transcript: &str, expected_line: &str, completion_threshold: f64) -> MatchResult {
    LineMatcher::new(completion_threshold).match_line(transcript, &ExpectedLine::new(expected_line))
}
