//! Per-line match state that never regresses.
//!
//! Recognizers often reissue a shorter or re-segmented interim transcript
//! before settling on a final one. The session keeps the best result seen
//! so far, so progress shown to the reader (and acted on by the controller)
//! only ever moves forward.
//!
//! One session serves one active line. Callers feed it transcripts in the
//! order the recognizer produced them, from a single thread, and replace or
//! reset it when the active line changes.

use crate::matching::line_matcher::{LineMatcher, MatchResult};
use crate::matching::normalize::{ExpectedLine, Token};

#[derive(Debug, Clone)]
pub struct MatchSession {
    expected: ExpectedLine,
    matcher: LineMatcher,
    best: MatchResult,
}

impl MatchSession {
    /// Session for `expected_text` with default tolerance and substitutions.
    pub fn new(expected_text: &str, completion_threshold: f64) -> Self {
        Self::with_matcher(expected_text, LineMatcher::new(completion_threshold))
    }

    pub fn with_matcher(expected_text: &str, matcher: LineMatcher) -> Self {
        let expected = ExpectedLine::new(expected_text);
        let best = MatchResult::empty(expected.len());
        Self {
            expected,
            matcher,
            best,
        }
    }

    /// Match a new transcript (interim or final) and return the best result so far.
    ///
    /// The stored result is replaced only by a strictly better one: more
    /// matched words, or the same count but newly complete. The second case
    /// only arises for a line with no words, which completes on its first
    /// update.
    pub fn update(&mut self, transcript: &str) -> &MatchResult {
        let fresh = self.matcher.match_line(transcript, &self.expected);
        let improves = fresh.matched_words > self.best.matched_words
            || (fresh.matched_words == self.best.matched_words
                && fresh.is_complete
                && !self.best.is_complete);
        if improves {
            self.best = fresh;
        }
        &self.best
    }

    /// Best result so far, without recomputing.
    pub fn get_match(&self) -> &MatchResult {
        &self.best
    }

    pub fn is_complete(&self) -> bool {
        self.best.is_complete
    }

    /// Forget all progress, e.g. when the reader starts the line over.
    pub fn reset(&mut self) {
        self.best = MatchResult::empty(self.expected.len());
    }

    /// The line's canonical tokens, for highlighting matched words.
    pub fn expected_tokens(&self) -> &[Token] {
        self.expected.tokens()
    }

    pub fn expected_line(&self) -> &ExpectedLine {
        &self.expected
    }
}
