//! Token-level fuzzy comparison.
//!
//! Speech recognizers mangle words in small ways ("recieve", "tomorow").
//! Two tokens match when they are equal, or when their normalized edit
//! distance is within a tolerance. Very short expected words must match
//! exactly.

use crate::defaults::SHORT_TOKEN_MAX_CHARS;

/// Levenshtein distance over characters (insert, delete, substitute cost 1).
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Similarity in `[0, 1]`: `1 - distance / max(len_a, len_b)`.
///
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Decide whether a spoken token matches an expected token.
///
/// `tolerance` is the accepted fraction of differing characters; the
/// default of 0.3 accepts pairs that are at least 70% similar.
pub fn tokens_match(spoken: &str, expected: &str, tolerance: f64) -> bool {
    if spoken == expected {
        return true;
    }

    if expected.chars().count() <= SHORT_TOKEN_MAX_CHARS {
        return false;
    }

    similarity(spoken, expected) >= 1.0 - tolerance
}
