//! Speech-to-script matching core.
//!
//! Pure and synchronous: normalize text into tokens, compare tokens
//! fuzzily, align a transcript against an expected line in order, and keep
//! a best-so-far result per active line.

pub mod line_matcher;
pub mod normalize;
pub mod session;
pub mod similarity;
pub mod substitutions;

pub use line_matcher::{LineMatcher, MatchResult, match_line};
pub use normalize::{ExpectedLine, Token, normalize_text, tokenize};
pub use session::MatchSession;
pub use similarity::{edit_distance, similarity, tokens_match};
pub use substitutions::{BUILTIN_SUBSTITUTIONS, SubstitutionTable, tokens_match_with_substitutions};
