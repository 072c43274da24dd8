//! Default configuration constants for cueline.
//!
//! Shared by the config types, the matcher and the controller so the
//! numbers live in exactly one place.

/// Fraction of expected words that must be heard before a line counts as spoken.
///
/// 0.75 lets a reader drop or garble one word in four without the line
/// getting stuck, while still requiring most of the line.
pub const COMPLETION_THRESHOLD: f64 = 0.75;

/// Maximum normalized edit distance for two tokens to be considered the same word.
///
/// 0.3 means at least 70% character similarity.
pub const TOKEN_TOLERANCE: f64 = 0.3;

/// Expected tokens this short (in characters) must match exactly.
///
/// Edit-distance tolerance on one- and two-letter words ("a", "to", "of")
/// produces far more false positives than it fixes.
pub const SHORT_TOKEN_MAX_CHARS: usize = 2;

/// Quiet period after a completed line before the performance moves on.
pub const SILENCE_THRESHOLD_MS: u64 = 1500;

/// Advance automatically once the human's line is complete.
pub const AUTO_ADVANCE: bool = true;

/// Delay before restarting the recognition engine after it ends or fails.
pub const RESTART_DELAY_MS: u64 = 100;

/// How often the pipeline wakes the controller to check silence timers.
pub const TICK_INTERVAL_MS: u64 = 100;

/// How long a recognition poll blocks before re-checking for shutdown.
pub const POLL_INTERVAL_MS: u64 = 50;

/// Capacity of the bounded channels between pipeline stations.
pub const CHANNEL_CAPACITY: usize = 64;
