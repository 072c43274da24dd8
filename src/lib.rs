//! cueline - follow a live script read-through by ear
//!
//! Matches recognized speech against the expected line, tracks progress
//! word by word, and moves a performance from cue to cue.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod matching;
#[cfg(feature = "cli")]
pub mod output;
pub mod performance;
pub mod pipeline;
pub mod recognition;

// Composition root for the binary
#[cfg(feature = "cli")]
pub mod app;

// Matching core
pub use matching::{
    ExpectedLine, LineMatcher, MatchResult, MatchSession, SubstitutionTable, Token, match_line,
    normalize_text, tokenize, tokens_match,
};

// Collaborator boundaries
pub use performance::Speaker;
pub use pipeline::EventSink;
pub use recognition::RecognitionEngine;

// Performance
pub use performance::{
    Control, PerformanceController, PerformanceEvent, PerformanceSettings, PerformanceStatus,
    Performer, Script, ScriptLine,
};
pub use pipeline::{PerformancePipeline, PipelineConfig, PipelineHandle};
pub use recognition::{RecognitionAdapter, RecognitionEvent, TranscriptSegment};

// Error handling
pub use error::{CuelineError, Result};

// Config
pub use config::Config;
