//! Boundary to the speech recognizer.
//!
//! The recognizer itself is an external capability. This module defines
//! the engine contract, classifies its errors, and turns its callback-style
//! lifecycle into a typed event stream with automatic restart.

pub mod adapter;
pub mod engine;
pub mod event;

pub use adapter::{AdapterConfig, RecognitionAdapter};
pub use engine::{EngineStats, LineReaderEngine, RecognitionEngine, ScriptedEngine};
pub use event::{EngineEvent, RecognitionErrorKind, RecognitionEvent, TranscriptSegment};
