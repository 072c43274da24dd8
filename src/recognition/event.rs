//! Events crossing the recognition boundary.

use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Raw events emitted by a recognition engine.
///
/// These mirror the lifecycle of a continuous recognizer: it starts, emits
/// results (interim and final), may report errors, and eventually ends.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started,
    Result { transcript: String, is_final: bool },
    /// Engine-specific error code, e.g. "no-speech" or "not-allowed".
    Error(String),
    Ended,
}

/// Classified recognition error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionErrorKind {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    BadGrammar,
    LanguageNotSupported,
    Other(String),
}

impl RecognitionErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::BadGrammar => "bad-grammar",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(code) => code,
        }
    }

    /// Normal conditions that must not surface as errors.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::Aborted)
    }

    /// Whether the adapter may restart the engine after this error.
    ///
    /// A denied microphone permission will not fix itself; retrying would
    /// spin forever.
    pub fn allows_restart(&self) -> bool {
        !matches!(self, Self::NotAllowed)
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One recognized utterance segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub is_final: bool,
    pub received_at: Instant,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, is_final: bool, received_at: Instant) -> Self {
        Self {
            text: text.into(),
            is_final,
            received_at,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self::new(text, false, Instant::now())
    }

    pub fn final_result(text: impl Into<String>) -> Self {
        Self::new(text, true, Instant::now())
    }
}

/// What subscribers of a [`RecognitionAdapter`](super::RecognitionAdapter) receive.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Transcript(TranscriptSegment),
    /// A non-benign engine error. Benign ones are filtered out.
    Error(RecognitionErrorKind),
    /// The engine was restarted after ending or failing.
    Restarted,
    /// The stream ended for good (engine unavailable or restart disabled).
    Closed { reason: String },
}
