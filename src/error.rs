//! Error types for cueline.
//!
//! The matching core itself never fails: every string is a valid transcript.
//! These variants cover the collaborators around it (configuration, scripts,
//! the recognition engine and the speech output).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuelineError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Script errors
    #[error("Failed to parse script: {0}")]
    ScriptParse(#[from] serde_json::Error),

    #[error("Unknown character: {name}")]
    UnknownCharacter { name: String },

    #[error("Line {index} is out of range (script has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    #[error("Unknown command: {input} (expected play, pause, stop, restart, done or jump N)")]
    UnknownCommand { input: String },

    // Recognition errors
    #[error("Speech recognition not available: {message}")]
    RecognitionUnavailable { message: String },

    #[error("Speech recognition already started")]
    RecognitionAlreadyStarted,

    // Speech output errors
    #[error("Speech output failed: {message}")]
    Speech { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CuelineError>;
