//! Error types and reporting for pipeline stations.

use std::fmt;

/// Errors that can occur while a station processes one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    /// The input is dropped and the station keeps going.
    Recoverable(String),
    /// The station shuts down.
    Fatal(String),
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StationError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StationError {}

/// Trait for reporting station errors.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, station: &str, error: &StationError);
}

/// Reports station errors through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        match error {
            StationError::Recoverable(_) => tracing::warn!(station, "{error}"),
            StationError::Fatal(_) => tracing::error!(station, "{error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_error_display() {
        let recoverable = StationError::Recoverable("line 12 is out of range".to_string());
        assert_eq!(
            recoverable.to_string(),
            "Recoverable error: line 12 is out of range"
        );

        let fatal = StationError::Fatal("speaker gone".to_string());
        assert_eq!(fatal.to_string(), "Fatal error: speaker gone");
    }

    #[test]
    fn test_log_reporter_accepts_both_kinds() {
        let reporter = LogReporter;
        reporter.report("performance", &StationError::Recoverable("skip".to_string()));
        reporter.report("performance", &StationError::Fatal("stop".to_string()));
    }
}
