use crate::defaults;
use crate::error::{CuelineError, Result};
use crate::matching::{LineMatcher, SubstitutionTable};
use crate::performance::PerformanceSettings;
use crate::recognition::AdapterConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub performance: PerformanceConfig,
    pub recognition: RecognitionConfig,
}

/// How strictly speech is matched against the script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Fraction of a line's words that must be heard, in (0, 1]
    pub completion_threshold: f64,
    /// Per-token edit tolerance, in [0, 1]
    pub tolerance: f64,
    /// Start from the built-in casual-speech table
    pub builtin_substitutions: bool,
    /// Extra entries, e.g. `"i'm" = ["i am"]`
    pub substitutions: BTreeMap<String, Vec<String>>,
}

/// Cue-to-cue behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    pub auto_advance: bool,
    pub silence_threshold_ms: u64,
}

/// Recognizer lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionConfig {
    pub restart_delay_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            completion_threshold: defaults::COMPLETION_THRESHOLD,
            tolerance: defaults::TOKEN_TOLERANCE,
            builtin_substitutions: true,
            substitutions: BTreeMap::new(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            auto_advance: defaults::AUTO_ADVANCE,
            silence_threshold_ms: defaults::SILENCE_THRESHOLD_MS,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: defaults::RESTART_DELAY_MS,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults only when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(CuelineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CUELINE_COMPLETION_THRESHOLD → matching.completion_threshold
    /// - CUELINE_TOLERANCE → matching.tolerance
    /// - CUELINE_AUTO_ADVANCE → performance.auto_advance (true/false)
    /// - CUELINE_SILENCE_THRESHOLD → performance.silence_threshold_ms (milliseconds)
    ///
    /// Empty values are ignored; unparsable ones are an error.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(threshold) = env_value("CUELINE_COMPLETION_THRESHOLD")? {
            self.matching.completion_threshold = threshold;
        }
        if let Some(tolerance) = env_value("CUELINE_TOLERANCE")? {
            self.matching.tolerance = tolerance;
        }
        if let Some(auto_advance) = env_value("CUELINE_AUTO_ADVANCE")? {
            self.performance.auto_advance = auto_advance;
        }
        if let Some(silence) = env_value("CUELINE_SILENCE_THRESHOLD")? {
            self.performance.silence_threshold_ms = silence;
        }
        Ok(self)
    }

    /// Reject values the matcher cannot work with.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.completion_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CuelineError::ConfigInvalidValue {
                key: "matching.completion_threshold".to_string(),
                message: format!("{threshold} is not in (0, 1]"),
            });
        }
        let tolerance = self.matching.tolerance;
        if !(0.0..=1.0).contains(&tolerance) {
            return Err(CuelineError::ConfigInvalidValue {
                key: "matching.tolerance".to_string(),
                message: format!("{tolerance} is not in [0, 1]"),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/cueline/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cueline").join("config.toml"))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CuelineError::Other(e.to_string()))
    }

    /// Build the line matcher described by `[matching]`.
    pub fn matcher(&self) -> LineMatcher {
        let mut table = if self.matching.builtin_substitutions {
            SubstitutionTable::default()
        } else {
            SubstitutionTable::empty()
        };
        table.extend(&self.matching.substitutions);

        LineMatcher::new(self.matching.completion_threshold)
            .with_tolerance(self.matching.tolerance)
            .with_substitutions(table)
    }

    pub fn performance_settings(&self) -> PerformanceSettings {
        PerformanceSettings {
            auto_advance: self.performance.auto_advance,
            silence_threshold: Duration::from_millis(self.performance.silence_threshold_ms),
        }
    }

    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            restart_delay: Duration::from_millis(self.recognition.restart_delay_ms),
            poll_interval: Duration::from_millis(self.recognition.poll_interval_ms),
            ..AdapterConfig::default()
        }
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| CuelineError::ConfigParse {
                    message: format!("{key}={value} is not a valid value"),
                })
        }
        _ => Ok(None),
    }
}
