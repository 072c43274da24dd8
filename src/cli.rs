//! Command-line interface for cueline
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Rehearse a script with a scene partner that listens
#[derive(Parser, Debug)]
#[command(
    name = "cueline",
    version,
    about = "Rehearse a script with a scene partner that listens"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration such as `1.5s`, `800ms` or a bare number of seconds.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // humantime has no fractional units, so "1.5" and "1.5s" are handled here
    let seconds = s.strip_suffix('s').unwrap_or(s);
    if let Ok(secs) = seconds.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|e| e.to_string());
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 1"))
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perform a structured script, reading transcripts from a file or stdin
    ///
    /// Each transcript line is one recognition result: plain text is final,
    /// `~ text` is interim and `! code` reports a recognizer error.
    /// Lines starting with `>` are commands: `> done`, `> restart`,
    /// `> pause`, `> play`, `> stop` and `> jump N`.
    Perform {
        /// Structured script (JSON)
        script: PathBuf,

        /// Character read by you (repeatable); the rest are voiced for you
        #[arg(long = "human", value_name = "CHARACTER")]
        humans: Vec<String>,

        /// Transcript source (default: stdin)
        #[arg(long, short = 't', value_name = "FILE")]
        transcript: Option<PathBuf>,

        /// Start at this line index
        #[arg(long, value_name = "INDEX", default_value = "0")]
        start: usize,

        /// Fraction of a line that must be heard, e.g. 0.75
        #[arg(long, value_name = "FRACTION", value_parser = parse_fraction)]
        threshold: Option<f64>,

        /// Quiet time before moving on (e.g. 1.5s, 800ms)
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        silence: Option<Duration>,

        /// Wait for `> done` instead of advancing by itself
        #[arg(long)]
        no_auto_advance: bool,

        /// Emit events as JSON lines on stdout
        #[arg(long)]
        json: bool,
    },

    /// Match transcripts against one expected line
    ///
    /// Transcripts are fed in order, as a recognizer would deliver them;
    /// the best result so far is reported after each.
    Match {
        /// The line as written in the script
        expected: String,

        /// One or more transcripts
        #[arg(required = true)]
        transcripts: Vec<String>,

        /// Fraction of the line that must be heard, e.g. 0.75
        #[arg(long, value_name = "FRACTION", value_parser = parse_fraction)]
        threshold: Option<f64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a script's cast and lines
    Cast {
        /// Structured script (JSON)
        script: PathBuf,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file + environment) as TOML
    Show,
    /// Print the configuration file path
    Path,
}
