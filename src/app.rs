//! Rehearsal application entry points.
//!
//! Wires a script, a transcript source and the terminal together:
//! transcripts → match → cue the next line

use crate::config::Config;
use crate::error::{CuelineError, Result};
use crate::matching::{MatchResult, MatchSession};
use crate::output::{TerminalSink, TerminalSpeaker, format_cast, format_match};
use crate::performance::{PerformanceController, PerformanceEvent, Performer, Script, SilentSpeaker, Speaker};
use crate::pipeline::{EventSink, JsonLinesSink, PerformancePipeline, PipelineConfig};
use crate::recognition::LineReaderEngine;
use crossbeam_channel::Receiver;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides for one `perform` run.
#[derive(Debug, Clone, Default)]
pub struct PerformOptions {
    pub humans: Vec<String>,
    pub transcript: Option<PathBuf>,
    pub start: usize,
    pub threshold: Option<f64>,
    pub silence: Option<Duration>,
    pub no_auto_advance: bool,
    pub json: bool,
    pub color: bool,
    pub quiet: bool,
}

/// Run the perform command: transcripts → performance → terminal.
///
/// # Arguments
/// * `config` - Base configuration (can be overridden by CLI args)
/// * `script_path` - Structured script to perform
/// * `options` - Command-line overrides and output choices
///
/// # Returns
/// Ok(()) when the script ends or the transcript source runs dry
pub fn run_perform_command(
    config: Config,
    script_path: &Path,
    options: PerformOptions,
) -> Result<()> {
    match perform_script(config, script_path, options)? {
        Some(PerformanceEvent::Finished) => tracing::debug!("script finished"),
        Some(PerformanceEvent::RecognitionClosed { reason }) => {
            tracing::info!("transcripts ended: {reason}");
        }
        other => tracing::debug!("performance ended: {other:?}"),
    }
    Ok(())
}

/// Perform until the script ends or transcripts run dry, returning the
/// ending event.
fn perform_script(
    mut config: Config,
    script_path: &Path,
    options: PerformOptions,
) -> Result<Option<PerformanceEvent>> {
    if let Some(threshold) = options.threshold {
        config.matching.completion_threshold = threshold;
    }
    if let Some(silence) = options.silence {
        config.performance.silence_threshold_ms =
            u64::try_from(silence.as_millis()).unwrap_or(u64::MAX);
    }
    if options.no_auto_advance {
        config.performance.auto_advance = false;
    }
    config.validate()?;

    let mut script = Script::load(script_path)?;
    for name in &options.humans {
        script.assign_character(name, Performer::Human)?;
    }
    if options.start >= script.lines.len() {
        return Err(CuelineError::LineOutOfRange {
            index: options.start,
            len: script.lines.len(),
        });
    }
    if script.human_characters().is_empty() {
        tracing::warn!("no character is read by you, every line will be voiced");
    }

    if !options.quiet && !options.json {
        let title = if options.color {
            script.title.bold().to_string()
        } else {
            script.title.clone()
        };
        eprintln!("{title}");
        let readers = script.human_characters().join(", ");
        if !readers.is_empty() {
            eprintln!("You read: {readers}");
        }
        eprintln!();
    }

    let (engine, commands) = match &options.transcript {
        Some(path) => LineReaderEngine::with_commands(BufReader::new(File::open(path)?)),
        None => LineReaderEngine::with_commands(BufReader::new(std::io::stdin())),
    };

    let sink: Box<dyn EventSink> = if options.json {
        Box::new(JsonLinesSink::new(std::io::stdout()))
    } else {
        Box::new(TerminalSink::new(
            script.clone(),
            std::io::stdout(),
            options.color,
        ))
    };

    let pipeline_config = PipelineConfig {
        adapter: config.adapter_config(),
        start_at: Some(options.start),
        ..PipelineConfig::default()
    };
    let controller =
        PerformanceController::new(script, config.matcher(), config.performance_settings());

    if options.json {
        perform_with(pipeline_config, controller, engine, &commands, SilentSpeaker, sink)
    } else {
        let speaker = TerminalSpeaker::new(std::io::stdout(), options.color);
        perform_with(pipeline_config, controller, engine, &commands, speaker, sink)
    }
}

fn perform_with<S: Speaker>(
    pipeline_config: PipelineConfig,
    controller: PerformanceController,
    engine: LineReaderEngine,
    commands: &Receiver<String>,
    speaker: S,
    sink: Box<dyn EventSink>,
) -> Result<Option<PerformanceEvent>> {
    let handle = PerformancePipeline::new(pipeline_config).start(controller, engine, speaker, sink)?;
    let outcome = handle.wait_with_commands(commands);
    handle.shutdown();
    Ok(outcome)
}

#[derive(Serialize)]
struct MatchReport<'a> {
    transcript: &'a str,
    #[serde(flatten)]
    result: &'a MatchResult,
}

/// Run the match command: feed transcripts in order and report each result.
pub fn run_match_command(
    mut config: Config,
    expected: &str,
    transcripts: &[String],
    threshold: Option<f64>,
    json: bool,
    color: bool,
) -> Result<()> {
    if let Some(threshold) = threshold {
        config.matching.completion_threshold = threshold;
    }
    config.validate()?;

    let mut session = MatchSession::with_matcher(expected, config.matcher());
    for transcript in transcripts {
        let result = session.update(transcript);
        if json {
            let report = MatchReport { transcript, result };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", format_match(expected, result, color));
        }
    }
    Ok(())
}

/// Run the cast command: list characters and who reads them.
pub fn run_cast_command(script_path: &Path, color: bool) -> Result<()> {
    let script = Script::load(script_path)?;
    let title = if color {
        script.title.bold().to_string()
    } else {
        script.title.clone()
    };
    println!("{title} ({} lines)", script.lines.len());
    print!("{}", format_cast(&script, color));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCRIPT: &str = r#"{
        "title": "Doorway",
        "characters": [
            {"name": "HOST", "assignedTo": "ai"},
            {"name": "GUEST", "assignedTo": "ai"}
        ],
        "lines": [
            {"type": "dialogue", "character": "HOST", "text": "Good evening."},
            {"type": "dialogue", "character": "GUEST", "text": "Good evening to you."}
        ]
    }"#;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn perform_runs_to_the_end_from_a_transcript_file() {
        let script = write_file(SCRIPT);
        let transcript = write_file("~ good evening\ngood evening to you\n");

        let options = PerformOptions {
            humans: vec!["GUEST".to_string()],
            transcript: Some(transcript.path().to_path_buf()),
            json: true,
            quiet: true,
            ..PerformOptions::default()
        };
        run_perform_command(Config::default(), script.path(), options).unwrap();
    }

    #[test]
    fn perform_without_auto_advance_moves_on_when_reader_is_done() {
        let script = write_file(SCRIPT);
        let transcript = write_file("good evening to you\n> done\n");

        let options = PerformOptions {
            humans: vec!["GUEST".to_string()],
            transcript: Some(transcript.path().to_path_buf()),
            no_auto_advance: true,
            json: true,
            quiet: true,
            ..PerformOptions::default()
        };
        assert_eq!(
            perform_script(Config::default(), script.path(), options).unwrap(),
            Some(PerformanceEvent::Finished)
        );
    }

    #[test]
    fn perform_without_auto_advance_holds_a_heard_line() {
        let script = write_file(SCRIPT);
        let transcript = write_file("good evening to you\n");

        let options = PerformOptions {
            humans: vec!["GUEST".to_string()],
            transcript: Some(transcript.path().to_path_buf()),
            no_auto_advance: true,
            json: true,
            quiet: true,
            ..PerformOptions::default()
        };
        assert!(matches!(
            perform_script(Config::default(), script.path(), options).unwrap(),
            Some(PerformanceEvent::RecognitionClosed { .. })
        ));
    }

    #[test]
    fn perform_rejects_unknown_character() {
        let script = write_file(SCRIPT);
        let options = PerformOptions {
            humans: vec!["BUTLER".to_string()],
            ..PerformOptions::default()
        };
        assert!(matches!(
            run_perform_command(Config::default(), script.path(), options),
            Err(CuelineError::UnknownCharacter { name }) if name == "BUTLER"
        ));
    }

    #[test]
    fn perform_rejects_start_past_the_end() {
        let script = write_file(SCRIPT);
        let options = PerformOptions {
            start: 2,
            ..PerformOptions::default()
        };
        assert!(matches!(
            run_perform_command(Config::default(), script.path(), options),
            Err(CuelineError::LineOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn perform_rejects_invalid_threshold() {
        let script = write_file(SCRIPT);
        let options = PerformOptions {
            threshold: Some(0.0),
            ..PerformOptions::default()
        };
        assert!(matches!(
            run_perform_command(Config::default(), script.path(), options),
            Err(CuelineError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn cast_reports_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_cast_command(&dir.path().join("missing.json"), false).is_err());
    }

    #[test]
    fn match_report_flattens_result() {
        let mut session = MatchSession::new("to be or not", 0.75);
        let result = session.update("to be");
        let report = MatchReport {
            transcript: "to be",
            result,
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["transcript"], "to be");
        assert_eq!(json["matched_words"], 2);
    }
}
