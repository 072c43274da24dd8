//! Terminal rendering for performances and match results.

use crate::error::Result;
use crate::matching::{MatchResult, tokenize};
use crate::performance::{
    Character, LineKind, PerformanceEvent, Performer, Script, ScriptLine, Speaker,
};
use crate::pipeline::EventSink;
use owo_colors::OwoColorize;
use std::io::Write;

/// Render the expected line's words, matched ones highlighted.
///
/// Words are shown in their normalized form, one per expected token, so
/// highlighting lines up with `matched_indices`.
pub fn highlight_line(expected_text: &str, result: &MatchResult, color: bool) -> String {
    tokenize(expected_text)
        .iter()
        .enumerate()
        .map(|(index, token)| match (result.is_matched(index), color) {
            (true, true) => token.green().bold().to_string(),
            (false, true) => token.dimmed().to_string(),
            (true, false) => token.as_str().to_uppercase(),
            (false, false) => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line summary of a match: highlighted words plus counts.
pub fn format_match(expected_text: &str, result: &MatchResult, color: bool) -> String {
    let status = if result.is_complete {
        if color {
            "complete".green().to_string()
        } else {
            "complete".to_string()
        }
    } else if color {
        "listening".yellow().to_string()
    } else {
        "listening".to_string()
    };
    format!(
        "{}  [{}/{} {:.0}% {}]",
        highlight_line(expected_text, result, color),
        result.matched_words,
        result.total_words,
        result.match_percentage,
        status
    )
}

/// Character list with line counts and who reads them.
pub fn format_cast(script: &Script, color: bool) -> String {
    let counts = script.line_counts();
    let width = script
        .characters
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for character in &script.characters {
        let lines = counts.get(character.name.as_str()).copied().unwrap_or(0);
        let performer = performer_label(character.assigned_to);
        let performer = if color {
            performer.dimmed().to_string()
        } else {
            performer.to_string()
        };
        out.push_str(&format!(
            "{:width$}  {:>3} lines  {}\n",
            character.name,
            lines,
            performer,
            width = width
        ));
    }
    out
}

fn performer_label(performer: Performer) -> &'static str {
    match performer {
        Performer::Human => "you",
        Performer::Ai => "partner",
        Performer::Skip => "skipped",
    }
}

/// Renders performance events for a reader at the terminal.
pub struct TerminalSink<W: Write + Send + 'static> {
    script: Script,
    writer: W,
    color: bool,
}

impl<W: Write + Send + 'static> TerminalSink<W> {
    pub fn new(script: Script, writer: W, color: bool) -> Self {
        Self {
            script,
            writer,
            color,
        }
    }

    fn line(&self, index: usize) -> Option<&ScriptLine> {
        self.script.line(index)
    }

    fn render(&self, event: &PerformanceEvent) -> Option<String> {
        let color = self.color;
        match event {
            PerformanceEvent::LineStarted {
                performer: Performer::Human,
                character,
                text,
                ..
            } => {
                let name = character.as_deref().unwrap_or("YOU");
                Some(if color {
                    format!("{} {}", format!("{name}:").cyan().bold(), text)
                } else {
                    format!("{name}: {text}")
                })
            }
            PerformanceEvent::LineSkipped { index } => {
                let line = self.line(*index)?;
                let text = match line.kind {
                    LineKind::Direction | LineKind::Action => format!("({})", line.text),
                    LineKind::Dialogue => format!(
                        "{}: {} (skipped)",
                        line.character.as_deref().unwrap_or("?"),
                        line.text
                    ),
                };
                Some(if color {
                    text.dimmed().italic().to_string()
                } else {
                    text
                })
            }
            PerformanceEvent::Progress { index, result } => {
                let line = self.line(*index)?;
                Some(format!("  {}", format_match(&line.text, result, color)))
            }
            PerformanceEvent::LineCompleted { result, manual, .. } => {
                let how = if *manual { "done" } else { "heard" };
                let text = format!("  {how} ({:.0}%)", result.match_percentage);
                Some(if color {
                    text.green().to_string()
                } else {
                    text
                })
            }
            PerformanceEvent::Finished => Some(if color {
                "End of script.".bold().to_string()
            } else {
                "End of script.".to_string()
            }),
            PerformanceEvent::RecognitionError { error } => {
                let text = format!("recognizer: {error}");
                Some(if color {
                    text.yellow().to_string()
                } else {
                    text
                })
            }
            PerformanceEvent::RecognitionClosed { reason } => {
                let text = format!("recognizer stopped: {reason}");
                Some(if color { text.red().to_string() } else { text })
            }
            PerformanceEvent::StatusChanged { status } => {
                tracing::debug!("status: {status}");
                None
            }
            // AI lines are printed by the speaker
            PerformanceEvent::LineStarted { .. } | PerformanceEvent::Speak { .. } => None,
        }
    }
}

impl<W: Write + Send + 'static> EventSink for TerminalSink<W> {
    fn handle(&mut self, event: &PerformanceEvent) -> Result<()> {
        if let Some(text) = self.render(event) {
            writeln!(self.writer, "{text}")?;
            self.writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}

/// Voices partner lines by printing them.
pub struct TerminalSpeaker<W: Write + Send + 'static> {
    writer: W,
    color: bool,
}

impl<W: Write + Send + 'static> TerminalSpeaker<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self { writer, color }
    }
}

impl<W: Write + Send + 'static> Speaker for TerminalSpeaker<W> {
    fn speak(&mut self, line: &ScriptLine, voice: Option<&Character>) -> Result<()> {
        let name = line.character.as_deref().unwrap_or("PARTNER");
        let hint = voice
            .and_then(|v| v.voice_id.as_deref().or(v.suggested_voice_type.as_deref()))
            .map(|v| format!(" [{v}]"))
            .unwrap_or_default();
        if self.color {
            writeln!(
                self.writer,
                "{}{} {}",
                format!("{name}:").magenta().bold(),
                hint.dimmed(),
                line.text.italic()
            )?;
        } else {
            writeln!(self.writer, "{name}:{hint} {}", line.text)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}
