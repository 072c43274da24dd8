//! Cue-to-cue state machine for a live read-through.
//!
//! The controller owns the script cursor. Human lines are followed by
//! matching recognized speech against the line; AI lines are handed to the
//! host to voice. Directions, actions and skipped lines are passed over.
//!
//! Operations that depend on time take `now` explicitly, and every
//! operation returns the events it produced. The controller holds no
//! threads or clocks. [`PerformanceStation`](crate::pipeline::PerformanceStation)
//! drives it from the pipeline.

use crate::defaults;
use crate::error::{CuelineError, Result};
use crate::matching::{LineMatcher, MatchResult, MatchSession};
use crate::performance::script::{Performer, Script, ScriptLine};
use crate::recognition::{RecognitionErrorKind, TranscriptSegment};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    Idle,
    Listening,
    Speaking,
    Paused,
}

impl fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
            Self::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSettings {
    /// Move on by itself once a human line is complete.
    pub auto_advance: bool,
    /// Quiet time after a completed line before auto-advancing.
    pub silence_threshold: Duration,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            auto_advance: defaults::AUTO_ADVANCE,
            silence_threshold: Duration::from_millis(defaults::SILENCE_THRESHOLD_MS),
        }
    }
}

/// Commands from the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Play,
    Pause,
    Stop,
    JumpTo(usize),
    RestartLine,
    /// "Done reading": finish the current human line by hand.
    HumanDone,
}

/// Parses reader commands as typed at the prompt: `play`, `pause`, `stop`,
/// `restart`, `done` and `jump N`.
impl FromStr for Control {
    type Err = CuelineError;

    fn from_str(input: &str) -> Result<Self> {
        let unknown = || CuelineError::UnknownCommand {
            input: input.trim().to_string(),
        };
        let mut words = input.split_whitespace();
        let command = words.next().map(str::to_lowercase).ok_or_else(unknown)?;
        let control = match (command.as_str(), words.next()) {
            ("play", None) => Self::Play,
            ("pause", None) => Self::Pause,
            ("stop", None) => Self::Stop,
            ("restart", None) => Self::RestartLine,
            ("done", None) => Self::HumanDone,
            ("jump", Some(index)) => Self::JumpTo(index.parse().map_err(|_| unknown())?),
            _ => return Err(unknown()),
        };
        if words.next().is_some() {
            return Err(unknown());
        }
        Ok(control)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PerformanceEvent {
    StatusChanged {
        status: PerformanceStatus,
    },
    LineStarted {
        index: usize,
        performer: Performer,
        character: Option<String>,
        text: String,
    },
    LineSkipped {
        index: usize,
    },
    /// The host should voice this line, then report `speech_finished`.
    Speak {
        index: usize,
    },
    Progress {
        index: usize,
        result: MatchResult,
    },
    LineCompleted {
        index: usize,
        result: MatchResult,
        manual: bool,
    },
    Finished,
    RecognitionError {
        error: RecognitionErrorKind,
    },
    RecognitionClosed {
        reason: String,
    },
}

pub struct PerformanceController {
    script: Script,
    matcher: LineMatcher,
    settings: PerformanceSettings,
    cursor: usize,
    status: PerformanceStatus,
    session: Option<MatchSession>,
    line_completed: bool,
    last_speech: Option<Instant>,
    /// The recognizer is partway through an utterance (last segment was interim).
    utterance_open: bool,
    /// The open utterance began before the active line did.
    stale_utterance: bool,
}

impl PerformanceController {
    pub fn new(script: Script, matcher: LineMatcher, settings: PerformanceSettings) -> Self {
        Self {
            script,
            matcher,
            settings,
            cursor: 0,
            status: PerformanceStatus::Idle,
            session: None,
            line_completed: false,
            last_speech: None,
            utterance_open: false,
            stale_utterance: false,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn settings(&self) -> &PerformanceSettings {
        &self.settings
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> PerformanceStatus {
        self.status
    }

    pub fn current_line(&self) -> Option<&ScriptLine> {
        self.script.line(self.cursor)
    }

    /// Match state of the active human line, if one is being listened for.
    pub fn session(&self) -> Option<&MatchSession> {
        self.session.as_ref()
    }

    pub fn current_match(&self) -> Option<&MatchResult> {
        self.session.as_ref().map(MatchSession::get_match)
    }

    /// Start or resume from the cursor.
    pub fn play(&mut self) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        match self.status {
            PerformanceStatus::Listening | PerformanceStatus::Speaking => {}
            PerformanceStatus::Idle | PerformanceStatus::Paused => {
                self.enter_line(&mut events);
            }
        }
        events
    }

    /// Hold at the current line. Resuming re-enters it from scratch.
    pub fn pause(&mut self) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        if matches!(
            self.status,
            PerformanceStatus::Listening | PerformanceStatus::Speaking
        ) {
            self.clear_line();
            self.set_status(PerformanceStatus::Paused, &mut events);
        }
        events
    }

    /// Halt and rewind to the top.
    pub fn stop(&mut self) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        self.clear_line();
        self.cursor = 0;
        self.set_status(PerformanceStatus::Idle, &mut events);
        events
    }

    /// Move to `index` and perform from there.
    pub fn jump_to(&mut self, index: usize) -> Result<Vec<PerformanceEvent>> {
        if index >= self.script.len() {
            return Err(CuelineError::LineOutOfRange {
                index,
                len: self.script.len(),
            });
        }
        let mut events = Vec::new();
        self.clear_line();
        self.cursor = index;
        self.enter_line(&mut events);
        Ok(events)
    }

    /// Forget what has been heard of the current human line.
    pub fn restart_line(&mut self) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        if self.status == PerformanceStatus::Listening
            && let Some(session) = self.session.as_mut()
        {
            session.reset();
            self.line_completed = false;
            self.last_speech = None;
            self.stale_utterance = self.utterance_open;
            events.push(PerformanceEvent::Progress {
                index: self.cursor,
                result: session.get_match().clone(),
            });
        }
        events
    }

    /// The reader finished the line themselves.
    pub fn human_done(&mut self) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        if self.status != PerformanceStatus::Listening {
            return events;
        }
        let result = self
            .current_match()
            .cloned()
            .unwrap_or_else(|| MatchResult::empty(0));
        events.push(PerformanceEvent::LineCompleted {
            index: self.cursor,
            result,
            manual: true,
        });
        self.advance(&mut events);
        events
    }

    /// The host finished voicing the current AI line.
    pub fn speech_finished(&mut self) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        if self.status == PerformanceStatus::Speaking {
            self.advance(&mut events);
        }
        events
    }

    pub fn apply(&mut self, control: Control) -> Result<Vec<PerformanceEvent>> {
        Ok(match control {
            Control::Play => self.play(),
            Control::Pause => self.pause(),
            Control::Stop => self.stop(),
            Control::JumpTo(index) => self.jump_to(index)?,
            Control::RestartLine => self.restart_line(),
            Control::HumanDone => self.human_done(),
        })
    }

    /// Feed recognized speech for the active human line.
    ///
    /// Segments that continue an utterance already in progress when the line
    /// was entered are dropped up to and including that utterance's final
    /// result; they were spoken for an earlier line.
    pub fn on_transcript(
        &mut self,
        segment: &TranscriptSegment,
        now: Instant,
    ) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        let stale = self.stale_utterance;
        self.utterance_open = !segment.is_final;
        if segment.is_final {
            self.stale_utterance = false;
        }
        if stale {
            tracing::debug!(line = self.cursor, "dropping late transcript: {}", segment.text);
            return events;
        }
        if self.status != PerformanceStatus::Listening {
            tracing::debug!(status = %self.status, "ignoring transcript: {}", segment.text);
            return events;
        }
        let Some(session) = self.session.as_mut() else {
            return events;
        };

        self.last_speech = Some(now);
        let before = session.get_match().clone();
        let result = session.update(&segment.text).clone();

        if result != before {
            events.push(PerformanceEvent::Progress {
                index: self.cursor,
                result: result.clone(),
            });
        }
        if result.is_complete && !self.line_completed {
            self.line_completed = true;
            tracing::debug!(line = self.cursor, "line complete");
            events.push(PerformanceEvent::LineCompleted {
                index: self.cursor,
                result,
                manual: false,
            });
        }
        if self.line_completed && self.settings.auto_advance && segment.is_final {
            self.advance(&mut events);
        }
        events
    }

    /// Advance a completed line once the reader has been quiet long enough.
    pub fn tick(&mut self, now: Instant) -> Vec<PerformanceEvent> {
        let mut events = Vec::new();
        if self.status == PerformanceStatus::Listening
            && self.line_completed
            && self.settings.auto_advance
            && let Some(last) = self.last_speech
            && now.saturating_duration_since(last) >= self.settings.silence_threshold
        {
            tracing::debug!(line = self.cursor, "silence after completed line");
            self.advance(&mut events);
        }
        events
    }

    /// The recognizer restarted; anything heard before belongs to a dead utterance.
    pub fn recognition_restarted(&mut self) -> Vec<PerformanceEvent> {
        self.utterance_open = false;
        self.stale_utterance = false;
        if self.line_completed {
            return Vec::new();
        }
        self.restart_line()
    }

    fn advance(&mut self, events: &mut Vec<PerformanceEvent>) {
        self.clear_line();
        self.cursor += 1;
        self.enter_line(events);
    }

    fn clear_line(&mut self) {
        self.session = None;
        self.line_completed = false;
        self.last_speech = None;
        self.stale_utterance = false;
    }

    /// Perform the line at the cursor, passing over anything nobody says.
    fn enter_line(&mut self, events: &mut Vec<PerformanceEvent>) {
        loop {
            let Some(line) = self.script.line(self.cursor) else {
                self.finish(events);
                return;
            };

            let performer = if line.is_dialogue() {
                line.assigned_to
            } else {
                Performer::Skip
            };
            let started = PerformanceEvent::LineStarted {
                index: self.cursor,
                performer,
                character: line.character.clone(),
                text: line.text.clone(),
            };

            match performer {
                Performer::Skip => {}
                Performer::Human => {
                    let session = MatchSession::with_matcher(&line.text, self.matcher.clone());
                    // Nothing to listen for in a line without words
                    if !session.expected_line().is_empty() {
                        self.session = Some(session);
                        self.line_completed = false;
                        self.last_speech = None;
                        self.stale_utterance = self.utterance_open;
                        events.push(started);
                        self.set_status(PerformanceStatus::Listening, events);
                        return;
                    }
                }
                Performer::Ai => {
                    events.push(started);
                    self.set_status(PerformanceStatus::Speaking, events);
                    events.push(PerformanceEvent::Speak { index: self.cursor });
                    return;
                }
            }

            events.push(PerformanceEvent::LineSkipped { index: self.cursor });
            self.cursor += 1;
        }
    }

    fn finish(&mut self, events: &mut Vec<PerformanceEvent>) {
        tracing::info!("end of script");
        self.clear_line();
        self.cursor = 0;
        self.set_status(PerformanceStatus::Idle, events);
        events.push(PerformanceEvent::Finished);
    }

    fn set_status(&mut self, status: PerformanceStatus, events: &mut Vec<PerformanceEvent>) {
        if self.status != status {
            self.status = status;
            events.push(PerformanceEvent::StatusChanged { status });
        }
    }
}
