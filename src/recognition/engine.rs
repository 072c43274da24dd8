use crate::error::{CuelineError, Result};
use crate::recognition::event::EngineEvent;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// A continuous speech recognizer.
///
/// The adapter drives an engine from a single thread: `start`, then
/// `poll_event` in a loop, `start` again after it ends, `stop` at shutdown.
/// Real engines (browser speech API bridges, local models) and synthetic
/// ones for tests implement the same contract.
pub trait RecognitionEngine: Send + 'static {
    /// Begin listening.
    ///
    /// Returns [`CuelineError::RecognitionAlreadyStarted`] if already running,
    /// [`CuelineError::RecognitionUnavailable`] if the engine can never start.
    fn start(&mut self) -> Result<()>;

    /// Stop listening. Idempotent.
    fn stop(&mut self);

    /// Wait up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> Option<EngineEvent>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Start/stop counters shared with a [`ScriptedEngine`] after it moves into the adapter.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl EngineStats {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Engine that replays a fixed sequence of events.
///
/// Events are only delivered while running. After an `Ended` event the
/// engine stops itself, and the remaining events wait for the next
/// `start`, which is how a restart looks from the outside.
#[derive(Debug)]
pub struct ScriptedEngine {
    events: VecDeque<EngineEvent>,
    running: bool,
    unavailable: bool,
    stats: EngineStats,
}

impl ScriptedEngine {
    pub fn new(events: impl IntoIterator<Item = EngineEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            running: false,
            unavailable: false,
            stats: EngineStats::default(),
        }
    }

    /// Shorthand for a run of final results.
    pub fn finals<'a>(transcripts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(transcripts.into_iter().map(|t| EngineEvent::Result {
            transcript: t.to_string(),
            is_final: true,
        }))
    }

    /// Configure the engine to refuse every start.
    pub fn with_unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn start(&mut self) -> Result<()> {
        if self.unavailable {
            return Err(CuelineError::RecognitionUnavailable {
                message: "scripted engine configured as unavailable".to_string(),
            });
        }
        if self.running {
            return Err(CuelineError::RecognitionAlreadyStarted);
        }
        self.running = true;
        self.stats.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.stats.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn poll_event(&mut self, timeout: Duration) -> Option<EngineEvent> {
        if !self.running {
            thread::sleep(timeout);
            return None;
        }
        match self.events.pop_front() {
            Some(EngineEvent::Ended) => {
                self.running = false;
                Some(EngineEvent::Ended)
            }
            Some(event) => Some(event),
            None => {
                thread::sleep(timeout);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Engine fed by text lines, one utterance segment per line.
///
/// - `~ words` is an interim result
/// - `! code` is an engine error code
/// - any other non-empty line is a final result
///
/// Built [`with_commands`](Self::with_commands), lines starting with `>`
/// are reader commands instead and are passed on without the marker.
///
/// End of input ends recognition for good; later starts report the
/// engine as unavailable. Used by the CLI to rehearse against typed or
/// piped transcripts.
pub struct LineReaderEngine {
    reader: Option<Box<dyn BufRead + Send>>,
    lines: Option<Receiver<String>>,
    commands: Option<Sender<String>>,
    running: bool,
    exhausted: bool,
}

impl LineReaderEngine {
    pub fn new(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            lines: None,
            commands: None,
            running: false,
            exhausted: false,
        }
    }

    /// Engine that splits `> command` lines off onto the returned channel.
    pub fn with_commands(reader: impl BufRead + Send + 'static) -> (Self, Receiver<String>) {
        let (tx, rx) = unbounded();
        let mut engine = Self::new(reader);
        engine.commands = Some(tx);
        (engine, rx)
    }

    fn spawn_reader(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        let commands = self.commands.take();
        let (tx, rx) = unbounded();
        // Detached: a blocking read on stdin cannot be interrupted, so this
        // thread lives until end of input even after `stop`. Dropping the
        // receiver makes it exit at the next line.
        thread::spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        let command = line
                            .trim_start()
                            .strip_prefix('>')
                            .map(|c| c.trim().to_string());
                        let sent = match (&commands, command) {
                            (Some(commands), Some(command)) => commands.send(command).is_ok(),
                            _ => tx.send(line).is_ok(),
                        };
                        if !sent {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("transcript input failed: {e}");
                        break;
                    }
                }
            }
        });
        self.lines = Some(rx);
    }

    /// Parse one input line into an engine event.
    pub fn parse_line(line: &str) -> Option<EngineEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix('~') {
            return Some(EngineEvent::Result {
                transcript: rest.trim().to_string(),
                is_final: false,
            });
        }
        if let Some(code) = line.strip_prefix('!') {
            return Some(EngineEvent::Error(code.trim().to_string()));
        }
        Some(EngineEvent::Result {
            transcript: line.to_string(),
            is_final: true,
        })
    }
}

impl RecognitionEngine for LineReaderEngine {
    fn start(&mut self) -> Result<()> {
        if self.exhausted {
            return Err(CuelineError::RecognitionUnavailable {
                message: "transcript input exhausted".to_string(),
            });
        }
        if self.running {
            return Err(CuelineError::RecognitionAlreadyStarted);
        }
        self.spawn_reader();
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn poll_event(&mut self, timeout: Duration) -> Option<EngineEvent> {
        let lines = match (&self.lines, self.running) {
            (Some(lines), true) => lines,
            _ => {
                thread::sleep(timeout);
                return None;
            }
        };
        match lines.recv_timeout(timeout) {
            Ok(line) => Self::parse_line(&line),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.running = false;
                self.exhausted = true;
                Some(EngineEvent::Ended)
            }
        }
    }

    fn name(&self) -> &'static str {
        "line-reader"
    }
}
