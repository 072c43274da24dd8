use crate::error::{CuelineError, Result};
use crate::performance::script::{Character, ScriptLine};
use std::sync::{Arc, Mutex};

/// Voices the lines assigned to the AI.
///
/// `speak` runs on the performance thread and blocks until the line has
/// been delivered; the controller is told afterwards via `speech_finished`.
/// Reader commands queue up behind it, so a `pause` or `stop` typed while a
/// line is being voiced takes effect once `speak` returns. Implementations
/// that play audio on a device should hand the utterance off and return
/// instead of blocking for its whole length. Speech synthesis itself lives
/// outside this crate.
pub trait Speaker: Send + 'static {
    fn speak(&mut self, line: &ScriptLine, voice: Option<&Character>) -> Result<()>;

    /// Cut off audio still playing from an earlier `speak`. Called on pause,
    /// stop and shutdown, never while `speak` is running.
    fn stop(&mut self) {}

    fn name(&self) -> &'static str;
}

/// Speaker that says nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, _line: &ScriptLine, _voice: Option<&Character>) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

/// Mock speaker for testing
///
/// Records the text of every spoken line. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct MockSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
    stops: Arc<Mutex<usize>>,
    should_fail: bool,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on speak
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Texts spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn stop_count(&self) -> usize {
        self.stops
            .lock()
            .map(|s| *s)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

impl Speaker for MockSpeaker {
    fn speak(&mut self, line: &ScriptLine, _voice: Option<&Character>) -> Result<()> {
        if self.should_fail {
            return Err(CuelineError::Speech {
                message: "mock speech failure".to_string(),
            });
        }
        let mut spoken = self
            .spoken
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        spoken.push(line.text.clone());
        Ok(())
    }

    fn stop(&mut self) {
        let mut stops = self
            .stops
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stops += 1;
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
