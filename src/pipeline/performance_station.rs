use crate::performance::{Control, PerformanceController, PerformanceEvent, Speaker};
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::recognition::RecognitionEvent;
use std::collections::VecDeque;
use std::time::Instant;

/// Everything the performance reacts to, merged into one stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Recognition(RecognitionEvent),
    Tick(Instant),
    Control(Control),
}

/// Drives a [`PerformanceController`] and voices AI lines.
///
/// Speech is synchronous: the station is busy while a line is spoken, so
/// recognition results queue up behind it and are matched once the
/// controller listens again.
pub struct PerformanceStation<S: Speaker> {
    controller: PerformanceController,
    speaker: S,
}

impl<S: Speaker> PerformanceStation<S> {
    pub fn new(controller: PerformanceController, speaker: S) -> Self {
        Self {
            controller,
            speaker,
        }
    }

    pub fn controller(&self) -> &PerformanceController {
        &self.controller
    }

    fn speak_line(&mut self, index: usize) {
        let script = self.controller.script();
        let Some(line) = script.line(index) else {
            return;
        };
        tracing::debug!(line = index, speaker = self.speaker.name(), "speaking");
        if let Err(e) = self.speaker.speak(line, script.voice_for(line)) {
            tracing::warn!(line = index, "speech failed, moving on: {e}");
        }
    }

    /// Voice every `Speak` in `events`, feeding completions back into the controller.
    fn perform(&mut self, events: Vec<PerformanceEvent>) -> Vec<PerformanceEvent> {
        let mut pending: VecDeque<PerformanceEvent> = events.into();
        let mut performed = Vec::with_capacity(pending.len());
        while let Some(event) = pending.pop_front() {
            let speak = match event {
                PerformanceEvent::Speak { index } => Some(index),
                _ => None,
            };
            performed.push(event);
            if let Some(index) = speak {
                self.speak_line(index);
                pending.extend(self.controller.speech_finished());
            }
        }
        performed
    }
}

impl<S: Speaker> Station for PerformanceStation<S> {
    type Input = Cue;
    type Output = PerformanceEvent;

    fn name(&self) -> &'static str {
        "performance"
    }

    fn process(&mut self, cue: Cue) -> Result<Vec<PerformanceEvent>, StationError> {
        let events = match cue {
            Cue::Recognition(RecognitionEvent::Transcript(segment)) => {
                self.controller.on_transcript(&segment, segment.received_at)
            }
            Cue::Recognition(RecognitionEvent::Error(error)) => {
                vec![PerformanceEvent::RecognitionError { error }]
            }
            Cue::Recognition(RecognitionEvent::Restarted) => self.controller.recognition_restarted(),
            Cue::Recognition(RecognitionEvent::Closed { reason }) => {
                vec![PerformanceEvent::RecognitionClosed { reason }]
            }
            Cue::Tick(now) => self.controller.tick(now),
            Cue::Control(control) => {
                if matches!(control, Control::Pause | Control::Stop) {
                    self.speaker.stop();
                }
                self.controller
                    .apply(control)
                    .map_err(|e| StationError::Recoverable(e.to_string()))?
            }
        };
        Ok(self.perform(events))
    }

    fn shutdown(&mut self) {
        self.speaker.stop();
    }
}
