use crate::error::Result;
use crate::performance::PerformanceEvent;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Pluggable consumer of performance events.
pub trait EventSink: Send + 'static {
    /// Handle one event. Called in the order the controller produced them.
    fn handle(&mut self, event: &PerformanceEvent) -> Result<()>;

    /// Called on pipeline shutdown.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Station wrapper for any EventSink implementation.
///
/// Passes on only the events that end a performance, so the pipeline
/// handle can wait for them.
pub(crate) struct SinkStation {
    sink: Box<dyn EventSink>,
}

impl SinkStation {
    pub(crate) fn new(sink: Box<dyn EventSink>) -> Self {
        Self { sink }
    }
}

impl Station for SinkStation {
    type Input = PerformanceEvent;
    type Output = PerformanceEvent;

    fn name(&self) -> &'static str {
        self.sink.name()
    }

    fn process(
        &mut self,
        event: PerformanceEvent,
    ) -> std::result::Result<Vec<PerformanceEvent>, StationError> {
        let handled = self.sink.handle(&event);
        let outcome = match event {
            PerformanceEvent::Finished | PerformanceEvent::RecognitionClosed { .. } => vec![event],
            _ => Vec::new(),
        };
        match handled {
            Ok(()) => Ok(outcome),
            // A broken sink must not hide the end of the performance
            Err(e) if !outcome.is_empty() => {
                tracing::warn!(sink = self.sink.name(), "failed to handle event: {e}");
                Ok(outcome)
            }
            Err(e) => Err(StationError::Recoverable(e.to_string())),
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.sink.finish() {
            tracing::warn!(sink = self.sink.name(), "failed to finish: {e}");
        }
    }
}

/// Keeps every event. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    collected: Arc<Mutex<Vec<PerformanceEvent>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PerformanceEvent> {
        self.collected
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl EventSink for CollectorSink {
    fn handle(&mut self, event: &PerformanceEvent) -> Result<()> {
        let mut collected = self
            .collected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collected.push(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Writes one JSON object per line for every event, progress included,
/// so another process can follow along.
pub struct JsonLinesSink<W: Write + Send + 'static> {
    writer: W,
}

impl<W: Write + Send + 'static> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + 'static> EventSink for JsonLinesSink<W> {
    fn handle(&mut self, event: &PerformanceEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json-lines"
    }
}
