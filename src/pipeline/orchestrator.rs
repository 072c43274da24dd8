//! Performance pipeline: recognition + ticks + controls → performance → sink.

use crate::defaults;
use crate::error::{CuelineError, Result};
use crate::performance::{Control, PerformanceController, PerformanceEvent, Speaker};
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::performance_station::{Cue, PerformanceStation};
use crate::pipeline::sink::{EventSink, SinkStation};
use crate::pipeline::station::StationRunner;
use crate::recognition::{AdapterConfig, RecognitionAdapter, RecognitionEngine, RecognitionEvent};
use crossbeam_channel::{Receiver, Sender, bounded, never, select, tick};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub adapter: AdapterConfig,
    /// How often the controller is ticked for silence detection
    pub tick_interval: Duration,
    /// Channel buffer sizes
    pub cue_buffer: usize,
    pub event_buffer: usize,
    /// Line to start performing from, queued before recognition starts.
    /// `None` waits for a control.
    pub start_at: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adapter: AdapterConfig::default(),
            tick_interval: Duration::from_millis(defaults::TICK_INTERVAL_MS),
            cue_buffer: defaults::CHANNEL_CAPACITY,
            event_buffer: defaults::CHANNEL_CAPACITY,
            start_at: Some(0),
        }
    }
}

/// Handle to a running performance.
pub struct PipelineHandle {
    cue_tx: Sender<Cue>,
    stop_tx: Sender<()>,
    outcome_rx: Receiver<PerformanceEvent>,
    adapter: RecognitionAdapter,
    threads: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Send a reader command to the performance.
    pub fn send(&self, control: Control) -> Result<()> {
        self.cue_tx
            .send(Cue::Control(control))
            .map_err(|_| CuelineError::Other("performance pipeline has stopped".to_string()))
    }

    /// Wait until the script finishes or recognition closes for good.
    ///
    /// Returns the ending event, or `None` on timeout or if the pipeline
    /// went away first.
    pub fn wait(&self, timeout: Option<Duration>) -> Option<PerformanceEvent> {
        match timeout {
            Some(timeout) => self.outcome_rx.recv_timeout(timeout).ok(),
            None => self.outcome_rx.recv().ok(),
        }
    }

    /// Wait without a timeout, forwarding typed reader commands
    /// (`done`, `jump 3`, ...) until the performance ends.
    ///
    /// Commands that do not parse are logged and skipped. Commands apply
    /// when read, ahead of transcripts still in flight.
    pub fn wait_with_commands(&self, commands: &Receiver<String>) -> Option<PerformanceEvent> {
        let closed = never();
        let mut commands_open = true;

        loop {
            let input = if commands_open { commands } else { &closed };
            select! {
                recv(self.outcome_rx) -> outcome => return outcome.ok(),
                recv(input) -> command => match command {
                    Ok(command) => match command.parse::<Control>() {
                        Ok(control) => {
                            tracing::debug!(?control, "reader command");
                            if self.send(control).is_err() {
                                return None;
                            }
                        }
                        Err(e) => tracing::warn!("{e}"),
                    },
                    Err(_) => commands_open = false,
                },
            }
        }
    }

    pub fn is_listening(&self) -> bool {
        self.adapter.is_listening()
    }

    /// Stop recognition, drain the stations and join every thread.
    pub fn shutdown(self) {
        let Self {
            cue_tx,
            stop_tx,
            outcome_rx,
            adapter,
            threads,
        } = self;

        drop(stop_tx);
        adapter.stop();
        drop(cue_tx);
        // Unblocks the sink if nobody collected its outcomes
        drop(outcome_rx);

        for handle in threads {
            if handle.join().is_err() {
                tracing::error!("pipeline thread panicked");
            }
        }
        tracing::debug!("performance pipeline stopped");
    }
}

/// Wires recognition, the performance controller and an event sink.
pub struct PerformancePipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl PerformancePipeline {
    /// Creates a new pipeline with default error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Start the performance.
    ///
    /// # Arguments
    /// * `controller` - Script state machine, usually still idle
    /// * `engine` - Speech recognizer for the human lines
    /// * `speaker` - Voice for the AI lines
    /// * `sink` - Receives every performance event
    pub fn start<E, S>(
        self,
        controller: PerformanceController,
        engine: E,
        speaker: S,
        sink: Box<dyn EventSink>,
    ) -> Result<PipelineHandle>
    where
        E: RecognitionEngine,
        S: Speaker,
    {
        let (cue_tx, cue_rx) = bounded(self.config.cue_buffer.max(1));
        let (event_tx, event_rx) = bounded(self.config.event_buffer.max(1));
        let (outcome_tx, outcome_rx) = bounded(self.config.event_buffer.max(1));

        if let Some(index) = self.config.start_at {
            let cue = if index == 0 {
                Control::Play
            } else {
                Control::JumpTo(index)
            };
            cue_tx
                .send(Cue::Control(cue))
                .map_err(|_| CuelineError::Other("cue channel closed".to_string()))?;
        }

        let performance_runner = StationRunner::spawn(
            PerformanceStation::new(controller, speaker),
            cue_rx,
            event_tx,
            self.error_reporter.clone(),
        );
        let sink_runner = StationRunner::spawn(
            SinkStation::new(sink),
            event_rx,
            outcome_tx,
            self.error_reporter.clone(),
        );

        let (adapter, recognition_rx) = RecognitionAdapter::subscribe(engine, self.config.adapter);
        tracing::info!(engine = adapter.engine_name(), "listening");

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let forward_tx = cue_tx.clone();
        let tick_interval = self.config.tick_interval;
        let forwarder = thread::spawn(move || {
            forward_cues(recognition_rx, forward_tx, stop_rx, tick_interval);
        });

        let threads = vec![
            forwarder,
            thread::spawn(move || {
                if let Err(msg) = performance_runner.join() {
                    tracing::error!("{msg}");
                }
            }),
            thread::spawn(move || {
                if let Err(msg) = sink_runner.join() {
                    tracing::error!("{msg}");
                }
            }),
        ];

        Ok(PipelineHandle {
            cue_tx,
            stop_tx,
            outcome_rx,
            adapter,
            threads,
        })
    }
}

/// Merge recognition events and periodic ticks into the cue stream.
fn forward_cues(
    recognition_rx: Receiver<RecognitionEvent>,
    cue_tx: Sender<Cue>,
    stop_rx: Receiver<()>,
    tick_interval: Duration,
) {
    let ticker = tick(tick_interval);
    let ended = never();
    let mut recognition_open = true;

    loop {
        let recognition = if recognition_open {
            &recognition_rx
        } else {
            &ended
        };
        let cue = select! {
            recv(stop_rx) -> _ => break,
            recv(recognition) -> event => match event {
                Ok(event) => Cue::Recognition(event),
                Err(_) => {
                    tracing::debug!("recognition stream ended");
                    recognition_open = false;
                    continue;
                }
            },
            recv(ticker) -> _ => Cue::Tick(Instant::now()),
        };
        if cue_tx.send(cue).is_err() {
            break;
        }
    }
}
