//! Continuous recognition with automatic restart.
//!
//! Wraps a [`RecognitionEngine`] in a dedicated thread and turns its raw
//! lifecycle into a clean stream of [`RecognitionEvent`]s:
//! - results become [`TranscriptSegment`]s, in engine order
//! - benign errors ("no-speech", "aborted") are swallowed
//! - other errors are forwarded, and the engine is restarted after a short
//!   delay unless the error rules restarts out ("not-allowed")
//! - an engine that ends on its own is restarted while subscribed

use crate::defaults;
use crate::error::CuelineError;
use crate::recognition::engine::RecognitionEngine;
use crate::recognition::event::{
    EngineEvent, RecognitionErrorKind, RecognitionEvent, TranscriptSegment,
};
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, select};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Timing knobs for the adapter thread.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Wait between the engine ending and the restart attempt.
    pub restart_delay: Duration,
    /// Upper bound on how long one engine poll blocks.
    pub poll_interval: Duration,
    /// Capacity of the subscriber channel.
    pub channel_capacity: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(defaults::RESTART_DELAY_MS),
            poll_interval: Duration::from_millis(defaults::POLL_INTERVAL_MS),
            channel_capacity: defaults::CHANNEL_CAPACITY,
        }
    }
}

/// Handle to a running recognition subscription.
///
/// Dropping the handle stops the engine and joins its thread.
pub struct RecognitionAdapter {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    listening: Arc<AtomicBool>,
    engine_name: &'static str,
}

impl RecognitionAdapter {
    /// Start `engine` and return the handle plus the event stream.
    ///
    /// The stream disconnects once the adapter stops, whether through
    /// [`stop`](Self::stop) or a [`RecognitionEvent::Closed`] condition.
    pub fn subscribe<E: RecognitionEngine>(
        engine: E,
        config: AdapterConfig,
    ) -> (Self, Receiver<RecognitionEvent>) {
        let (event_tx, event_rx) = bounded(config.channel_capacity.max(1));
        let (stop_tx, stop_rx) = bounded(1);
        let listening = Arc::new(AtomicBool::new(false));
        let engine_name = engine.name();

        let worker = AdapterWorker {
            engine,
            events: event_tx,
            stop_rx,
            listening: listening.clone(),
            config,
        };
        let handle = thread::spawn(move || worker.run());

        (
            Self {
                stop_tx: Some(stop_tx),
                handle: Some(handle),
                listening,
                engine_name,
            },
            event_rx,
        )
    }

    /// Whether the engine is currently running (false between a stop and its restart).
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine_name
    }

    /// Stop listening and wait for the engine thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnecting the stop channel is the stop signal
        self.stop_tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("recognition thread for '{}' panicked", self.engine_name);
        }
        self.listening.store(false, Ordering::SeqCst);
    }
}

impl Drop for RecognitionAdapter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct AdapterWorker<E: RecognitionEngine> {
    engine: E,
    events: Sender<RecognitionEvent>,
    stop_rx: Receiver<()>,
    listening: Arc<AtomicBool>,
    config: AdapterConfig,
}

impl<E: RecognitionEngine> AdapterWorker<E> {
    fn run(mut self) {
        let name = self.engine.name();

        if let Err(e) = self.engine.start() {
            tracing::warn!("failed to start recognition engine '{name}': {e}");
            self.deliver(RecognitionEvent::Closed {
                reason: e.to_string(),
            });
            return;
        }
        self.listening.store(true, Ordering::SeqCst);
        tracing::debug!("recognition engine '{name}' started");

        let mut should_restart = true;
        let mut restart_at: Option<Instant> = None;

        loop {
            match self.stop_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Disconnected) => break,
            }

            if let Some(at) = restart_at
                && Instant::now() >= at
            {
                restart_at = None;
                if should_restart && !self.listening.load(Ordering::SeqCst) {
                    match self.engine.start() {
                        Ok(()) => {
                            self.listening.store(true, Ordering::SeqCst);
                            tracing::debug!("recognition engine '{name}' restarted");
                            if !self.deliver(RecognitionEvent::Restarted) {
                                break;
                            }
                        }
                        Err(CuelineError::RecognitionAlreadyStarted) => {
                            self.listening.store(true, Ordering::SeqCst);
                        }
                        Err(e) => {
                            tracing::warn!("recognition engine '{name}' cannot restart: {e}");
                            self.deliver(RecognitionEvent::Closed {
                                reason: e.to_string(),
                            });
                            break;
                        }
                    }
                }
            }

            let Some(event) = self.engine.poll_event(self.config.poll_interval) else {
                continue;
            };

            match event {
                EngineEvent::Started => {
                    self.listening.store(true, Ordering::SeqCst);
                }
                EngineEvent::Result {
                    transcript,
                    is_final,
                } => {
                    tracing::trace!(is_final, "transcript: {transcript}");
                    let segment = TranscriptSegment::new(transcript, is_final, Instant::now());
                    if !self.deliver(RecognitionEvent::Transcript(segment)) {
                        break;
                    }
                }
                EngineEvent::Error(code) => {
                    let kind = RecognitionErrorKind::from_code(&code);
                    if kind.is_benign() {
                        tracing::debug!("recognition engine '{name}' reported {kind}");
                    } else {
                        tracing::warn!("recognition engine '{name}' error: {kind}");
                        if !self.deliver(RecognitionEvent::Error(kind.clone())) {
                            break;
                        }
                    }
                    if !kind.allows_restart() {
                        should_restart = false;
                    } else if should_restart {
                        restart_at = Some(Instant::now() + self.config.restart_delay);
                    }
                }
                EngineEvent::Ended => {
                    self.listening.store(false, Ordering::SeqCst);
                    if should_restart {
                        restart_at = Some(Instant::now() + self.config.restart_delay);
                    } else {
                        self.deliver(RecognitionEvent::Closed {
                            reason: "recognition ended and restart is disabled".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        self.engine.stop();
        self.listening.store(false, Ordering::SeqCst);
        tracing::debug!("recognition engine '{name}' stopped");
    }

    /// Send an event unless a stop arrives first. Returns false when the
    /// adapter should wind down.
    fn deliver(&self, event: RecognitionEvent) -> bool {
        select! {
            send(self.events, event) -> sent => sent.is_ok(),
            recv(self.stop_rx) -> _ => false,
        }
    }
}
