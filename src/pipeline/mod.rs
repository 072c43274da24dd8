//! Threaded performance pipeline.
//!
//! Each station runs in its own thread, connected by bounded crossbeam
//! channels for backpressure:
//!
//! ```text
//! recognizer ─┐
//! ticker ─────┼─► PerformanceStation ─► SinkStation ─► PipelineHandle::wait
//! controls ───┘        (speaker)         (EventSink)
//! ```

pub mod error;
pub mod orchestrator;
pub mod performance_station;
pub mod sink;
pub mod station;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use orchestrator::{PerformancePipeline, PipelineConfig, PipelineHandle};
pub use performance_station::{Cue, PerformanceStation};
pub use sink::{CollectorSink, EventSink, JsonLinesSink};
pub use station::{Station, StationRunner};
