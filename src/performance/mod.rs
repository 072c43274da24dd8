//! Script-driven performance: who says which line, and when to move on.

pub mod controller;
pub mod script;
pub mod speaker;

pub use controller::{
    Control, PerformanceController, PerformanceEvent, PerformanceSettings, PerformanceStatus,
};
pub use script::{Character, LineKind, Performer, Script, ScriptLine};
pub use speaker::{MockSpeaker, SilentSpeaker, Speaker};
