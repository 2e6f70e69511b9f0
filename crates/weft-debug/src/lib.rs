//! # weft-debug
//!
//! Inspection hooks and contact recordings for debugging collision
//! issues. Recordings are serialized to binary for replay and offline
//! inspection.

pub mod hooks;
pub mod recording;
pub mod snapshot;

pub use hooks::{FrameRecorder, InspectionHook};
pub use recording::{ContactRecording, RecordingStats};
pub use snapshot::FrameSnapshot;
