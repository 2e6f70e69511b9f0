//! Inspection hooks for live debugging.
//!
//! Hooks are called by the simulation loop at fixed points to capture
//! state without changing the solver.

use std::sync::Arc;

use glam::Vec3;
use weft_solver::{CollisionReport, ContactLog};

use crate::recording::ContactRecording;
use crate::snapshot::FrameSnapshot;

/// Trait for simulation inspection hooks.
///
/// # Lifecycle
///
/// ```text
/// for each outer step:
///   hook.on_step_begin(...)
///   for each relaxation iteration:
///     hook.on_iteration(...)
///   hook.on_step_end(...)
/// hook.on_simulation_end()
/// ```
pub trait InspectionHook: Send {
    /// Called at the beginning of each outer step.
    fn on_step_begin(&mut self, step: u32, sim_time: f64) {
        let _ = (step, sim_time);
    }

    /// Called after each solver call.
    fn on_iteration(&mut self, step: u32, iteration: u32, report: &CollisionReport) {
        let _ = (step, iteration, report);
    }

    /// Called at the end of each outer step with the committed positions.
    fn on_step_end(&mut self, step: u32, positions: &[Vec3]) {
        let _ = (step, positions);
    }

    /// Called when the simulation completes.
    fn on_simulation_end(&mut self) {}

    /// Returns the hook's name for logging.
    fn name(&self) -> &str;
}

/// Hook that turns each outer step into a [`FrameSnapshot`].
///
/// Contacts are drained from the [`ContactLog`] the solver reports to.
pub struct FrameRecorder {
    log: Arc<ContactLog>,
    recording: ContactRecording,
    sim_time: f64,
    last_report: CollisionReport,
}

impl FrameRecorder {
    /// Creates a recorder reading from `log`, which must also be
    /// installed as the solver's contact sink.
    pub fn new(scenario: impl Into<String>, log: Arc<ContactLog>) -> Self {
        Self {
            log,
            recording: ContactRecording::new(scenario),
            sim_time: 0.0,
            last_report: CollisionReport::default(),
        }
    }

    pub fn recording(&self) -> &ContactRecording {
        &self.recording
    }

    pub fn into_recording(self) -> ContactRecording {
        self.recording
    }
}

impl InspectionHook for FrameRecorder {
    fn on_step_begin(&mut self, _step: u32, sim_time: f64) {
        self.sim_time = sim_time;
        // Contacts from outside the step do not belong to this frame.
        self.log.take();
    }

    fn on_iteration(&mut self, _step: u32, _iteration: u32, report: &CollisionReport) {
        self.last_report = *report;
    }

    fn on_step_end(&mut self, step: u32, positions: &[Vec3]) {
        let contacts = self.log.take();
        self.recording
            .push(FrameSnapshot::new(step, self.sim_time, positions, contacts, self.last_report));
        self.last_report = CollisionReport::default();
    }

    fn name(&self) -> &str {
        "frame_recorder"
    }
}
