//! Per-frame snapshot of particle positions and resolved contacts.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use weft_solver::{CollisionReport, DebugContact};
use weft_types::{WeftError, WeftResult};

/// Particle positions and contacts at the end of one outer step.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Outer step index.
    pub frame: u32,
    /// Simulation time in seconds.
    pub sim_time: f64,
    /// Particle positions (flat: [x0, y0, z0, x1, y1, z1, ...]).
    pub positions: Vec<f32>,
    /// Contacts resolved during the step, across all iterations.
    pub contacts: Vec<DebugContact>,
    /// Report of the last solver call of the step.
    pub report: CollisionReport,
}

impl FrameSnapshot {
    /// Creates a snapshot from particle positions.
    pub fn new(
        frame: u32,
        sim_time: f64,
        positions: &[Vec3],
        contacts: Vec<DebugContact>,
        report: CollisionReport,
    ) -> Self {
        let mut flat = Vec::with_capacity(positions.len() * 3);
        for p in positions {
            flat.extend_from_slice(&p.to_array());
        }
        Self {
            frame,
            sim_time,
            positions: flat,
            contacts,
            report,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Position of particle `index`.
    pub fn position(&self, index: usize) -> Option<Vec3> {
        let chunk = self.positions.get(index * 3..index * 3 + 3)?;
        Some(Vec3::from_slice(chunk))
    }

    /// Deepest contact of the frame.
    pub fn max_penetration(&self) -> f32 {
        self.contacts.iter().map(|c| c.penetration).fold(0.0, f32::max)
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> WeftResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| WeftError::Serialization(format!("snapshot encode failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> WeftResult<Self> {
        bincode::deserialize(data).map_err(|e| WeftError::Serialization(format!("snapshot decode failed: {e}")))
    }
}
