//! Optional contact sink for visualization and debugging.
//!
//! The solver reports every resolved contact to the sink when one is
//! installed. Without a sink the reporting path is skipped entirely.

use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use weft_types::{ColliderId, ParticleId};

/// One resolved contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugContact {
    pub particle: ParticleId,
    /// Collider index, or the recorded collider for cached planes.
    pub collider: ColliderId,
    /// Particle position after the push.
    pub position: [f32; 3],
    /// World-space push direction.
    pub normal: [f32; 3],
    /// Push distance.
    pub penetration: f32,
}

impl DebugContact {
    pub fn new(particle: ParticleId, collider: ColliderId, position: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            particle,
            collider,
            position: position.to_array(),
            normal: normal.to_array(),
            penetration,
        }
    }
}

/// Receiver of resolved contacts.
///
/// Called concurrently from the particle loops.
pub trait ContactSink: Send + Sync {
    fn record(&self, contact: &DebugContact);

    /// Returns the sink's name.
    fn name(&self) -> &str;
}

/// In-memory sink collecting contacts behind a single lock.
#[derive(Debug, Default)]
pub struct ContactLog {
    contacts: Mutex<Vec<DebugContact>>,
}

impl ContactLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DebugContact>> {
        self.contacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns the recorded contacts.
    pub fn take(&self) -> Vec<DebugContact> {
        std::mem::take(&mut *self.lock())
    }
}

impl ContactSink for ContactLog {
    fn record(&self, contact: &DebugContact) {
        self.lock().push(*contact);
    }

    fn name(&self) -> &str {
        "contact_log"
    }
}
