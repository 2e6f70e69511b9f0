//! Per-call contact statistics.

use serde::{Deserialize, Serialize};

/// Summary of one solver call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionReport {
    /// Number of corrections applied (a particle touching two colliders counts twice).
    pub contacts: usize,
    /// Largest single push distance.
    pub max_penetration: f32,
    /// Length of the dense cached-plane list after the call.
    pub planar_constraints: usize,
}

/// Running contact count and depth, combined across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ContactTally {
    pub contacts: usize,
    pub max_penetration: f32,
}

impl ContactTally {
    #[inline]
    pub fn add(&mut self, depth: f32) {
        self.contacts += 1;
        self.max_penetration = self.max_penetration.max(depth);
    }

    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            contacts: self.contacts + other.contacts,
            max_penetration: self.max_penetration.max(other.max_penetration),
        }
    }
}
