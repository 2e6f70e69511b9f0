//! Particle buffers.
//!
//! [`ParticleRange`] is the borrowed view every solver call works on.
//! [`ParticleState`] owns the buffers and performs the outer PBD step
//! around the collision solve.

use glam::Vec3;
use weft_types::{WeftError, WeftResult};

/// Mutable view of the particles handed to one solver call.
///
/// All three slices have the same length. Particles with `inv_m == 0`
/// are immovable and never written.
pub struct ParticleRange<'a> {
    /// Positions at the start of the step.
    pub x: &'a [Vec3],
    /// Predicted positions, corrected in place.
    pub p: &'a mut [Vec3],
    /// Inverse masses.
    pub inv_m: &'a [f32],
}

impl<'a> ParticleRange<'a> {
    pub fn new(x: &'a [Vec3], p: &'a mut [Vec3], inv_m: &'a [f32]) -> Self {
        debug_assert_eq!(x.len(), p.len(), "prior and predicted positions differ in length");
        debug_assert_eq!(x.len(), inv_m.len(), "positions and inverse masses differ in length");
        Self { x, p, inv_m }
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }
}

/// Owned particle buffers for a simulation.
#[derive(Debug, Clone)]
pub struct ParticleState {
    // ─── Position at the start of the step ───
    pub x: Vec<Vec3>,

    // ─── Predicted position ───
    pub p: Vec<Vec3>,

    // ─── Velocity ───
    pub v: Vec<Vec3>,

    // ─── Inverse mass (0 = pinned) ───
    pub inv_m: Vec<f32>,
}

impl ParticleState {
    /// Creates particles at rest.
    pub fn new(positions: Vec<Vec3>, inv_m: Vec<f32>) -> WeftResult<Self> {
        if positions.len() != inv_m.len() {
            return Err(WeftError::InvalidConfig(format!(
                "inverse mass array length ({}) != particle count ({})",
                inv_m.len(),
                positions.len()
            )));
        }
        if let Some(bad) = inv_m.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(WeftError::InvalidConfig(format!(
                "inverse masses must be finite and non-negative, got {bad}"
            )));
        }
        let n = positions.len();
        Ok(Self {
            p: positions.clone(),
            x: positions,
            v: vec![Vec3::ZERO; n],
            inv_m,
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Predicts positions: `p = x + dt * v + dt² * gravity`.
    ///
    /// Pinned particles keep their position.
    pub fn predict(&mut self, dt: f32, gravity: Vec3) {
        let dt2 = dt * dt;
        for i in 0..self.len() {
            if self.inv_m[i] == 0.0 {
                self.p[i] = self.x[i];
                continue;
            }
            self.p[i] = self.x[i] + dt * self.v[i] + dt2 * gravity;
        }
    }

    /// Derives velocities from the corrected positions and commits them.
    pub fn update_velocities(&mut self, dt: f32) {
        let inv_dt = 1.0 / dt;
        for i in 0..self.len() {
            self.v[i] = (self.p[i] - self.x[i]) * inv_dt;
            self.x[i] = self.p[i];
        }
    }

    /// Borrows the buffers as a solver range.
    pub fn range(&mut self) -> ParticleRange<'_> {
        ParticleRange::new(&self.x, &mut self.p, &self.inv_m)
    }
}
