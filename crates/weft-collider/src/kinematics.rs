//! Rigid motion of a collider (or of one of its bones).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear and angular velocity about an origin.
///
/// Used as the friction reference: the velocity of the collider surface
/// at a contact point is `v + w × (point − origin)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    /// Center of rotation (world space).
    pub origin: Vec3,
    /// Linear velocity (m/s).
    pub linear_velocity: Vec3,
    /// Angular velocity (rad/s, axis × rate).
    pub angular_velocity: Vec3,
}

impl Kinematics {
    /// Creates a reference from an origin and its velocities.
    pub fn new(origin: Vec3, linear_velocity: Vec3, angular_velocity: Vec3) -> Self {
        Self {
            origin,
            linear_velocity,
            angular_velocity,
        }
    }

    /// A reference translating with `velocity` and not rotating.
    pub fn linear(velocity: Vec3) -> Self {
        Self {
            origin: Vec3::ZERO,
            linear_velocity: velocity,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Velocity of the rigid motion at a world point.
    #[inline]
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.origin)
    }
}
