//! Rigid transforms for collider frames.
//!
//! Colliders are described in their own local frame. The solver moves
//! particle positions into that frame for distance queries and moves
//! normals and contact points back out to world space.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A rotation followed by a translation: `world = rotation * local + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// World-space position of the local origin.
    pub translation: Vec3,
    /// Orientation of the local frame (unit quaternion).
    pub rotation: Quat,
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a transform from a translation and rotation.
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation }
    }

    /// Creates a pure translation.
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Maps a local point to world space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.translation
    }

    /// Maps a world point into the local frame.
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.translation)
    }

    /// Rotates a local direction to world space.
    #[inline]
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Rotates a world direction into the local frame.
    #[inline]
    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            translation: inv_rotation * -self.translation,
            rotation: inv_rotation,
        }
    }

    /// Composes two transforms: `self * other` applies `other` first.
    pub fn mul_transform(&self, other: &RigidTransform) -> Self {
        Self {
            translation: self.transform_point(other.translation),
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
