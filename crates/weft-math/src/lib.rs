//! # weft-math
//!
//! Geometric primitives for the Weft collision solver.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Quat`, etc.)
//! - Rigid transforms for collider frames
//! - Axis-aligned bounds used by batch-query early-outs
//! - Small vector helpers (safe normalization, tangent projection,
//!   closest points on segments)

pub mod aabb;
pub mod geometry;
pub mod transform;

pub use aabb::Aabb;
pub use transform::RigidTransform;

// Re-export glam types as the canonical math types for Weft.
pub use glam::{Mat3, Quat, Vec3};
