//! # weft-types
//!
//! Shared types, identifiers, error types, and solver constants
//! for the Weft soft-body collision solver.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other Weft crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod parallel;

pub use error::{WeftError, WeftResult};
pub use ids::{BoneIndex, ColliderId, ParticleId};
pub use parallel::ParallelConfig;
