//! # weft-solver
//!
//! Position-based collision resolution between simulated particles and
//! rigid, skinned and implicit colliders.
//!
//! ## Key Types
//!
//! - [`SoftBodyCollisionSolver`]: entry point with direct and cached apply
//! - [`SolverConfig`]: thickness, friction, CCD and caching switches
//! - [`ParticleRange`] / [`ParticleState`]: particle buffers
//! - [`PlanarConstraintCache`]: contact planes replayed between iterations
//! - [`ContactSink`] / [`ContactLog`]: optional contact reporting

mod ccd;
pub mod config;
pub mod debug;
mod dispatch;
pub mod friction;
pub mod one_sided;
mod parallel;
pub mod particles;
pub mod planar;
pub mod report;
pub mod solver;

pub use config::SolverConfig;
pub use debug::{ContactLog, ContactSink, DebugContact};
pub use friction::apply_friction;
pub use one_sided::one_sided_correction;
pub use particles::{ParticleRange, ParticleState};
pub use planar::{ContactPlane, PlanarConstraint, PlanarConstraintCache};
pub use report::CollisionReport;
pub use solver::SoftBodyCollisionSolver;
