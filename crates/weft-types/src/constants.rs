//! Physical constants and solver defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default number of relaxation iterations per outer timestep.
pub const DEFAULT_ITERATIONS: u32 = 4;

/// Default collider-side collision thickness (meters).
pub const DEFAULT_COLLISION_THICKNESS: f32 = 0.01;

/// Default cloth-side collision thickness (meters).
pub const DEFAULT_SOFT_BODY_THICKNESS: f32 = 0.0;

/// Friction coefficients at or below this value disable friction entirely.
pub const FRICTION_ENABLE_THRESHOLD: f32 = 1.0e-3;

/// Minimum tangential slip length for which friction is applied.
pub const SLIP_EPSILON: f32 = 1.0e-8;

/// Default extra distance a CCD correction pushes past the contact plane.
pub const DEFAULT_CCD_MARGIN: f32 = 1.0e-4;

/// Default minimum particle count per parallel work item.
pub const DEFAULT_PARALLEL_MIN_BATCH: usize = 128;

/// Epsilon for floating-point comparisons and degenerate vectors.
pub const EPSILON: f32 = 1.0e-7;
