//! Solver configuration.
//!
//! Parameters that control how contacts are detected and resolved:
//! shell thickness, friction, CCD and which collider categories are
//! cached as planes between relaxation iterations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_types::constants::{
    DEFAULT_CCD_MARGIN, DEFAULT_COLLISION_THICKNESS, DEFAULT_SOFT_BODY_THICKNESS, FRICTION_ENABLE_THRESHOLD,
};
use weft_types::{ParallelConfig, WeftError, WeftResult};

/// Configuration for the collision solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Collider-side contact offset (meters).
    pub collision_thickness: f32,

    /// Particle-side contact offset (meters). Added to
    /// `collision_thickness` to get the activation depth.
    pub soft_body_collision_thickness: f32,

    /// Coulomb friction coefficient. Values at or below 1e-3 disable friction.
    pub friction_coefficient: f32,

    /// Resolve contacts with swept queries instead of the discrete pass.
    pub use_ccd: bool,

    /// Extra push beyond the contact plane after a swept hit (meters).
    pub ccd_margin: f32,

    pub enable_simple_colliders: bool,
    pub enable_complex_colliders: bool,

    /// Cache simple-collider contacts as planes during generate passes.
    pub use_planar_constraint_for_simple_colliders: bool,

    /// Cache complex-collider contacts as planes during generate passes.
    pub use_planar_constraint_for_complex_colliders: bool,

    /// Parallel-for settings for particle loops.
    pub parallel: ParallelConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            collision_thickness: DEFAULT_COLLISION_THICKNESS,
            soft_body_collision_thickness: DEFAULT_SOFT_BODY_THICKNESS,
            friction_coefficient: 0.2,
            use_ccd: false,
            ccd_margin: DEFAULT_CCD_MARGIN,
            enable_simple_colliders: true,
            enable_complex_colliders: true,
            use_planar_constraint_for_simple_colliders: false,
            use_planar_constraint_for_complex_colliders: false,
            parallel: ParallelConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Exact resolution of every collider on every call.
    pub fn exact() -> Self {
        Self::default()
    }

    /// Caches complex colliders as planes between generate passes.
    pub fn cached() -> Self {
        Self {
            use_planar_constraint_for_complex_colliders: true,
            ..Default::default()
        }
    }

    /// Swept collision for fast-moving particles.
    pub fn ccd() -> Self {
        Self {
            use_ccd: true,
            ..Default::default()
        }
    }

    /// Total activation depth.
    #[inline]
    pub fn thickness(&self) -> f32 {
        self.collision_thickness + self.soft_body_collision_thickness
    }

    /// Returns true if the friction coefficient is large enough to matter.
    #[inline]
    pub fn friction_enabled(&self) -> bool {
        self.friction_coefficient > FRICTION_ENABLE_THRESHOLD
    }

    /// Checks that every parameter is in range.
    pub fn validate(&self) -> WeftResult<()> {
        let non_negative = [
            ("collision_thickness", self.collision_thickness),
            ("soft_body_collision_thickness", self.soft_body_collision_thickness),
            ("friction_coefficient", self.friction_coefficient),
            ("ccd_margin", self.ccd_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(WeftError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.parallel.min_batch_size == 0 {
            return Err(WeftError::InvalidConfig("parallel.min_batch_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(text: &str) -> WeftResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| WeftError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> WeftResult<String> {
        toml::to_string_pretty(self).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> WeftResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
