//! Simulation config: which scenario to run, how, and for how long.
//!
//! Loaded from TOML by the `weft simulate` command:
//!
//! ```toml
//! scenario = "sphere_drop"
//! mode = "cached"
//! steps = 120
//! iterations = 4
//! dt = 0.016666668
//! record = "sphere_drop.weft"
//!
//! [solver]
//! friction_coefficient = 0.3
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use weft_solver::SolverConfig;
use weft_types::constants::{DEFAULT_DT, DEFAULT_ITERATIONS};
use weft_types::{WeftError, WeftResult};

use crate::scenarios::{Scenario, ScenarioKind};

/// How the runner calls the solver each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMode {
    /// `direct_apply` on every iteration.
    Direct,
    /// `cached_apply`, generating on the first iteration of each step.
    #[default]
    Cached,
}

impl SolveMode {
    pub fn all() -> &'static [SolveMode] {
        &[SolveMode::Direct, SolveMode::Cached]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolveMode::Direct => "direct",
            SolveMode::Cached => "cached",
        }
    }
}

impl fmt::Display for SolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolveMode {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(SolveMode::Direct),
            "cached" => Ok(SolveMode::Cached),
            other => Err(WeftError::InvalidConfig(format!(
                "unknown mode '{other}'. Available: direct, cached"
            ))),
        }
    }
}

/// A simulation run described in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scenario: ScenarioKind,
    pub mode: SolveMode,
    /// Outer steps. Zero keeps the scenario's own count.
    pub steps: u32,
    /// Solver calls per step.
    pub iterations: u32,
    /// Timestep size (seconds).
    pub dt: f32,
    /// Replaces the scenario's solver config when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
    /// Where to write a binary contact recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::SphereDrop,
            mode: SolveMode::Cached,
            steps: 0,
            iterations: DEFAULT_ITERATIONS,
            dt: DEFAULT_DT,
            solver: None,
            record: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> WeftResult<()> {
        if self.iterations == 0 {
            return Err(WeftError::InvalidConfig("iterations must be at least 1".into()));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(WeftError::InvalidConfig(format!(
                "dt must be finite and positive, got {}",
                self.dt
            )));
        }
        if let Some(solver) = &self.solver {
            solver.validate()?;
        }
        Ok(())
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(text: &str) -> WeftResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| WeftError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> WeftResult<String> {
        toml::to_string_pretty(self).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> WeftResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Builds the configured scenario with this config's overrides applied.
    pub fn build_scenario(&self) -> WeftResult<Scenario> {
        let mut scenario = Scenario::from_kind(self.scenario)?;
        if self.steps > 0 {
            scenario.timesteps = self.steps;
        }
        scenario.iterations = self.iterations;
        scenario.dt = self.dt;
        if let Some(solver) = &self.solver {
            scenario.config = solver.clone();
        }
        Ok(scenario)
    }
}
