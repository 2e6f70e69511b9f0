//! # weft-bench
//!
//! Benchmark suite for the Weft collision solver.
//!
//! Provides procedural collision scenarios covering every collider
//! family, a runner for both solve modes, TOML simulation configs and
//! CSV/JSON metric export for regression tracking.

pub mod config;
pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use config::{SimulationConfig, SolveMode};
pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{particle_sheet, BoneSpin, Scenario, ScenarioKind};
