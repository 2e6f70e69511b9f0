//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};
use weft_types::{WeftError, WeftResult};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Solve mode name (`direct` or `cached`).
    pub mode: String,
    pub particle_count: usize,
    pub collider_count: usize,
    /// Number of timesteps executed.
    pub timesteps: u32,
    /// Solver calls per timestep.
    pub iterations: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time spent in the solver per timestep (seconds).
    pub avg_step_time: f64,
    /// Minimum step time.
    pub min_step_time: f64,
    /// Maximum step time.
    pub max_step_time: f64,
    /// Contacts resolved over the whole run, summed over iterations.
    pub total_contacts: u64,
    /// Largest planar constraint list after a generate pass.
    pub peak_planar_constraints: usize,
    /// Deepest correction applied during the run (meters).
    pub max_penetration: f32,
    /// Deepest remaining penetration at the end of the run (meters).
    pub residual_penetration: f32,
    /// Lowest particle height at the end of the run.
    pub min_height: f32,
}

impl BenchmarkMetrics {
    /// Format as a CSV row (header + data).
    pub fn to_csv_header() -> String {
        "scenario,mode,particle_count,collider_count,timesteps,iterations,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,total_contacts,peak_planar_constraints,max_penetration,residual_penetration,min_height".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{},{},{:.6},{:.6},{:.6}",
            self.scenario,
            self.mode,
            self.particle_count,
            self.collider_count,
            self.timesteps,
            self.iterations,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.total_contacts,
            self.peak_planar_constraints,
            self.max_penetration,
            self.residual_penetration,
            self.min_height,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// Format multiple metrics as a pretty-printed JSON array.
    pub fn to_json(metrics: &[BenchmarkMetrics]) -> WeftResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| WeftError::Serialization(e.to_string()))
    }
}
