//! Benchmark runner: executes scenarios with the collision solver and
//! collects metrics.
//!
//! Each outer step predicts positions under gravity, calls the solver
//! `iterations` times and commits the corrected positions:
//!
//! ```text
//! for each step:
//!   move colliders, advance bone spin, predict
//!   for it in 0..iterations:
//!     direct_apply            (SolveMode::Direct)
//!     cached_apply(it == 0)   (SolveMode::Cached)
//!   update velocities
//! ```

use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use weft_collider::{ColliderInstance, ColliderQuery, ShapeClass};
use weft_debug::InspectionHook;
use weft_math::RigidTransform;
use weft_solver::{ContactSink, SoftBodyCollisionSolver, SolverConfig};
use weft_types::constants::GRAVITY;
use weft_types::{WeftError, WeftResult};

use crate::config::SolveMode;
use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario in the given mode.
    ///
    /// Returns metrics for the completed run.
    pub fn run(scenario: &Scenario, mode: SolveMode) -> WeftResult<BenchmarkMetrics> {
        Self::run_with_hooks(scenario, mode, None, &mut [])
    }

    /// Run a single scenario, reporting contacts to `sink` and driving
    /// `hooks` at every step and iteration.
    pub fn run_with_hooks(
        scenario: &Scenario,
        mode: SolveMode,
        sink: Option<Arc<dyn ContactSink>>,
        hooks: &mut [&mut dyn InspectionHook],
    ) -> WeftResult<BenchmarkMetrics> {
        if !scenario.dt.is_finite() || scenario.dt <= 0.0 {
            return Err(WeftError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                scenario.dt
            )));
        }
        if scenario.iterations == 0 {
            return Err(WeftError::InvalidConfig("iterations must be at least 1".into()));
        }

        let mut solver = SoftBodyCollisionSolver::new(scenario.config.clone())?;
        if let Some(sink) = sink {
            solver = solver.with_contact_sink(sink);
        }

        let mut particles = scenario.particles.clone();
        let mut colliders = scenario.colliders.clone();
        let gravity = Vec3::new(0.0, 0.0, -GRAVITY);
        let dt = scenario.dt;

        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.timesteps as usize);
        let mut total_contacts: u64 = 0;
        let mut peak_planar_constraints = 0usize;
        let mut max_penetration = 0.0f32;

        let total_start = Instant::now();

        for step in 0..scenario.timesteps {
            let sim_time = step as f64 * dt as f64;
            for hook in hooks.iter_mut() {
                hook.on_step_begin(step, sim_time);
            }

            if scenario.collider_velocity != Vec3::ZERO {
                for collider in &mut colliders {
                    let next = RigidTransform::new(
                        collider.transform.translation + scenario.collider_velocity * dt,
                        collider.transform.rotation,
                    );
                    collider.move_to(next, dt);
                }
            }
            if let Some(spin) = &scenario.bone_spin {
                for collider in colliders.iter_mut().filter(|c| c.bone_map.is_some()) {
                    spin.advance(collider, dt)?;
                }
            }
            particles.predict(dt, gravity);

            let step_start = Instant::now();
            for iteration in 0..scenario.iterations {
                let report = match mode {
                    SolveMode::Direct => solver.direct_apply(particles.range(), &colliders, dt),
                    SolveMode::Cached => solver.cached_apply(particles.range(), &colliders, dt, iteration == 0),
                };
                total_contacts += report.contacts as u64;
                max_penetration = max_penetration.max(report.max_penetration);
                peak_planar_constraints = peak_planar_constraints.max(report.planar_constraints);
                for hook in hooks.iter_mut() {
                    hook.on_iteration(step, iteration, &report);
                }
            }
            step_times.push(step_start.elapsed().as_secs_f64());

            particles.update_velocities(dt);
            for hook in hooks.iter_mut() {
                hook.on_step_end(step, &particles.x);
            }
        }
        for hook in hooks.iter_mut() {
            hook.on_simulation_end();
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);

        let residual_penetration = residual_penetration(&particles.x, &colliders, &scenario.config);
        let min_height = particles.x.iter().map(|x| x.z).fold(f32::INFINITY, f32::min);

        tracing::debug!(
            scenario = scenario.kind.name(),
            mode = mode.name(),
            steps = scenario.timesteps,
            contacts = total_contacts,
            residual = residual_penetration,
            wall_time = total_wall_time,
            "benchmark_complete"
        );

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            mode: mode.name().to_string(),
            particle_count: particles.len(),
            collider_count: colliders.len(),
            timesteps: scenario.timesteps,
            iterations: scenario.iterations,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: min_step,
            max_step_time: max_step,
            total_contacts,
            peak_planar_constraints,
            max_penetration,
            residual_penetration,
            min_height,
        })
    }

    /// Run all scenarios in `mode` and return metrics for each.
    pub fn run_all(mode: SolveMode) -> WeftResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let scenario = Scenario::from_kind(kind)?;
            let metrics = Self::run(&scenario, mode)?;
            results.push(metrics);
        }
        Ok(results)
    }
}

/// Deepest penetration of any particle into an enabled collider's
/// surface (ignoring the contact thickness).
pub fn residual_penetration(positions: &[Vec3], colliders: &[ColliderInstance], config: &SolverConfig) -> f32 {
    let enabled = |class: ShapeClass| match class {
        ShapeClass::Simple => config.enable_simple_colliders,
        ShapeClass::Complex => config.enable_complex_colliders,
    };
    colliders
        .iter()
        .filter(|c| enabled(c.class()))
        .flat_map(|c| {
            positions.iter().map(move |&x| {
                let (phi, _) = c.shape.phi_with_normal(c.transform.inverse_transform_point(x));
                (-phi).max(0.0)
            })
        })
        .fold(0.0, f32::max)
}
