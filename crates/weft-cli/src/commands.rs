//! CLI command implementations.

use std::sync::Arc;

use weft_bench::{BenchmarkMetrics, BenchmarkRunner, Scenario, ScenarioKind, SimulationConfig, SolveMode};
use weft_debug::{ContactRecording, FrameRecorder, InspectionHook};
use weft_solver::{ContactLog, ContactSink, SolverConfig};

/// Number of frames listed individually by `inspect`.
const INSPECT_FRAME_LIMIT: usize = 10;

fn print_metrics(metrics: &BenchmarkMetrics) {
    println!("  Wall time:     {:.3}s", metrics.total_wall_time);
    println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
    println!("  Contacts:      {}", metrics.total_contacts);
    println!("  Planes (peak): {}", metrics.peak_planar_constraints);
    println!("  Max depth:     {:.6}m", metrics.max_penetration);
    println!("  Residual:      {:.6}m", metrics.residual_penetration);
}

/// Run a simulation from config file.
pub fn simulate(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Simulation");
    println!("───────────────");
    println!("Config: {config_path}");
    println!();

    let config = SimulationConfig::load(config_path)?;
    let scenario = config.build_scenario()?;

    println!(
        "Running: {} ({} particles, {} colliders, {} steps × {} iterations, {})",
        scenario.kind.name(),
        scenario.particle_count(),
        scenario.colliders.len(),
        scenario.timesteps,
        scenario.iterations,
        config.mode,
    );

    let metrics = match &config.record {
        Some(path) => {
            let log = Arc::new(ContactLog::new());
            let mut recorder = FrameRecorder::new(scenario.kind.name(), Arc::clone(&log));
            let sink: Arc<dyn ContactSink> = log;
            let metrics = {
                let mut hooks: [&mut dyn InspectionHook; 1] = [&mut recorder];
                BenchmarkRunner::run_with_hooks(&scenario, config.mode, Some(sink), &mut hooks)
                    .map_err(|e| format!("Simulation failed: {e}"))?
            };
            let recording = recorder.into_recording();
            recording.save(path)?;
            println!("Recording written to: {} ({} frames)", path.display(), recording.frames.len());
            metrics
        }
        None => BenchmarkRunner::run(&scenario, config.mode).map_err(|e| format!("Simulation failed: {e}"))?,
    };

    println!();
    print_metrics(&metrics);
    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    only: Option<ScenarioKind>,
    mode: SolveMode,
    steps: Option<u32>,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Benchmark Suite");
    println!("════════════════════");
    println!("Mode: {mode}");
    println!();

    let scenarios: Vec<ScenarioKind> = match only {
        Some(kind) => vec![kind],
        None => ScenarioKind::all().to_vec(),
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind)?;
        if let Some(steps) = steps.filter(|&s| s > 0) {
            scenario.timesteps = steps;
        }

        println!(
            "Running: {} ({} particles, {} colliders, {} steps)",
            kind.name(),
            scenario.particle_count(),
            scenario.colliders.len(),
            scenario.timesteps,
        );

        let metrics = BenchmarkRunner::run(&scenario, mode).map_err(|e| format!("Benchmark failed: {e}"))?;
        print_metrics(&metrics);
        println!();

        all_metrics.push(metrics);
    }

    match output_path {
        Some(path) if path.ends_with(".json") => {
            std::fs::write(path, BenchmarkMetrics::to_json(&all_metrics)?)?;
            println!("Results written to: {path}");
        }
        Some(path) => {
            std::fs::write(path, BenchmarkMetrics::to_csv(&all_metrics))?;
            println!("Results written to: {path}");
        }
        None => {
            println!("CSV Output:");
            println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
        }
    }

    Ok(())
}

/// Inspect a contact recording.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Recording Inspector");
    println!("────────────────────────");
    println!();

    let recording = ContactRecording::load(path).map_err(|e| format!("Failed to read recording: {e}"))?;
    let stats = recording.stats();

    println!("Scenario:     {}", recording.scenario);
    println!("Frames:       {}", stats.frames);
    println!("Particles:    {}", stats.particles);
    println!("Contacts:     {}", stats.total_contacts);
    println!("Max depth:    {:.6}m", stats.max_penetration);
    match stats.busiest_frame {
        Some(frame) => println!("Busiest:      frame {frame}"),
        None => println!("Busiest:      (no contacts)"),
    }

    if !recording.frames.is_empty() {
        println!();
        println!("frame  sim_time  contacts  max_depth");
        for frame in recording.frames.iter().take(INSPECT_FRAME_LIMIT) {
            println!(
                "{:>5}  {:>8.4}  {:>8}  {:.6}",
                frame.frame,
                frame.sim_time,
                frame.contacts.len(),
                frame.max_penetration()
            );
        }
        if recording.frames.len() > INSPECT_FRAME_LIMIT {
            println!("... {} more frames", recording.frames.len() - INSPECT_FRAME_LIMIT);
        }
    }

    Ok(())
}

/// Validate a simulation or solver config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Weft Validator");
    println!("──────────────");
    println!();

    if !path.ends_with(".toml") {
        println!("Unsupported file format. Use .toml (simulation or solver config).");
        return Ok(());
    }

    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;
    let is_simulation = ["scenario", "mode", "steps", "iterations", "dt", "solver", "record"]
        .iter()
        .any(|key| table.contains_key(*key));

    if is_simulation {
        println!("Validating simulation config: {path}");
        match SimulationConfig::from_toml_str(&content) {
            Ok(config) => println!(
                "✅ Config is valid ({} / {}).",
                config.scenario, config.mode
            ),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    } else {
        println!("Validating solver config: {path}");
        match SolverConfig::from_toml_str(&content) {
            Ok(config) => println!("✅ Config is valid (thickness {:.4}m).", config.thickness()),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    }

    Ok(())
}
