//! Integration tests for weft-bench.

use std::sync::Arc;

use glam::{Quat, Vec3};

use weft_bench::config::{SimulationConfig, SolveMode};
use weft_bench::metrics::BenchmarkMetrics;
use weft_bench::runner::BenchmarkRunner;
use weft_bench::scenarios::{particle_sheet, BoneSpin, Scenario, ScenarioKind};
use weft_collider::Shape;
use weft_debug::{FrameRecorder, InspectionHook};
use weft_solver::{ContactLog, ContactSink};
use weft_math::RigidTransform;
use weft_types::{BoneIndex, WeftError};

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn particle_sheet_layout() {
    let sheet = particle_sheet(4, 1.0, 0.3).unwrap();
    assert_eq!(sheet.len(), 25); // 5×5
    assert!(sheet.x.iter().all(|p| (p.z - 0.3).abs() < 1e-6));
    assert!((sheet.x[0].x + 0.5).abs() < 1e-6);
    assert!((sheet.x[24].x - 0.5).abs() < 1e-6);
    assert!(sheet.inv_m.iter().all(|&w| w > 0.0));
    assert_eq!(sheet.x, sheet.p);
}

#[test]
fn sphere_drop_setup() {
    let s = Scenario::sphere_drop().unwrap();
    assert_eq!(s.kind, ScenarioKind::SphereDrop);
    assert_eq!(s.particle_count(), 289); // 17×17
    assert_eq!(s.colliders.len(), 2);
    assert!(s.colliders.iter().all(|c| c.shape.is_simple()));
}

#[test]
fn capsule_opening_setup() {
    let s = Scenario::capsule_opening().unwrap();
    let pinned = s.particles.inv_m.iter().filter(|&&w| w == 0.0).count();
    assert_eq!(pinned, 17); // one edge row
    assert!(s.colliders[0].shape.one_sided_split().is_some());
    assert!(s.config.use_planar_constraint_for_simple_colliders);
}

#[test]
fn complex_scenarios_use_complex_colliders() {
    for kind in [ScenarioKind::SkinnedLattice, ScenarioKind::NeuralGround] {
        let s = Scenario::from_kind(kind).unwrap();
        assert!(
            s.colliders.iter().all(|c| c.shape.is_complex()),
            "{} should only hold complex colliders",
            kind.name()
        );
    }
}

#[test]
fn fast_projectile_uses_ccd() {
    let s = Scenario::fast_projectile().unwrap();
    assert!(s.config.use_ccd);
    // Faster than the slab is thick, per step.
    let per_step = s.particles.v[0].length() * s.dt;
    assert!(per_step > 0.02 * 10.0);
}

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 6);
    for &kind in ScenarioKind::all() {
        let parsed: ScenarioKind = kind.name().parse().unwrap();
        assert_eq!(parsed, kind);
        assert_eq!(kind.to_string(), kind.name());
    }
}

#[test]
fn unknown_scenario_name() {
    let err = "hanging_sheet".parse::<ScenarioKind>().unwrap_err();
    assert!(matches!(err, WeftError::InvalidConfig(_)));
    assert!(err.to_string().contains("sphere_drop"));
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_all_scenarios_in_both_modes() {
    for &mode in SolveMode::all() {
        for &kind in ScenarioKind::all() {
            let mut scenario = Scenario::from_kind(kind).unwrap();
            scenario.timesteps = 10;
            let metrics = BenchmarkRunner::run(&scenario, mode).unwrap();

            assert_eq!(metrics.scenario, kind.name());
            assert_eq!(metrics.mode, mode.name());
            assert_eq!(metrics.timesteps, 10);
            assert_eq!(metrics.particle_count, scenario.particle_count());
            assert!(metrics.total_wall_time >= 0.0);
            assert!(metrics.min_height.is_finite(), "{kind} / {mode}");
        }
    }
}

#[test]
fn sphere_drop_resolves_contacts() {
    let mut scenario = Scenario::sphere_drop().unwrap();
    scenario.timesteps = 40;
    for &mode in SolveMode::all() {
        let metrics = BenchmarkRunner::run(&scenario, mode).unwrap();
        assert!(metrics.total_contacts > 0, "{mode}: sheet never reached the sphere");
        assert!(
            metrics.residual_penetration < 1e-3,
            "{mode}: residual penetration {}",
            metrics.residual_penetration
        );
    }
}

#[test]
fn level_set_drape_resolves_contacts() {
    let mut scenario = Scenario::level_set_drape().unwrap();
    scenario.timesteps = 40;
    let metrics = BenchmarkRunner::run(&scenario, SolveMode::Direct).unwrap();
    assert!(metrics.total_contacts > 0);
    assert!(metrics.residual_penetration < 0.02, "residual {}", metrics.residual_penetration);
}

#[test]
fn skinned_lattice_caches_planes() {
    let mut scenario = Scenario::skinned_lattice().unwrap();
    scenario.timesteps = 30;

    let cached = BenchmarkRunner::run(&scenario, SolveMode::Cached).unwrap();
    assert!(cached.total_contacts > 0);
    assert!(cached.peak_planar_constraints > 0);
    assert!(cached.residual_penetration < 0.02, "residual {}", cached.residual_penetration);

    let direct = BenchmarkRunner::run(&scenario, SolveMode::Direct).unwrap();
    assert_eq!(direct.peak_planar_constraints, 0);
    assert!(direct.residual_penetration < 0.02, "residual {}", direct.residual_penetration);
}

#[test]
fn bone_spin_poses_lattice_and_external_bone() {
    let scenario = Scenario::skinned_lattice().unwrap();
    let spin = scenario.bone_spin.unwrap();
    let mut collider = scenario.colliders[0].clone();
    spin.advance(&mut collider, 0.5).unwrap();

    let Shape::WeightedLatticeLevelSet(lattice) = &*collider.shape else {
        panic!("skinned lattice collider");
    };
    assert_eq!(lattice.bone_poses()[0], RigidTransform::IDENTITY);
    let (axis, angle) = lattice.bone_poses()[1].rotation.to_axis_angle();
    assert!((angle - 0.2).abs() < 1e-4, "angle = {angle}");
    assert!((axis - Vec3::Y).length() < 1e-4, "axis = {axis}");

    let reference = collider.reference_kinematics(Some(BoneIndex(1)));
    assert!((reference.angular_velocity - Vec3::new(0.0, 0.2, 0.0)).length() < 1e-6);

    // The scenario's own shape is shared, not modified.
    let Shape::WeightedLatticeLevelSet(original) = &*scenario.colliders[0].shape else {
        panic!("skinned lattice collider");
    };
    assert_eq!(original.bone_poses()[1].rotation, Quat::from_rotation_y(0.1));
}

#[test]
fn bone_spin_rejects_unskinned_collider() {
    let spin = BoneSpin {
        bone: 0,
        external: 0,
        angular_velocity: Vec3::Y,
    };
    let mut sphere = Scenario::sphere_drop().unwrap().colliders[0].clone();
    assert!(matches!(spin.advance(&mut sphere, 0.1), Err(WeftError::InvalidConfig(_))));

    let mut lattice = Scenario::skinned_lattice().unwrap().colliders[0].clone();
    let unmapped = BoneSpin { external: 3, ..spin };
    assert!(unmapped.advance(&mut lattice, 0.1).is_err());
}

#[test]
fn neural_ground_holds_the_sheet() {
    let mut scenario = Scenario::neural_ground().unwrap();
    scenario.timesteps = 40;
    for &mode in SolveMode::all() {
        let metrics = BenchmarkRunner::run(&scenario, mode).unwrap();
        assert!(metrics.total_contacts > 0);
        // Ground plane sits at z = -0.3.
        assert!(metrics.min_height > -0.3, "{mode}: min height {}", metrics.min_height);
    }
}

#[test]
fn fast_projectile_does_not_tunnel() {
    let scenario = Scenario::fast_projectile().unwrap();
    for &mode in SolveMode::all() {
        let metrics = BenchmarkRunner::run(&scenario, mode).unwrap();
        // Slab top is at z = 0.01.
        assert!(metrics.min_height > 0.0, "{mode}: min height {}", metrics.min_height);
    }
}

#[test]
fn fast_projectile_tunnels_without_ccd() {
    let mut scenario = Scenario::fast_projectile().unwrap();
    scenario.config.use_ccd = false;
    let metrics = BenchmarkRunner::run(&scenario, SolveMode::Direct).unwrap();
    assert!(metrics.min_height < -0.01);
}

#[test]
fn rejects_bad_timestep() {
    let mut scenario = Scenario::sphere_drop().unwrap();
    scenario.dt = 0.0;
    let err = BenchmarkRunner::run(&scenario, SolveMode::Direct).unwrap_err();
    assert!(matches!(err, WeftError::InvalidConfig(_)));
}

#[test]
fn recorder_captures_every_step() {
    let mut scenario = Scenario::capsule_opening().unwrap();
    scenario.timesteps = 20;
    let log = Arc::new(ContactLog::new());
    let mut recorder = FrameRecorder::new(scenario.kind.name(), Arc::clone(&log));

    let sink: Arc<dyn ContactSink> = log;
    let metrics = {
        let mut hooks: [&mut dyn InspectionHook; 1] = [&mut recorder];
        BenchmarkRunner::run_with_hooks(&scenario, SolveMode::Cached, Some(sink), &mut hooks).unwrap()
    };

    let recording = recorder.into_recording();
    assert_eq!(recording.frames.len(), 20);
    assert_eq!(recording.scenario, "capsule_opening");

    let stats = recording.stats();
    assert_eq!(stats.particles, scenario.particle_count());
    assert!(metrics.total_contacts > 0);
    assert!(stats.total_contacts > 0);

    // The pinned edge never moves.
    let last = recording.frames.last().unwrap();
    for i in 0..=16 {
        let p = last.position(i).unwrap();
        assert!((p - scenario.particles.x[i]).length() < 1e-6, "pinned particle {i} moved");
    }
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn simulation_config_from_toml() {
    let text = r#"
        scenario = "neural_ground"
        mode = "direct"
        steps = 12
        iterations = 2
        record = "out.weft"

        [solver]
        friction_coefficient = 0.4
    "#;
    let config = SimulationConfig::from_toml_str(text).unwrap();
    assert_eq!(config.scenario, ScenarioKind::NeuralGround);
    assert_eq!(config.mode, SolveMode::Direct);
    assert_eq!(config.record.as_deref(), Some(std::path::Path::new("out.weft")));

    let solver = config.solver.as_ref().unwrap();
    assert!((solver.friction_coefficient - 0.4).abs() < 1e-6);
    // Unspecified solver fields keep their defaults.
    assert!(solver.enable_complex_colliders);

    let scenario = config.build_scenario().unwrap();
    assert_eq!(scenario.timesteps, 12);
    assert_eq!(scenario.iterations, 2);
    assert!((scenario.config.friction_coefficient - 0.4).abs() < 1e-6);
}

#[test]
fn simulation_config_defaults_keep_scenario_steps() {
    let config = SimulationConfig::from_toml_str("scenario = \"fast_projectile\"").unwrap();
    assert_eq!(config.mode, SolveMode::Cached);
    let scenario = config.build_scenario().unwrap();
    assert_eq!(scenario.timesteps, Scenario::fast_projectile().unwrap().timesteps);
    assert!(scenario.config.use_ccd);
}

#[test]
fn simulation_config_round_trip() {
    let config = SimulationConfig {
        scenario: ScenarioKind::LevelSetDrape,
        steps: 5,
        ..Default::default()
    };
    let text = config.to_toml_string().unwrap();
    let parsed = SimulationConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn simulation_config_validation() {
    let zero_dt = SimulationConfig::from_toml_str("dt = 0.0").unwrap_err();
    assert!(matches!(zero_dt, WeftError::InvalidConfig(_)));

    let no_iterations = SimulationConfig::from_toml_str("iterations = 0").unwrap_err();
    assert!(matches!(no_iterations, WeftError::InvalidConfig(_)));

    let bad_solver = SimulationConfig::from_toml_str("[solver]\nfriction_coefficient = -1.0").unwrap_err();
    assert!(matches!(bad_solver, WeftError::InvalidConfig(_)));

    let bad_scenario = SimulationConfig::from_toml_str("scenario = \"self_fold\"").unwrap_err();
    assert!(matches!(bad_scenario, WeftError::Serialization(_)));
}

#[test]
fn solve_mode_parsing() {
    assert_eq!("direct".parse::<SolveMode>().unwrap(), SolveMode::Direct);
    assert_eq!("cached".parse::<SolveMode>().unwrap(), SolveMode::Cached);
    assert!("fast".parse::<SolveMode>().is_err());
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn metrics_csv_format() {
    let mut scenario = Scenario::sphere_drop().unwrap();
    scenario.timesteps = 3;
    let metrics = BenchmarkRunner::run(&scenario, SolveMode::Direct).unwrap();
    let csv = BenchmarkMetrics::to_csv(&[metrics]);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2); // header + 1 data row
    assert!(lines[0].starts_with("scenario,mode"));
    assert!(lines[1].starts_with("sphere_drop,direct"));
    assert_eq!(lines[0].split(',').count(), lines[1].split(',').count());
}

#[test]
fn metrics_json_export() {
    let mut scenario = Scenario::fast_projectile().unwrap();
    scenario.timesteps = 2;
    let metrics = BenchmarkRunner::run(&scenario, SolveMode::Cached).unwrap();
    let json = BenchmarkMetrics::to_json(std::slice::from_ref(&metrics)).unwrap();
    let parsed: Vec<BenchmarkMetrics> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].scenario, "fast_projectile");
    assert_eq!(parsed[0].total_contacts, metrics.total_contacts);
}
