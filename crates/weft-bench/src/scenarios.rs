//! Benchmark scenarios: a particle sheet, a set of colliders and a
//! solver config for each test case.
//!
//! Six canonical scenarios for regression testing, one per collider
//! family the solver handles:
//! 1. **Sphere drop**: a sheet falls onto a sphere and a capsule
//! 2. **Capsule opening**: a sheet pinned along one edge drapes over a
//!    one-sided tapered capsule
//! 3. **Level-set drape**: a sheet settles on a sampled rounded box
//! 4. **Skinned lattice**: a sheet rests on a bone-weighted level set
//!    that drifts sideways while one bone swings, dragging it through
//!    friction
//! 5. **Neural ground**: a sheet lands on a ground plane given by a
//!    small dense network
//! 6. **Fast projectile**: particles hit a thin slab at a speed that
//!    tunnels through it without swept queries
//!
//! All scenarios use +Z as up.

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use weft_collider::{
    Activation, BoneInfluences, BoneMap, Capsule, ColliderInstance, Convex, DenseLayer, Kinematics, MlLevelSet,
    Shape, SimpleLevelSet, Sphere, SplitPlane, TaperedCapsule, UniformGrid, WeightedLatticeLevelSet,
};
use weft_math::{Aabb, RigidTransform};
use weft_solver::{ParticleState, SolverConfig};
use weft_types::constants::{DEFAULT_DT, DEFAULT_ITERATIONS};
use weft_types::{WeftError, WeftResult};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Sheet dropped onto a sphere and a capsule.
    SphereDrop,
    /// Edge-pinned sheet over a one-sided tapered capsule.
    CapsuleOpening,
    /// Sheet settling on a sampled level set.
    LevelSetDrape,
    /// Sheet on a moving bone-weighted level set.
    SkinnedLattice,
    /// Sheet on a network-defined ground plane.
    NeuralGround,
    /// Fast particles against a thin slab (CCD stress test).
    FastProjectile,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::SphereDrop,
            ScenarioKind::CapsuleOpening,
            ScenarioKind::LevelSetDrape,
            ScenarioKind::SkinnedLattice,
            ScenarioKind::NeuralGround,
            ScenarioKind::FastProjectile,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::SphereDrop => "sphere_drop",
            ScenarioKind::CapsuleOpening => "capsule_opening",
            ScenarioKind::LevelSetDrape => "level_set_drape",
            ScenarioKind::SkinnedLattice => "skinned_lattice",
            ScenarioKind::NeuralGround => "neural_ground",
            ScenarioKind::FastProjectile => "fast_projectile",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = WeftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                WeftError::InvalidConfig(format!("unknown scenario '{s}'. Available: {}", available.join(", ")))
            })
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// Particles at rest at the start of the run.
    pub particles: ParticleState,
    /// Colliders in their initial pose.
    pub colliders: Vec<ColliderInstance>,
    /// Rigid drift applied to every collider each step (m/s).
    pub collider_velocity: Vec3,
    /// Bone animation applied to every bone-mapped collider each step.
    pub bone_spin: Option<BoneSpin>,
    /// Solver configuration.
    pub config: SolverConfig,
    /// Number of timesteps to simulate.
    pub timesteps: u32,
    /// Solver calls per timestep.
    pub iterations: u32,
    /// Timestep size (seconds).
    pub dt: f32,
}

/// Constant-rate rotation of one lattice bone about its pose origin.
///
/// The external bone mapped to it is kept in step, so friction sees
/// the swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneSpin {
    /// Lattice bone whose pose rotates.
    pub bone: usize,
    /// External bone in the collider's bone map that follows it.
    pub external: usize,
    /// Angular velocity in the collider frame (rad/s, axis × rate).
    pub angular_velocity: Vec3,
}

impl BoneSpin {
    /// Rotates the bone pose of `collider` by `dt` worth of spin and
    /// refreshes the motion of the external bone.
    ///
    /// Copies the shape first if another instance still shares it.
    pub fn advance(&self, collider: &mut ColliderInstance, dt: f32) -> WeftResult<()> {
        let Shape::WeightedLatticeLevelSet(lattice) = Arc::make_mut(&mut collider.shape) else {
            return Err(WeftError::InvalidConfig("bone spin needs a skinned lattice collider".into()));
        };
        if self.bone >= lattice.bone_count() {
            return Err(WeftError::InvalidConfig(format!(
                "bone spin targets bone {} of {}",
                self.bone,
                lattice.bone_count()
            )));
        }

        let mut poses = lattice.bone_poses().to_vec();
        let pose = poses[self.bone];
        let delta = Quat::from_scaled_axis(self.angular_velocity * dt);
        poses[self.bone] = RigidTransform::new(pose.translation, (delta * pose.rotation).normalize());
        lattice.set_bone_poses(poses)?;

        let origin = collider.transform.transform_point(pose.translation);
        let kinematics = Kinematics::new(
            origin,
            collider.kinematics().velocity_at(origin),
            collider.angular_velocity + collider.transform.transform_vector(self.angular_velocity),
        );
        match collider
            .bone_map
            .as_mut()
            .map(|bone_map| bone_map.set_external(self.external, kinematics))
        {
            Some(true) => Ok(()),
            _ => Err(WeftError::InvalidConfig(format!(
                "bone spin follows external bone {} but the collider does not map it",
                self.external
            ))),
        }
    }
}

/// Per-particle mass used by every scenario (kg).
const PARTICLE_MASS: f32 = 0.002;

/// A square sheet of `(n + 1)²` particles centred over the origin at
/// height `z`, all at rest.
pub fn particle_sheet(n: usize, size: f32, z: f32) -> WeftResult<ParticleState> {
    let verts = n + 1;
    let step = if n == 0 { 0.0 } else { size / n as f32 };
    let half = 0.5 * size;
    let mut positions = Vec::with_capacity(verts * verts);
    for j in 0..verts {
        for i in 0..verts {
            positions.push(Vec3::new(i as f32 * step - half, j as f32 * step - half, z));
        }
    }
    let inv_m = vec![1.0 / PARTICLE_MASS; positions.len()];
    ParticleState::new(positions, inv_m)
}

impl Scenario {
    fn with_defaults(kind: ScenarioKind, particles: ParticleState, colliders: Vec<ColliderInstance>) -> Self {
        Self {
            kind,
            particles,
            colliders,
            collider_velocity: Vec3::ZERO,
            bone_spin: None,
            config: SolverConfig::exact(),
            timesteps: 90,
            iterations: DEFAULT_ITERATIONS,
            dt: DEFAULT_DT,
        }
    }

    /// Create the sphere drop scenario.
    ///
    /// A 1.2m sheet at 16×16 resolution falls from 0.8m onto a 0.4m
    /// sphere. Its +X edge lands on a thin capsule lying along Y.
    pub fn sphere_drop() -> WeftResult<Self> {
        let particles = particle_sheet(16, 1.2, 0.8)?;
        let colliders = vec![
            ColliderInstance::new(Shape::from(Sphere::new(0.4)?), RigidTransform::IDENTITY),
            ColliderInstance::new(
                Shape::from(Capsule::new(0.4, 0.1)?),
                RigidTransform::new(Vec3::new(0.55, 0.0, 0.0), Quat::from_rotation_x(FRAC_PI_2)),
            ),
        ];
        Ok(Self::with_defaults(ScenarioKind::SphereDrop, particles, colliders))
    }

    /// Create the capsule opening scenario.
    ///
    /// A sheet pinned along its -Y edge drapes over a horizontal tapered
    /// capsule whose lower half is cut away by a split plane. Simple
    /// colliders are cached as planes.
    pub fn capsule_opening() -> WeftResult<Self> {
        let n = 16;
        let mut particles = particle_sheet(n, 1.0, 0.45)?;
        particles.inv_m[..=n].fill(0.0);

        // Local Z maps to world X; local -X maps to world +Z.
        let split = SplitPlane::new(Vec3::ZERO, -Vec3::X)?;
        let capsule = TaperedCapsule::new(0.45, 0.3, 0.18)?.one_sided(split);
        let colliders = vec![ColliderInstance::new(
            Shape::from(capsule),
            RigidTransform::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2)),
        )];

        let mut scenario = Self::with_defaults(ScenarioKind::CapsuleOpening, particles, colliders);
        scenario.config = SolverConfig {
            use_planar_constraint_for_simple_colliders: true,
            ..SolverConfig::cached()
        };
        Ok(scenario)
    }

    /// Create the level-set drape scenario.
    ///
    /// A rounded box sampled on a 29³ grid; the sheet falls from 0.6m.
    pub fn level_set_drape() -> WeftResult<Self> {
        let half = Vec3::new(0.35, 0.35, 0.15);
        let rounding = 0.05;
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.7));
        let level_set = SimpleLevelSet::from_fn(bounds, [29, 29, 29], |p| {
            let q = p.abs() - half;
            q.max(Vec3::ZERO).length() + q.max_element().min(0.0) - rounding
        })?;

        let particles = particle_sheet(16, 1.0, 0.6)?;
        let colliders = vec![ColliderInstance::new(Shape::from(level_set), RigidTransform::IDENTITY)];
        Ok(Self::with_defaults(ScenarioKind::LevelSetDrape, particles, colliders))
    }

    /// Create the skinned lattice scenario.
    ///
    /// A sphere level set embedded in a 3×3×3 lattice split between two
    /// bones. Bone 1 swings about Y and is mapped to an external bone
    /// that follows it; bone 0 is unmapped and falls back to the
    /// collider's rigid motion.
    pub fn skinned_lattice() -> WeftResult<Self> {
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.8));
        let level_set = SimpleLevelSet::from_fn(bounds, [25, 25, 25], |p| p.length() - 0.45)?;
        let lattice = UniformGrid::from_bounds(bounds, [3, 3, 3])?;

        // Nodes are x-fastest: the -X column follows bone 0, +X bone 1.
        let influences = (0..lattice.node_count())
            .map(|node| match node % 3 {
                0 => BoneInfluences::single(0),
                1 => BoneInfluences::from_pairs(&[(0, 0.5), (1, 0.5)]),
                _ => BoneInfluences::single(1),
            })
            .collect();
        let poses = vec![
            RigidTransform::IDENTITY,
            RigidTransform::new(Vec3::ZERO, Quat::from_rotation_y(0.1)),
        ];
        let shape = WeightedLatticeLevelSet::new(level_set, lattice, influences, poses)?;
        let bone_map = BoneMap::new(vec![None, Some(0)], vec![Kinematics::default()]);

        let particles = particle_sheet(16, 1.0, 0.6)?;
        let colliders =
            vec![ColliderInstance::new(Shape::from(shape), RigidTransform::IDENTITY).with_bone_map(bone_map)];

        let mut scenario = Self::with_defaults(ScenarioKind::SkinnedLattice, particles, colliders);
        scenario.collider_velocity = Vec3::new(0.1, 0.0, 0.0);
        scenario.bone_spin = Some(BoneSpin {
            bone: 1,
            external: 0,
            angular_velocity: Vec3::new(0.0, 0.2, 0.0),
        });
        scenario.config = SolverConfig {
            friction_coefficient: 0.5,
            ..SolverConfig::cached()
        };
        Ok(scenario)
    }

    /// Create the neural ground scenario.
    ///
    /// The network computes `relu(z) - relu(-z)`, i.e. the plane `z = 0`
    /// of its own frame, which sits at world height -0.3.
    pub fn neural_ground() -> WeftResult<Self> {
        let hidden = DenseLayer::new(3, vec![0.0, 0.0, 1.0, 0.0, 0.0, -1.0], vec![0.0, 0.0], Activation::Relu)?;
        let output = DenseLayer::new(2, vec![1.0, -1.0], vec![0.0], Activation::Linear)?;
        let training = Aabb::new(Vec3::new(-1.0, -1.0, -0.5), Vec3::new(1.0, 1.0, 0.5));
        let network = MlLevelSet::new(vec![hidden, output], training, 1.0)?;

        let particles = particle_sheet(16, 1.2, 0.2)?;
        let colliders = vec![ColliderInstance::new(
            Shape::from(network),
            RigidTransform::from_translation(Vec3::new(0.0, 0.0, -0.3)),
        )];
        let mut scenario = Self::with_defaults(ScenarioKind::NeuralGround, particles, colliders);
        scenario.config = SolverConfig::cached();
        Ok(scenario)
    }

    /// Create the fast projectile scenario.
    ///
    /// An 8×8 patch starts 0.5m above a 2cm slab moving down at 40 m/s,
    /// far more than the slab's thickness per step. Uses swept queries.
    pub fn fast_projectile() -> WeftResult<Self> {
        let mut particles = particle_sheet(8, 0.6, 0.5)?;
        particles.v.fill(Vec3::new(0.0, 0.0, -40.0));

        let colliders = vec![ColliderInstance::new(
            Shape::from(Convex::cuboid(Vec3::new(1.0, 1.0, 0.01))?),
            RigidTransform::IDENTITY,
        )];
        let mut scenario = Self::with_defaults(ScenarioKind::FastProjectile, particles, colliders);
        scenario.config = SolverConfig::ccd();
        scenario.timesteps = 30;
        Ok(scenario)
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> WeftResult<Self> {
        match kind {
            ScenarioKind::SphereDrop => Self::sphere_drop(),
            ScenarioKind::CapsuleOpening => Self::capsule_opening(),
            ScenarioKind::LevelSetDrape => Self::level_set_drape(),
            ScenarioKind::SkinnedLattice => Self::skinned_lattice(),
            ScenarioKind::NeuralGround => Self::neural_ground(),
            ScenarioKind::FastProjectile => Self::fast_projectile(),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}
