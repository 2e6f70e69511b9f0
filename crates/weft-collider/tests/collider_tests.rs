//! Integration tests for weft-collider.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use weft_collider::{
    Activation, BatchQueryResult, BoneInfluences, BoneMap, Capsule, ColliderInstance, ColliderQuery,
    Convex, DenseLayer, Kinematics, MlLevelSet, Shape, ShapeClass, SimpleLevelSet, Sphere, SplitPlane,
    TaperedCapsule, UniformGrid, WeightedLatticeLevelSet,
};
use weft_math::{Aabb, RigidTransform};
use weft_types::{BoneIndex, ParallelConfig};

fn unit_box() -> Aabb {
    Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

fn sphere_level_set(center: Vec3, radius: f32, bounds: Aabb, n: usize) -> SimpleLevelSet {
    SimpleLevelSet::from_fn(bounds, [n, n, n], |p| (p - center).length() - radius).unwrap()
}

/// Network computing `phi = z` over the unit box.
fn plane_network() -> MlLevelSet {
    let layer = DenseLayer::new(3, vec![0.0, 0.0, 1.0], vec![0.0], Activation::Linear).unwrap();
    MlLevelSet::new(vec![layer], unit_box(), 1.0).unwrap()
}

fn single_bone_lattice(level_set: SimpleLevelSet, pose: RigidTransform) -> WeightedLatticeLevelSet {
    let lattice = UniformGrid::from_bounds(unit_box(), [2, 2, 2]).unwrap();
    let influences = vec![BoneInfluences::single(0); lattice.node_count()];
    WeightedLatticeLevelSet::new(level_set, lattice, influences, vec![pose]).unwrap()
}

/// Lattice over the unit box: the x = -1 face is bound to bone 0, x = +1 to bone 1.
fn two_bone_lattice() -> WeightedLatticeLevelSet {
    let level_set = sphere_level_set(Vec3::ZERO, 0.5, unit_box(), 9);
    let lattice = UniformGrid::from_bounds(unit_box(), [2, 2, 2]).unwrap();
    let mut influences = Vec::with_capacity(lattice.node_count());
    for _k in 0..2 {
        for _j in 0..2 {
            for i in 0..2u32 {
                influences.push(BoneInfluences::single(i));
            }
        }
    }
    let poses = vec![RigidTransform::IDENTITY; 2];
    WeightedLatticeLevelSet::new(level_set, lattice, influences, poses).unwrap()
}

// ─── Analytic Shapes ──────────────────────────────────────────

#[test]
fn sphere_phi_and_normal() {
    let sphere = Sphere::new(1.0).unwrap();
    let (phi, n) = sphere.phi_with_normal(Vec3::new(0.0, 0.0, -1.5));
    assert!((phi - 0.5).abs() < 1e-6, "phi = {phi}");
    assert!((n - Vec3::NEG_Z).length() < 1e-6);

    let (phi, n) = sphere.phi_with_normal(Vec3::new(0.0, 0.0, -0.4));
    assert!((phi + 0.6).abs() < 1e-6, "phi = {phi}");
    assert!((n - Vec3::NEG_Z).length() < 1e-6);
}

#[test]
fn sphere_center_has_unit_normal() {
    let sphere = Sphere::new(0.3).unwrap();
    let (phi, n) = sphere.phi_with_normal(Vec3::ZERO);
    assert!((phi + 0.3).abs() < 1e-6);
    assert!((n.length() - 1.0).abs() < 1e-6);
}

#[test]
fn sphere_rejects_bad_radius() {
    assert!(Sphere::new(0.0).is_err());
    assert!(Sphere::new(-1.0).is_err());
    assert!(Sphere::new(f32::NAN).is_err());
}

#[test]
fn capsule_side_and_cap() {
    let capsule = Capsule::new(1.0, 0.5).unwrap();
    let (phi, n) = capsule.phi_with_normal(Vec3::new(2.0, 0.0, 0.3));
    assert!((phi - 1.5).abs() < 1e-6, "side phi = {phi}");
    assert!((n - Vec3::X).length() < 1e-6);

    let (phi, n) = capsule.phi_with_normal(Vec3::new(0.0, 0.0, 3.0));
    assert!((phi - 1.5).abs() < 1e-6, "cap phi = {phi}");
    assert!((n - Vec3::Z).length() < 1e-6);
}

#[test]
fn tapered_capsule_with_equal_radii_matches_capsule() {
    let capsule = Capsule::new(1.0, 0.5).unwrap();
    let tapered = TaperedCapsule::new(1.0, 0.5, 0.5).unwrap();
    for p in [
        Vec3::new(2.0, 0.0, 0.3),
        Vec3::new(0.1, 0.2, 0.0),
        Vec3::new(0.0, 1.0, -2.0),
        Vec3::new(-0.7, 0.7, 1.4),
    ] {
        let (a, _) = capsule.phi_with_normal(p);
        let (b, _) = tapered.phi_with_normal(p);
        assert!((a - b).abs() < 1e-5, "at {p}: capsule {a}, tapered {b}");
    }
}

#[test]
fn tapered_capsule_ends_and_side() {
    let tapered = TaperedCapsule::new(1.0, 0.5, 0.25).unwrap();

    let (phi, n) = tapered.phi_with_normal(Vec3::new(0.0, 0.0, -3.0));
    assert!((phi - 1.5).abs() < 1e-5, "bottom phi = {phi}");
    assert!((n - Vec3::NEG_Z).length() < 1e-5);

    let (phi, n) = tapered.phi_with_normal(Vec3::new(0.0, 0.0, 3.0));
    assert!((phi - 1.75).abs() < 1e-5, "top phi = {phi}");
    assert!((n - Vec3::Z).length() < 1e-5);

    // Side: the surface leans inward towards the thin end.
    let (phi, n) = tapered.phi_with_normal(Vec3::new(2.0, 0.0, 0.0));
    let sin_t = 0.125_f32;
    let cos_t = (1.0 - sin_t * sin_t).sqrt();
    let expected = 2.0 * cos_t + sin_t - 0.5;
    assert!((phi - expected).abs() < 1e-5, "side phi = {phi}, expected {expected}");
    assert!(n.x > 0.99 && n.z > 0.0, "side normal = {n}");
}

#[test]
fn tapered_capsule_one_sided_flag() {
    let split = SplitPlane::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)).unwrap();
    assert!((split.normal - Vec3::Y).length() < 1e-6);

    let tapered = TaperedCapsule::new(1.0, 0.4, 0.2).unwrap().one_sided(split);
    assert!(tapered.is_one_sided());

    let shape = Shape::from(tapered);
    assert_eq!(shape.one_sided_split(), Some(&split));
    assert!(Shape::from(Sphere::new(1.0).unwrap()).one_sided_split().is_none());
    assert!(SplitPlane::new(Vec3::ZERO, Vec3::ZERO).is_err());
}

#[test]
fn cuboid_outside_and_inside() {
    let cuboid = Convex::cuboid(Vec3::new(1.0, 2.0, 3.0)).unwrap();

    let (phi, n) = cuboid.phi_with_normal(Vec3::new(0.0, 0.0, 4.0));
    assert!((phi - 1.0).abs() < 1e-6);
    assert_eq!(n, Vec3::Z);

    let (phi, n) = cuboid.phi_with_normal(Vec3::new(0.5, 0.0, 0.0));
    assert!((phi + 0.5).abs() < 1e-6, "inside phi = {phi}");
    assert_eq!(n, Vec3::X);

    assert_eq!(cuboid.planes().len(), 6);
    assert!(Convex::cuboid(Vec3::new(1.0, 0.0, 1.0)).is_err());
}

// ─── Level Sets ───────────────────────────────────────────────

#[test]
fn level_set_approximates_sampled_sphere() {
    let bounds = Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0));
    let level_set = sphere_level_set(Vec3::ZERO, 1.0, bounds, 41);

    for p in [
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(0.6, 0.6, 0.6),
    ] {
        let (phi, n) = level_set.phi_with_normal(p);
        let exact = p.length() - 1.0;
        assert!((phi - exact).abs() < 0.02, "at {p}: phi {phi}, exact {exact}");
        assert!(n.dot(p.normalize()) > 0.98, "at {p}: normal {n}");
    }
}

#[test]
fn level_set_outside_grid_adds_box_distance() {
    let level_set = sphere_level_set(Vec3::ZERO, 0.5, unit_box(), 21);
    let (phi, n) = level_set.phi_with_normal(Vec3::new(3.0, 0.0, 0.0));
    // Value 0.5 at the clamped point plus 2.0 outside the grid.
    assert!((phi - 2.5).abs() < 0.02, "phi = {phi}");
    assert!(n.x > 0.99, "normal = {n}");
}

#[test]
fn level_set_rejects_bad_samples() {
    let grid = UniformGrid::from_bounds(unit_box(), [2, 2, 2]).unwrap();
    assert!(SimpleLevelSet::new(grid, vec![0.0; 7]).is_err());
    assert!(SimpleLevelSet::new(grid, vec![f32::NAN; 8]).is_err());
    assert!(UniformGrid::from_bounds(unit_box(), [1, 2, 2]).is_err());
}

#[test]
fn lattice_identity_pose_matches_level_set() {
    let level_set = sphere_level_set(Vec3::ZERO, 0.5, unit_box(), 21);
    let lattice = single_bone_lattice(level_set.clone(), RigidTransform::IDENTITY);

    for p in [Vec3::new(0.8, 0.0, 0.0), Vec3::new(0.1, -0.2, 0.3), Vec3::new(0.0, 0.0, -0.9)] {
        let (expected_phi, expected_n) = level_set.phi_with_normal(p);
        let (phi, n) = lattice.phi_with_normal(p);
        assert!((phi - expected_phi).abs() < 1e-5, "at {p}: {phi} vs {expected_phi}");
        assert!((n - expected_n).length() < 1e-4, "at {p}: {n} vs {expected_n}");
    }
}

#[test]
fn lattice_rotated_bone_rotates_field() {
    let bounds = Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0));
    let level_set = sphere_level_set(Vec3::new(0.5, 0.0, 0.0), 0.3, bounds, 41);
    let pose = RigidTransform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2));
    let lattice = single_bone_lattice(level_set, pose);

    // The rest-pose sphere at +X now sits at +Y.
    let (phi, n) = lattice.phi_with_normal(Vec3::new(0.0, 1.3, 0.0));
    assert!((phi - 0.5).abs() < 0.02, "phi = {phi}");
    assert!(n.y > 0.99, "normal = {n}");
    assert_eq!(lattice.dominant_bone(Vec3::new(0.0, 1.3, 0.0)), Some(BoneIndex(0)));
}

#[test]
fn lattice_dominant_bone_follows_weights() {
    let lattice = two_bone_lattice();
    assert_eq!(lattice.dominant_bone(Vec3::new(-0.5, 0.0, 0.0)), Some(BoneIndex(0)));
    assert_eq!(lattice.dominant_bone(Vec3::new(0.5, 0.0, 0.0)), Some(BoneIndex(1)));

    let shape = Shape::from(lattice);
    let (_, _, bone) = shape.query_with_bone(Vec3::new(0.6, 0.2, 0.0));
    assert_eq!(bone, Some(BoneIndex(1)));
}

#[test]
fn lattice_bone_poses_can_be_replaced() {
    let level_set = sphere_level_set(Vec3::ZERO, 0.5, unit_box(), 21);
    let mut lattice = single_bone_lattice(level_set, RigidTransform::IDENTITY);
    assert_eq!(lattice.bone_count(), 1);

    let raised = RigidTransform::from_translation(Vec3::new(0.0, 0.0, 0.2));
    lattice.set_bone_poses(vec![raised]).unwrap();
    assert_eq!(lattice.bone_poses(), &[raised]);

    // The sphere follows the bone up by 0.2.
    let (phi, n) = lattice.phi_with_normal(Vec3::new(0.0, 0.0, 0.7));
    assert!(phi.abs() < 0.01, "phi = {phi}");
    assert!(n.z > 0.99, "normal = {n}");

    assert!(lattice.set_bone_poses(Vec::new()).is_err());
    assert_eq!(lattice.bone_poses(), &[raised]);
}

#[test]
fn lattice_rejects_inconsistent_data() {
    let level_set = sphere_level_set(Vec3::ZERO, 0.5, unit_box(), 5);
    let lattice = UniformGrid::from_bounds(unit_box(), [2, 2, 2]).unwrap();

    let short = vec![BoneInfluences::single(0); 3];
    assert!(WeightedLatticeLevelSet::new(level_set.clone(), lattice, short, vec![RigidTransform::IDENTITY]).is_err());

    let unknown_bone = vec![BoneInfluences::single(4); 8];
    assert!(
        WeightedLatticeLevelSet::new(level_set, lattice, unknown_bone, vec![RigidTransform::IDENTITY]).is_err()
    );
}

#[test]
fn bone_influences_are_normalized() {
    let inf = BoneInfluences::from_pairs(&[(3, 2.0), (1, 1.0), (2, 1.0), (5, 0.0)]);
    assert_eq!(inf.bones[0], 3);
    assert!((inf.weights[0] - 0.5).abs() < 1e-6);
    assert!((inf.weights.iter().sum::<f32>() - 1.0).abs() < 1e-6);
}

#[test]
fn ml_linear_network_is_a_plane() {
    let network = plane_network();
    let (phi, n) = network.phi_with_normal(Vec3::new(0.2, 0.1, 0.5));
    assert!((phi - 0.5).abs() < 1e-5, "phi = {phi}");
    assert!((n - Vec3::Z).length() < 1e-3, "normal = {n}");

    // Outside the training box: clamped value plus box distance.
    let (phi, _) = network.phi_with_normal(Vec3::new(0.0, 0.0, 3.0));
    assert!((phi - 3.0).abs() < 1e-5, "phi = {phi}");
}

#[test]
fn ml_field_is_non_negative_outside_bounds() {
    // The network is negative across the bottom face of its box; below
    // the box only the box distance remains.
    let network = plane_network();
    let (phi, n) = network.phi_with_normal(Vec3::new(0.0, 0.0, -1.2));
    assert!((phi - 0.2).abs() < 1e-4, "phi = {phi}");
    assert!((n - Vec3::NEG_Z).length() < 1e-2, "normal = {n}");

    let (phi, _) = network.phi_with_normal(Vec3::new(1.5, 0.0, -0.5));
    assert!((phi - 0.5).abs() < 1e-4, "phi = {phi}");

    // Inside the box the raw field is kept.
    let (phi, _) = network.phi_with_normal(Vec3::new(0.0, 0.0, -0.9));
    assert!((phi + 0.9).abs() < 1e-5, "phi = {phi}");
}

#[test]
fn ml_network_validates_layers() {
    let hidden = DenseLayer::new(3, vec![1.0; 6], vec![0.0; 2], Activation::Relu).unwrap();
    let wrong_out = DenseLayer::new(3, vec![1.0; 3], vec![0.0], Activation::Tanh).unwrap();
    assert!(MlLevelSet::new(vec![hidden.clone(), wrong_out], unit_box(), 1.0).is_err());
    assert!(MlLevelSet::new(vec![hidden], unit_box(), 1.0).is_err());
    assert!(MlLevelSet::new(vec![], unit_box(), 1.0).is_err());
    assert!(DenseLayer::new(3, vec![1.0; 5], vec![0.0; 2], Activation::Linear).is_err());
}

#[test]
fn ml_network_json_round_trip() {
    let hidden = DenseLayer::new(3, vec![0.0, 0.0, 1.0, 0.0, 0.0, -1.0], vec![0.0, 0.0], Activation::Relu).unwrap();
    let output = DenseLayer::new(2, vec![1.0, -1.0], vec![0.0], Activation::Linear).unwrap();
    let network = MlLevelSet::new(vec![hidden, output], unit_box(), 1.0).unwrap();

    let json = serde_json::to_string(&network).unwrap();
    let loaded: MlLevelSet = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, network);

    let p = Vec3::new(0.3, -0.2, -0.4);
    assert!((loaded.phi_with_normal(p).0 - p.z).abs() < 1e-5);
}

// ─── Classification ───────────────────────────────────────────

#[test]
fn shape_classification() {
    let bounds = unit_box();
    let simple: Vec<Shape> = vec![
        Sphere::new(1.0).unwrap().into(),
        Capsule::new(1.0, 0.2).unwrap().into(),
        TaperedCapsule::new(1.0, 0.3, 0.2).unwrap().into(),
        Convex::cuboid(Vec3::ONE).unwrap().into(),
        sphere_level_set(Vec3::ZERO, 0.5, bounds, 5).into(),
    ];
    for shape in &simple {
        assert_eq!(shape.class(), ShapeClass::Simple, "{}", shape.type_name());
        assert!(shape.is_simple() && !shape.is_complex());
    }

    let complex: Vec<Shape> = vec![two_bone_lattice().into(), plane_network().into()];
    for shape in &complex {
        assert_eq!(shape.class(), ShapeClass::Complex, "{}", shape.type_name());
    }
}

// ─── Swept Queries ────────────────────────────────────────────

#[test]
fn sphere_ccd_hit_miss_and_inside() {
    let sphere = Sphere::new(1.0).unwrap();

    let hit = sphere
        .find_closest_intersection(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -3.0), 0.1)
        .expect("segment crosses the sphere");
    assert!((hit.point.z - 1.1).abs() < 1e-5, "hit = {:?}", hit.point);
    assert!((hit.time - 1.9 / 6.0).abs() < 1e-5);
    assert!((hit.normal - Vec3::Z).length() < 1e-5);

    assert!(sphere
        .find_closest_intersection(Vec3::new(2.0, 0.0, 3.0), Vec3::new(2.0, 0.0, -3.0), 0.1)
        .is_none());
    assert!(sphere
        .find_closest_intersection(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, 3.0), 0.1)
        .is_none());
}

#[test]
fn sphere_trace_finds_level_set_surface() {
    let shape = Shape::from(sphere_level_set(Vec3::ZERO, 0.5, unit_box(), 41));
    let hit = shape
        .find_closest_intersection(Vec3::new(0.0, 0.0, 0.9), Vec3::new(0.0, 0.0, -0.9), 0.0)
        .expect("segment crosses the level set");
    assert!((hit.point.z - 0.5).abs() < 0.03, "hit = {:?}", hit.point);
    assert!(hit.time > 0.0 && hit.time < 0.5);
}

#[test]
fn sphere_trace_misses_short_segment() {
    let shape = Shape::from(Convex::cuboid(Vec3::ONE).unwrap());
    assert!(shape
        .find_closest_intersection(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, 2.5), 0.0)
        .is_none());
}

// ─── Batch Queries ────────────────────────────────────────────

#[test]
fn batch_skips_particles_outside_activation() {
    let shape = Shape::from(plane_network());
    let frame = RigidTransform::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let positions = [Vec3::new(10.0, 0.0, 0.5), Vec3::new(20.0, 0.0, 0.0)];
    let mut out = BatchQueryResult::default();
    shape.batch_phi_with_normal(&positions, &frame, 0.1, &ParallelConfig::default(), &mut out);

    assert_eq!(out.len(), 2);
    assert!((out.phi[0] - 0.5).abs() < 1e-5);
    assert!((out.normal[0] - Vec3::Z).length() < 1e-3);
    assert!(out.phi[1].is_infinite());
    assert_eq!(out.dominant_bone[1], None);
}

#[test]
fn batch_normals_are_world_space() {
    let shape = Shape::from(plane_network());
    let frame = RigidTransform::new(Vec3::ZERO, Quat::from_rotation_x(FRAC_PI_2));
    // Local +Z maps to world -Y.
    let positions = [Vec3::new(0.0, -0.5, 0.0)];
    let mut out = BatchQueryResult::default();
    shape.batch_phi_with_normal(&positions, &frame, 0.0, &ParallelConfig::sequential(), &mut out);
    assert!((out.phi[0] - 0.5).abs() < 1e-4, "phi = {}", out.phi[0]);
    assert!((out.normal[0] - Vec3::NEG_Y).length() < 1e-3, "normal = {}", out.normal[0]);
}

#[test]
fn batch_parallel_matches_sequential() {
    let shape = Shape::from(two_bone_lattice());
    let frame = RigidTransform::IDENTITY;
    let positions: Vec<Vec3> = (0..500)
        .map(|i| {
            let t = i as f32 * 0.37;
            Vec3::new(t.sin(), t.cos() * 0.8, (t * 0.5).sin() * 1.5)
        })
        .collect();

    let mut seq = BatchQueryResult::default();
    shape.batch_phi_with_normal(&positions, &frame, 0.05, &ParallelConfig::sequential(), &mut seq);
    let parallel = ParallelConfig {
        enabled: true,
        min_batch_size: 16,
    };
    let mut par = BatchQueryResult::default();
    shape.batch_phi_with_normal(&positions, &frame, 0.05, &parallel, &mut par);

    assert_eq!(seq.dominant_bone, par.dominant_bone);
    for i in 0..positions.len() {
        assert_eq!(seq.phi[i], par.phi[i]);
        assert_eq!(seq.normal[i], par.normal[i]);
    }
}

// ─── Instances & Bone Maps ────────────────────────────────────

#[test]
fn bone_map_reference_and_fallback() {
    let bone_map = BoneMap::new(vec![Some(0), None], vec![Kinematics::linear(Vec3::X)]);
    let instance = ColliderInstance::new(Shape::from(two_bone_lattice()), RigidTransform::IDENTITY)
        .with_velocity(Vec3::Y, Vec3::ZERO)
        .with_bone_map(bone_map);

    assert_eq!(instance.reference_kinematics(Some(BoneIndex(0))).linear_velocity, Vec3::X);
    assert_eq!(instance.reference_kinematics(Some(BoneIndex(1))).linear_velocity, Vec3::Y);
    assert_eq!(instance.reference_kinematics(Some(BoneIndex(7))).linear_velocity, Vec3::Y);
    assert_eq!(instance.reference_kinematics(None).linear_velocity, Vec3::Y);
    assert_eq!(instance.class(), ShapeClass::Complex);
}

#[test]
fn bone_map_drops_out_of_range_entries() {
    let bone_map = BoneMap::new(vec![Some(0), Some(3)], vec![Kinematics::linear(Vec3::X)]);
    assert_eq!(bone_map.len(), 2);
    assert!(bone_map.lookup(BoneIndex(0)).is_some());
    assert!(bone_map.lookup(BoneIndex(1)).is_none());
}

#[test]
fn bone_map_external_motion_updates() {
    let mut bone_map = BoneMap::new(vec![None, Some(0)], vec![Kinematics::default()]);
    assert!(bone_map.set_external(0, Kinematics::linear(Vec3::Y)));
    assert_eq!(bone_map.lookup(BoneIndex(1)).map(|k| k.linear_velocity), Some(Vec3::Y));
    assert!(!bone_map.set_external(2, Kinematics::linear(Vec3::X)));
    assert_eq!(bone_map.lookup(BoneIndex(0)), None);
}

#[test]
fn kinematics_surface_velocity() {
    let k = Kinematics::new(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 0.0, 2.0));
    let v = k.velocity_at(Vec3::new(1.0, 0.0, 0.0));
    assert!((v - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6, "v = {v}");
}

#[test]
fn move_to_derives_velocities() {
    let mut instance = ColliderInstance::new(Shape::from(Sphere::new(1.0).unwrap()), RigidTransform::IDENTITY);
    let target = RigidTransform::new(Vec3::new(0.1, 0.0, 0.0), Quat::from_rotation_z(0.1));
    instance.move_to(target, 0.1);

    assert_eq!(instance.previous_transform, RigidTransform::IDENTITY);
    assert!((instance.linear_velocity - Vec3::X).length() < 1e-4, "v = {}", instance.linear_velocity);
    assert!(
        (instance.angular_velocity - Vec3::Z).length() < 1e-3,
        "w = {}",
        instance.angular_velocity
    );
}
