//! Skinned level set: a rest-pose SDF embedded in a bone-weighted lattice.
//!
//! The level set lives in embedding (rest) space. Each lattice node
//! carries up to [`MAX_INFLUENCES`] bone weights, and every bone has a
//! rigid pose mapping embedding space into the collider's local frame.
//! A query point is pulled back into embedding space by weighted inverse
//! skinning, the rest-pose SDF is evaluated there, and the normal is
//! carried forward by the dominant bone.

use glam::Vec3;
use weft_math::geometry::normalize_or;
use weft_math::{Aabb, RigidTransform};
use weft_types::constants::EPSILON;
use weft_types::{BoneIndex, WeftError, WeftResult};

use crate::level_set::{SimpleLevelSet, UniformGrid};
use crate::query::ColliderQuery;

/// Maximum bone influences per lattice node.
pub const MAX_INFLUENCES: usize = 4;

/// Fixed-point refinement steps of the inverse skinning.
const EMBED_REFINE_STEPS: usize = 3;

/// Capacity of the per-query weight accumulator (8 corners × 4 influences).
const BLEND_CAPACITY: usize = 8 * MAX_INFLUENCES;

/// Bone weights at a lattice node. Unused slots have zero weight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneInfluences {
    pub bones: [u32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl BoneInfluences {
    /// A node fully bound to one bone.
    pub fn single(bone: u32) -> Self {
        let mut influences = Self::default();
        influences.bones[0] = bone;
        influences.weights[0] = 1.0;
        influences
    }

    /// Builds influences from `(bone, weight)` pairs, keeping the
    /// strongest [`MAX_INFLUENCES`] and normalizing them to sum to one.
    pub fn from_pairs(pairs: &[(u32, f32)]) -> Self {
        let mut sorted: Vec<(u32, f32)> = pairs.iter().copied().filter(|&(_, w)| w > 0.0).collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
        sorted.truncate(MAX_INFLUENCES);

        let total: f32 = sorted.iter().map(|&(_, w)| w).sum();
        let mut influences = Self::default();
        if total <= 0.0 {
            return influences;
        }
        for (slot, &(bone, w)) in sorted.iter().enumerate() {
            influences.bones[slot] = bone;
            influences.weights[slot] = w / total;
        }
        influences
    }

    fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.bones
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .filter(|&(_, w)| w > 0.0)
    }
}

/// Trilinearly blended bone weights at one embedding point.
struct WeightBlend {
    entries: [(u32, f32); BLEND_CAPACITY],
    len: usize,
}

impl WeightBlend {
    fn new() -> Self {
        Self {
            entries: [(0, 0.0); BLEND_CAPACITY],
            len: 0,
        }
    }

    fn add(&mut self, bone: u32, weight: f32) {
        if let Some(entry) = self.entries[..self.len].iter_mut().find(|e| e.0 == bone) {
            entry.1 += weight;
        } else if self.len < BLEND_CAPACITY {
            self.entries[self.len] = (bone, weight);
            self.len += 1;
        }
    }

    fn as_slice(&self) -> &[(u32, f32)] {
        &self.entries[..self.len]
    }

    fn total(&self) -> f32 {
        self.as_slice().iter().map(|e| e.1).sum()
    }

    fn weight_of(&self, bone: u32) -> f32 {
        self.as_slice()
            .iter()
            .find(|e| e.0 == bone)
            .map_or(0.0, |e| e.1)
    }

    fn dominant(&self) -> Option<u32> {
        self.as_slice()
            .iter()
            .filter(|e| e.1 > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|e| e.0)
    }
}

/// A level set deformed by a bone-weighted lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedLatticeLevelSet {
    level_set: SimpleLevelSet,
    lattice: UniformGrid,
    influences: Vec<BoneInfluences>,
    bone_poses: Vec<RigidTransform>,
}

impl WeightedLatticeLevelSet {
    /// Creates a skinned level set.
    ///
    /// `influences` has one entry per lattice node and every referenced
    /// bone must have a pose in `bone_poses`.
    pub fn new(
        level_set: SimpleLevelSet,
        lattice: UniformGrid,
        influences: Vec<BoneInfluences>,
        bone_poses: Vec<RigidTransform>,
    ) -> WeftResult<Self> {
        if influences.len() != lattice.node_count() {
            return Err(WeftError::InvalidShape(format!(
                "lattice has {} influence entries for {} nodes",
                influences.len(),
                lattice.node_count()
            )));
        }
        if bone_poses.is_empty() {
            return Err(WeftError::InvalidShape("skinned level set needs at least one bone".into()));
        }
        if let Some(bad) = influences
            .iter()
            .flat_map(|inf| inf.iter())
            .find(|&(bone, _)| bone as usize >= bone_poses.len())
        {
            return Err(WeftError::InvalidShape(format!(
                "lattice references bone {} but only {} poses are given",
                bad.0,
                bone_poses.len()
            )));
        }
        Ok(Self {
            level_set,
            lattice,
            influences,
            bone_poses,
        })
    }

    /// Replaces the current bone poses (e.g. after animation).
    pub fn set_bone_poses(&mut self, poses: Vec<RigidTransform>) -> WeftResult<()> {
        if poses.len() != self.bone_poses.len() {
            return Err(WeftError::InvalidShape(format!(
                "expected {} bone poses, got {}",
                self.bone_poses.len(),
                poses.len()
            )));
        }
        self.bone_poses = poses;
        Ok(())
    }

    pub fn bone_poses(&self) -> &[RigidTransform] {
        &self.bone_poses
    }

    pub fn bone_count(&self) -> usize {
        self.bone_poses.len()
    }

    fn blend_weights(&self, embedded: Vec3) -> WeightBlend {
        let coord = self.lattice.locate(embedded);
        let mut blend = WeightBlend::new();
        for (node, corner_weight) in self.lattice.corner_weights(&coord) {
            if corner_weight <= 0.0 {
                continue;
            }
            for (bone, w) in self.influences[node].iter() {
                blend.add(bone, corner_weight * w);
            }
        }
        blend
    }

    /// Pulls a local point back into embedding space.
    ///
    /// Returns the embedding coordinate and the dominant bone there.
    pub fn embed(&self, local: Vec3) -> (Vec3, Option<BoneIndex>) {
        // Initial guess: the bone that claims its own pull-back most strongly.
        let mut embedded = self.bone_poses[0].inverse_transform_point(local);
        let mut best_weight = f32::NEG_INFINITY;
        for (bone, pose) in self.bone_poses.iter().enumerate() {
            let candidate = pose.inverse_transform_point(local);
            let w = self.blend_weights(candidate).weight_of(bone as u32);
            if w > best_weight {
                best_weight = w;
                embedded = candidate;
            }
        }

        for _ in 0..EMBED_REFINE_STEPS {
            let blend = self.blend_weights(embedded);
            let total = blend.total();
            if total <= EPSILON {
                break;
            }
            let mut next = Vec3::ZERO;
            for &(bone, w) in blend.as_slice() {
                next += w * self.bone_poses[bone as usize].inverse_transform_point(local);
            }
            embedded = next / total;
        }

        let dominant = self.blend_weights(embedded).dominant().map(BoneIndex);
        (embedded, dominant)
    }

    /// Distance, normal and dominant bone from a single pull-back.
    pub fn query(&self, local: Vec3) -> (f32, Vec3, Option<BoneIndex>) {
        let (embedded, dominant) = self.embed(local);
        let (phi, rest_normal) = self.level_set.phi_with_normal(embedded);
        let normal = match dominant {
            Some(bone) => self.bone_poses[bone.index()].transform_vector(rest_normal),
            None => rest_normal,
        };
        (phi, normalize_or(normal, rest_normal), dominant)
    }
}

impl ColliderQuery for WeightedLatticeLevelSet {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let (phi, normal, _) = self.query(local);
        (phi, normal)
    }

    fn local_bounds(&self) -> Aabb {
        // Union of the rest bounds carried by every bone pose.
        let rest = self.level_set.local_bounds();
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for pose in &self.bone_poses {
            for n in 0..8 {
                let corner = Vec3::new(
                    if n & 1 == 0 { rest.min.x } else { rest.max.x },
                    if n & 2 == 0 { rest.min.y } else { rest.max.y },
                    if n & 4 == 0 { rest.min.z } else { rest.max.z },
                );
                let p = pose.transform_point(corner);
                min = min.min(p);
                max = max.max(p);
            }
        }
        Aabb::new(min, max)
    }

    fn dominant_bone(&self, local: Vec3) -> Option<BoneIndex> {
        self.embed(local).1
    }
}
