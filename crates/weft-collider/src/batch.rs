//! Whole-range queries for complex shapes.
//!
//! Complex shapes are too expensive to query lazily per particle and
//! collider, so the solver asks each one once for every particle in the
//! range. Particles outside the shape's grown bounds skip the query.

use glam::Vec3;
use rayon::prelude::*;
use weft_math::RigidTransform;
use weft_types::{BoneIndex, ParallelConfig};

use crate::query::ColliderQuery;
use crate::shape::Shape;

/// Per-particle output of a batch query.
///
/// Normals are in world space. Particles that were skipped report
/// `phi = +∞` and a zero normal.
#[derive(Debug, Clone, Default)]
pub struct BatchQueryResult {
    pub phi: Vec<f32>,
    pub normal: Vec<Vec3>,
    pub dominant_bone: Vec<Option<BoneIndex>>,
}

impl BatchQueryResult {
    /// Resizes to `len` entries, all marked as out of range.
    pub fn reset(&mut self, len: usize) {
        self.phi.clear();
        self.phi.resize(len, f32::INFINITY);
        self.normal.clear();
        self.normal.resize(len, Vec3::ZERO);
        self.dominant_bone.clear();
        self.dominant_bone.resize(len, None);
    }

    pub fn len(&self) -> usize {
        self.phi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phi.is_empty()
    }
}

impl Shape {
    /// Queries every world-space position against this shape placed at `frame`.
    ///
    /// `activation` is the distance below which contacts matter; points
    /// farther than that from the local bounds are not evaluated.
    pub fn batch_phi_with_normal(
        &self,
        positions: &[Vec3],
        frame: &RigidTransform,
        activation: f32,
        parallel: &ParallelConfig,
        out: &mut BatchQueryResult,
    ) {
        out.reset(positions.len());
        let bounds = self.local_bounds().grown(activation.max(0.0));

        let query = |world: &Vec3| -> (f32, Vec3, Option<BoneIndex>) {
            let local = frame.inverse_transform_point(*world);
            if !bounds.contains(local) {
                return (f32::INFINITY, Vec3::ZERO, None);
            }
            let (phi, normal, bone) = self.query_with_bone(local);
            (phi, frame.transform_vector(normal), bone)
        };

        let BatchQueryResult {
            phi,
            normal,
            dominant_bone,
        } = out;

        if parallel.should_parallelize(positions.len()) {
            positions
                .par_iter()
                .zip(phi.par_iter_mut())
                .zip(normal.par_iter_mut())
                .zip(dominant_bone.par_iter_mut())
                .with_min_len(parallel.min_len())
                .for_each(|(((world, phi), normal), bone)| {
                    (*phi, *normal, *bone) = query(world);
                });
        } else {
            for (((world, phi), normal), bone) in positions
                .iter()
                .zip(phi.iter_mut())
                .zip(normal.iter_mut())
                .zip(dominant_bone.iter_mut())
            {
                (*phi, *normal, *bone) = query(world);
            }
        }
    }
}
