//! Cached contact planes.
//!
//! A generate pass records, for every particle that touched a cached
//! collider category, the plane it was pushed onto. Later relaxation
//! iterations replay those planes instead of querying the colliders.

use glam::Vec3;
use rayon::prelude::*;
use weft_collider::Kinematics;
use weft_types::{ColliderId, ParallelConfig, ParticleId};

use crate::debug::{ContactSink, DebugContact};
use crate::friction::apply_friction;
use crate::report::ContactTally;

/// The plane a particle was pushed onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPlane {
    /// Particle position right after the push (before friction).
    pub position: Vec3,
    /// World-space unit normal.
    pub normal: Vec3,
    /// Collider surface velocity at the contact, used for friction.
    pub velocity: Option<Vec3>,
    /// Collider that produced the contact.
    pub collider: ColliderId,
}

/// A cached plane bound to its particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarConstraint {
    pub particle: ParticleId,
    pub plane: ContactPlane,
}

/// Per-particle plane slots plus the dense list built from them.
///
/// Slots are overwritten by every contact in a generate pass, so the
/// last collider to touch a particle wins.
#[derive(Debug, Clone, Default)]
pub struct PlanarConstraintCache {
    slots: Vec<Option<ContactPlane>>,
    constraints: Vec<PlanarConstraint>,
}

impl PlanarConstraintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every slot and the dense list, sized for `len` particles.
    pub fn reset(&mut self, len: usize) {
        self.slots.clear();
        self.slots.resize(len, None);
        self.constraints.clear();
    }

    pub fn slots_mut(&mut self) -> &mut [Option<ContactPlane>] {
        &mut self.slots
    }

    /// Plane recorded for particle `index`, if any.
    pub fn plane(&self, index: usize) -> Option<&ContactPlane> {
        self.slots.get(index)?.as_ref()
    }

    /// Rebuilds the dense list from the filled slots.
    ///
    /// The list is sorted by particle and holds each particle at most once.
    pub fn compact(&mut self) {
        self.constraints.clear();
        self.constraints.extend(self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.map(|plane| PlanarConstraint {
                particle: ParticleId(i as u32),
                plane,
            })
        }));
    }

    pub fn constraints(&self) -> &[PlanarConstraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Settings for one replay of the dense plane list.
pub(crate) struct PlanarPass<'a> {
    /// Friction coefficient, or `None` when friction is disabled.
    pub friction: Option<f32>,
    pub dt: f32,
    pub parallel: &'a ParallelConfig,
    pub sink: Option<&'a dyn ContactSink>,
}

/// Pushes particles back onto their cached planes.
///
/// `constraints` must be sorted by particle with unique indices, as
/// produced by [`PlanarConstraintCache::compact`]. Each constraint gets
/// its own `&mut` slot of `p`, so the pass needs no synchronization.
pub(crate) fn apply_planar_constraints(
    pass: &PlanarPass<'_>,
    x: &[Vec3],
    p: &mut [Vec3],
    inv_m: &[f32],
    constraints: &[PlanarConstraint],
) -> ContactTally {
    let mut work: Vec<(&PlanarConstraint, &mut Vec3)> = Vec::with_capacity(constraints.len());
    let mut rest = p;
    let mut offset = 0;
    for constraint in constraints {
        let index = constraint.particle.index();
        debug_assert!(index >= offset, "planar constraints must be sorted and unique");
        if index < offset || index - offset >= rest.len() {
            continue;
        }
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(index - offset);
        if let Some((slot, tail)) = tail.split_first_mut() {
            if inv_m[index] > 0.0 {
                work.push((constraint, slot));
            }
            rest = tail;
            offset = index + 1;
        }
    }

    let resolve = |(constraint, p): &mut (&PlanarConstraint, &mut Vec3)| -> ContactTally {
        let mut tally = ContactTally::default();
        let plane = &constraint.plane;
        let depth = (plane.position - **p).dot(plane.normal);
        if depth <= 0.0 {
            return tally;
        }
        **p += depth * plane.normal;
        if let (Some(mu), Some(velocity)) = (pass.friction, plane.velocity) {
            let index = constraint.particle.index();
            **p = apply_friction(**p, x[index], plane.normal, mu * depth, pass.dt, &Kinematics::linear(velocity));
        }
        if let Some(sink) = pass.sink {
            sink.record(&DebugContact::new(constraint.particle, plane.collider, **p, plane.normal, depth));
        }
        tally.add(depth);
        tally
    };

    if pass.parallel.should_parallelize(work.len()) {
        work.par_iter_mut()
            .with_min_len(pass.parallel.min_len())
            .map(resolve)
            .reduce(ContactTally::default, ContactTally::merge)
    } else {
        work.iter_mut().map(resolve).fold(ContactTally::default(), ContactTally::merge)
    }
}
