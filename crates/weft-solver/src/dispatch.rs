//! Discrete collision passes.
//!
//! Simple colliders are queried per particle. Complex colliders are
//! queried once each over the whole range and then applied per particle.
//! Every correction lands on top of the previous one: simple colliders
//! first, then complex colliders in list order.

use glam::Vec3;
use weft_collider::{BatchQueryResult, ColliderInstance, ColliderQuery, Kinematics, ShapeClass};
use weft_types::{ColliderId, ParticleId};

use crate::config::SolverConfig;
use crate::debug::{ContactSink, DebugContact};
use crate::friction::apply_friction;
use crate::one_sided::one_sided_correction;
use crate::parallel::for_each_particle;
use crate::particles::ParticleRange;
use crate::planar::ContactPlane;
use crate::report::ContactTally;

/// Shared inputs of one solver call.
pub(crate) struct PassContext<'a> {
    pub config: &'a SolverConfig,
    pub dt: f32,
    pub sink: Option<&'a dyn ContactSink>,
}

impl PassContext<'_> {
    /// Pushes `p` by `depth` along `normal`, then applies friction.
    ///
    /// Returns the plane the particle was pushed onto.
    #[allow(clippy::too_many_arguments)]
    pub fn push(
        &self,
        particle: usize,
        collider: ColliderId,
        prior: Vec3,
        p: &mut Vec3,
        normal: Vec3,
        depth: f32,
        reference: &Kinematics,
    ) -> ContactPlane {
        *p += depth * normal;
        let plane = ContactPlane {
            position: *p,
            normal,
            velocity: Some(reference.velocity_at(*p)),
            collider,
        };
        if self.config.friction_enabled() {
            let max_correction = self.config.friction_coefficient * depth;
            *p = apply_friction(*p, prior, normal, max_correction, self.dt, reference);
        }
        if let Some(sink) = self.sink {
            sink.record(&DebugContact::new(ParticleId(particle as u32), collider, *p, normal, depth));
        }
        plane
    }
}

/// Colliders of one class with their list indices.
pub(crate) fn colliders_of_class(
    colliders: &[ColliderInstance],
    class: ShapeClass,
) -> Vec<(ColliderId, &ColliderInstance)> {
    colliders
        .iter()
        .enumerate()
        .filter(|(_, c)| c.class() == class)
        .map(|(i, c)| (ColliderId(i as u32), c))
        .collect()
}

/// Resolves every particle against every simple collider.
///
/// When `slots` is given, each contact is also recorded as the
/// particle's cached plane.
pub(crate) fn apply_simple(
    ctx: &PassContext<'_>,
    range: &mut ParticleRange<'_>,
    colliders: &[ColliderInstance],
    slots: Option<&mut [Option<ContactPlane>]>,
) -> ContactTally {
    let simple = colliders_of_class(colliders, ShapeClass::Simple);
    if simple.is_empty() {
        return ContactTally::default();
    }
    let thickness = ctx.config.thickness();

    let tally = for_each_particle(&ctx.config.parallel, range, slots, |i, prior, p, mut slot| {
        let mut tally = ContactTally::default();
        for &(id, collider) in &simple {
            let local = collider.transform.inverse_transform_point(*p);
            let (phi, mut local_normal) = collider.shape.phi_with_normal(local);
            let mut depth = thickness - phi;
            if depth <= 0.0 {
                continue;
            }
            if let Some(split) = collider.shape.one_sided_split() {
                (local_normal, depth) = one_sided_correction(local, local_normal, depth, split);
                if depth <= 0.0 {
                    continue;
                }
            }
            let normal = collider.transform.transform_vector(local_normal);
            let plane = ctx.push(i, id, prior, p, normal, depth, &collider.kinematics());
            if let Some(slot) = slot.as_deref_mut() {
                *slot = Some(plane);
            }
            tally.add(depth);
        }
        tally
    });
    tracing::trace!(colliders = simple.len(), contacts = tally.contacts, "simple_pass");
    tally
}

/// Resolves every particle against each complex collider in turn.
///
/// Each collider is batch-queried at the positions left by the previous
/// collider, so corrections stack in list order.
pub(crate) fn apply_complex(
    ctx: &PassContext<'_>,
    range: &mut ParticleRange<'_>,
    colliders: &[ColliderInstance],
    batch: &mut BatchQueryResult,
    mut slots: Option<&mut [Option<ContactPlane>]>,
) -> ContactTally {
    let thickness = ctx.config.thickness();
    let parallel = &ctx.config.parallel;
    let mut total = ContactTally::default();

    for (id, collider) in colliders_of_class(colliders, ShapeClass::Complex) {
        collider
            .shape
            .batch_phi_with_normal(&*range.p, &collider.transform, thickness, parallel, batch);
        let result = &*batch;

        let tally = for_each_particle(parallel, range, slots.as_deref_mut(), |i, prior, p, slot| {
            let mut tally = ContactTally::default();
            let depth = thickness - result.phi[i];
            if depth <= 0.0 {
                return tally;
            }
            let reference = collider.reference_kinematics(result.dominant_bone[i]);
            let plane = ctx.push(i, id, prior, p, result.normal[i], depth, &reference);
            if let Some(slot) = slot {
                *slot = Some(plane);
            }
            tally.add(depth);
            tally
        });
        tracing::trace!(
            collider = id.0,
            shape = collider.shape.type_name(),
            contacts = tally.contacts,
            "complex_pass"
        );
        total = total.merge(tally);
    }
    total
}
