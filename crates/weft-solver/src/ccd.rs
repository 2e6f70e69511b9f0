//! Swept collision pass.
//!
//! Each particle's motion over the step is swept against every eligible
//! collider: the start point goes through the collider's previous pose
//! and the end point through its current pose. A crossing pushes the
//! particle back onto the contact plane plus a small margin.

use weft_collider::{ColliderInstance, ColliderQuery, ShapeClass};
use weft_types::ColliderId;

use crate::dispatch::{colliders_of_class, PassContext};
use crate::one_sided::one_sided_correction;
use crate::parallel::for_each_particle;
use crate::particles::ParticleRange;
use crate::report::ContactTally;

/// Resolves the range with swept queries. Never records cached planes.
pub(crate) fn apply_ccd(
    ctx: &PassContext<'_>,
    range: &mut ParticleRange<'_>,
    colliders: &[ColliderInstance],
) -> ContactTally {
    let config = ctx.config;
    let mut eligible: Vec<(ColliderId, &ColliderInstance)> = Vec::new();
    if config.enable_simple_colliders {
        eligible.extend(colliders_of_class(colliders, ShapeClass::Simple));
    }
    if config.enable_complex_colliders {
        eligible.extend(colliders_of_class(colliders, ShapeClass::Complex));
    }
    if eligible.is_empty() {
        return ContactTally::default();
    }
    let thickness = config.thickness();
    let margin = config.ccd_margin;

    for_each_particle(&config.parallel, range, None, |i, prior, p, _| {
        let mut tally = ContactTally::default();
        for &(id, collider) in &eligible {
            let shape = &collider.shape;
            let start = collider.previous_transform.inverse_transform_point(prior);
            let end = collider.transform.inverse_transform_point(*p);

            let (mut local_normal, mut depth, bone) = match shape.find_closest_intersection(start, end, thickness) {
                Some(hit) => (
                    hit.normal,
                    (hit.point - end).dot(hit.normal) + margin,
                    shape.dominant_bone(hit.point),
                ),
                // No crossing, but the particle may have started inside the shell.
                None => {
                    let (phi, normal, bone) = shape.query_with_bone(end);
                    (normal, thickness - phi, bone)
                }
            };
            if depth <= 0.0 {
                continue;
            }
            if let Some(split) = shape.one_sided_split() {
                (local_normal, depth) = one_sided_correction(end, local_normal, depth, split);
                if depth <= 0.0 {
                    continue;
                }
            }

            let normal = collider.transform.transform_vector(local_normal);
            let reference = collider.reference_kinematics(bone);
            ctx.push(i, id, prior, p, normal, depth, &reference);
            tally.add(depth);
        }
        tally
    })
}
