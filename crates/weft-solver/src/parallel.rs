//! Parallel-for over particles.
//!
//! Every particle pass runs through [`for_each_particle`], which fans
//! out over rayon when the range is long enough and otherwise stays on
//! the calling thread. Each worker owns a disjoint `&mut` slice of the
//! predicted positions (and of the plane cache when one is recorded).

use glam::Vec3;
use rayon::prelude::*;
use weft_types::ParallelConfig;

use crate::particles::ParticleRange;
use crate::planar::ContactPlane;
use crate::report::ContactTally;

/// A cache slot a pass may record its contact into.
pub(crate) type PlaneSlot<'s> = Option<&'s mut Option<ContactPlane>>;

/// Runs `visit(index, prior, predicted, slot)` for every movable particle
/// and sums the returned tallies.
///
/// Particles with zero inverse mass are skipped and never written.
pub(crate) fn for_each_particle<F>(
    parallel: &ParallelConfig,
    range: &mut ParticleRange<'_>,
    slots: Option<&mut [Option<ContactPlane>]>,
    visit: F,
) -> ContactTally
where
    F: Fn(usize, Vec3, &mut Vec3, PlaneSlot<'_>) -> ContactTally + Sync,
{
    let len = range.len();
    let x = range.x;
    let inv_m = range.inv_m;
    let p = &mut *range.p;
    debug_assert!(slots.as_ref().map_or(true, |s| s.len() == len), "plane cache sized for another range");

    let step = |i: usize, p: &mut Vec3, slot: Option<&mut Option<ContactPlane>>| {
        if inv_m[i] > 0.0 {
            visit(i, x[i], p, slot)
        } else {
            ContactTally::default()
        }
    };

    if parallel.should_parallelize(len) {
        let min_len = parallel.min_len();
        match slots {
            Some(slots) => p
                .par_iter_mut()
                .zip(slots.par_iter_mut())
                .enumerate()
                .with_min_len(min_len)
                .map(|(i, (p, slot))| step(i, p, Some(slot)))
                .reduce(ContactTally::default, ContactTally::merge),
            None => p
                .par_iter_mut()
                .enumerate()
                .with_min_len(min_len)
                .map(|(i, p)| step(i, p, None))
                .reduce(ContactTally::default, ContactTally::merge),
        }
    } else {
        match slots {
            Some(slots) => p
                .iter_mut()
                .zip(slots.iter_mut())
                .enumerate()
                .map(|(i, (p, slot))| step(i, p, Some(slot)))
                .fold(ContactTally::default(), ContactTally::merge),
            None => p
                .iter_mut()
                .enumerate()
                .map(|(i, p)| step(i, p, None))
                .fold(ContactTally::default(), ContactTally::merge),
        }
    }
}
