//! Correction for one-sided colliders.

use glam::Vec3;
use weft_collider::SplitPlane;
use weft_math::geometry::try_normalize;

/// Keeps a push on the valid side of a collider's split plane.
///
/// `position`, `normal` and the split plane share one frame. The naive
/// target `position + depth · normal` is mirrored across the plane when
/// it lands on the negative side. Returns the new push direction and
/// length; a degenerate push yields `(Vec3::ZERO, 0.0)`.
pub fn one_sided_correction(position: Vec3, normal: Vec3, depth: f32, split: &SplitPlane) -> (Vec3, f32) {
    let mut target = position + depth * normal;
    let side = split.signed_distance(target);
    if side < 0.0 {
        target -= 2.0 * side * split.normal;
    }
    let delta = target - position;
    match try_normalize(delta) {
        Some(n) => (n, delta.length()),
        None => (Vec3::ZERO, 0.0),
    }
}
