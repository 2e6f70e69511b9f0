//! Small vector helpers shared by collider queries and the solver.

use glam::Vec3;
use weft_types::constants::EPSILON;

/// Normalizes `v`, returning `None` for (near-)zero vectors.
#[inline]
pub fn try_normalize(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    if len > EPSILON {
        Some(v / len)
    } else {
        None
    }
}

/// Normalizes `v`, returning `fallback` for (near-)zero vectors.
#[inline]
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    try_normalize(v).unwrap_or(fallback)
}

/// Removes the component of `v` along the unit vector `normal`.
#[inline]
pub fn project_to_tangent_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - v.dot(normal) * normal
}

/// Parameter in `[0, 1]` of the point on segment `a–b` closest to `p`.
#[inline]
pub fn closest_segment_parameter(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= EPSILON * EPSILON {
        return 0.0;
    }
    ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
}

/// Point on segment `a–b` closest to `p`.
#[inline]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    a + closest_segment_parameter(p, a, b) * (b - a)
}

/// Any unit vector perpendicular to the unit vector `n`.
pub fn any_orthonormal(n: Vec3) -> Vec3 {
    let helper = if n.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    normalize_or(helper.cross(n), Vec3::Z)
}
