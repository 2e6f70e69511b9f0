//! The uniform query interface over collider shapes.
//!
//! Every shape answers a signed-distance query in its own local frame.
//! Swept (CCD) queries default to sphere tracing along the segment,
//! which only needs the distance bound; shapes with a closed-form
//! answer override it.

use glam::Vec3;
use weft_math::Aabb;
use weft_types::constants::EPSILON;
use weft_types::BoneIndex;

/// Maximum number of sphere-tracing steps per swept query.
const MAX_TRACE_STEPS: usize = 64;

/// Gap below which sphere tracing reports a hit (meters).
const TRACE_TOLERANCE: f32 = 1.0e-5;

/// A point where a swept segment first reaches a collider's thickness shell.
///
/// All quantities are in the collider's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Contact point on the shell surface.
    pub point: Vec3,
    /// Outward unit normal at the contact point.
    pub normal: Vec3,
    /// Segment parameter in `[0, 1]` of the contact.
    pub time: f32,
}

/// Signed-distance query over a collider shape in its local frame.
///
/// Implementations must be pure: repeated queries with the same input
/// return the same output and have no observable side effects.
pub trait ColliderQuery: Send + Sync {
    /// Signed distance from `local` to the surface (negative inside)
    /// and the outward unit normal at the closest surface point.
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3);

    /// Conservative local-space bounds of the shape's surface.
    fn local_bounds(&self) -> Aabb;

    /// First point where the segment `start → end` reaches the surface
    /// inflated by `thickness`.
    ///
    /// Returns `None` when the segment never reaches the shell, or when
    /// `start` is already inside it.
    fn find_closest_intersection(&self, start: Vec3, end: Vec3, thickness: f32) -> Option<SurfaceHit> {
        sphere_trace(self, start, end, thickness)
    }

    /// The skeletal bone with the greatest influence at `local`, for
    /// skinned shapes.
    fn dominant_bone(&self, _local: Vec3) -> Option<BoneIndex> {
        None
    }
}

/// Sphere traces the segment `start → end` against `query`'s shell.
///
/// Steps along the segment by the current gap, which never overshoots
/// the surface as long as `phi` does not overestimate the distance.
pub fn sphere_trace<Q: ColliderQuery + ?Sized>(
    query: &Q,
    start: Vec3,
    end: Vec3,
    thickness: f32,
) -> Option<SurfaceHit> {
    let segment = end - start;
    let length = segment.length();

    let (phi0, _) = query.phi_with_normal(start);
    if phi0 - thickness <= 0.0 || length <= EPSILON {
        return None;
    }

    let mut t = 0.0_f32;
    for _ in 0..MAX_TRACE_STEPS {
        let point = start + segment * t;
        let (phi, normal) = query.phi_with_normal(point);
        let gap = phi - thickness;
        if gap <= TRACE_TOLERANCE {
            return Some(SurfaceHit { point, normal, time: t });
        }
        t += gap / length;
        if t > 1.0 {
            return None;
        }
    }
    None
}
