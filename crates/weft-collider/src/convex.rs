//! Convex polytope collider described by bounding half-spaces.
//!
//! `phi` is the largest signed plane distance. Inside the polytope this
//! is the exact distance to the nearest face; outside, near edges and
//! corners it underestimates the true distance, which keeps sphere
//! tracing conservative.

use glam::Vec3;
use weft_math::geometry::try_normalize;
use weft_math::Aabb;
use weft_types::{WeftError, WeftResult};

use crate::query::ColliderQuery;

/// A half-space boundary `dot(normal, p) <= distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Outward unit normal.
    pub normal: Vec3,
    /// Offset of the plane along its normal from the local origin.
    pub distance: f32,
}

impl Plane {
    /// Creates a plane through `point` with outward `normal`.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> WeftResult<Self> {
        let normal = try_normalize(normal)
            .ok_or_else(|| WeftError::InvalidShape("plane normal must be non-zero".into()))?;
        Ok(Self {
            normal,
            distance: normal.dot(point),
        })
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.distance
    }
}

/// A convex polytope: the intersection of its half-spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Convex {
    planes: Vec<Plane>,
    bounds: Aabb,
}

impl Convex {
    /// Creates a convex shape from its face planes and hull vertices.
    ///
    /// The vertices only provide the shape's bounds.
    pub fn from_planes(planes: Vec<Plane>, vertices: &[Vec3]) -> WeftResult<Self> {
        if planes.len() < 4 {
            return Err(WeftError::InvalidShape(format!(
                "convex needs at least 4 planes, got {}",
                planes.len()
            )));
        }
        let (first, rest) = vertices
            .split_first()
            .ok_or_else(|| WeftError::InvalidShape("convex needs hull vertices".into()))?;
        let bounds = rest
            .iter()
            .fold(Aabb::new(*first, *first), |b, &v| Aabb::new(b.min.min(v), b.max.max(v)));
        Ok(Self { planes, bounds })
    }

    /// An axis-aligned box centered at the local origin.
    pub fn cuboid(half_extents: Vec3) -> WeftResult<Self> {
        if half_extents.cmple(Vec3::ZERO).any() || !half_extents.is_finite() {
            return Err(WeftError::InvalidShape(format!(
                "cuboid half extents must be positive, got {half_extents}"
            )));
        }
        let h = half_extents;
        let planes = vec![
            Plane { normal: Vec3::X, distance: h.x },
            Plane { normal: Vec3::NEG_X, distance: h.x },
            Plane { normal: Vec3::Y, distance: h.y },
            Plane { normal: Vec3::NEG_Y, distance: h.y },
            Plane { normal: Vec3::Z, distance: h.z },
            Plane { normal: Vec3::NEG_Z, distance: h.z },
        ];
        Ok(Self {
            planes,
            bounds: Aabb::from_center_half_extents(Vec3::ZERO, h),
        })
    }

    /// The face planes.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }
}

impl ColliderQuery for Convex {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let mut best_phi = f32::NEG_INFINITY;
        let mut best_normal = Vec3::Z;
        for plane in &self.planes {
            let d = plane.signed_distance(local);
            if d > best_phi {
                best_phi = d;
                best_normal = plane.normal;
            }
        }
        (best_phi, best_normal)
    }

    fn local_bounds(&self) -> Aabb {
        self.bounds
    }
}
