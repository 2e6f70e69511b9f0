//! Capsule and tapered-capsule colliders.
//!
//! Both shapes are built around a segment on the local Z axis from
//! `-half_height` to `+half_height`. A tapered capsule has a different
//! radius at each end (a "round cone") and may be marked one-sided
//! with a split plane, in which case only contacts on the positive side
//! of that plane are meaningful.

use glam::Vec3;
use weft_math::geometry::{any_orthonormal, closest_point_on_segment, normalize_or, try_normalize};
use weft_math::Aabb;
use weft_types::{WeftError, WeftResult};

use crate::query::ColliderQuery;

/// A capsule: all points within `radius` of the local Z-axis segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Capsule {
    /// Half the length of the core segment.
    pub half_height: f32,
    /// Radius around the core segment.
    pub radius: f32,
}

impl Capsule {
    /// Creates a capsule. The radius must be positive and the half
    /// height non-negative.
    pub fn new(half_height: f32, radius: f32) -> WeftResult<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(WeftError::InvalidShape(format!(
                "capsule radius must be positive, got {radius}"
            )));
        }
        if half_height < 0.0 || !half_height.is_finite() {
            return Err(WeftError::InvalidShape(format!(
                "capsule half height must be non-negative, got {half_height}"
            )));
        }
        Ok(Self { half_height, radius })
    }

    fn segment(&self) -> (Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, -self.half_height),
            Vec3::new(0.0, 0.0, self.half_height),
        )
    }
}

impl ColliderQuery for Capsule {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let (a, b) = self.segment();
        let closest = closest_point_on_segment(local, a, b);
        let offset = local - closest;
        let normal = try_normalize(offset).unwrap_or_else(|| any_orthonormal(Vec3::Z));
        (offset.length() - self.radius, normal)
    }

    fn local_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(
            Vec3::ZERO,
            Vec3::new(self.radius, self.radius, self.half_height + self.radius),
        )
    }
}

/// Split plane of a one-sided collider, in the collider's local frame.
///
/// Only contacts that leave the particle on the side the normal points
/// to are physically meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPlane {
    /// A point on the plane.
    pub origin: Vec3,
    /// Unit normal pointing to the valid side.
    pub normal: Vec3,
}

impl SplitPlane {
    /// Creates a split plane; the normal is normalized.
    pub fn new(origin: Vec3, normal: Vec3) -> WeftResult<Self> {
        let normal = try_normalize(normal).ok_or_else(|| {
            WeftError::InvalidShape("split plane normal must be non-zero".into())
        })?;
        Ok(Self { origin, normal })
    }

    /// Signed distance of `point` from the plane (positive on the valid side).
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.normal)
    }
}

/// A capsule whose radius varies linearly from `radius_bottom` (at
/// `-half_height`) to `radius_top` (at `+half_height`).
#[derive(Debug, Clone, PartialEq)]
pub struct TaperedCapsule {
    pub half_height: f32,
    pub radius_bottom: f32,
    pub radius_top: f32,
    /// Present when the capsule is one-sided.
    pub split: Option<SplitPlane>,
}

impl TaperedCapsule {
    /// Creates a two-sided tapered capsule.
    pub fn new(half_height: f32, radius_bottom: f32, radius_top: f32) -> WeftResult<Self> {
        for (label, r) in [("bottom", radius_bottom), ("top", radius_top)] {
            if r <= 0.0 || !r.is_finite() {
                return Err(WeftError::InvalidShape(format!(
                    "tapered capsule {label} radius must be positive, got {r}"
                )));
            }
        }
        if half_height < 0.0 || !half_height.is_finite() {
            return Err(WeftError::InvalidShape(format!(
                "tapered capsule half height must be non-negative, got {half_height}"
            )));
        }
        Ok(Self {
            half_height,
            radius_bottom,
            radius_top,
            split: None,
        })
    }

    /// Marks the capsule one-sided with the given split plane.
    pub fn one_sided(mut self, split: SplitPlane) -> Self {
        self.split = Some(split);
        self
    }

    /// Returns true if the capsule carries a split plane.
    pub fn is_one_sided(&self) -> bool {
        self.split.is_some()
    }
}

impl ColliderQuery for TaperedCapsule {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let (r1, r2) = (self.radius_bottom, self.radius_top);
        let a = Vec3::new(0.0, 0.0, -self.half_height);
        let b = Vec3::new(0.0, 0.0, self.half_height);
        let length = 2.0 * self.half_height;

        // One end sphere swallows the other: the larger sphere is the shape.
        if length <= (r1 - r2).abs() {
            let (center, r) = if r1 >= r2 { (a, r1) } else { (b, r2) };
            let offset = local - center;
            return (offset.length() - r, normalize_or(offset, Vec3::Z));
        }

        // Work in the (radial, axial) half-plane through the axis.
        let q = local - a;
        let y = q.z;
        let radial = Vec3::new(q.x, q.y, 0.0);
        let x = radial.length();
        let e = try_normalize(radial).unwrap_or(Vec3::X);

        let sin_t = (r1 - r2) / length;
        let cos_t = (1.0 - sin_t * sin_t).sqrt();

        // Position along the slanted side; the tangent points sit at 0
        // (bottom sphere) and `length * cos_t` (top sphere).
        let s = y * cos_t - x * sin_t;
        if s <= 0.0 {
            let offset = local - a;
            (offset.length() - r1, normalize_or(offset, -Vec3::Z))
        } else if s >= length * cos_t {
            let offset = local - b;
            (offset.length() - r2, normalize_or(offset, Vec3::Z))
        } else {
            let phi = x * cos_t + y * sin_t - r1;
            (phi, (cos_t * e + sin_t * Vec3::Z).normalize())
        }
    }

    fn local_bounds(&self) -> Aabb {
        let r = self.radius_bottom.max(self.radius_top);
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(r, r, self.half_height + r))
    }
}
