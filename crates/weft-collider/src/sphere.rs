//! Analytical sphere collider.

use glam::Vec3;
use weft_math::geometry::try_normalize;
use weft_math::Aabb;
use weft_types::{WeftError, WeftResult};

use crate::query::{ColliderQuery, SurfaceHit};

/// A sphere centered at the local origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    /// Radius of the sphere.
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere. The radius must be positive.
    pub fn new(radius: f32) -> WeftResult<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return Err(WeftError::InvalidShape(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        Ok(Self { radius })
    }
}

impl ColliderQuery for Sphere {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        let dist = local.length();
        // Exactly at the center any direction is closest; pick +Z.
        let normal = try_normalize(local).unwrap_or(Vec3::Z);
        (dist - self.radius, normal)
    }

    fn local_bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(self.radius))
    }

    fn find_closest_intersection(&self, start: Vec3, end: Vec3, thickness: f32) -> Option<SurfaceHit> {
        let r = self.radius + thickness;
        let c = start.length_squared() - r * r;
        if c <= 0.0 {
            return None;
        }

        let d = end - start;
        let a = d.length_squared();
        if a <= f32::EPSILON {
            return None;
        }
        let b = 2.0 * start.dot(d);
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let t = (-b - disc.sqrt()) / (2.0 * a);
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let point = start + t * d;
        let normal = try_normalize(point).unwrap_or(Vec3::Z);
        Some(SurfaceHit { point, normal, time: t })
    }
}
