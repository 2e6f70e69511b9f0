//! The closed set of collider shapes.
//!
//! Dispatch is a `match` over [`Shape`], so adding a shape means adding a
//! variant here and teaching the solver nothing new.

use glam::Vec3;
use weft_math::Aabb;
use weft_types::BoneIndex;

use crate::capsule::{Capsule, SplitPlane, TaperedCapsule};
use crate::convex::Convex;
use crate::lattice::WeightedLatticeLevelSet;
use crate::level_set::SimpleLevelSet;
use crate::ml_level_set::MlLevelSet;
use crate::query::{ColliderQuery, SurfaceHit};
use crate::sphere::Sphere;

/// Solver category of a shape.
///
/// Simple shapes are queried per particle. Complex shapes are queried in
/// one batch per collider over the whole particle range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeClass {
    Simple,
    Complex,
}

/// A collider shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Capsule(Capsule),
    TaperedCapsule(TaperedCapsule),
    Convex(Convex),
    SimpleLevelSet(SimpleLevelSet),
    WeightedLatticeLevelSet(WeightedLatticeLevelSet),
    MlLevelSet(MlLevelSet),
}

impl Shape {
    /// Category of this shape. Depends only on the variant.
    pub fn class(&self) -> ShapeClass {
        match self {
            Shape::Sphere(_)
            | Shape::Capsule(_)
            | Shape::TaperedCapsule(_)
            | Shape::Convex(_)
            | Shape::SimpleLevelSet(_) => ShapeClass::Simple,
            Shape::WeightedLatticeLevelSet(_) | Shape::MlLevelSet(_) => ShapeClass::Complex,
        }
    }

    pub fn is_simple(&self) -> bool {
        self.class() == ShapeClass::Simple
    }

    pub fn is_complex(&self) -> bool {
        self.class() == ShapeClass::Complex
    }

    /// Short name for logs and reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Sphere(_) => "sphere",
            Shape::Capsule(_) => "capsule",
            Shape::TaperedCapsule(_) => "tapered_capsule",
            Shape::Convex(_) => "convex",
            Shape::SimpleLevelSet(_) => "level_set",
            Shape::WeightedLatticeLevelSet(_) => "weighted_lattice_level_set",
            Shape::MlLevelSet(_) => "ml_level_set",
        }
    }

    /// Split plane of a one-sided tapered capsule.
    pub fn one_sided_split(&self) -> Option<&SplitPlane> {
        match self {
            Shape::TaperedCapsule(capsule) => capsule.split.as_ref(),
            _ => None,
        }
    }

    /// Distance, normal and dominant bone in one evaluation.
    ///
    /// Skinned shapes pull the point back into embedding space once and
    /// reuse it for all three outputs.
    pub fn query_with_bone(&self, local: Vec3) -> (f32, Vec3, Option<BoneIndex>) {
        match self {
            Shape::WeightedLatticeLevelSet(lattice) => lattice.query(local),
            other => {
                let (phi, normal) = other.phi_with_normal(local);
                (phi, normal, None)
            }
        }
    }
}

macro_rules! dispatch {
    ($shape:expr, $s:ident => $body:expr) => {
        match $shape {
            Shape::Sphere($s) => $body,
            Shape::Capsule($s) => $body,
            Shape::TaperedCapsule($s) => $body,
            Shape::Convex($s) => $body,
            Shape::SimpleLevelSet($s) => $body,
            Shape::WeightedLatticeLevelSet($s) => $body,
            Shape::MlLevelSet($s) => $body,
        }
    };
}

impl ColliderQuery for Shape {
    fn phi_with_normal(&self, local: Vec3) -> (f32, Vec3) {
        dispatch!(self, s => s.phi_with_normal(local))
    }

    fn local_bounds(&self) -> Aabb {
        dispatch!(self, s => s.local_bounds())
    }

    fn find_closest_intersection(&self, start: Vec3, end: Vec3, thickness: f32) -> Option<SurfaceHit> {
        dispatch!(self, s => s.find_closest_intersection(start, end, thickness))
    }

    fn dominant_bone(&self, local: Vec3) -> Option<BoneIndex> {
        dispatch!(self, s => s.dominant_bone(local))
    }
}

macro_rules! impl_from_shape {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Shape {
                fn from(shape: $variant) -> Self {
                    Shape::$variant(shape)
                }
            }
        )*
    };
}

impl_from_shape!(
    Sphere,
    Capsule,
    TaperedCapsule,
    Convex,
    SimpleLevelSet,
    WeightedLatticeLevelSet,
    MlLevelSet
);
