//! # weft-collider
//!
//! Collider shapes and the signed-distance queries the solver runs
//! against them.
//!
//! Every shape answers [`ColliderQuery`] in its own local frame. Shapes
//! are grouped into a closed [`Shape`] enum and split into two classes:
//! 1. **Simple** shapes (sphere, capsules, convex, grid level set) are
//!    cheap enough to query per particle.
//! 2. **Complex** shapes (skinned and learned level sets) are queried
//!    once per collider over the whole particle range, see
//!    [`Shape::batch_phi_with_normal`].

pub mod batch;
pub mod bone_map;
pub mod capsule;
pub mod convex;
pub mod instance;
pub mod kinematics;
pub mod lattice;
pub mod level_set;
pub mod ml_level_set;
pub mod query;
pub mod shape;
pub mod sphere;

pub use batch::BatchQueryResult;
pub use bone_map::BoneMap;
pub use capsule::{Capsule, SplitPlane, TaperedCapsule};
pub use convex::{Convex, Plane};
pub use instance::ColliderInstance;
pub use kinematics::Kinematics;
pub use lattice::{BoneInfluences, WeightedLatticeLevelSet};
pub use level_set::{SimpleLevelSet, UniformGrid};
pub use ml_level_set::{Activation, DenseLayer, MlLevelSet};
pub use query::{sphere_trace, ColliderQuery, SurfaceHit};
pub use shape::{Shape, ShapeClass};
pub use sphere::Sphere;
