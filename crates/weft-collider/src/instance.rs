//! A placed collider: shape plus pose and motion for the current step.

use std::sync::Arc;

use glam::Vec3;
use weft_math::RigidTransform;
use weft_types::BoneIndex;

use crate::bone_map::BoneMap;
use crate::kinematics::Kinematics;
use crate::shape::{Shape, ShapeClass};

/// A collider as seen by the solver for one outer step.
///
/// The shape is shared so that many instances (or many steps) can point
/// at the same level set data without copying it.
#[derive(Debug, Clone)]
pub struct ColliderInstance {
    pub shape: Arc<Shape>,
    /// Pose at the end of the step.
    pub transform: RigidTransform,
    /// Pose at the start of the step (used by CCD).
    pub previous_transform: RigidTransform,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub bone_map: Option<BoneMap>,
}

impl ColliderInstance {
    /// A stationary collider at `transform`.
    pub fn new(shape: impl Into<Arc<Shape>>, transform: RigidTransform) -> Self {
        Self {
            shape: shape.into(),
            transform,
            previous_transform: transform,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            bone_map: None,
        }
    }

    pub fn with_velocity(mut self, linear: Vec3, angular: Vec3) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    pub fn with_previous_transform(mut self, previous: RigidTransform) -> Self {
        self.previous_transform = previous;
        self
    }

    pub fn with_bone_map(mut self, bone_map: BoneMap) -> Self {
        self.bone_map = Some(bone_map);
        self
    }

    pub fn class(&self) -> ShapeClass {
        self.shape.class()
    }

    /// Rigid motion of the collider about its current origin.
    pub fn kinematics(&self) -> Kinematics {
        Kinematics::new(self.transform.translation, self.linear_velocity, self.angular_velocity)
    }

    /// Friction reference for a contact whose dominant bone is `bone`.
    ///
    /// Uses the mapped external bone when there is one, otherwise the
    /// collider's rigid motion.
    pub fn reference_kinematics(&self, bone: Option<BoneIndex>) -> Kinematics {
        bone.and_then(|b| self.bone_map.as_ref()?.lookup(b).copied())
            .unwrap_or_else(|| self.kinematics())
    }

    /// Advances to `transform`, deriving velocities from the pose change over `dt`.
    pub fn move_to(&mut self, transform: RigidTransform, dt: f32) {
        self.previous_transform = self.transform;
        self.transform = transform;
        if dt <= 0.0 {
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
            return;
        }

        self.linear_velocity = (transform.translation - self.previous_transform.translation) / dt;

        let mut delta = transform.rotation * self.previous_transform.rotation.inverse();
        if delta.w < 0.0 {
            delta = -delta;
        }
        let (axis, angle) = delta.to_axis_angle();
        self.angular_velocity = if angle.abs() > 0.0 { axis * (angle / dt) } else { Vec3::ZERO };
    }
}
