//! Position-based Coulomb friction.
//!
//! Friction is applied as a tangential position correction after a
//! contact push. It never touches velocities, so it stays stable under
//! any number of relaxation iterations.

use glam::Vec3;
use weft_collider::Kinematics;
use weft_math::geometry::project_to_tangent_plane;
use weft_types::constants::SLIP_EPSILON;

/// Removes up to `max_correction` of the particle's tangential slip
/// relative to the collider surface.
///
/// `max_correction` is `μ · depth`. The slip is the step displacement
/// `predicted − prior` minus the surface motion `reference.velocity_at(predicted) · dt`,
/// projected onto the tangent plane of `normal`.
pub fn apply_friction(
    predicted: Vec3,
    prior: Vec3,
    normal: Vec3,
    max_correction: f32,
    dt: f32,
    reference: &Kinematics,
) -> Vec3 {
    if max_correction <= 0.0 {
        return predicted;
    }
    let surface_velocity = reference.velocity_at(predicted);
    let displacement = (predicted - prior) - surface_velocity * dt;
    let slip = project_to_tangent_plane(displacement, normal);
    let slip_length = slip.length();
    if slip_length <= SLIP_EPSILON {
        return predicted;
    }
    let correction = max_correction.min(slip_length);
    predicted - slip * (correction / slip_length)
}
