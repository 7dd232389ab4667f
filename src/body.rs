// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::{Mat3, Quat, Vec3};

use crate::Shape;
use crate::simplex::EPSILON;

/// How the simulation treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Never integrated, never moved.
    Static,
    /// Not integrated, may be moved by the caller.
    Kinematic,
    /// Integrated and moved by physics.
    #[default]
    Dynamic,
}

/// Surface response coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProperties {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BodyProperties {
    fn default() -> Self {
        Self {
            friction: 0.25,
            restitution: 0.0,
        }
    }
}

/// Velocity, accumulated loads, and mass/inertia bookkeeping for a dynamic
/// body. Zero mass stands for infinite mass: inverse mass and inverse
/// inertia both collapse to zero and the body behaves as unmovable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicProperties {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub force: Vec3,
    pub torque: Vec3,
    pub inverse_mass: f32,
    pub inverse_inertia: Mat3,
    pub world_inverse_inertia: Mat3,
}

impl DynamicProperties {
    pub fn new(mass: f32, shape: &Shape) -> Self {
        let inverse_mass = safe_inverse(mass);
        let inverse_inertia = if inverse_mass < EPSILON {
            Mat3::ZERO
        } else {
            shape.inertia(mass).inverse()
        };

        Self {
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            inverse_mass,
            inverse_inertia,
            world_inverse_inertia: inverse_inertia,
        }
    }

    /// Infinite-mass properties for bodies that never respond to loads.
    pub fn zero() -> Self {
        Self {
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            inverse_mass: 0.0,
            inverse_inertia: Mat3::ZERO,
            world_inverse_inertia: Mat3::ZERO,
        }
    }

    /// World-space inverse inertia `R * I^-1 * R^T` for the given rotation.
    pub fn world_inertia(&self, rotation: Quat) -> Mat3 {
        let r = Mat3::from_quat(rotation);
        r * self.inverse_inertia * r.transpose()
    }
}

/// Inverse that treats near-zero input as zero instead of blowing up.
pub fn safe_inverse(value: f32) -> f32 {
    if value > EPSILON { 1.0 / value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn safe_inverse_handles_zero_and_tiny_values() {
        assert_eq!(safe_inverse(0.0), 0.0);
        assert_eq!(safe_inverse(EPSILON / 2.0), 0.0);
        assert_approx_eq!(safe_inverse(4.0), 0.25, 1e-6);
    }

    #[test]
    fn zero_mass_body_has_no_inverse_inertia() {
        let shape = Shape::cuboid(Vec3::splat(0.5)).unwrap();
        let dynamics = DynamicProperties::new(0.0, &shape);
        assert_eq!(dynamics.inverse_mass, 0.0);
        assert_eq!(dynamics.inverse_inertia, Mat3::ZERO);
        assert_eq!(dynamics.world_inverse_inertia, Mat3::ZERO);
    }

    #[test]
    fn box_inverse_inertia_inverts_the_tensor() {
        let shape = Shape::cuboid(Vec3::splat(0.5)).unwrap();
        let mass = 6.0;
        let dynamics = DynamicProperties::new(mass, &shape);
        let product = shape.inertia(mass) * dynamics.inverse_inertia;
        assert_approx_eq!(product.col(0).x, 1.0, 1e-5);
        assert_approx_eq!(product.col(1).y, 1.0, 1e-5);
        assert_approx_eq!(product.col(2).z, 1.0, 1e-5);
    }

    #[test]
    fn world_inertia_is_identity_rotation_stable() {
        let shape = Shape::cuboid(Vec3::new(0.5, 1.0, 1.5)).unwrap();
        let dynamics = DynamicProperties::new(2.0, &shape);
        let world = dynamics.world_inertia(Quat::IDENTITY);
        assert_approx_eq!(world.col(0).x, dynamics.inverse_inertia.col(0).x, 1e-6);
        assert_approx_eq!(world.col(1).y, dynamics.inverse_inertia.col(1).y, 1e-6);
        assert_approx_eq!(world.col(2).z, dynamics.inverse_inertia.col(2).z, 1e-6);
    }

    #[test]
    fn world_inertia_follows_rotation() {
        // Rotating a box 90 degrees around Z swaps its x and y axes.
        let shape = Shape::cuboid(Vec3::new(0.5, 1.0, 1.5)).unwrap();
        let dynamics = DynamicProperties::new(2.0, &shape);
        let world = dynamics.world_inertia(Quat::from_rotation_z(FRAC_PI_2));
        assert_approx_eq!(world.col(0).x, dynamics.inverse_inertia.col(1).y, 1e-5);
        assert_approx_eq!(world.col(1).y, dynamics.inverse_inertia.col(0).x, 1e-5);
        assert_approx_eq!(world.col(2).z, dynamics.inverse_inertia.col(2).z, 1e-5);
    }
}
