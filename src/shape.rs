// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::{Mat3, Vec3};

use crate::{Aabb, CollisionError};

/// Convex primitives understood by the narrow phase.
///
/// Each variant answers support queries in its own local space; world-space
/// placement lives in [`crate::Origin`]. Shapes are stateless with respect
/// to collision queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Box described by half extents along each local axis.
    Box { half_extents: Vec3 },
    /// Sphere centered at the local origin.
    Sphere { radius: f32 },
}

impl Shape {
    pub fn cuboid(half_extents: Vec3) -> Result<Self, CollisionError> {
        if !half_extents.is_finite() || half_extents.min_element() < 0.0 {
            return Err(CollisionError::InvalidShape(format!(
                "box half extents must be finite and non-negative, got {half_extents}"
            )));
        }
        Ok(Self::Box { half_extents })
    }

    pub fn cube(side: f32) -> Result<Self, CollisionError> {
        Self::cuboid(Vec3::splat(side / 2.0))
    }

    pub fn sphere(radius: f32) -> Result<Self, CollisionError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CollisionError::InvalidShape(format!(
                "sphere radius must be finite and non-negative, got {radius}"
            )));
        }
        Ok(Self::Sphere { radius })
    }

    /// Farthest point of the shape along `direction`, in local space.
    ///
    /// `direction` need not be normalized but must be non-zero; a zero
    /// direction is a caller error.
    pub fn support_local(&self, direction: Vec3) -> Vec3 {
        match *self {
            Shape::Box { half_extents } => Vec3::new(
                if direction.x < 0.0 { -half_extents.x } else { half_extents.x },
                if direction.y < 0.0 { -half_extents.y } else { half_extents.y },
                if direction.z < 0.0 { -half_extents.z } else { half_extents.z },
            ),
            Shape::Sphere { radius } => direction.normalize_or_zero() * radius,
        }
    }

    /// Local-space inertia tensor for the given mass.
    pub fn inertia(&self, mass: f32) -> Mat3 {
        match *self {
            Shape::Box { half_extents } => {
                let w = half_extents.x * 2.0;
                let h = half_extents.y * 2.0;
                let d = half_extents.z * 2.0;
                let m = mass / 12.0;
                Mat3::from_diagonal(Vec3::new(
                    m * (h * h + d * d),
                    m * (w * w + d * d),
                    m * (w * w + h * h),
                ))
            }
            Shape::Sphere { .. } => Mat3::from_diagonal(Vec3::splat(mass)),
        }
    }

    /// Local-space bounding box, the seed for broad-phase world AABBs.
    pub fn local_aabb(&self) -> Aabb {
        match *self {
            Shape::Box { half_extents } => Aabb::new(-half_extents, half_extents),
            Shape::Sphere { radius } => Aabb::new(Vec3::splat(-radius), Vec3::splat(radius)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn box_support_selects_extent_corner() {
        let shape = Shape::cuboid(Vec3::new(0.5, 1.0, 2.0)).unwrap();
        assert_eq!(
            shape.support_local(Vec3::new(1.0, -3.0, 0.25)),
            Vec3::new(0.5, -1.0, 2.0)
        );
        // A zero component counts as positive.
        assert_eq!(
            shape.support_local(Vec3::new(0.0, -1.0, 0.0)),
            Vec3::new(0.5, -1.0, 2.0)
        );
    }

    #[test]
    fn sphere_support_has_radius_length() {
        let shape = Shape::sphere(2.5).unwrap();
        let support = shape.support_local(Vec3::new(1.0, 2.0, -2.0));
        assert_approx_eq!(support.length(), 2.5, 1e-5);
        // Support is parallel to the query direction.
        let expected = Vec3::new(1.0, 2.0, -2.0).normalize() * 2.5;
        assert_approx_eq!(support.x, expected.x, 1e-5);
        assert_approx_eq!(support.y, expected.y, 1e-5);
        assert_approx_eq!(support.z, expected.z, 1e-5);
    }

    #[test]
    fn box_inertia_matches_solid_cuboid() {
        let shape = Shape::cuboid(Vec3::new(0.5, 1.0, 1.5)).unwrap();
        let inertia = shape.inertia(12.0);
        // Full extents 1 x 2 x 3.
        assert_approx_eq!(inertia.col(0).x, 4.0 + 9.0, 1e-5);
        assert_approx_eq!(inertia.col(1).y, 1.0 + 9.0, 1e-5);
        assert_approx_eq!(inertia.col(2).z, 1.0 + 4.0, 1e-5);
    }

    #[test]
    fn constructors_reject_bad_parameters() {
        assert!(Shape::sphere(-1.0).is_err());
        assert!(Shape::sphere(f32::NAN).is_err());
        assert!(Shape::cuboid(Vec3::new(1.0, -0.5, 1.0)).is_err());
        assert!(Shape::cuboid(Vec3::splat(f32::INFINITY)).is_err());
        // Zero-volume shapes are allowed; the solver treats them as degenerate.
        assert!(Shape::cuboid(Vec3::new(1.0, 0.0, 1.0)).is_ok());
        assert!(Shape::sphere(0.0).is_ok());
    }

    #[test]
    fn local_aabb_wraps_shape() {
        let shape = Shape::cuboid(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let aabb = shape.local_aabb();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));

        let sphere = Shape::sphere(1.5).unwrap();
        assert_eq!(sphere.local_aabb().max, Vec3::splat(1.5));
    }
}
