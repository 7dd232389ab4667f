// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::Vec3;

use crate::Origin;

/// Axis-aligned bounding box. Invariant: `min <= max` component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box by `margin` on every side. The broad phase stores
    /// these fat boxes so small movements don't force tree updates.
    pub fn expand(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Surface area, the cost metric for broad-phase sibling selection.
    pub fn area(&self) -> f32 {
        let extent = self.max - self.min;
        2.0 * (extent.x * extent.y + extent.y * extent.z + extent.z * extent.x)
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && other.max.x <= self.max.x
            && self.min.y <= other.min.y
            && other.max.y <= self.max.y
            && self.min.z <= other.min.z
            && other.max.z <= self.max.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        !(point.x < self.min.x
            || point.x > self.max.x
            || point.y < self.min.y
            || point.y > self.max.y
            || point.z < self.min.z
            || point.z > self.max.z)
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        (self.clamp_point(center) - center).length_squared() <= radius * radius
    }

    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        (self.clamp_point(point) - point).length()
    }

    /// World-space AABB of this local-space box placed at `origin`: the
    /// eight corner offsets are rotated and re-wrapped axis-aligned, so the
    /// result is conservative for any rotation.
    pub fn transform(&self, origin: &Origin) -> Aabb {
        let center = self.center();
        let half = (self.max - self.min) * 0.5;

        let right = origin.local_to_world_direction(Vec3::new(half.x, 0.0, 0.0));
        let up = origin.local_to_world_direction(Vec3::new(0.0, half.y, 0.0));
        let forward = origin.local_to_world_direction(Vec3::new(0.0, 0.0, half.z));

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    let corner = center + right * sx + up * sy + forward * sz;
                    min = min.min(corner);
                    max = max.max(corner);
                }
            }
        }

        Aabb::new(min + origin.position(), max + origin.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_4;

    fn unit() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn union_covers_both_boxes() {
        let a = Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(0.0, -2.0, 0.5), Vec3::new(3.0, 0.5, 0.75));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 1.0, 1.0));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
    }

    #[test]
    fn intersection_is_inclusive_of_touching_faces() {
        let a = unit();
        let touching = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        let apart = Aabb::new(Vec3::new(1.1, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        assert!(a.intersects(&touching));
        assert!(touching.intersects(&a));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn point_queries_clamp_to_surface() {
        let a = unit();
        assert!(a.contains_point(Vec3::ZERO));
        assert!(a.contains_point(Vec3::splat(1.0)));
        assert!(!a.contains_point(Vec3::new(1.01, 0.0, 0.0)));
        assert_eq!(a.clamp_point(Vec3::new(5.0, 0.5, -9.0)), Vec3::new(1.0, 0.5, -1.0));
        assert_approx_eq!(a.distance_to_point(Vec3::new(4.0, 0.0, 0.0)), 3.0, 1e-5);
        assert_approx_eq!(a.distance_to_point(Vec3::ZERO), 0.0, 1e-6);
    }

    #[test]
    fn sphere_test_uses_closest_point() {
        let a = unit();
        assert!(a.intersects_sphere(Vec3::new(2.0, 0.0, 0.0), 1.0));
        assert!(!a.intersects_sphere(Vec3::new(2.0, 2.0, 0.0), 1.0));
        assert!(a.intersects_sphere(Vec3::ZERO, 0.1));
    }

    #[test]
    fn area_matches_surface_area() {
        let a = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_approx_eq!(a.area(), 2.0 * (2.0 + 6.0 + 3.0), 1e-5);
    }

    #[test]
    fn expand_grows_every_side() {
        let fat = unit().expand(0.1);
        assert_eq!(fat.min, Vec3::splat(-1.1));
        assert_eq!(fat.max, Vec3::splat(1.1));
        assert!(fat.contains(&unit()));
    }

    #[test]
    fn transform_translates_an_unrotated_box() {
        let origin = Origin::from_position(Vec3::new(10.0, 0.0, -5.0));
        let moved = unit().transform(&origin);
        assert_eq!(moved.min, Vec3::new(9.0, -1.0, -6.0));
        assert_eq!(moved.max, Vec3::new(11.0, 1.0, -4.0));
    }

    #[test]
    fn transform_of_rotated_box_is_conservative() {
        // A unit box rotated 45 degrees around Z needs sqrt(2) of room in x/y.
        let origin = Origin::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_4));
        let wrapped = unit().transform(&origin);
        let reach = 2.0_f32.sqrt();
        assert_approx_eq!(wrapped.max.x, reach, 1e-5);
        assert_approx_eq!(wrapped.max.y, reach, 1e-5);
        assert_approx_eq!(wrapped.max.z, 1.0, 1e-5);
        assert_approx_eq!(wrapped.min.x, -reach, 1e-5);
    }
}
