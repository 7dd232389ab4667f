// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::{Quat, Vec3};

/// Position and orientation of one shape instance.
///
/// The inverse rotation is cached so the world-to-local direction transform
/// in the GJK inner loop stays a single quaternion multiply. An `Origin` is
/// read-only for the duration of a collision query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    position: Vec3,
    rotation: Quat,
    inv_rotation: Quat,
}

impl Origin {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            inv_rotation: rotation.inverse(),
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.inv_rotation = rotation.inverse();
    }

    pub fn world_to_local_direction(&self, direction: Vec3) -> Vec3 {
        self.inv_rotation * direction
    }

    pub fn local_to_world_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    pub fn world_to_local_point(&self, point: Vec3) -> Vec3 {
        self.inv_rotation * (point - self.position)
    }

    pub fn local_to_world_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec3_approx(actual: Vec3, expected: Vec3) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(actual.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn point_round_trips_through_local_space() {
        let origin = Origin::new(
            Vec3::new(3.0, -2.0, 5.0),
            Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.2, 0.7),
        );
        let point = Vec3::new(1.0, 2.0, 3.0);
        let round_trip = origin.local_to_world_point(origin.world_to_local_point(point));
        assert_vec3_approx(round_trip, point);
    }

    #[test]
    fn direction_transform_ignores_translation() {
        let rotation = Quat::from_rotation_z(FRAC_PI_2);
        let origin = Origin::new(Vec3::new(100.0, 0.0, 0.0), rotation);
        // Rotating +X by 90 degrees around Z yields +Y, wherever the origin sits.
        assert_vec3_approx(origin.local_to_world_direction(Vec3::X), Vec3::Y);
        assert_vec3_approx(origin.world_to_local_direction(Vec3::Y), Vec3::X);
    }

    #[test]
    fn set_rotation_refreshes_cached_inverse() {
        let mut origin = Origin::from_position(Vec3::ZERO);
        origin.set_rotation(Quat::from_rotation_y(FRAC_PI_2));
        let back = origin.world_to_local_direction(origin.local_to_world_direction(Vec3::Z));
        assert_vec3_approx(back, Vec3::Z);
    }
}
