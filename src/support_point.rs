// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::Vec3;

/// One vertex of the simplex in Minkowski-difference space, together with
/// the world-space witness points on each shape that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SupportPoint {
    /// Farthest point on shape A along the search direction, world space.
    pub s1: Vec3,
    /// Farthest point on shape B against the search direction, world space.
    pub s2: Vec3,
    /// Minkowski difference `s1 - s2`.
    pub w: Vec3,
}

impl SupportPoint {
    pub fn new(s1: Vec3, s2: Vec3) -> Self {
        Self { s1, s2, w: s1 - s2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_point_stores_minkowski_difference() {
        let point = SupportPoint::new(Vec3::new(3.0, 1.0, -2.0), Vec3::new(1.0, 1.0, 4.0));
        assert_eq!(point.w, Vec3::new(2.0, 0.0, -6.0));
    }
}
