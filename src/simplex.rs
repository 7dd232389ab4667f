// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::Vec3;

use crate::SupportPoint;

/// Geometric quantities with magnitude below this are treated as zero.
///
/// The same tolerance drives the affine-dependence test and the Voronoi
/// region classification, which can misclassify extremely thin inputs as
/// non-colliding. That is an accepted approximation of the solver.
pub const EPSILON: f32 = 1e-6;
/// Squared-length companion of [`EPSILON`].
pub const EPSILON_SQUARED: f32 = EPSILON * EPSILON;

const MAX_POINTS: usize = 4;

/// The GJK working set: up to four Minkowski-difference points.
///
/// Backed by a fixed array plus a live count. Removal swaps the last live
/// point into the freed slot, so slot identity is not meaningful across
/// iterations; only the set of live points is. A single instance is meant
/// to be reused across many queries (cleared at the start of each run) but
/// never shared between concurrent queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplex {
    points: [SupportPoint; MAX_POINTS],
    used: usize,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.used = 0;
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Appends `point` as the newest vertex. The GJK driver resolves a
    /// four-point simplex before ever adding a fifth.
    pub fn add(&mut self, point: SupportPoint) {
        debug_assert!(self.used < MAX_POINTS);
        self.points[self.used] = point;
        self.used += 1;
    }

    /// Drops the vertex at `index` by moving the current last vertex into
    /// its slot. Used to discard a point proven unable to bound the origin.
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < self.used);
        self.used -= 1;
        self.points[index] = self.points[self.used];
    }

    /// The most recently added vertex. Caller guarantees non-empty.
    pub fn last(&self) -> SupportPoint {
        self.points[self.used - 1]
    }

    /// The live vertices, oldest first.
    pub fn points(&self) -> &[SupportPoint] {
        &self.points[..self.used]
    }

    /// True when the live vertices span a lower dimension than their count
    /// allows: a coincident pair, a collinear triple, or a coplanar
    /// quadruple. Further support queries cannot grow such a simplex toward
    /// enclosing the origin, so the search stops.
    pub fn is_affinely_dependent(&self) -> bool {
        match self.used {
            0 | 1 => false,
            2 => (self.points[0].w - self.points[1].w).length_squared() < EPSILON_SQUARED,
            3 => {
                let l1 = self.points[1].w - self.points[0].w;
                let l2 = self.points[2].w - self.points[0].w;
                l1.cross(l2).length_squared() < EPSILON_SQUARED
            }
            4 => {
                let ad = self.points[0].w - self.points[3].w;
                let bd = self.points[1].w - self.points[3].w;
                let cd = self.points[2].w - self.points[3].w;
                ad.dot(bd.cross(cd)).abs() <= EPSILON
            }
            _ => false,
        }
    }

    /// Tests whether the simplex encloses the origin, updating `direction`
    /// to the next search direction when it does not.
    ///
    /// Only a tetrahedron can report containment; lower-order simplices
    /// always return false and steer the search instead.
    pub fn contains_origin(&mut self, direction: &mut Vec3) -> bool {
        match self.used {
            1 => {
                *direction = -*direction;
                false
            }
            2 => {
                let a = self.points[1].w;
                let b = self.points[0].w;
                let ab = b - a;
                *direction = triple_product(ab, -a, ab);

                // Origin lies on the segment itself; any perpendicular works.
                if direction.length_squared() < EPSILON_SQUARED {
                    *direction = ab.cross(Vec3::X);
                    if direction.length_squared() < EPSILON_SQUARED {
                        *direction = ab.cross(Vec3::Z);
                    }
                }
                false
            }
            3 => {
                let (a, b, c) = (self.points[2].w, self.points[1].w, self.points[0].w);
                self.triangle(a, b, c, direction);
                false
            }
            4 => {
                let (a, b, c, d) = (
                    self.points[3].w,
                    self.points[2].w,
                    self.points[1].w,
                    self.points[0].w,
                );
                self.tetrahedron(a, b, c, d, direction)
            }
            _ => false,
        }
    }

    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, direction: &mut Vec3) {
        let n = (b - a).cross(c - a);
        let ao = -a;

        // Origin beyond edge ab: drop c, search perpendicular to ab toward it.
        if (b - a).cross(n).dot(ao) > 0.0 {
            self.remove(0);
            *direction = (b - a).cross(ao).cross(b - a);
            return;
        }

        // Origin beyond edge ac: drop b.
        if n.cross(c - a).dot(ao) > 0.0 {
            self.remove(1);
            *direction = (c - a).cross(ao).cross(c - a);
            return;
        }

        // Origin projects inside the triangle; search along the facing side.
        if n.dot(ao) > 0.0 {
            *direction = n;
        } else {
            *direction = -n;
        }
    }

    fn tetrahedron(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, direction: &mut Vec3) -> bool {
        // By construction the origin is above face bcd and below vertex a,
        // so only the three faces sharing a need testing.
        let abc = (b - a).cross(c - a);
        let acd = (c - a).cross(d - a);
        let adb = (d - a).cross(b - a);
        let ao = -a;

        if abc.dot(ao) > 0.0 {
            self.remove(0);
            *direction = abc;
            return false;
        }

        if acd.dot(ao) > 0.0 {
            self.remove(2);
            *direction = acd;
            return false;
        }

        if adb.dot(ao) > 0.0 {
            self.remove(1);
            *direction = adb;
            return false;
        }

        true
    }
}

fn triple_product(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a.cross(b).cross(c)
}
