// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::Vec3;

use crate::{Origin, Shape, Simplex, SupportPoint};

/// Upper bound on GJK iterations before giving up. Reaching the cap is a
/// normal termination path reported as no collision, not an error.
pub const GJK_MAX_ITERATIONS: u32 = 32;

/// Boolean overlap test between two positioned convex shapes.
///
/// Runs the GJK fixed-point iteration over the shapes' support functions,
/// growing `simplex` in Minkowski-difference space until it either encloses
/// the origin (overlap) or proves the origin unreachable (separation).
///
/// The caller-supplied simplex is cleared first and mutated in place, so a
/// single instance can be reused across many queries without allocation.
/// Its final contents are an implementation artifact, useful as a seed for
/// a follow-up penetration pass but not otherwise guaranteed.
pub fn gjk_intersect(
    shape_a: &Shape,
    origin_a: &Origin,
    shape_b: &Shape,
    origin_b: &Origin,
    simplex: &mut Simplex,
) -> bool {
    simplex.clear();

    let mut direction = Vec3::Y;

    let mut iteration = 0;
    while iteration < GJK_MAX_ITERATIONS {
        let support = minkowski_support(shape_a, origin_a, shape_b, origin_b, direction);
        simplex.add(support);

        // The newest point never made it past the origin along the search
        // direction, so the Minkowski difference cannot reach it.
        if simplex.last().w.dot(direction) <= 0.0 {
            return false;
        }

        if simplex.is_affinely_dependent() {
            return false;
        }

        if simplex.contains_origin(&mut direction) {
            return true;
        }

        iteration += 1;
    }

    log::trace!("gjk: iteration cap reached, reporting separation");
    false
}

/// World-space support point of one positioned shape: the query direction
/// is taken into local space, answered there, and the answer brought back.
fn support(shape: &Shape, origin: &Origin, direction: Vec3) -> Vec3 {
    origin.local_to_world_point(shape.support_local(origin.world_to_local_direction(direction)))
}

fn minkowski_support(
    shape_a: &Shape,
    origin_a: &Origin,
    shape_b: &Shape,
    origin_b: &Origin,
    direction: Vec3,
) -> SupportPoint {
    let s1 = support(shape_a, origin_a, direction);
    let s2 = support(shape_b, origin_b, -direction);
    SupportPoint::new(s1, s2)
}
