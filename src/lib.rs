// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

mod aabb;
mod body;
mod broad_phase;
mod gjk;
mod origin;
mod shape;
mod simplex;
mod support_point;
mod world;

pub use aabb::Aabb;
pub use body::{BodyProperties, BodyType, DynamicProperties, safe_inverse};
pub use broad_phase::{AABB_MARGIN, AabbTree, NodeId};
pub use gjk::{GJK_MAX_ITERATIONS, gjk_intersect};
pub use origin::Origin;
pub use shape::Shape;
pub use simplex::{EPSILON, EPSILON_SQUARED, Simplex};
pub use support_point::SupportPoint;
pub use world::{BodyKey, CollisionWorld};

use thiserror::Error;

/// Errors surfaced by the world-level API.
///
/// The geometric core itself never fails: degenerate configurations are
/// numeric branches that resolve to a boolean verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollisionError {
    #[error("invalid shape parameter: {0}")]
    InvalidShape(String),
    #[error("unknown body key")]
    UnknownBody,
}
