// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use std::time::Instant;

use glam::{Quat, Vec3};
use rayon::prelude::*;
use slotmap::SlotMap;

use crate::broad_phase::{AabbTree, NodeId};
use crate::{
    BodyProperties, BodyType, CollisionError, DynamicProperties, Origin, Shape, Simplex,
    gjk_intersect,
};

slotmap::new_key_type! {
    /// Stable generational handle to a body in a [`CollisionWorld`].
    pub struct BodyKey;
}

#[derive(Debug)]
struct BodyData {
    shape: Shape,
    origin: Origin,
    body_type: BodyType,
    properties: BodyProperties,
    dynamics: DynamicProperties,
    node: NodeId,
}

/// Body storage plus the two collision phases: a dynamic AABB tree for
/// candidate pairs and GJK for the exact verdict.
///
/// Shapes and origins are read-only while queries run; each narrow-phase
/// worker owns its own simplex, so pair confirmation parallelizes without
/// shared mutable state.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    bodies: SlotMap<BodyKey, BodyData>,
    broad_phase: AabbTree,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Adds a body and indexes it in the broad phase. `mass` only matters
    /// for dynamic bodies; static and kinematic bodies get infinite-mass
    /// properties.
    pub fn add_body(&mut self, shape: Shape, origin: Origin, body_type: BodyType, mass: f32) -> BodyKey {
        let dynamics = match body_type {
            BodyType::Dynamic => DynamicProperties::new(mass, &shape),
            BodyType::Static | BodyType::Kinematic => DynamicProperties::zero(),
        };
        let world_aabb = shape.local_aabb().transform(&origin);

        let key = self.bodies.insert(BodyData {
            shape,
            origin,
            body_type,
            properties: BodyProperties::default(),
            dynamics,
            node: NodeId::MAX,
        });
        let node = self.broad_phase.insert(key, world_aabb);
        self.bodies[key].node = node;
        key
    }

    pub fn remove_body(&mut self, key: BodyKey) -> Result<(), CollisionError> {
        let body = self.bodies.remove(key).ok_or(CollisionError::UnknownBody)?;
        self.broad_phase.remove(body.node);
        Ok(())
    }

    pub fn shape(&self, key: BodyKey) -> Option<&Shape> {
        self.bodies.get(key).map(|body| &body.shape)
    }

    pub fn origin(&self, key: BodyKey) -> Option<&Origin> {
        self.bodies.get(key).map(|body| &body.origin)
    }

    pub fn body_type(&self, key: BodyKey) -> Option<BodyType> {
        self.bodies.get(key).map(|body| body.body_type)
    }

    pub fn properties(&self, key: BodyKey) -> Option<&BodyProperties> {
        self.bodies.get(key).map(|body| &body.properties)
    }

    pub fn dynamics(&self, key: BodyKey) -> Option<&DynamicProperties> {
        self.bodies.get(key).map(|body| &body.dynamics)
    }

    pub fn set_position(&mut self, key: BodyKey, position: Vec3) -> Result<(), CollisionError> {
        let body = self.bodies.get_mut(key).ok_or(CollisionError::UnknownBody)?;
        body.origin.set_position(position);
        let aabb = body.shape.local_aabb().transform(&body.origin);
        let node = body.node;
        self.broad_phase.update(node, aabb);
        Ok(())
    }

    pub fn set_rotation(&mut self, key: BodyKey, rotation: Quat) -> Result<(), CollisionError> {
        let body = self.bodies.get_mut(key).ok_or(CollisionError::UnknownBody)?;
        body.origin.set_rotation(rotation);
        body.dynamics.world_inverse_inertia = body.dynamics.world_inertia(rotation);
        let aabb = body.shape.local_aabb().transform(&body.origin);
        let node = body.node;
        self.broad_phase.update(node, aabb);
        Ok(())
    }

    /// Direct narrow-phase query between two bodies, reusing the caller's
    /// simplex.
    pub fn test_overlap(
        &self,
        a: BodyKey,
        b: BodyKey,
        simplex: &mut Simplex,
    ) -> Result<bool, CollisionError> {
        let body_a = self.bodies.get(a).ok_or(CollisionError::UnknownBody)?;
        let body_b = self.bodies.get(b).ok_or(CollisionError::UnknownBody)?;
        Ok(gjk_intersect(
            &body_a.shape,
            &body_a.origin,
            &body_b.shape,
            &body_b.origin,
            simplex,
        ))
    }

    /// All body pairs currently overlapping, in a deterministic order.
    ///
    /// Broad phase: every non-static body queries the tree with its world
    /// AABB; candidate pairs are ordered and deduplicated. Narrow phase:
    /// survivors are confirmed by GJK in parallel, one simplex per worker.
    /// Static-static pairs are never tested.
    pub fn colliding_pairs(&self) -> Vec<(BodyKey, BodyKey)> {
        let broad_start = Instant::now();
        let mut candidates: Vec<(BodyKey, BodyKey)> = Vec::new();
        for (key, body) in &self.bodies {
            if body.body_type == BodyType::Static {
                continue;
            }
            let world_aabb = body.shape.local_aabb().transform(&body.origin);
            self.broad_phase.query(world_aabb, |other| {
                if other != key {
                    candidates.push((key, other));
                }
            });
        }
        Self::deduplicate_pairs(&mut candidates);
        log::trace!(
            "broad phase: {} candidate pairs in {:.2?}",
            candidates.len(),
            broad_start.elapsed()
        );

        let narrow_start = Instant::now();
        let pairs: Vec<(BodyKey, BodyKey)> = candidates
            .par_iter()
            .map_init(Simplex::new, |simplex, &(a, b)| {
                let body_a = &self.bodies[a];
                let body_b = &self.bodies[b];
                gjk_intersect(
                    &body_a.shape,
                    &body_a.origin,
                    &body_b.shape,
                    &body_b.origin,
                    simplex,
                )
                .then_some((a, b))
            })
            .flatten()
            .collect();
        log::trace!(
            "narrow phase: {} of {} pairs overlap in {:.2?}",
            pairs.len(),
            candidates.len(),
            narrow_start.elapsed()
        );

        pairs
    }

    fn deduplicate_pairs(pairs: &mut Vec<(BodyKey, BodyKey)>) {
        for (a, b) in pairs.iter_mut() {
            if *a > *b {
                std::mem::swap(a, b);
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
    }
}
