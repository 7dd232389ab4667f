// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use crate::Aabb;
use crate::world::BodyKey;

pub type NodeId = usize;

/// Margin added to every leaf AABB. A body can move this far before its
/// leaf has to be re-inserted.
pub const AABB_MARGIN: f32 = 0.1;

#[derive(Debug, Default)]
struct Node {
    aabb: Aabb,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: i32,
    key: Option<BodyKey>, // Some => leaf
}

/// Incrementally maintained bounding-volume hierarchy over fat AABBs.
///
/// Leaves carry body keys. Sibling choice on insertion follows the
/// surface-area heuristic; the tree is height-balanced with rotations on
/// the walk back up, and freed nodes are recycled through a free list.
#[derive(Debug, Default)]
pub struct AabbTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    free_list: Vec<NodeId>,
}

impl AabbTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new leaf for `key`, fattened by [`AABB_MARGIN`].
    pub fn insert(&mut self, key: BodyKey, aabb: Aabb) -> NodeId {
        let leaf = self.allocate_node();
        let fat = aabb.expand(AABB_MARGIN);

        let node = &mut self.nodes[leaf];
        node.key = Some(key);
        node.height = 0;

        self.insert_leaf(leaf, fat);
        leaf
    }

    /// Refreshes a leaf after its body moved. While the tight AABB stays
    /// inside the stored fat AABB the tree is left untouched.
    pub fn update(&mut self, leaf: NodeId, aabb: Aabb) {
        if self.nodes[leaf].aabb.contains(&aabb) {
            return;
        }

        self.detach_leaf(leaf);
        self.insert_leaf(leaf, aabb.expand(AABB_MARGIN));
    }

    pub fn remove(&mut self, leaf: NodeId) {
        self.detach_leaf(leaf);
        self.nodes[leaf] = Node::default();
        self.free_list.push(leaf);
    }

    /// Calls `callback` with the key of every leaf whose fat AABB
    /// intersects `aabb`.
    pub fn query<F>(&self, aabb: Aabb, mut callback: F)
    where
        F: FnMut(BodyKey),
    {
        if let Some(root) = self.root {
            self.query_node(root, &aabb, &mut callback);
        }
    }

    fn query_node<F>(&self, node_id: NodeId, aabb: &Aabb, callback: &mut F)
    where
        F: FnMut(BodyKey),
    {
        let node = &self.nodes[node_id];

        if !node.aabb.intersects(aabb) {
            return;
        }

        if let Some(key) = node.key {
            callback(key);
        } else {
            self.query_node(node.left.unwrap(), aabb, callback);
            self.query_node(node.right.unwrap(), aabb, callback);
        }
    }

    fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].left.is_none()
    }

    fn insert_leaf(&mut self, leaf: NodeId, aabb: Aabb) {
        self.nodes[leaf].aabb = aabb;
        self.nodes[leaf].left = None;
        self.nodes[leaf].right = None;
        self.nodes[leaf].height = 0;

        if self.root.is_none() {
            self.root = Some(leaf);
            self.nodes[leaf].parent = None;
            return;
        }

        // Descend toward the cheapest sibling by surface area.
        let mut index = self.root.unwrap();
        while !self.is_leaf(index) {
            let left = self.nodes[index].left.unwrap();
            let right = self.nodes[index].right.unwrap();

            let area = self.nodes[index].aabb.area();
            let combined_area = self.nodes[index].aabb.union(&aabb).area();

            // Cost of pairing the new leaf with this whole subtree.
            let cost = 2.0 * combined_area;
            // Minimum cost of pushing the leaf further down.
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost_left = {
                let union = self.nodes[left].aabb.union(&aabb);
                if self.is_leaf(left) {
                    union.area() + inheritance_cost
                } else {
                    union.area() - self.nodes[left].aabb.area() + inheritance_cost
                }
            };

            let cost_right = {
                let union = self.nodes[right].aabb.union(&aabb);
                if self.is_leaf(right) {
                    union.area() + inheritance_cost
                } else {
                    union.area() - self.nodes[right].aabb.area() + inheritance_cost
                }
            };

            if cost < cost_left && cost < cost_right {
                break;
            }

            index = if cost_left < cost_right { left } else { right };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling].parent;

        // Splice in a fresh parent above the chosen sibling.
        let new_parent = self.allocate_node();
        self.nodes[new_parent].parent = old_parent;
        self.nodes[new_parent].aabb = self.nodes[sibling].aabb.union(&aabb);
        self.nodes[new_parent].height = self.nodes[sibling].height + 1;
        self.nodes[new_parent].left = Some(sibling);
        self.nodes[new_parent].right = Some(leaf);
        self.nodes[new_parent].key = None;

        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        if let Some(parent) = old_parent {
            if self.nodes[parent].left == Some(sibling) {
                self.nodes[parent].left = Some(new_parent);
            } else {
                self.nodes[parent].right = Some(new_parent);
            }
        } else {
            self.root = Some(new_parent);
        }

        self.fix_upwards(new_parent);
    }

    /// Unlinks a leaf and collapses its parent, recycling the parent node.
    fn detach_leaf(&mut self, leaf: NodeId) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }

        let parent = self.nodes[leaf].parent.unwrap();
        let grandparent = self.nodes[parent].parent;
        let sibling = if self.nodes[parent].left == Some(leaf) {
            self.nodes[parent].right.unwrap()
        } else {
            self.nodes[parent].left.unwrap()
        };

        if let Some(gp) = grandparent {
            if self.nodes[gp].left == Some(parent) {
                self.nodes[gp].left = Some(sibling);
            } else {
                self.nodes[gp].right = Some(sibling);
            }
            self.nodes[sibling].parent = Some(gp);
            self.fix_upwards(gp);
        } else {
            self.root = Some(sibling);
            self.nodes[sibling].parent = None;
        }

        self.nodes[leaf].parent = None;
        self.nodes[parent] = Node::default();
        self.free_list.push(parent);
    }

    fn refresh_node(&mut self, node: NodeId) {
        let left = self.nodes[node].left.unwrap();
        let right = self.nodes[node].right.unwrap();

        self.nodes[node].height = 1 + self.nodes[left].height.max(self.nodes[right].height);
        self.nodes[node].aabb = self.nodes[left].aabb.union(&self.nodes[right].aabb);
    }

    fn fix_upwards(&mut self, mut index: NodeId) {
        loop {
            self.refresh_node(index);

            let left = self.nodes[index].left.unwrap();
            let right = self.nodes[index].right.unwrap();
            let balance = self.nodes[left].height - self.nodes[right].height;

            index = if balance > 1 {
                self.rotate_right(index)
            } else if balance < -1 {
                self.rotate_left(index)
            } else {
                index
            };

            match self.nodes[index].parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
    }

    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let left = self.nodes[node].left.unwrap();
        let left_right = self.nodes[left].right;

        self.nodes[left].parent = self.nodes[node].parent;
        self.nodes[node].parent = Some(left);

        self.nodes[left].right = Some(node);
        self.nodes[node].left = left_right;

        if let Some(lr) = left_right {
            self.nodes[lr].parent = Some(node);
        }

        if let Some(parent) = self.nodes[left].parent {
            if self.nodes[parent].left == Some(node) {
                self.nodes[parent].left = Some(left);
            } else {
                self.nodes[parent].right = Some(left);
            }
        } else {
            self.root = Some(left);
        }

        self.refresh_node(node);
        self.refresh_node(left);
        left
    }

    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let right = self.nodes[node].right.unwrap();
        let right_left = self.nodes[right].left;

        self.nodes[right].parent = self.nodes[node].parent;
        self.nodes[node].parent = Some(right);

        self.nodes[right].left = Some(node);
        self.nodes[node].right = right_left;

        if let Some(rl) = right_left {
            self.nodes[rl].parent = Some(node);
        }

        if let Some(parent) = self.nodes[right].parent {
            if self.nodes[parent].left == Some(node) {
                self.nodes[parent].left = Some(right);
            } else {
                self.nodes[parent].right = Some(right);
            }
        } else {
            self.root = Some(right);
        }

        self.refresh_node(node);
        self.refresh_node(right);
        right
    }

    fn allocate_node(&mut self) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            id
        } else {
            self.nodes.push(Node::default());
            self.nodes.len() - 1
        }
    }
}
