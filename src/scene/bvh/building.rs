use index_vec::IndexVec;

use crate::geometry::{Aabb, Triangle};

use super::{Bvh, BvhNode, NodeId, NodeKind};

/// Nodes with at most this many triangles become leaves regardless of the
/// remaining depth budget.
pub const LEAF_TRIANGLE_THRESHOLD: usize = 8;

impl Bvh {
    /// Builds the tree over the flattened scene triangles.
    ///
    /// Every input, including the empty list, produces a valid tree; the
    /// worst case is a single leaf. `max_depth = 0` keeps everything in the
    /// root leaf.
    pub fn build(triangles: Vec<Triangle>, max_depth: u32) -> Bvh {
        let mut nodes = IndexVec::new();
        build_recursive(&mut nodes, triangles, max_depth, 0);
        Bvh { nodes }
    }
}

fn build_recursive(
    nodes: &mut IndexVec<NodeId, BvhNode>,
    triangles: Vec<Triangle>,
    max_depth: u32,
    depth: u32,
) -> NodeId {
    let bounds = node_bounds(&triangles);

    if depth == max_depth || triangles.len() <= LEAF_TRIANGLE_THRESHOLD {
        return nodes.push(BvhNode {
            bounds,
            kind: NodeKind::Leaf { triangles },
        });
    }

    // The placeholder claims the pre-order id before either subtree
    // allocates one; it is replaced once both children exist.
    let id = nodes.push(BvhNode {
        bounds: bounds.clone(),
        kind: NodeKind::Leaf {
            triangles: Vec::new(),
        },
    });

    let axis = bounds.largest_axis();
    let split = (bounds.min[axis] + bounds.max[axis]) / 2.0;

    // Ties go left, so a triangle can never land on both sides or neither.
    let (left_triangles, right_triangles): (Vec<_>, Vec<_>) = triangles
        .into_iter()
        .partition(|triangle| triangle.centroid[axis] >= split);

    // Left first: the encoder relies on the left child id being the next id
    // after the parent's.
    let left = build_recursive(nodes, left_triangles, max_depth, depth + 1);
    let right = build_recursive(nodes, right_triangles, max_depth, depth + 1);
    nodes[id].kind = NodeKind::Inner { left, right };

    id
}

/// Tight bound over all vertices of the node's triangles. Leaves and inner
/// nodes scan independently; the empty set keeps the inverted sentinel box.
fn node_bounds(triangles: &[Triangle]) -> Aabb {
    Aabb::from_points(triangles.iter().flat_map(|t| t.world_positions()))
}
