mod building;
mod printing;

pub use building::LEAF_TRIANGLE_THRESHOLD;

use index_vec::IndexVec;

use crate::geometry::{Aabb, Triangle};

index_vec::define_index_type! {
    /// Stable node id. Construction order makes it the node's pre-order
    /// position, so ids double as positions in the encoded node table.
    pub struct NodeId = u32;
    IMPL_RAW_CONVERSIONS = true;
}

/// Binary BVH over the flattened scene triangles.
///
/// Nodes live in an arena in the order they were created, which is
/// pre-order: a node is pushed before either of its subtrees, and the left
/// subtree completes before the right one starts. The arena is rebuilt from
/// scratch on every build, so ids always start at 0.
#[derive(Clone, Debug)]
pub struct Bvh {
    nodes: IndexVec<NodeId, BvhNode>,
}

#[derive(Clone, Debug)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub kind: NodeKind,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Inner { left: NodeId, right: NodeId },
    Leaf { triangles: Vec<Triangle> },
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

impl Bvh {
    pub fn root(&self) -> NodeId {
        NodeId::from_raw(0)
    }

    pub fn node(&self, id: NodeId) -> &BvhNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &BvhNode)> {
        self.nodes.iter_enumerated()
    }

    /// Total triangle count across all leaves.
    pub fn triangle_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Inner { .. } => 0,
                NodeKind::Leaf { triangles } => triangles.len(),
            })
            .sum()
    }
}
