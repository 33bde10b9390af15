//! Every fixed width of the wire format, in one place.
//!
//! The GPU consumer computes record positions purely from these widths, so
//! changing any of them breaks every offset derived downstream. No other
//! module is allowed to restate them.

use crate::scene::{Bvh, BvhNode, NodeKind};

/// Reserved cells at the start of the buffer, holding the block start
/// offsets. Cells past `LIGHT_START_CELL` stay zero.
pub const HEADER_SLOTS: usize = 10;

pub const CAMERA_START_CELL: usize = 0;
pub const VERTEX_START_CELL: usize = 1;
pub const BVH_START_CELL: usize = 2;
pub const MATERIAL_START_CELL: usize = 3;
pub const LIGHT_START_CELL: usize = 4;

/// fov, aspect ratio, resolution, position, 3x3 basis, viewport mode,
/// downsample factor.
pub const CAMERA_BLOCK_SLOTS: usize = 1 + 1 + 2 + 3 + 9 + 2;

/// World position only.
pub const VERTEX_SLOTS: usize = 3;

/// Box, leaf flag, left and right child ids.
pub const INNER_NODE_SLOTS: usize = 6 + 1 + 2;
/// Box, leaf flag, triangle count.
pub const LEAF_HEADER_SLOTS: usize = 6 + 1 + 1;
/// Model index, mesh index, three vertex indices, normal.
pub const TRIANGLE_SLOTS: usize = 2 + 3 + 3;

/// Diffuse and ambient color.
pub const MATERIAL_SLOTS: usize = 3 + 3;

/// Kind tag, intensity, two parameters, position, color.
pub const LIGHT_SLOTS: usize = 1 + 1 + 2 + 3 + 3;

/// Number of slots the node's encoded record occupies.
pub fn node_size(node: &BvhNode) -> usize {
    match &node.kind {
        NodeKind::Inner { .. } => INNER_NODE_SLOTS,
        NodeKind::Leaf { triangles } => LEAF_HEADER_SLOTS + triangles.len() * TRIANGLE_SLOTS,
    }
}

/// Per-node record sizes in pre-order. Arena order is pre-order by
/// construction, so this is a plain scan; the offset table is the prefix
/// sum of this list.
pub fn node_sizes(bvh: &Bvh) -> Vec<usize> {
    bvh.nodes().map(|(_, node)| node_size(node)).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Triangle, Vertex, WorldPoint, WorldVector};
    use assert2::assert;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    fn scattered_triangles(count: usize, seed: u64) -> Vec<Triangle> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let normal = WorldVector::z();
        (0..count)
            .map(|_| {
                let center = WorldPoint::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                );
                Triangle::new(
                    [
                        Vertex::new(center, normal),
                        Vertex::new(center + WorldVector::new(0.01, 0.0, 0.0), normal),
                        Vertex::new(center + WorldVector::new(0.0, 0.01, 0.0), normal),
                    ],
                    [0, 1, 2],
                )
            })
            .collect()
    }

    #[test]
    fn single_leaf_size() {
        let bvh = Bvh::build(scattered_triangles(2, 1), 5);
        assert!(bvh.node_count() == 1);
        assert!(node_sizes(&bvh) == [LEAF_HEADER_SLOTS + 2 * TRIANGLE_SLOTS]);
    }

    #[test]
    fn sizes_follow_pre_order_traversal() {
        let bvh = Bvh::build(scattered_triangles(100, 2), 4);
        let sizes = node_sizes(&bvh);
        assert!(sizes.len() == bvh.node_count());

        // The arena scan must agree with an explicit pre-order walk.
        fn walk(bvh: &Bvh, id: crate::scene::NodeId, out: &mut Vec<usize>) {
            let node = bvh.node(id);
            out.push(node_size(node));
            if let NodeKind::Inner { left, right } = &node.kind {
                walk(bvh, *left, out);
                walk(bvh, *right, out);
            }
        }
        let mut walked = Vec::new();
        walk(&bvh, bvh.root(), &mut walked);
        assert!(walked == sizes);
    }

    #[test]
    fn empty_leaf_is_header_only() {
        let bvh = Bvh::build(Vec::new(), 3);
        assert!(node_sizes(&bvh) == [LEAF_HEADER_SLOTS]);
    }
}
