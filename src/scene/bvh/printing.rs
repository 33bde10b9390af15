use crate::util::Stats;

use super::{Bvh, NodeId, NodeKind};

impl Bvh {
    pub fn print_tree(&self) {
        self.print_recursive(0, self.root());
    }

    pub fn print_statistics(&self) {
        println!("Nodes: {}", self.node_count());
        println!("Triangles: {}", self.triangle_count());
        println!("Leaf depth: {}", self.depth_statistics(self.root()));
        println!("Leaf fill: {}", self.leaf_fill_statistics());
    }

    fn depth_statistics(&self, id: NodeId) -> Stats {
        match &self.node(id).kind {
            NodeKind::Leaf { .. } => Stats::new_single(0),
            NodeKind::Inner { left, right } => {
                let mut stats = self
                    .depth_statistics(*left)
                    .merge(&self.depth_statistics(*right));
                stats.offset(1);
                stats
            }
        }
    }

    fn leaf_fill_statistics(&self) -> Stats {
        let mut stats = Stats::default();
        stats.add_samples(self.nodes().filter_map(|(_, node)| match &node.kind {
            NodeKind::Inner { .. } => None,
            NodeKind::Leaf { triangles } => Some(triangles.len()),
        }));
        stats
    }

    fn print_recursive(&self, indent: usize, id: NodeId) {
        let node = self.node(id);
        let label = if node.is_leaf() { "L" } else { "I" };
        println!(
            "{}- {}{}: {:?}-{:?}",
            "  ".repeat(indent),
            label,
            id.raw(),
            node.bounds.min,
            node.bounds.max,
        );

        match &node.kind {
            NodeKind::Leaf { triangles } => {
                if !triangles.is_empty() {
                    println!("{}{} triangles", "  ".repeat(indent + 1), triangles.len());
                }
            }
            NodeKind::Inner { left, right } => {
                self.print_recursive(indent + 1, *left);
                self.print_recursive(indent + 1, *right);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Triangle, Vertex, WorldPoint, WorldVector};
    use assert2::assert;

    #[test]
    fn depth_statistics_count_leaves() {
        let normal = WorldVector::z();
        let triangles: Vec<Triangle> = (0..20)
            .map(|i| {
                let x = i as f32;
                Triangle::new(
                    [
                        Vertex::new(WorldPoint::new(x, 0.0, 0.0), normal),
                        Vertex::new(WorldPoint::new(x + 0.5, 0.0, 0.0), normal),
                        Vertex::new(WorldPoint::new(x, 0.5, 0.0), normal),
                    ],
                    [0, 1, 2],
                )
            })
            .collect();

        let bvh = Bvh::build(triangles, 4);
        let stats = bvh.depth_statistics(bvh.root());

        let leaf_count = bvh.nodes().filter(|(_, node)| node.is_leaf()).count();
        assert!(stats.count() == leaf_count);
        assert!(stats.max() <= 4);
        assert!(stats.min() >= 1);
    }
}
