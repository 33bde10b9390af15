use crate::geometry::{WorldPoint, WorldVector};

/// Single mesh vertex.
///
/// `position` is the rest pose as it came from the asset, `world_position`
/// the value after the owning mesh's transform was applied. Only
/// `world_position` is ever serialized or bounded.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: WorldPoint,
    pub world_position: WorldPoint,
    pub normal: WorldVector,
}

impl Vertex {
    pub fn new(position: WorldPoint, normal: WorldVector) -> Vertex {
        Vertex {
            position,
            world_position: position,
            normal,
        }
    }
}

/// Triangle with provenance back to the model and mesh that own it.
///
/// Carries its three vertices by value so that the BVH can partition
/// triangles without chasing the scene graph.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    /// Vertex indices local to the owning mesh.
    pub indices: [u32; 3],
    /// Indices renumbered to be globally unique across the flattened scene.
    pub scene_indices: [u32; 3],
    pub model_index: u32,
    pub mesh_index: u32,
    /// Mean of the three world positions. Used only for spatial
    /// partitioning, recomputed whenever the vertices move.
    pub centroid: WorldPoint,
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3], indices: [u32; 3]) -> Triangle {
        let mut triangle = Triangle {
            vertices,
            indices,
            scene_indices: indices,
            model_index: 0,
            mesh_index: 0,
            centroid: WorldPoint::origin(),
        };
        triangle.recalculate_centroid();
        triangle
    }

    pub fn recalculate_centroid(&mut self) {
        let sum: WorldVector = self.vertices.iter().map(|v| v.world_position.coords).sum();
        self.centroid = WorldPoint::from(sum / 3.0);
    }

    pub fn world_positions(&self) -> impl Iterator<Item = &WorldPoint> {
        self.vertices.iter().map(|v| &v.world_position)
    }
}
