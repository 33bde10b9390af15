pub mod bvh;
mod light;
mod material;
mod model;

pub use bvh::{Bvh, BvhNode, NodeId, NodeKind};
pub use light::{Light, LightKind};
pub use material::Material;
pub use model::{Mesh, Model, ObjOpenError};

#[cfg(test)]
pub(crate) use model::test::quad_mesh;

use crate::geometry::{Triangle, Vertex};

/// Classification of a scene edit. Drives which buffer blocks the encoder
/// rewrites, see `SceneBuffer::apply`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneChange {
    None,
    Geometry,
    Material,
    Camera,
    Settings,
    Lights,
}

/// The live scene graph plus its flattened projection.
///
/// Models and lights carry stable ids handed out by per-scene counters;
/// removing one never renumbers the others. The flattened triangle, vertex
/// and material lists are what the BVH builder and the encoder consume and
/// are refreshed by `recalculate` after every structural edit.
#[derive(Default)]
pub struct Scene {
    models: Vec<Model>,
    lights: Vec<Light>,
    next_model_index: u32,
    next_light_index: u32,

    triangles: Vec<Triangle>,
    vertices: Vec<Vertex>,
    materials: Vec<Material>,
    material_runs: Vec<u32>,
}

impl Scene {
    pub fn new() -> Scene {
        Default::default()
    }

    pub fn add_model(&mut self, mut model: Model) -> u32 {
        let index = self.next_model_index;
        self.next_model_index += 1;

        model.index = index;
        model.set_name(format!("{}_{}", model.name(), index));
        self.models.push(model);
        self.recalculate();

        index
    }

    pub fn remove_model(&mut self, model_index: u32) -> bool {
        let Some(position) = self.models.iter().position(|m| m.index() == model_index) else {
            return false;
        };
        self.models.remove(position);
        self.recalculate();
        true
    }

    pub fn model_mut(&mut self, model_index: u32) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.index() == model_index)
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn add_light(&mut self, kind: LightKind) -> u32 {
        let index = self.next_light_index;
        self.next_light_index += 1;
        self.lights.push(Light::new(index, kind));
        index
    }

    pub fn remove_light(&mut self, light_index: u32) -> bool {
        let Some(position) = self.lights.iter().position(|l| l.index == light_index) else {
            return false;
        };
        self.lights.remove(position);
        true
    }

    pub fn light_mut(&mut self, light_index: u32) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.index == light_index)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// The flatten pass: walks models in order, records each model's mesh
    /// count, stamps triangles with their model's position in the walk and
    /// renumbers their vertex indices to be globally unique.
    ///
    /// Must run after every edit that moves geometry or changes the
    /// model/mesh structure; material value edits keep the projection valid.
    pub fn recalculate(&mut self) {
        self.triangles.clear();
        self.vertices.clear();
        self.materials.clear();
        self.material_runs.clear();

        let mut index_offset: u32 = 0;
        for (scene_index, model) in self.models.iter_mut().enumerate() {
            let scene_index = scene_index as u32;
            model.scene_index = scene_index;
            self.material_runs.push(model.mesh_count() as u32);

            for mesh in model.meshes() {
                self.materials.push(*mesh.material());

                for triangle in mesh.triangles() {
                    let mut triangle = triangle.clone();
                    triangle.model_index = scene_index;
                    for i in 0..3 {
                        triangle.scene_indices[i] = triangle.indices[i] + index_offset;
                    }
                    self.triangles.push(triangle);
                }

                self.vertices.extend_from_slice(mesh.vertices());
                index_offset += mesh.vertex_count() as u32;
            }
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// One material per mesh, in mesh traversal order.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Mesh count per model, in flatten order. The encoder turns this into
    /// the per-model material offset table.
    pub fn material_runs(&self) -> &[u32] {
        &self.material_runs
    }
}

#[cfg(test)]
mod test {
    use super::model::test::quad_mesh;
    use super::*;
    use crate::util::Color;
    use assert2::assert;

    fn two_mesh_model() -> Model {
        Model::new("quads", vec![quad_mesh(), quad_mesh()])
    }

    #[test]
    fn flatten_renumbers_vertex_indices() {
        let mut scene = Scene::new();
        scene.add_model(two_mesh_model());

        assert!(scene.triangle_count() == 4);
        assert!(scene.vertex_count() == 8);

        // First mesh keeps its indices, second mesh is shifted past it.
        assert!(scene.triangles()[0].scene_indices == [0, 1, 2]);
        assert!(scene.triangles()[2].scene_indices == [4, 5, 6]);
        assert!(scene.triangles()[3].scene_indices == [4, 6, 7]);
    }

    #[test]
    fn flatten_spans_models() {
        let mut scene = Scene::new();
        scene.add_model(two_mesh_model());
        scene.add_model(Model::new("more", vec![quad_mesh()]));

        assert!(scene.material_runs() == [2, 1]);
        assert!(scene.materials().len() == 3);

        let last = scene.triangles().last().unwrap();
        assert!(last.model_index == 1);
        assert!(last.scene_indices == [8, 10, 11]);
    }

    #[test]
    fn model_ids_are_stable_across_removal() {
        let mut scene = Scene::new();
        let first = scene.add_model(two_mesh_model());
        let second = scene.add_model(Model::new("more", vec![quad_mesh()]));

        assert!(scene.remove_model(first));
        assert!(!scene.remove_model(first));

        // The survivor keeps its id but moves to flatten position 0.
        assert!(scene.model_mut(second).is_some());
        assert!(scene.triangles()[0].model_index == 0);

        let third = scene.add_model(two_mesh_model());
        assert!(third == 2);
    }

    #[test]
    fn lookup_misses_are_none() {
        let mut scene = Scene::new();
        assert!(scene.model_mut(7).is_none());
        assert!(scene.light_mut(7).is_none());
        assert!(!scene.remove_light(7));
    }

    #[test]
    fn light_ids_count_up() {
        let mut scene = Scene::new();
        let a = scene.add_light(LightKind::Point);
        let b = scene.add_light(LightKind::Directional);
        assert!(a == 0);
        assert!(b == 1);
        assert!(scene.remove_light(a));
        assert!(scene.add_light(LightKind::Point) == 2);
    }

    #[test]
    fn material_edit_shows_up_after_recalculate() {
        let mut scene = Scene::new();
        let id = scene.add_model(two_mesh_model());

        let model = scene.model_mut(id).unwrap();
        model.meshes_mut()[1].material_mut().diffuse = Color::new(1.0, 0.0, 0.0);
        scene.recalculate();

        assert!(scene.materials()[1].diffuse == Color::new(1.0, 0.0, 0.0));
        assert!(scene.materials()[0].diffuse != Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn empty_scene_flattens_to_nothing() {
        let mut scene = Scene::new();
        scene.recalculate();
        assert!(scene.triangle_count() == 0);
        assert!(scene.vertex_count() == 0);
        assert!(scene.materials().is_empty());
        assert!(scene.material_runs().is_empty());
    }
}
