use std::{fs, path::Path};

use indexmap::IndexMap;
use nalgebra::Rotation3;
use thiserror::Error;

use crate::geometry::{Aabb, Triangle, Vertex, WorldMatrix, WorldPoint, WorldVector};

use super::Material;

/// One mesh of a model: an indexed triangle list with a material and a
/// transform. Vertices keep both the rest pose and the transformed world
/// position; `update` re-derives the latter.
#[derive(Clone, Debug)]
pub struct Mesh {
    index: u32,
    position: WorldVector,
    scale: WorldVector,
    /// Euler angles in degrees, applied in x, y, z order.
    rotation: WorldVector,
    triangles: Vec<Triangle>,
    vertices: Vec<Vertex>,
    material: Material,
    bounds: Aabb,
}

impl Mesh {
    /// Assembles triangles from an index list, three indices per triangle.
    /// A trailing partial triangle is ignored.
    pub fn new(vertices: Vec<Vertex>, indices: &[u32]) -> Mesh {
        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| {
                let corners = [
                    vertices[chunk[0] as usize].clone(),
                    vertices[chunk[1] as usize].clone(),
                    vertices[chunk[2] as usize].clone(),
                ];
                Triangle::new(corners, [chunk[0], chunk[1], chunk[2]])
            })
            .collect();

        let mut mesh = Mesh {
            index: 0,
            position: WorldVector::zeros(),
            scale: WorldVector::repeat(1.0),
            rotation: WorldVector::zeros(),
            triangles,
            vertices,
            material: Material::default(),
            bounds: Aabb::empty(),
        };
        mesh.recalculate_bounds();
        mesh
    }

    pub(super) fn set_index(&mut self, index: u32) {
        self.index = index;
        for triangle in &mut self.triangles {
            triangle.mesh_index = index;
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub(super) fn set_transform(
        &mut self,
        position: WorldVector,
        scale: WorldVector,
        rotation: WorldVector,
    ) {
        self.position = position;
        self.scale = scale;
        self.rotation = rotation;
        self.update();
    }

    /// Re-applies the transform to every vertex: scale, then translate,
    /// then rotate about the mesh position, in exactly this order (the
    /// interactive editor's convention).
    pub fn update(&mut self) {
        let rotation = rotation_matrix(&self.rotation);
        for vertex in &mut self.vertices {
            transform_vertex(vertex, &self.position, &self.scale, &rotation);
        }
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                transform_vertex(vertex, &self.position, &self.scale, &rotation);
            }
            triangle.recalculate_centroid();
        }
        self.recalculate_bounds();
    }

    fn recalculate_bounds(&mut self) {
        self.bounds = Aabb::from_points(self.vertices.iter().map(|v| &v.world_position));
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

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}

/// A loaded asset instance: named, transformed, made of meshes.
#[derive(Clone, Debug)]
pub struct Model {
    name: String,
    position: WorldVector,
    scale: WorldVector,
    rotation: WorldVector,
    /// Stable id handed out by the scene; survives removals of other models.
    pub(super) index: u32,
    /// Position in the current flatten order; reassigned on every
    /// recalculate.
    pub(super) scene_index: u32,
    meshes: Vec<Mesh>,
    bounds: Aabb,
}

impl Model {
    pub fn new(name: impl Into<String>, mut meshes: Vec<Mesh>) -> Model {
        for (i, mesh) in meshes.iter_mut().enumerate() {
            mesh.set_index(i as u32);
        }

        let mut model = Model {
            name: name.into(),
            position: WorldVector::zeros(),
            scale: WorldVector::repeat(1.0),
            rotation: WorldVector::zeros(),
            index: 0,
            scene_index: 0,
            meshes,
            bounds: Aabb::empty(),
        };
        model.recalculate_bounds();
        model
    }

    pub fn with_obj(path: impl AsRef<Path>) -> Result<Model, ObjOpenError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let parsed = wavefront_obj::obj::parse(content)?;

        let name = path
            .file_stem()
            .map_or_else(|| "model".to_string(), |s| s.to_string_lossy().into_owned());

        Ok(Model::new(name, load_obj(parsed)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn position(&self) -> WorldVector {
        self.position
    }

    pub fn set_position(&mut self, position: WorldVector) {
        self.position = position;
    }

    pub fn scale(&self) -> WorldVector {
        self.scale
    }

    pub fn set_scale(&mut self, scale: WorldVector) {
        self.scale = scale;
    }

    pub fn rotation(&self) -> WorldVector {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: WorldVector) {
        self.rotation = rotation;
    }

    /// Pushes the model transform down to the meshes and re-derives bounds.
    /// Callers mutate the transform first, then call this, then have the
    /// scene recalculate.
    pub fn update(&mut self) {
        for mesh in &mut self.meshes {
            mesh.set_transform(self.position, self.scale, self.rotation);
        }
        self.recalculate_bounds();
    }

    fn recalculate_bounds(&mut self) {
        let mut bounds = Aabb::empty();
        for mesh in &self.meshes {
            let mesh_bounds = mesh.bounds();
            if !mesh_bounds.is_empty() {
                bounds.grow(&mesh_bounds.min);
                bounds.grow(&mesh_bounds.max);
            }
        }
        self.bounds = bounds;
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}

#[derive(Debug, Error)]
pub enum ObjOpenError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),
}

/// One mesh per OBJ object; vertices deduplicated per (position, normal)
/// index pair. Non-triangle primitives are skipped.
fn load_obj(obj: wavefront_obj::obj::ObjSet) -> Vec<Mesh> {
    let mut meshes = Vec::new();

    for o in obj.objects.into_iter() {
        let mut indices: Vec<u32> = Vec::new();
        let mut vertices = IndexMap::new();

        for geometry in o.geometry {
            for shape in geometry.shapes {
                let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                    continue;
                };

                let mut handle_vertex = |vtindex: (usize, Option<usize>, Option<usize>)| {
                    let key = (vtindex.0, vtindex.2);
                    let entry = vertices.entry(key);
                    let index = entry.index();
                    entry.or_insert_with(|| {
                        let position = &o.vertices[vtindex.0];
                        let normal = vtindex.2.map(|i| &o.normals[i]);
                        Vertex::new(
                            WorldPoint::new(position.x as f32, position.y as f32, position.z as f32),
                            normal.map_or_else(WorldVector::zeros, |n| {
                                WorldVector::new(n.x as f32, n.y as f32, n.z as f32).normalize()
                            }),
                        )
                    });
                    index as u32
                };

                indices.push(handle_vertex(a));
                indices.push(handle_vertex(b));
                indices.push(handle_vertex(c));
            }
        }

        let vertices = vertices.into_iter().map(|(_k, v)| v).collect();
        meshes.push(Mesh::new(vertices, &indices));
    }

    meshes
}

fn rotation_matrix(rotation_degrees: &WorldVector) -> WorldMatrix {
    let x = Rotation3::from_axis_angle(&WorldVector::x_axis(), rotation_degrees.x.to_radians());
    let y = Rotation3::from_axis_angle(&WorldVector::y_axis(), rotation_degrees.y.to_radians());
    let z = Rotation3::from_axis_angle(&WorldVector::z_axis(), rotation_degrees.z.to_radians());
    (x * y * z).into_inner()
}

fn transform_vertex(
    vertex: &mut Vertex,
    position: &WorldVector,
    scale: &WorldVector,
    rotation: &WorldMatrix,
) {
    let scaled = vertex.position.coords.component_mul(scale);
    vertex.world_position = WorldPoint::from(position + rotation * scaled);
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use assert2::assert;

    pub(crate) fn quad_mesh() -> Mesh {
        let normal = WorldVector::z();
        let vertices = vec![
            Vertex::new(WorldPoint::new(0.0, 0.0, 0.0), normal),
            Vertex::new(WorldPoint::new(1.0, 0.0, 0.0), normal),
            Vertex::new(WorldPoint::new(1.0, 1.0, 0.0), normal),
            Vertex::new(WorldPoint::new(0.0, 1.0, 0.0), normal),
        ];
        Mesh::new(vertices, &[0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn mesh_assembles_triangles() {
        let mesh = quad_mesh();
        assert!(mesh.triangle_count() == 2);
        assert!(mesh.vertex_count() == 4);
        assert!(mesh.triangles()[0].indices == [0, 1, 2]);
        assert!(mesh.triangles()[1].indices == [0, 2, 3]);
    }

    #[test]
    fn mesh_ignores_trailing_partial_triangle() {
        let normal = WorldVector::z();
        let vertices = vec![
            Vertex::new(WorldPoint::new(0.0, 0.0, 0.0), normal),
            Vertex::new(WorldPoint::new(1.0, 0.0, 0.0), normal),
            Vertex::new(WorldPoint::new(1.0, 1.0, 0.0), normal),
        ];
        let mesh = Mesh::new(vertices, &[0, 1, 2, 0, 1]);
        assert!(mesh.triangle_count() == 1);
    }

    #[test]
    fn transform_scales_then_translates() {
        let mut mesh = quad_mesh();
        mesh.set_transform(
            WorldVector::new(10.0, 0.0, 0.0),
            WorldVector::repeat(2.0),
            WorldVector::zeros(),
        );

        let corner = &mesh.vertices()[2];
        assert!((corner.world_position - WorldPoint::new(12.0, 2.0, 0.0)).norm() < 1e-6);
        // Rest pose is untouched.
        assert!(corner.position == WorldPoint::new(1.0, 1.0, 0.0));
        assert!((mesh.bounds().max - WorldPoint::new(12.0, 2.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn rotation_is_about_mesh_position() {
        let mut mesh = quad_mesh();
        // Quarter turn around z, pivoting on the translated origin.
        mesh.set_transform(
            WorldVector::new(5.0, 0.0, 0.0),
            WorldVector::repeat(1.0),
            WorldVector::new(0.0, 0.0, 90.0),
        );

        let corner = &mesh.vertices()[1];
        assert!((corner.world_position - WorldPoint::new(5.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn transform_updates_triangle_centroids() {
        let mut mesh = quad_mesh();
        mesh.set_transform(
            WorldVector::new(0.0, 0.0, 3.0),
            WorldVector::repeat(1.0),
            WorldVector::zeros(),
        );

        for triangle in mesh.triangles() {
            assert!((triangle.centroid.z - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn model_assigns_mesh_indices() {
        let model = Model::new("quads", vec![quad_mesh(), quad_mesh()]);
        assert!(model.meshes()[0].index() == 0);
        assert!(model.meshes()[1].index() == 1);
        assert!(model.meshes()[1].triangles()[0].mesh_index == 1);
    }

    #[test]
    fn model_bounds_cover_meshes() {
        let mut model = Model::new("quads", vec![quad_mesh(), quad_mesh()]);
        model.set_position(WorldVector::new(0.0, 0.0, -4.0));
        model.update();

        assert!((model.bounds().min - WorldPoint::new(0.0, 0.0, -4.0)).norm() < 1e-6);
        assert!((model.bounds().max - WorldPoint::new(1.0, 1.0, -4.0)).norm() < 1e-6);
    }
}
