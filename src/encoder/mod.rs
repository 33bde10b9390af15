pub mod layout;

use assert2::assert;
use thiserror::Error;

use crate::{
    camera::Camera,
    geometry::{Aabb, Triangle, WorldMatrix, WorldPoint, WorldVector},
    scene::{Bvh, Light, Material, NodeKind, Scene, SceneChange},
    settings::Settings,
    util::Color,
};

use layout::{
    BVH_START_CELL, CAMERA_BLOCK_SLOTS, CAMERA_START_CELL, HEADER_SLOTS, LIGHT_SLOTS,
    LIGHT_START_CELL, MATERIAL_SLOTS, MATERIAL_START_CELL, VERTEX_SLOTS, VERTEX_START_CELL,
};

/// Default buffer capacity in slots. Sized generously for interactive
/// scenes; block offsets are stored as f32, which holds integers exactly
/// only up to 2^24, so capacities beyond that are not usable anyway.
pub const DEFAULT_CAPACITY: usize = 10_000_000;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("scene needs {needed} slots but the buffer holds {capacity}")]
    Overflow { needed: usize, capacity: usize },
}

/// The flat buffer the GPU consumes, plus the cursor state to rebuild it.
///
/// Blocks are packed back to back in a fixed order: camera, vertices, BVH,
/// materials, lights, with the start of each recorded in a reserved header
/// cell. There is no slack between blocks; instead, any edit that can change
/// a block's size re-encodes that block and every block after it
/// (`apply`). Rewrites of a size-stable block happen in place and never
/// touch another block's header cell.
pub struct SceneBuffer {
    data: Box<[f32]>,
    cursor: usize,
    /// One past the last slot of the light block; `floats()` ends here.
    used: usize,
}

impl SceneBuffer {
    pub fn new() -> SceneBuffer {
        SceneBuffer::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> SceneBuffer {
        SceneBuffer {
            data: vec![0.0; capacity].into_boxed_slice(),
            cursor: HEADER_SLOTS,
            used: HEADER_SLOTS,
        }
    }

    // ---- encode entry points ----

    /// Encodes every block in the fixed order. Must run once before any of
    /// the partial re-encode paths.
    pub fn encode_all(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        settings: &Settings,
    ) -> Result<(), EncodeError> {
        self.encode_camera(camera, settings)?;
        self.encode_geometry(scene, settings)
    }

    /// Re-encodes exactly the blocks a classified edit invalidates.
    pub fn apply(
        &mut self,
        change: SceneChange,
        scene: &Scene,
        camera: &Camera,
        settings: &Settings,
    ) -> Result<(), EncodeError> {
        match change {
            SceneChange::None => Ok(()),
            SceneChange::Camera | SceneChange::Settings => self.encode_camera(camera, settings),
            SceneChange::Material => self.encode_materials(scene),
            SceneChange::Lights => self.encode_lights(scene),
            SceneChange::Geometry => self.encode_geometry(scene, settings),
        }
    }

    /// Camera and settings share one fixed-width block right after the
    /// header; rewriting it can never move anything else.
    pub fn encode_camera(
        &mut self,
        camera: &Camera,
        settings: &Settings,
    ) -> Result<(), EncodeError> {
        self.begin_block(CAMERA_START_CELL, HEADER_SLOTS, CAMERA_BLOCK_SLOTS)?;

        self.put_scalar(camera.fov());
        self.put_scalar(camera.aspect_ratio());
        let resolution = camera.resolution();
        self.put_pair(resolution.x, resolution.y);
        self.put_point(&camera.position());
        self.put_matrix(&camera.basis());

        self.put_index(settings.viewport_mode.tag());
        self.put_index(settings.downsample_factor);
        Ok(())
    }

    /// The geometry path: rebuilds the BVH from the flattened triangles and
    /// rewrites everything after the camera block, updating the header
    /// cells. Vertex, BVH and material sizes all depend on the model/mesh
    /// structure, so they are never rewritten separately.
    pub fn encode_geometry(
        &mut self,
        scene: &Scene,
        settings: &Settings,
    ) -> Result<(), EncodeError> {
        let bvh = Bvh::build(scene.triangles().to_vec(), settings.max_depth);

        self.write_vertices(scene)?;
        self.write_bvh(&bvh)?;
        self.write_materials_at(self.cursor, scene)?;
        self.write_lights_at(self.cursor, scene)
    }

    /// In-place rewrite for material value edits. The record count cannot
    /// have changed (that would be a geometry edit), so the block keeps its
    /// size and position.
    pub fn encode_materials(&mut self, scene: &Scene) -> Result<(), EncodeError> {
        let start = self.block_start(MATERIAL_START_CELL);
        assert!(start >= HEADER_SLOTS, "geometry has not been encoded yet");
        self.write_materials_at(start, scene)
    }

    /// Rewrites the light block alone. It is the last block, so even a
    /// light add/remove cannot disturb anything else.
    pub fn encode_lights(&mut self, scene: &Scene) -> Result<(), EncodeError> {
        let start = self.block_start(LIGHT_START_CELL);
        assert!(start >= HEADER_SLOTS, "geometry has not been encoded yet");
        self.write_lights_at(start, scene)
    }

    // ---- block writers ----

    fn write_vertices(&mut self, scene: &Scene) -> Result<(), EncodeError> {
        let start = HEADER_SLOTS + CAMERA_BLOCK_SLOTS;
        self.begin_block(VERTEX_START_CELL, start, scene.vertices().len() * VERTEX_SLOTS)?;

        for vertex in scene.vertices() {
            self.put_point(&vertex.world_position);
        }
        Ok(())
    }

    /// Offset index table first, then the node records in the same
    /// pre-order. Sizes are prefix-summed before anything is written, so
    /// every table entry is final by the time it lands in the buffer.
    fn write_bvh(&mut self, bvh: &Bvh) -> Result<(), EncodeError> {
        let start = self.cursor;
        let sizes = layout::node_sizes(bvh);
        let total = sizes.len() + sizes.iter().sum::<usize>();
        self.begin_block(BVH_START_CELL, start, total)?;

        let mut record_offset = start + sizes.len();
        for size in &sizes {
            self.put_index(record_offset as u32);
            record_offset += size;
        }

        for (_, node) in bvh.nodes() {
            self.put_aabb(&node.bounds);
            match &node.kind {
                NodeKind::Inner { left, right } => {
                    self.put_bool(false);
                    self.put_index(left.raw());
                    self.put_index(right.raw());
                }
                NodeKind::Leaf { triangles } => {
                    self.put_bool(true);
                    self.put_index(triangles.len() as u32);
                    for triangle in triangles {
                        self.put_triangle(triangle);
                    }
                }
            }
        }
        Ok(())
    }

    fn write_materials_at(&mut self, start: usize, scene: &Scene) -> Result<(), EncodeError> {
        let runs = scene.material_runs();
        let total = runs.len() + scene.materials().len() * MATERIAL_SLOTS;
        self.begin_block(MATERIAL_START_CELL, start, total)?;

        // Per-model table: where the model's first mesh material starts.
        let mut material_sum = 0;
        for run in runs {
            self.put_index((start + runs.len() + material_sum) as u32);
            material_sum += *run as usize * MATERIAL_SLOTS;
        }

        for material in scene.materials() {
            self.put_material(material);
        }
        Ok(())
    }

    fn write_lights_at(&mut self, start: usize, scene: &Scene) -> Result<(), EncodeError> {
        let total = 1 + scene.lights().len() * LIGHT_SLOTS;
        self.begin_block(LIGHT_START_CELL, start, total)?;

        self.put_index(scene.lights().len() as u32);
        for light in scene.lights() {
            self.put_light(light);
        }

        // The light block is always the tail of the buffer.
        self.used = start + total;
        Ok(())
    }

    /// Checks capacity for the whole block up front and records its start
    /// in the header cell. Nothing is written when the block does not fit.
    fn begin_block(&mut self, cell: usize, start: usize, slots: usize) -> Result<(), EncodeError> {
        let end = start + slots;
        if end > self.data.len() {
            return Err(EncodeError::Overflow {
                needed: end,
                capacity: self.data.len(),
            });
        }
        self.data[cell] = start as f32;
        self.cursor = start;
        self.used = self.used.max(end);
        Ok(())
    }

    // ---- append primitives ----
    //
    // Each writes its documented slot count at the cursor and advances by
    // exactly that much. Compound records are composed from the scalar ones
    // so the widths in `layout` stay the single source of truth.

    fn put(&mut self, value: f32) {
        debug_assert!(self.cursor < self.data.len());
        self.data[self.cursor] = value;
        self.cursor += 1;
    }

    /// 1 slot.
    fn put_scalar(&mut self, value: f32) {
        self.put(value);
    }

    /// 1 slot, 1.0 or 0.0.
    fn put_bool(&mut self, value: bool) {
        self.put(if value { 1.0 } else { 0.0 });
    }

    /// 1 slot, float-cast integer.
    fn put_index(&mut self, value: u32) {
        self.put(value as f32);
    }

    /// 2 slots.
    fn put_pair(&mut self, a: u32, b: u32) {
        self.put_index(a);
        self.put_index(b);
    }

    /// 3 slots.
    fn put_point(&mut self, point: &WorldPoint) {
        for i in 0..3 {
            self.put(point[i]);
        }
    }

    /// 3 slots.
    fn put_vector(&mut self, vector: &WorldVector) {
        for i in 0..3 {
            self.put(vector[i]);
        }
    }

    /// 3 slots.
    fn put_color(&mut self, color: &Color) {
        self.put(color.r);
        self.put(color.g);
        self.put(color.b);
    }

    /// 9 slots, row-major.
    fn put_matrix(&mut self, matrix: &WorldMatrix) {
        for row in 0..3 {
            for col in 0..3 {
                self.put(matrix[(row, col)]);
            }
        }
    }

    /// 6 slots: min corner, then max corner.
    fn put_aabb(&mut self, aabb: &Aabb) {
        self.put_point(&aabb.min);
        self.put_point(&aabb.max);
    }

    /// `TRIANGLE_SLOTS`: provenance, renumbered vertex indices, one normal.
    fn put_triangle(&mut self, triangle: &Triangle) {
        self.put_pair(triangle.model_index, triangle.mesh_index);
        for index in triangle.scene_indices {
            self.put_index(index);
        }
        self.put_vector(&triangle.vertices[0].normal);
    }

    /// `MATERIAL_SLOTS`.
    fn put_material(&mut self, material: &Material) {
        self.put_color(&material.diffuse);
        self.put_color(&material.ambient);
    }

    /// `LIGHT_SLOTS`.
    fn put_light(&mut self, light: &Light) {
        self.put_index(light.kind.tag());
        self.put_scalar(light.intensity);
        self.put_scalar(light.param_a);
        self.put_scalar(light.param_b);
        self.put_point(&light.position);
        self.put_color(&light.color);
    }

    // ---- output surface ----

    /// Everything encoded so far, header included, up to the end of the
    /// light block.
    pub fn floats(&self) -> &[f32] {
        &self.data[..self.used]
    }

    /// Byte view for the GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.floats())
    }

    /// Occupied slot count.
    pub fn len(&self) -> usize {
        self.used
    }

    /// True until the first encode.
    pub fn is_empty(&self) -> bool {
        self.used <= HEADER_SLOTS
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Current value of one of the header cells.
    pub fn block_start(&self, cell: usize) -> usize {
        assert!(cell < HEADER_SLOTS);
        self.data[cell] as usize
    }
}

impl Default for SceneBuffer {
    fn default() -> SceneBuffer {
        SceneBuffer::new()
    }
}
