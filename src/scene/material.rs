use crate::util::Color;

/// Per-mesh surface colors. One record per mesh is serialized, in mesh
/// traversal order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    pub ambient: Color,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: Color::new(0.8, 0.8, 0.8),
            ambient: Color::new(0.1, 0.1, 0.1),
        }
    }
}
