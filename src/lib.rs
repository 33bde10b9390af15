mod camera;
pub mod encoder;
pub mod geometry;
mod scene;
mod settings;
mod util;

pub use camera::Camera;
pub use encoder::{EncodeError, SceneBuffer};
pub use scene::{
    Bvh, BvhNode, Light, LightKind, Material, Mesh, Model, NodeId, NodeKind, ObjOpenError, Scene,
    SceneChange,
};
pub use settings::{Settings, ViewportMode};
pub use util::Color;
