mod aabb;
mod triangle;

pub use aabb::Aabb;
pub use triangle::{Triangle, Vertex};

pub type FloatType = f32;

pub const EPSILON: FloatType = 1e-6;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldMatrix = nalgebra::Matrix3<FloatType>;
pub type ScreenSize = nalgebra::Vector2<u32>;
