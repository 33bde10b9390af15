mod stats;

pub use stats::Stats;

pub type Color = rgb::RGB<f32>;
