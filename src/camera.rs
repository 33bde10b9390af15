use assert2::assert;
use bon::bon;
use nalgebra::Unit;

use crate::geometry::{EPSILON, FloatType, ScreenSize, WorldMatrix, WorldPoint, WorldVector};

/// Camera state as the encoder consumes it.
///
/// The orientation is kept as a right/up/front basis; `basis()` packs it
/// into the 3x3 matrix the shader multiplies ray directions with.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    position: WorldPoint,

    front: Unit<WorldVector>,
    up: Unit<WorldVector>,
    right: Unit<WorldVector>,

    resolution: ScreenSize,

    /// Vertical field of view in degrees.
    fov: FloatType,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        position: WorldPoint,
        front: WorldVector,
        up: WorldVector,
        resolution: ScreenSize,
        fov: FloatType,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(fov > 0.0);

        let (front, up, right) = orthonormal_basis(front, up);

        Camera {
            position,
            front,
            up,
            right,
            resolution,
            fov,
        }
    }
}

impl Camera {
    pub fn position(&self) -> WorldPoint {
        self.position
    }

    pub fn set_position(&mut self, position: WorldPoint) {
        self.position = position;
    }

    pub fn fov(&self) -> FloatType {
        self.fov
    }

    pub fn set_fov(&mut self, fov: FloatType) {
        assert!(fov > 0.0);
        self.fov = fov;
    }

    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: ScreenSize) {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        self.resolution = resolution;
    }

    pub fn aspect_ratio(&self) -> FloatType {
        self.resolution.x as FloatType / self.resolution.y as FloatType
    }

    pub fn front(&self) -> WorldVector {
        self.front.into_inner()
    }

    /// Replaces the orientation, re-orthogonalizing `up` against `front`.
    pub fn set_orientation(&mut self, front: WorldVector, up: WorldVector) {
        let (front, up, right) = orthonormal_basis(front, up);
        self.front = front;
        self.up = up;
        self.right = right;
    }

    /// Row-major orientation basis: rows are right, up, front.
    pub fn basis(&self) -> WorldMatrix {
        WorldMatrix::from_rows(&[
            self.right.into_inner().transpose(),
            self.up.into_inner().transpose(),
            self.front.into_inner().transpose(),
        ])
    }
}

fn orthonormal_basis(
    front: WorldVector,
    up: WorldVector,
) -> (Unit<WorldVector>, Unit<WorldVector>, Unit<WorldVector>) {
    let front = Unit::try_new(front, EPSILON).expect("Front vector must be non-zero");
    let up = Unit::try_new(up, EPSILON).expect("Up vector must be non-zero");
    let right = Unit::try_new(front.cross(&up), EPSILON)
        .expect("`up` and `front` must be linearly independent");
    let up = Unit::new_normalize(right.cross(&front));
    (front, up, right)
}
