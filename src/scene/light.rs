use crate::geometry::WorldPoint;
use crate::util::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
}

impl LightKind {
    pub fn tag(self) -> u32 {
        match self {
            LightKind::Point => 0,
            LightKind::Directional => 1,
        }
    }
}

/// A scene light. Both kinds share the record layout; the two parameter
/// scalars are reinterpreted per kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub index: u32,
    pub name: String,
    pub kind: LightKind,
    pub intensity: f32,
    /// Point: linear falloff. Directional: pitch in degrees.
    pub param_a: f32,
    /// Point: quadratic falloff. Directional: yaw in degrees.
    pub param_b: f32,
    pub position: WorldPoint,
    pub color: Color,
}

impl Light {
    pub fn new(index: u32, kind: LightKind) -> Light {
        let (name, param_b) = match kind {
            LightKind::Point => (format!("Point_{index}"), 0.0),
            LightKind::Directional => (format!("Directional_{index}"), 270.0),
        };

        Light {
            index,
            name,
            kind,
            intensity: 1.0,
            param_a: 0.0,
            param_b,
            position: WorldPoint::origin(),
            color: Color::new(1.0, 1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn directional_defaults() {
        let light = Light::new(2, LightKind::Directional);
        assert!(light.name == "Directional_2");
        assert!(light.param_b == 270.0);
        assert!(light.intensity == 1.0);
    }

    #[test]
    fn point_defaults() {
        let light = Light::new(0, LightKind::Point);
        assert!(light.name == "Point_0");
        assert!(light.param_a == 0.0);
        assert!(light.param_b == 0.0);
    }
}
