use crate::geometry::{FloatType, WorldPoint, WorldVector};

/// Axis aligned box over world positions.
///
/// The empty box is the inverted sentinel (`min` above `max`), so growing it
/// by any point produces a box containing exactly that point.
#[derive(Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Aabb {
    pub fn new(min: WorldPoint, max: WorldPoint) -> Aabb {
        Aabb { min, max }
    }

    pub fn empty() -> Aabb {
        Aabb {
            min: WorldPoint::new(FloatType::MAX, FloatType::MAX, FloatType::MAX),
            max: WorldPoint::new(-FloatType::MAX, -FloatType::MAX, -FloatType::MAX),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Aabb {
        let mut ret = Aabb::empty();
        for point in points {
            ret.grow(point);
        }
        ret
    }

    pub fn grow(&mut self, point: &WorldPoint) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn size(&self) -> WorldVector {
        self.max - self.min
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint::from((self.min.coords + self.max.coords) / 2.0)
    }

    /// Axis with the largest extent. Ties resolve to the lower axis index
    /// (x before y before z) to keep splits reproducible.
    pub fn largest_axis(&self) -> usize {
        let size = self.size();
        let mut axis = 0;
        for i in 1..3 {
            if size[i] > size[axis] {
                axis = i;
            }
        }
        axis
    }

    pub fn contains(&self, point: &WorldPoint, tolerance: FloatType) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] - tolerance && point[i] <= self.max[i] + tolerance)
    }

    /// An empty box is contained in everything.
    pub fn contains_box(&self, other: &Aabb, tolerance: FloatType) -> bool {
        other.is_empty()
            || (self.contains(&other.min, tolerance) && self.contains(&other.max, tolerance))
    }
}

impl Default for Aabb {
    fn default() -> Aabb {
        Aabb::empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    #[test]
    fn empty_grows_to_single_point() {
        let mut aabb = Aabb::empty();
        assert!(aabb.is_empty());

        let p = WorldPoint::new(1.0, -2.0, 3.0);
        aabb.grow(&p);

        assert!(!aabb.is_empty());
        assert!(aabb.min == p);
        assert!(aabb.max == p);
    }

    #[test]
    fn from_points_is_tight() {
        let points = [
            WorldPoint::new(-1.0, 0.0, 2.0),
            WorldPoint::new(3.0, -5.0, 1.0),
            WorldPoint::new(0.0, 1.0, 0.0),
        ];
        let aabb = Aabb::from_points(&points);

        assert!(aabb.min == WorldPoint::new(-1.0, -5.0, 0.0));
        assert!(aabb.max == WorldPoint::new(3.0, 1.0, 2.0));
        for point in &points {
            assert!(aabb.contains(point, 0.0));
        }
    }

    #[test_case(2.0, 1.0, 1.0 => 0; "x wins")]
    #[test_case(1.0, 2.0, 1.0 => 1; "y wins")]
    #[test_case(1.0, 1.0, 2.0 => 2; "z wins")]
    #[test_case(1.0, 1.0, 1.0 => 0; "three way tie goes to x")]
    #[test_case(1.0, 2.0, 2.0 => 1; "y z tie goes to y")]
    fn largest_axis(x: f32, y: f32, z: f32) -> usize {
        Aabb::new(WorldPoint::origin(), WorldPoint::new(x, y, z)).largest_axis()
    }

    #[test]
    fn center_is_midpoint() {
        let aabb = Aabb::new(WorldPoint::new(-2.0, 0.0, 4.0), WorldPoint::new(2.0, 2.0, 8.0));
        assert!(aabb.center() == WorldPoint::new(0.0, 1.0, 6.0));
    }

    #[test]
    fn contains_box_with_empty() {
        let aabb = Aabb::new(WorldPoint::origin(), WorldPoint::new(1.0, 1.0, 1.0));
        assert!(aabb.contains_box(&Aabb::empty(), 0.0));
        assert!(!Aabb::empty().contains(&WorldPoint::origin(), 0.0));
    }
}
