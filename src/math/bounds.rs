use glam::{Mat4, Vec3};

use crate::math::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(point1: Vec3, point2: Vec3) -> AABB {
        let min = point1.min(point2);
        let max = point1.max(point2);
        AABB { min, max }
    }

    /// An inverted box that any `extend` call will overwrite.
    pub fn empty() -> AABB {
        AABB {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> AABB {
        let mut aabb = AABB::empty();
        for point in points {
            aabb.extend(point);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Axis-aligned box enclosing this box after `matrix` is applied.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if self.is_empty() {
            return *self;
        }

        AABB::from_points(
            self.corners()
                .map(|corner| matrix.transform_point3(corner)),
        )
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Slab test. Returns the entry distance along the ray, clamped to zero
    /// when the origin is inside the box.
    pub fn ray_entry(&self, ray: &Ray, far: f32) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let inverse = ray.direction.recip();
        let t1 = (self.min - ray.origin) * inverse;
        let t2 = (self.max - ray.origin) * inverse;

        // NaN appears when the origin lies on a slab plane of a zero direction axis.
        let near = t1.min(t2);
        let far_t = t1.max(t2);
        let entry = [near.x, near.y, near.z]
            .into_iter()
            .filter(|t| !t.is_nan())
            .fold(0.0_f32, f32::max);
        let exit = [far_t.x, far_t.y, far_t.z]
            .into_iter()
            .filter(|t| !t.is_nan())
            .fold(far, f32::min);

        (entry <= exit).then_some(entry)
    }
}
