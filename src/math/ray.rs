use glam::{Quat, Vec3};

const DETERMINANT_EPSILON: f32 = 1e-8;
// Keeps hits on a shared edge from slipping between two triangles.
const EDGE_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray.
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub distance: f32,
    /// Unit geometric normal, oriented against the ray.
    pub normal: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO || !self.direction.is_finite() || !self.origin.is_finite()
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    pub fn rotated_about_y(&self, angle: f32) -> Ray {
        Ray {
            origin: self.origin,
            direction: Quat::from_rotation_y(angle) * self.direction,
        }
    }

    /// Möller–Trumbore, double sided.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<TriangleHit> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let determinant = edge1.dot(p);

        if determinant.abs() < DETERMINANT_EPSILON {
            return None;
        }

        let inverse_determinant = 1.0 / determinant;
        let to_origin = self.origin - a;
        let u = to_origin.dot(p) * inverse_determinant;
        if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&u) {
            return None;
        }

        let q = to_origin.cross(edge1);
        let v = self.direction.dot(q) * inverse_determinant;
        if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
            return None;
        }

        let distance = edge2.dot(q) * inverse_determinant;
        if distance < 0.0 {
            return None;
        }

        let mut normal = edge1.cross(edge2).normalize_or_zero();
        if normal.dot(self.direction) > 0.0 {
            normal = -normal;
        }

        Some(TriangleHit { distance, normal })
    }
}
