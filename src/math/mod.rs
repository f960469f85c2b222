pub mod bounds;
pub mod ray;

pub use bounds::AABB;
pub use ray::{Ray, TriangleHit};
