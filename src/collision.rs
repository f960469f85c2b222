use glam::{Mat4, Vec3};

use crate::error::QueryError;
use crate::math::Ray;
use crate::registry::ObjectId;
use crate::scene_graph::SurfaceMesh;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub owner: ObjectId,
}

/// Ray intersection against a set of surfaces. Hits come back sorted by increasing distance.
pub trait RayQuery {
    fn cast(&self, ray: &Ray, far: f32) -> Result<Vec<RayHit>, QueryError>;

    fn first_hit(&self, ray: &Ray, far: f32) -> Result<Option<RayHit>, QueryError> {
        Ok(self.cast(ray, far)?.into_iter().next())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorldSurface<'a> {
    pub owner: ObjectId,
    pub world_matrix: Mat4,
    pub mesh: &'a SurfaceMesh,
}

/// World-space leaf surfaces, built fresh from the registry whenever it is needed.
#[derive(Debug, Default)]
pub struct CollisionGeometry<'a> {
    surfaces: Vec<WorldSurface<'a>>,
}

impl<'a> CollisionGeometry<'a> {
    pub fn new(surfaces: Vec<WorldSurface<'a>>) -> Self {
        Self { surfaces }
    }

    pub fn surfaces(&self) -> &[WorldSurface<'a>] {
        &self.surfaces
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl RayQuery for CollisionGeometry<'_> {
    fn cast(&self, ray: &Ray, far: f32) -> Result<Vec<RayHit>, QueryError> {
        if ray.is_degenerate() {
            return Err(QueryError::DegenerateRay);
        }

        let mut hits = Vec::new();

        for surface in &self.surfaces {
            if !surface.world_matrix.is_finite() {
                return Err(QueryError::NonFiniteTransform(surface.owner));
            }

            let world_bounds = surface.mesh.bounds().transformed(&surface.world_matrix);
            if world_bounds.ray_entry(ray, far).is_none() {
                continue;
            }

            for triangle in surface.mesh.triangles() {
                let world_triangle =
                    triangle.map(|vertex| surface.world_matrix.transform_point3(vertex));

                if let Some(hit) = ray.intersect_triangle(world_triangle) {
                    if hit.distance <= far {
                        hits.push(RayHit {
                            distance: hit.distance,
                            point: ray.at(hit.distance),
                            normal: hit.normal,
                            owner: surface.owner,
                        });
                    }
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::primitives;

    fn wall_at(z: f32) -> SurfaceMesh {
        primitives::quad(
            "wall",
            [
                Vec3::new(-2.0, -1.0, z),
                Vec3::new(2.0, -1.0, z),
                Vec3::new(2.0, 3.0, z),
                Vec3::new(-2.0, 3.0, z),
            ],
        )
    }

    #[test]
    fn hits_are_sorted_by_distance() {
        let near = wall_at(-1.0);
        let far = wall_at(-3.0);
        let geometry = CollisionGeometry::new(vec![
            WorldSurface {
                owner: ObjectId(1),
                world_matrix: Mat4::IDENTITY,
                mesh: &far,
            },
            WorldSurface {
                owner: ObjectId(0),
                world_matrix: Mat4::IDENTITY,
                mesh: &near,
            },
        ]);

        let hits = geometry
            .cast(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), 10.0)
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].owner, ObjectId(0));
        assert!((hits[0].distance - 1.0).abs() < 1e-6);
        assert!(hits[0].point.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
        assert!((hits[1].distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn far_limit_excludes_distant_hits() {
        let wall = wall_at(-3.0);
        let geometry = CollisionGeometry::new(vec![WorldSurface {
            owner: ObjectId(0),
            world_matrix: Mat4::IDENTITY,
            mesh: &wall,
        }]);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(geometry.first_hit(&ray, 2.5).unwrap().is_none());
        assert!(geometry.first_hit(&ray, 3.5).unwrap().is_some());
    }

    #[test]
    fn world_matrix_moves_surface() {
        let wall = wall_at(0.0);
        let geometry = CollisionGeometry::new(vec![WorldSurface {
            owner: ObjectId(0),
            world_matrix: Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)),
            mesh: &wall,
        }]);

        let hit = geometry
            .first_hit(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), 5.0)
            .unwrap()
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn reports_broken_transforms_and_rays() {
        let wall = wall_at(-1.0);
        let geometry = CollisionGeometry::new(vec![WorldSurface {
            owner: ObjectId(4),
            world_matrix: Mat4::from_translation(Vec3::new(f32::NAN, 0.0, 0.0)),
            mesh: &wall,
        }]);

        assert_eq!(
            geometry.cast(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), 5.0),
            Err(QueryError::NonFiniteTransform(ObjectId(4)))
        );
        assert_eq!(
            geometry.cast(&Ray::new(Vec3::ZERO, Vec3::ZERO), 5.0),
            Err(QueryError::DegenerateRay)
        );
    }
}
