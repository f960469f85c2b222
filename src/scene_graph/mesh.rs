use glam::Vec3;
use itertools::Itertools;

use crate::error::AssetError;
use crate::math::AABB;

/// Triangle list geometry. Shared read-only between every placement of a template.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    pub name: String,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: AABB,
}

impl SurfaceMesh {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> Result<Self, AssetError> {
        let name = name.into();

        if indices.len() % 3 != 0 {
            return Err(AssetError::InvalidMesh {
                name,
                reason: format!("index count {} is not a multiple of 3", indices.len()),
            });
        }

        if let Some(index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(AssetError::InvalidMesh {
                name,
                reason: format!("index {} out of range for {} vertices", index, positions.len()),
            });
        }

        let bounds = AABB::from_points(positions.iter().copied());

        Ok(Self {
            name,
            positions,
            indices,
            bounds,
        })
    }

    /// For generated geometry whose indices are known to be in range.
    pub(crate) fn from_valid_parts(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        let bounds = AABB::from_points(positions.iter().copied());

        Self {
            name: name.into(),
            positions,
            indices,
            bounds,
        }
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices
            .iter()
            .tuples()
            .map(|(&a, &b, &c)| {
                [
                    self.positions[a as usize],
                    self.positions[b as usize],
                    self.positions[c as usize],
                ]
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_indices() {
        let result = SurfaceMesh::new("broken", vec![Vec3::ZERO, Vec3::X], vec![0, 1, 2]);
        assert!(matches!(result, Err(AssetError::InvalidMesh { .. })));
    }

    #[test]
    fn rejects_partial_triangles() {
        let result = SurfaceMesh::new("broken", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1]);
        assert!(matches!(result, Err(AssetError::InvalidMesh { .. })));
    }

    #[test]
    fn iterates_triangles_and_bounds() {
        let mesh = SurfaceMesh::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        let triangles: Vec<_> = mesh.triangles().collect();
        assert_eq!(triangles[1], [Vec3::ZERO, Vec3::Y, Vec3::Z]);
        assert_eq!(mesh.bounds().size(), Vec3::ONE);
    }
}
