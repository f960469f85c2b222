use glam::Mat4;
use id_arena::{Arena, Id};

use crate::math::AABB;
use crate::scene_graph::mesh::SurfaceMesh;
use crate::scene_graph::node::SceneNode;

pub type MeshId = Id<SurfaceMesh>;

/// A loaded model. Placements clone the `Arc` around it, never the geometry.
#[derive(Debug)]
pub struct ModelTemplate {
    pub name: String,
    pub url: String,
    /// Scale a fresh placement starts from.
    pub base_scale: f32,
    pub nodes: Vec<SceneNode>,
    meshes: Arena<SurfaceMesh>,
}

#[derive(Debug, Clone, Copy)]
pub struct LeafSurface {
    pub local_matrix: Mat4,
    pub mesh: MeshId,
}

impl ModelTemplate {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            base_scale: 1.0,
            nodes: Vec::new(),
            meshes: Arena::new(),
        }
    }

    pub fn with_base_scale(mut self, base_scale: f32) -> Self {
        self.base_scale = base_scale;
        self
    }

    pub fn add_mesh(&mut self, mesh: SurfaceMesh) -> MeshId {
        self.meshes.alloc(mesh)
    }

    pub fn add_node(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn mesh(&self, id: MeshId) -> Option<&SurfaceMesh> {
        self.meshes.get(id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Flattens the node tree into leaf surfaces relative to the template root.
    pub fn leaf_surfaces(&self) -> Vec<LeafSurface> {
        let mut leaves = Vec::new();
        for node in &self.nodes {
            node.visit_surfaces(Mat4::IDENTITY, &mut |local_matrix, mesh| {
                leaves.push(LeafSurface { local_matrix, mesh });
            });
        }
        leaves
    }

    /// Bounds of every leaf surface in template space.
    pub fn bounds(&self) -> AABB {
        self.leaf_surfaces()
            .iter()
            .filter_map(|leaf| {
                self.mesh(leaf.mesh)
                    .map(|mesh| mesh.bounds().transformed(&leaf.local_matrix))
            })
            .fold(AABB::empty(), |acc, bounds| acc.union(&bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::primitives;
    use crate::scene_graph::transform::Transform;
    use glam::Vec3;

    #[test]
    fn leaf_surfaces_compose_group_transforms() {
        let mut template = ModelTemplate::new("house", "house.glb");
        let mesh = template.add_mesh(primitives::cuboid("block", Vec3::splat(0.5)));

        template.add_node(SceneNode::group(
            "root",
            Transform::from_translation(Vec3::X),
            vec![
                SceneNode::surface("a", Transform::identity(), mesh),
                SceneNode::group(
                    "nested",
                    Transform::from_translation(Vec3::Y),
                    vec![SceneNode::surface("b", Transform::identity(), mesh)],
                ),
            ],
        ));

        let leaves = template.leaf_surfaces();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].local_matrix.transform_point3(Vec3::ZERO), Vec3::X);
        assert_eq!(
            leaves[1].local_matrix.transform_point3(Vec3::ZERO),
            Vec3::new(1.0, 1.0, 0.0)
        );

        let bounds = template.bounds();
        assert!(bounds.min.abs_diff_eq(Vec3::new(0.5, -0.5, -0.5), 1e-6));
        assert!(bounds.max.abs_diff_eq(Vec3::new(1.5, 1.5, 0.5), 1e-6));
    }
}
