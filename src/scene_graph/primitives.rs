use glam::Vec3;

use crate::scene_graph::mesh::SurfaceMesh;
use crate::scene_graph::node::SceneNode;
use crate::scene_graph::template::ModelTemplate;
use crate::scene_graph::transform::Transform;

/// Two triangles spanning `corners` in order.
pub fn quad(name: impl Into<String>, corners: [Vec3; 4]) -> SurfaceMesh {
    SurfaceMesh::from_valid_parts(name, corners.to_vec(), vec![0, 1, 2, 0, 2, 3])
}

pub fn cuboid(name: impl Into<String>, half_extents: Vec3) -> SurfaceMesh {
    let (x, y, z) = (half_extents.x, half_extents.y, half_extents.z);
    let positions = vec![
        Vec3::new(-x, -y, -z),
        Vec3::new(x, -y, -z),
        Vec3::new(x, y, -z),
        Vec3::new(-x, y, -z),
        Vec3::new(-x, -y, z),
        Vec3::new(x, -y, z),
        Vec3::new(x, y, z),
        Vec3::new(-x, y, z),
    ];

    #[rustfmt::skip]
    let indices = vec![
        // -Z
        0, 2, 1, 0, 3, 2,
        // +Z
        4, 5, 6, 4, 6, 7,
        // -X
        0, 4, 7, 0, 7, 3,
        // +X
        1, 2, 6, 1, 6, 5,
        // -Y
        0, 1, 5, 0, 5, 4,
        // +Y
        3, 7, 6, 3, 6, 2,
    ];

    SurfaceMesh::from_valid_parts(name, positions, indices)
}

/// Floor, ceiling and four walls of an open box centred on the origin at floor level.
pub fn room(name: impl Into<String>, size: Vec3) -> ModelTemplate {
    let name = name.into();
    let half = size * 0.5;
    let h = size.y;

    let mut template = ModelTemplate::new(name.clone(), format!("generated://{}", name));

    let faces = [
        (
            "Floor",
            [
                Vec3::new(-half.x, 0.0, -half.z),
                Vec3::new(half.x, 0.0, -half.z),
                Vec3::new(half.x, 0.0, half.z),
                Vec3::new(-half.x, 0.0, half.z),
            ],
        ),
        (
            "Ceiling",
            [
                Vec3::new(-half.x, h, -half.z),
                Vec3::new(-half.x, h, half.z),
                Vec3::new(half.x, h, half.z),
                Vec3::new(half.x, h, -half.z),
            ],
        ),
        (
            "North",
            [
                Vec3::new(-half.x, 0.0, -half.z),
                Vec3::new(-half.x, h, -half.z),
                Vec3::new(half.x, h, -half.z),
                Vec3::new(half.x, 0.0, -half.z),
            ],
        ),
        (
            "South",
            [
                Vec3::new(-half.x, 0.0, half.z),
                Vec3::new(half.x, 0.0, half.z),
                Vec3::new(half.x, h, half.z),
                Vec3::new(-half.x, h, half.z),
            ],
        ),
        (
            "West",
            [
                Vec3::new(-half.x, 0.0, -half.z),
                Vec3::new(-half.x, 0.0, half.z),
                Vec3::new(-half.x, h, half.z),
                Vec3::new(-half.x, h, -half.z),
            ],
        ),
        (
            "East",
            [
                Vec3::new(half.x, 0.0, -half.z),
                Vec3::new(half.x, h, -half.z),
                Vec3::new(half.x, h, half.z),
                Vec3::new(half.x, 0.0, half.z),
            ],
        ),
    ];

    let children = faces
        .into_iter()
        .map(|(face_name, corners)| {
            let mesh = template.add_mesh(quad(face_name, corners));
            SceneNode::surface(face_name, Transform::identity(), mesh)
        })
        .collect();

    template.add_node(SceneNode::group(name, Transform::identity(), children));
    template
}
