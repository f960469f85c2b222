use glam::{Mat4, Vec3};

use crate::scene_graph::template::MeshId;
use crate::scene_graph::transform::Transform;

#[derive(Debug, Clone)]
pub enum SceneNode {
    Group(GroupNode),
    Surface(SurfaceNode),
}

#[derive(Debug, Clone)]
pub struct GroupNode {
    pub name: String,
    pub transform: Transform,
    /// Per-axis scale applied before `transform`. Imported assets may scale non-uniformly.
    pub stretch: Vec3,
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone)]
pub struct SurfaceNode {
    pub name: String,
    pub transform: Transform,
    pub stretch: Vec3,
    pub mesh: MeshId,
}

impl SceneNode {
    pub fn group(name: impl Into<String>, transform: Transform, children: Vec<SceneNode>) -> Self {
        SceneNode::Group(GroupNode {
            name: name.into(),
            transform,
            stretch: Vec3::ONE,
            children,
        })
    }

    pub fn surface(name: impl Into<String>, transform: Transform, mesh: MeshId) -> Self {
        SceneNode::Surface(SurfaceNode {
            name: name.into(),
            transform,
            stretch: Vec3::ONE,
            mesh,
        })
    }

    pub fn with_stretch(mut self, stretch: Vec3) -> Self {
        match &mut self {
            SceneNode::Group(group) => group.stretch = stretch,
            SceneNode::Surface(surface) => surface.stretch = stretch,
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            SceneNode::Group(group) => &group.name,
            SceneNode::Surface(surface) => &surface.name,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            SceneNode::Group(group) => &group.transform,
            SceneNode::Surface(surface) => &surface.transform,
        }
    }

    pub fn stretch(&self) -> Vec3 {
        match self {
            SceneNode::Group(group) => group.stretch,
            SceneNode::Surface(surface) => surface.stretch,
        }
    }

    /// Matrix relative to the parent node, stretch included.
    pub fn local_matrix(&self) -> Mat4 {
        let matrix = self.transform().matrix();
        if self.stretch() == Vec3::ONE {
            matrix
        } else {
            matrix * Mat4::from_scale(self.stretch())
        }
    }

    /// Visits every leaf surface below this node with its matrix relative to `parent_matrix`.
    pub fn visit_surfaces<F>(&self, parent_matrix: Mat4, visit: &mut F)
    where
        F: FnMut(Mat4, MeshId),
    {
        let matrix = parent_matrix * self.local_matrix();

        match self {
            SceneNode::Group(group) => {
                for child in &group.children {
                    child.visit_surfaces(matrix, visit);
                }
            }
            SceneNode::Surface(surface) => visit(matrix, surface.mesh),
        }
    }
}
