use glam::Vec3;

use crate::registry::Registry;

/// Wireframe box the renderer draws around the selected object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionHighlight {
    pub visible: bool,
    pub center: Vec3,
    pub size: Vec3,
}

impl SelectionHighlight {
    /// Refit to the selection's current world bounds, or hide when nothing is selected.
    pub fn update(&mut self, registry: &Registry) {
        match registry.selected_object() {
            Some(object) => {
                let bounds = object.world_bounds();
                self.center = bounds.center();
                self.size = bounds.size();
                self.visible = true;
            }
            None => self.hide(),
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Pose;
    use crate::scene_graph::{primitives, ModelTemplate, SceneNode, Transform};
    use glam::Quat;
    use std::sync::Arc;

    #[test]
    fn follows_selection_and_scale() {
        let mut template = ModelTemplate::new("block", "block.glb");
        let mesh = template.add_mesh(primitives::cuboid("block", Vec3::new(0.5, 1.0, 0.5)));
        template.add_node(SceneNode::surface("block", Transform::identity(), mesh));
        let template = Arc::new(template);

        let mut registry = Registry::new();
        let id = registry.place(&Pose::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY), &template);
        let mut highlight = SelectionHighlight::default();

        highlight.update(&registry);
        assert!(!highlight.visible);

        registry.select(id).unwrap();
        highlight.update(&registry);
        assert!(highlight.visible);
        assert!(highlight.center.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
        assert!(highlight.size.abs_diff_eq(Vec3::new(1.0, 2.0, 1.0), 1e-6));

        registry.set_scale(id, 3.0).unwrap();
        highlight.update(&registry);
        assert!(highlight.size.abs_diff_eq(Vec3::new(3.0, 6.0, 3.0), 1e-5));

        registry.deselect();
        highlight.update(&registry);
        assert!(!highlight.visible);
    }
}
