//! Desk-mode viewer for individual building floors, shown outside of AR.

use std::sync::Arc;

use crate::camera::OrbitCamera;
use crate::scene_graph::ModelTemplate;

#[derive(Debug, Clone, Default)]
pub struct FloorCatalog {
    floors: Vec<(u32, String)>,
}

impl FloorCatalog {
    pub fn new(floors: impl IntoIterator<Item = (u32, String)>) -> Self {
        let mut floors: Vec<_> = floors.into_iter().collect();
        floors.sort_by_key(|(number, _)| *number);
        floors.dedup_by_key(|(number, _)| *number);
        Self { floors }
    }

    pub fn url(&self, floor: u32) -> Option<&str> {
        self.floors
            .iter()
            .find(|(number, _)| *number == floor)
            .map(|(_, url)| url.as_str())
    }

    pub fn floors(&self) -> impl Iterator<Item = u32> + '_ {
        self.floors.iter().map(|(number, _)| *number)
    }
}

/// State of one open interior view. The floor model arrives asynchronously.
#[derive(Debug)]
pub struct InteriorViewer {
    floor: u32,
    template: Option<Arc<ModelTemplate>>,
    pub camera: OrbitCamera,
}

impl InteriorViewer {
    pub fn new(floor: u32) -> Self {
        Self {
            floor,
            template: None,
            camera: OrbitCamera::default(),
        }
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn template(&self) -> Option<&Arc<ModelTemplate>> {
        self.template.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.template.is_none()
    }

    pub fn show(&mut self, template: Arc<ModelTemplate>) {
        log::info!("Showing floor {} ({})", self.floor, template.name);
        self.template = Some(template);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::scene_graph::primitives;
    use glam::Vec3;

    #[test]
    fn catalog_looks_up_default_floors() {
        let catalog = FloorCatalog::new(ViewerConfig::default().floors);

        assert_eq!(catalog.url(1), Some("interior-lantai-1.glb"));
        assert_eq!(catalog.url(2), Some("interior-lantai-2.glb"));
        assert_eq!(catalog.url(3), None);
        assert_eq!(catalog.floors().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn duplicate_floor_numbers_keep_one_entry() {
        let catalog = FloorCatalog::new(vec![
            (2, "b.glb".to_string()),
            (1, "a.glb".to_string()),
            (2, "c.glb".to_string()),
        ]);

        assert_eq!(catalog.floors().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(catalog.url(2), Some("b.glb"));
    }

    #[test]
    fn viewer_waits_for_template() {
        let mut viewer = InteriorViewer::new(1);
        assert!(viewer.is_loading());

        viewer.show(Arc::new(primitives::room("floor", Vec3::splat(4.0))));
        assert!(!viewer.is_loading());
        assert_eq!(viewer.template().map(|t| t.name.as_str()), Some("floor"));
        assert_eq!(viewer.floor(), 1);
    }
}
