use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use crate::anchor::Pose;
use crate::collision::{CollisionGeometry, RayQuery, WorldSurface};
use crate::error::RegistryError;
use crate::math::{Ray, AABB};
use crate::scene_graph::{LeafSurface, ModelTemplate, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A template leaf together with the placement that owns it.
#[derive(Debug, Clone, Copy)]
pub struct PlacedSurface {
    pub owner: ObjectId,
    pub leaf: LeafSurface,
}

#[derive(Debug)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub transform: Transform,
    pub visible: bool,
    source: Arc<ModelTemplate>,
    surfaces: Vec<PlacedSurface>,
}

impl PlacedObject {
    pub fn source(&self) -> &Arc<ModelTemplate> {
        &self.source
    }

    pub fn surfaces(&self) -> &[PlacedSurface] {
        &self.surfaces
    }

    pub fn world_surfaces(&self) -> impl Iterator<Item = WorldSurface<'_>> + '_ {
        let root = self.transform.matrix();

        self.surfaces.iter().filter_map(move |surface| {
            self.source.mesh(surface.leaf.mesh).map(|mesh| WorldSurface {
                owner: surface.owner,
                world_matrix: root * surface.leaf.local_matrix,
                mesh,
            })
        })
    }

    pub fn world_bounds(&self) -> AABB {
        self.world_surfaces()
            .map(|surface| surface.mesh.bounds().transformed(&surface.world_matrix))
            .fold(AABB::empty(), |acc, bounds| acc.union(&bounds))
    }
}

/// Owns every placed object and the current selection.
#[derive(Debug, Default)]
pub struct Registry {
    objects: Vec<PlacedObject>,
    next_id: u32,
    selected: Option<ObjectId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, pose: &Pose, template: &Arc<ModelTemplate>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let surfaces = template
            .leaf_surfaces()
            .into_iter()
            .map(|leaf| PlacedSurface { owner: id, leaf })
            .collect();

        self.objects.push(PlacedObject {
            id,
            transform: Transform::new(pose.position, pose.orientation, template.base_scale),
            visible: true,
            source: Arc::clone(template),
            surfaces,
        });

        log::info!("Placed {} as object #{} at {}", template.name, id, pose.position);
        id
    }

    pub fn get(&self, id: ObjectId) -> Result<&PlacedObject, RegistryError> {
        self.objects
            .iter()
            .find(|object| object.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut PlacedObject, RegistryError> {
        self.objects
            .iter_mut()
            .find(|object| object.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<PlacedObject, RegistryError> {
        let index = self
            .objects
            .iter()
            .position(|object| object.id == id)
            .ok_or(RegistryError::NotFound(id))?;

        if self.selected == Some(id) {
            self.selected = None;
        }

        log::info!("Removed object #{}", id);
        Ok(self.objects.remove(index))
    }

    pub fn set_scale(&mut self, id: ObjectId, scale: f32) -> Result<(), RegistryError> {
        self.get_mut(id)?.transform.set_scale(scale);
        Ok(())
    }

    pub fn set_yaw(&mut self, id: ObjectId, yaw: f32) -> Result<(), RegistryError> {
        self.get_mut(id)?.transform.set_yaw(yaw);
        Ok(())
    }

    pub fn translate(&mut self, id: ObjectId, delta: Vec3) -> Result<(), RegistryError> {
        self.get_mut(id)?.transform.translate(delta);
        Ok(())
    }

    /// Removes every object. The id counter keeps running.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
    }

    pub fn list(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn select(&mut self, id: ObjectId) -> Result<(), RegistryError> {
        self.get(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&PlacedObject> {
        self.selected.and_then(|id| self.get(id).ok())
    }

    pub fn world_bounds(&self, id: ObjectId) -> Result<AABB, RegistryError> {
        Ok(self.get(id)?.world_bounds())
    }

    pub fn set_visibility_except(&mut self, keep: ObjectId, visible: bool) {
        for object in self.objects.iter_mut().filter(|object| object.id != keep) {
            object.visible = visible;
        }
    }

    pub fn show_all(&mut self) {
        for object in &mut self.objects {
            object.visible = true;
        }
    }

    /// Leaf surfaces of every object except `exclude`.
    pub fn collision_geometry(&self, exclude: Option<ObjectId>) -> CollisionGeometry<'_> {
        CollisionGeometry::new(
            self.objects
                .iter()
                .filter(|object| Some(object.id) != exclude)
                .flat_map(|object| object.world_surfaces())
                .collect(),
        )
    }

    /// Owner of the nearest surface hit by `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<ObjectId> {
        match self.collision_geometry(None).first_hit(ray, f32::INFINITY) {
            Ok(hit) => hit.map(|hit| hit.owner),
            Err(e) => {
                log::warn!("Pick ray query failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::{primitives, SceneNode};
    use glam::Quat;

    fn block_template() -> Arc<ModelTemplate> {
        let mut template = ModelTemplate::new("block", "block.glb");
        let mesh = template.add_mesh(primitives::cuboid("block", Vec3::splat(0.5)));
        template.add_node(SceneNode::surface("block", Transform::identity(), mesh));
        Arc::new(template)
    }

    fn pose_at(position: Vec3) -> Pose {
        Pose::new(position, Quat::IDENTITY)
    }

    #[test]
    fn ids_increase_and_are_never_reused() {
        let template = block_template();
        let mut registry = Registry::new();

        let a = registry.place(&pose_at(Vec3::ZERO), &template);
        let b = registry.place(&pose_at(Vec3::X), &template);
        registry.remove(b).unwrap();
        let c = registry.place(&pose_at(Vec3::Y), &template);
        registry.clear();
        let d = registry.place(&pose_at(Vec3::Z), &template);

        assert!(a < b && b < c && c < d);
        assert_eq!(a, ObjectId(0));
        assert_eq!(d, ObjectId(3));
    }

    #[test]
    fn remove_clears_selection_and_get_fails() {
        let template = block_template();
        let mut registry = Registry::new();
        let id = registry.place(&pose_at(Vec3::ZERO), &template);
        registry.select(id).unwrap();

        registry.remove(id).unwrap();

        assert_eq!(registry.get(id).unwrap_err(), RegistryError::NotFound(id));
        assert_eq!(registry.selected(), None);
        assert!(registry.remove(id).is_err());
    }

    #[test]
    fn removing_other_object_keeps_selection() {
        let template = block_template();
        let mut registry = Registry::new();
        let a = registry.place(&pose_at(Vec3::ZERO), &template);
        let b = registry.place(&pose_at(Vec3::X), &template);
        registry.select(a).unwrap();

        registry.remove(b).unwrap();
        assert_eq!(registry.selected(), Some(a));
    }

    #[test]
    fn placements_share_template_geometry() {
        let template = block_template();
        let mut registry = Registry::new();
        let a = registry.place(&pose_at(Vec3::ZERO), &template);
        let b = registry.place(&pose_at(Vec3::X), &template);

        assert!(Arc::ptr_eq(
            registry.get(a).unwrap().source(),
            registry.get(b).unwrap().source()
        ));
        assert_eq!(Arc::strong_count(&template), 3);
    }

    #[test]
    fn surfaces_point_back_to_owner() {
        let template = block_template();
        let mut registry = Registry::new();
        registry.place(&pose_at(Vec3::ZERO), &template);
        let b = registry.place(&pose_at(Vec3::X), &template);

        assert!(registry
            .get(b)
            .unwrap()
            .surfaces()
            .iter()
            .all(|surface| surface.owner == b));
    }

    #[test]
    fn pick_returns_nearest_owner() {
        let template = block_template();
        let mut registry = Registry::new();
        let far = registry.place(&pose_at(Vec3::new(0.0, 0.0, -5.0)), &template);
        let near = registry.place(&pose_at(Vec3::new(0.0, 0.0, -2.0)), &template);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(registry.pick(&ray), Some(near));

        registry.remove(near).unwrap();
        assert_eq!(registry.pick(&ray), Some(far));
        assert_eq!(registry.pick(&Ray::new(Vec3::ZERO, Vec3::Z)), None);
    }

    #[test]
    fn collision_geometry_excludes_object() {
        let template = block_template();
        let mut registry = Registry::new();
        let a = registry.place(&pose_at(Vec3::ZERO), &template);
        registry.place(&pose_at(Vec3::X), &template);

        assert_eq!(registry.collision_geometry(None).surfaces().len(), 2);
        let geometry = registry.collision_geometry(Some(a));
        assert_eq!(geometry.surfaces().len(), 1);
        assert!(geometry.surfaces().iter().all(|surface| surface.owner != a));
    }

    #[test]
    fn set_scale_and_yaw_on_missing_object_fail() {
        let mut registry = Registry::new();
        assert!(registry.set_scale(ObjectId(7), 2.0).is_err());
        assert!(registry.set_yaw(ObjectId(7), 1.0).is_err());
        assert!(registry.select(ObjectId(7)).is_err());
        assert_eq!(registry.selected(), None);
    }
}
