use glam::{EulerRot, Mat4, Quat, Vec3};
use std::cell::Cell;

#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: f32,

    local_matrix: Cell<Mat4>,
    local_dirty: Cell<bool>,
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
            local_matrix: Cell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, 1.0)
    }

    pub fn identity() -> Self {
        Self::from_translation(Vec3::ZERO)
    }

    pub fn matrix(&self) -> Mat4 {
        if self.local_dirty.get() {
            let matrix = Mat4::from_scale_rotation_translation(
                Vec3::splat(self.scale),
                self.rotation,
                self.translation,
            );

            self.local_matrix.set(matrix);
            self.local_dirty.set(false);
        }

        self.local_matrix.get()
    }

    fn invalidate(&self) {
        self.local_dirty.set(true);
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.invalidate();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.invalidate();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
        self.invalidate();
    }

    /// Heading about the vertical axis, in `(-PI, PI]`.
    pub fn yaw(&self) -> f32 {
        let (yaw, _, _) = self.rotation.to_euler(EulerRot::YXZ);
        yaw
    }

    /// Replaces only the heading, keeping the surface tilt.
    pub fn set_yaw(&mut self, yaw: f32) {
        let (_, pitch, roll) = self.rotation.to_euler(EulerRot::YXZ);
        self.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);
        self.invalidate();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}
