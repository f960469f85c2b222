//! Thin adapter over the platform's spatial tracking API.
//!
//! The platform delivers one [`XrFrame`] per display refresh. Everything the
//! rest of the crate needs from it is a viewer pose, the ordered hit-test
//! results against detected surfaces, and pick rays from input sources.

use glam::{Mat4, Quat, Vec3};

use crate::error::SessionError;
use crate::math::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// From a column-major rigid transform as delivered by the platform.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (_, orientation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    pub fn from_cols_array(matrix: &[f32; 16]) -> Self {
        Self::from_matrix(&Mat4::from_cols_array(matrix))
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Ray along the pose's forward axis, as used for input-source target rays.
    pub fn pick_ray(&self) -> Ray {
        Ray::new(self.position, self.forward())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

/// What the platform reports for one frame.
#[derive(Debug, Clone, Default)]
pub struct XrFrame {
    pub viewer_pose: Option<Pose>,
    /// Ordered best match first.
    pub hit_results: Vec<Pose>,
}

impl XrFrame {
    pub fn best_surface_pose(&self) -> Option<Pose> {
        self.hit_results.first().copied()
    }
}

pub trait SpatialPlatform {
    fn is_ar_supported(&self) -> bool;

    fn request_session(&mut self) -> Result<(), SessionError>;

    fn request_hit_test_source(&mut self) -> Result<(), SessionError>;

    /// Cancels the hit-test source and detaches session listeners. Must be safe to call twice.
    fn release(&mut self);

    /// Asks the platform to end the running session. The platform answers with a session-end event.
    fn end_session(&mut self) {}
}

/// Platform stand-in with scriptable failures. Used by the demo and in tests.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    pub unsupported: bool,
    pub deny_session: bool,
    pub deny_hit_test: bool,
    pub session_active: bool,
    pub hit_test_active: bool,
    pub releases: usize,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialPlatform for HeadlessPlatform {
    fn is_ar_supported(&self) -> bool {
        !self.unsupported
    }

    fn request_session(&mut self) -> Result<(), SessionError> {
        if self.deny_session {
            return Err(SessionError::StartFailed("permission denied".to_string()));
        }
        self.session_active = true;
        Ok(())
    }

    fn request_hit_test_source(&mut self) -> Result<(), SessionError> {
        if self.deny_hit_test {
            return Err(SessionError::StartFailed(
                "hit-test feature unavailable".to_string(),
            ));
        }
        self.hit_test_active = true;
        Ok(())
    }

    fn release(&mut self) {
        self.session_active = false;
        self.hit_test_active = false;
        self.releases += 1;
    }

    fn end_session(&mut self) {
        self.session_active = false;
    }
}
