use glam::{Mat4, Vec3};

pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 1.6, 3.0);
pub const DEFAULT_TARGET: Vec3 = Vec3::new(0.0, 1.6, 0.0);

const MIN_POLAR: f32 = 0.01;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;

/// Desk-mode camera orbiting a target, with damped rotation and zoom.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
}

impl OrbitCamera {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            damping: 0.05,
            min_distance: 0.5,
            max_distance: 5.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 1.0,
        }
    }

    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }

    /// Queues an orbit around the target, applied gradually by `update`.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.pending_yaw += delta_yaw;
        self.pending_pitch += delta_pitch;
    }

    /// Queues a zoom. Factors below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.pending_zoom *= factor;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < 1e-5
            && self.pending_pitch.abs() < 1e-5
            && (self.pending_zoom - 1.0).abs() < 1e-5
    }

    /// Advances the damped motion by one frame.
    pub fn update(&mut self) {
        let offset = self.eye - self.target;
        let radius = offset.length().max(f32::EPSILON);

        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let yaw_step = self.pending_yaw * self.damping;
        let pitch_step = self.pending_pitch * self.damping;
        let zoom_step = self.pending_zoom.powf(self.damping);

        azimuth += yaw_step;
        polar = (polar + pitch_step).clamp(MIN_POLAR, MAX_POLAR);
        let radius = (radius * zoom_step).clamp(self.min_distance, self.max_distance);

        self.pending_yaw -= yaw_step;
        self.pending_pitch -= pitch_step;
        self.pending_zoom /= zoom_step;

        let offset = Vec3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        );
        self.eye = self.target + offset;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_lh(45f32.to_radians(), aspect, 0.1, 100.0);
        projection * self.view_matrix()
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(DEFAULT_EYE, DEFAULT_TARGET)
    }
}
