//! First-person movement with ray-based collision avoidance.
//!
//! The viewer's head is physically fixed, so walking is simulated by moving
//! the worn object the opposite way. Collision reasoning happens from the
//! player's side: a player standing at [`PLAYER_ORIGIN`] attempting the
//! inverted displacement. Horizontal and vertical motion are resolved
//! independently, then a single penetration ray clamps the combined result.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;

use crate::anchor::Pose;
use crate::collision::RayQuery;
use crate::config::MovementConfig;
use crate::math::Ray;
use crate::registry::{ObjectId, Registry};

pub const PLAYER_ORIGIN: Vec3 = Vec3::ZERO;

/// Slides shorter than this (squared) are treated as a dead stop.
const SLIDE_EPSILON: f32 = 1e-10;

/// Penetration clamps below this fraction snap to a full stop.
const MIN_REMAINING_RATIO: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Held-button state. Level triggered: a flag stays set until released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementIntent {
    pub fn set(&mut self, direction: Direction, active: bool) {
        match direction {
            Direction::Forward => self.forward = active,
            Direction::Backward => self.backward = active,
            Direction::Left => self.left = active,
            Direction::Right => self.right = active,
            Direction::Up => self.up = active,
            Direction::Down => self.down = active,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.up || self.down
    }

    pub fn clear(&mut self) {
        *self = MovementIntent::default();
    }
}

/// Viewer forward/right flattened onto the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl HorizontalBasis {
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            forward: flatten(pose.forward()),
            right: flatten(pose.right()),
        }
    }
}

impl Default for HorizontalBasis {
    fn default() -> Self {
        Self::from_pose(&Pose::IDENTITY)
    }
}

fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// World displacement for one frame. Signs are inverted: walking forward moves the world back.
pub fn desired_movement(intent: &MovementIntent, basis: &HorizontalBasis, speed: f32) -> Vec3 {
    let mut movement = Vec3::ZERO;

    if intent.forward {
        movement -= basis.forward * speed;
    }
    if intent.backward {
        movement += basis.forward * speed;
    }
    if intent.left {
        movement += basis.right * speed;
    }
    if intent.right {
        movement -= basis.right * speed;
    }
    if intent.up {
        movement.y -= speed;
    }
    if intent.down {
        movement.y += speed;
    }

    movement
}

pub struct CollisionResolver<'q, Q: RayQuery + ?Sized> {
    query: &'q Q,
    player_radius: f32,
    player_height: f32,
}

impl<'q, Q: RayQuery + ?Sized> CollisionResolver<'q, Q> {
    pub fn new(query: &'q Q, config: &MovementConfig) -> Self {
        Self {
            query,
            player_radius: config.player_radius,
            player_height: config.player_height,
        }
    }

    /// Corrects a world displacement so the player never ends up inside geometry.
    pub fn resolve(&self, movement: Vec3) -> Vec3 {
        if movement.length_squared() == 0.0 {
            return movement;
        }

        let inverted = -movement;
        let mut final_movement = movement;

        if let Some(horizontal) = self.resolve_horizontal(inverted) {
            final_movement.x = horizontal.x;
            final_movement.z = horizontal.z;
        }

        if self.vertical_blocked(inverted.y) {
            final_movement.y = 0.0;
        }

        self.clamp_penetration(inverted, final_movement)
    }

    /// Replacement horizontal world movement, or `None` when the way is clear.
    fn resolve_horizontal(&self, inverted: Vec3) -> Option<Vec3> {
        let attempt = Vec3::new(inverted.x, 0.0, inverted.z);
        if attempt.length_squared() == 0.0 {
            return None;
        }

        let travel = attempt.length();
        let far = travel + self.player_radius;
        let straight = Ray::new(PLAYER_ORIGIN, attempt);
        let probes = [
            straight,
            straight.rotated_about_y(FRAC_PI_4),
            straight.rotated_about_y(-FRAC_PI_4),
        ];

        for probe in &probes {
            let hit = match self.query.first_hit(probe, far) {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Horizontal collision query failed, stopping: {}", e);
                    return Some(Vec3::ZERO);
                }
            };

            if hit.distance < self.player_radius {
                return Some(Vec3::ZERO);
            }

            if hit.distance < far {
                let normal = flatten(hit.normal);
                let slide = attempt - normal * attempt.dot(normal);

                if slide.length_squared() > SLIDE_EPSILON {
                    return Some(-slide);
                }
                return Some(Vec3::ZERO);
            }
        }

        None
    }

    fn vertical_blocked(&self, attempt: f32) -> bool {
        if attempt == 0.0 {
            return false;
        }

        let offset = self.player_height / 2.0 - self.player_radius / 2.0;
        let probe = if attempt > 0.0 {
            Ray::new(PLAYER_ORIGIN + Vec3::Y * offset, Vec3::Y)
        } else {
            Ray::new(PLAYER_ORIGIN - Vec3::Y * offset, Vec3::NEG_Y)
        };

        let travel = attempt.abs();
        match self.query.first_hit(&probe, travel + self.player_radius) {
            Ok(Some(hit)) => hit.distance < travel + self.player_radius / 2.0,
            Ok(None) => false,
            Err(e) => {
                log::warn!("Vertical collision query failed, stopping: {}", e);
                true
            }
        }
    }

    fn clamp_penetration(&self, inverted: Vec3, movement: Vec3) -> Vec3 {
        let travel = inverted.length();
        let probe = Ray::new(PLAYER_ORIGIN, inverted);

        match self.query.first_hit(&probe, travel + self.player_radius) {
            Ok(Some(hit)) if hit.distance < travel => {
                let ratio = ((hit.distance - self.player_radius / 2.0) / travel).max(0.0);
                if ratio < MIN_REMAINING_RATIO {
                    Vec3::ZERO
                } else {
                    movement * ratio
                }
            }
            Ok(_) => movement,
            Err(e) => {
                log::warn!("Penetration query failed, stopping: {}", e);
                Vec3::ZERO
            }
        }
    }
}

/// Moves the worn object once per frame in first-person mode.
#[derive(Debug, Clone, Default)]
pub struct MovementEngine {
    pub config: MovementConfig,
}

impl MovementEngine {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.config.speed_multiplier = multiplier;
    }

    /// Computes, corrects and applies this frame's displacement. Returns what was applied.
    pub fn step(
        &self,
        registry: &mut Registry,
        worn: Option<ObjectId>,
        intent: &MovementIntent,
        basis: &HorizontalBasis,
    ) -> Vec3 {
        let desired = desired_movement(intent, basis, self.config.move_speed());

        let Some(worn) = worn else {
            return desired;
        };
        if desired.length_squared() == 0.0 {
            return desired;
        }

        let adjusted = {
            let exclude = (!self.config.collide_with_worn).then_some(worn);
            let geometry = registry.collision_geometry(exclude);
            if geometry.is_empty() {
                desired
            } else {
                CollisionResolver::new(&geometry, &self.config).resolve(desired)
            }
        };

        if let Err(e) = registry.translate(worn, adjusted) {
            log::warn!("Worn object vanished during movement: {}", e);
            return Vec3::ZERO;
        }

        adjusted
    }
}
