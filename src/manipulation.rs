use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};

use crate::anchor::Pose;
use crate::config::ViewerConfig;
use crate::error::RegistryError;
use crate::math::Ray;
use crate::mode::{Mode, ModeEvent};
use crate::movement::{Direction, HorizontalBasis, MovementEngine, MovementIntent};
use crate::registry::{ObjectId, Registry};
use crate::scene_graph::{ModelTemplate, Transform};
use crate::selection::SelectionHighlight;

/// Swallows taps that belong to a widget press rather than the scene.
#[derive(Debug, Clone)]
pub struct UiGuard {
    interacting: bool,
    last_interaction: Option<Instant>,
    window: Duration,
}

impl UiGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            interacting: false,
            last_interaction: None,
            window,
        }
    }

    pub fn begin_interaction(&mut self, now: Instant) {
        self.interacting = true;
        self.last_interaction = Some(now);
    }

    pub fn end_interaction(&mut self, now: Instant) {
        self.interacting = false;
        self.last_interaction = Some(now);
    }

    pub fn should_ignore_tap(&self, now: Instant) -> bool {
        self.interacting
            || self
                .last_interaction
                .is_some_and(|last| now.saturating_duration_since(last) < self.window)
    }
}

/// Two-finger pinch (scale) and twist (yaw) relative to where the gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchTwist {
    initial_distance: f32,
    initial_angle: f32,
    base_scale: f32,
    base_yaw: f32,
}

impl PinchTwist {
    pub fn start(touches: [Vec2; 2], base_scale: f32, base_yaw: f32) -> Option<Self> {
        let initial_distance = touches[0].distance(touches[1]);
        if initial_distance <= f32::EPSILON {
            return None;
        }

        Some(Self {
            initial_distance,
            initial_angle: touch_angle(touches),
            base_scale,
            base_yaw,
        })
    }

    /// Scale and yaw for the current touch positions.
    pub fn apply(&self, touches: [Vec2; 2], (min_scale, max_scale): (f32, f32)) -> (f32, f32) {
        let factor = touches[0].distance(touches[1]) / self.initial_distance;
        let scale = (self.base_scale * factor).max(min_scale).min(max_scale);
        let yaw = self.base_yaw + (touch_angle(touches) - self.initial_angle);
        (scale, yaw)
    }
}

fn touch_angle(touches: [Vec2; 2]) -> f32 {
    let delta = touches[0] - touches[1];
    delta.y.atan2(delta.x)
}

#[derive(Debug, Clone)]
pub struct FirstPersonSession {
    pub worn: ObjectId,
    /// Transform before entry, restored verbatim on exit.
    pub saved: Transform,
    pub intent: MovementIntent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Swallowed by the UI guard or not applicable in this mode.
    Ignored,
    Selected(ObjectId),
    Placed(ObjectId),
    /// A surface was available but no model has loaded yet.
    NoTemplate,
    /// Nothing hit and no surface to place on.
    Nothing,
}

/// Values the UI needs to keep its sliders in sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionSliders {
    pub id: ObjectId,
    pub scale: f32,
    pub rotation_degrees: f32,
}

pub struct ManipulationController {
    mode: Mode,
    registry: Registry,
    highlight: SelectionHighlight,
    reticle: Option<Pose>,
    ui: UiGuard,
    gesture: Option<PinchTwist>,
    first_person: Option<FirstPersonSession>,
    first_person_scale: f32,
    gesture_scale_limits: (f32, f32),
}

impl ManipulationController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            mode: Mode::Idle,
            registry: Registry::new(),
            highlight: SelectionHighlight::default(),
            reticle: None,
            ui: UiGuard::new(config.ui_debounce),
            gesture: None,
            first_person: None,
            first_person_scale: config.first_person_scale,
            gesture_scale_limits: config.gesture_scale_limits,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn highlight(&self) -> &SelectionHighlight {
        &self.highlight
    }

    pub fn reticle(&self) -> Option<Pose> {
        self.reticle
    }

    pub fn ui(&self) -> &UiGuard {
        &self.ui
    }

    pub fn first_person(&self) -> Option<&FirstPersonSession> {
        self.first_person.as_ref()
    }

    /// Applies a mode event. Illegal events are logged and ignored.
    pub fn transition(&mut self, event: ModeEvent) -> bool {
        match self.mode.next(event) {
            Some(mode) => {
                log::debug!("Mode {} -> {} on {:?}", self.mode, mode, event);
                self.mode = mode;
                true
            }
            None => {
                log::warn!("Ignoring {:?} in {} mode", event, self.mode);
                false
            }
        }
    }

    pub fn on_surface_detected(&mut self, pose: Option<Pose>) {
        self.reticle = match self.mode {
            Mode::Placing => pose,
            _ => None,
        };
    }

    pub fn on_primary_action(
        &mut self,
        pick_ray: Option<Ray>,
        template: Option<&Arc<ModelTemplate>>,
        now: Instant,
    ) -> TapOutcome {
        if self.ui.should_ignore_tap(now) {
            log::debug!("Tap ignored during UI interaction");
            return TapOutcome::Ignored;
        }
        if self.mode != Mode::Placing {
            return TapOutcome::Ignored;
        }

        if let Some(id) = pick_ray.and_then(|ray| self.select_at(&ray)) {
            return TapOutcome::Selected(id);
        }

        let Some(pose) = self.reticle else {
            return TapOutcome::Nothing;
        };

        match template {
            Some(template) => {
                let id = self.registry.place(&pose, template);
                if let Err(e) = self.select(id) {
                    log::error!("Freshly placed object missing: {}", e);
                }
                TapOutcome::Placed(id)
            }
            None => {
                log::warn!("No model loaded yet, refusing placement");
                TapOutcome::NoTemplate
            }
        }
    }

    pub fn select_at(&mut self, ray: &Ray) -> Option<ObjectId> {
        let id = self.registry.pick(ray)?;
        self.select(id).ok()?;
        log::debug!("Object #{} selected via pick ray", id);
        Some(id)
    }

    pub fn select(&mut self, id: ObjectId) -> Result<(), RegistryError> {
        self.registry.select(id)?;
        self.highlight.update(&self.registry);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.registry.deselect();
        self.highlight.hide();
    }

    /// Removes the selected object. No-op without a selection or while walking.
    pub fn delete(&mut self) -> Option<ObjectId> {
        if self.mode == Mode::FirstPerson {
            return None;
        }

        let id = self.registry.selected()?;
        let removed = self.registry.remove(id).ok().map(|object| object.id);
        self.deselect();
        removed
    }

    pub fn set_scale(&mut self, scale: f32) {
        if let Some(id) = self.manipulable_selection() {
            if self.registry.set_scale(id, scale).is_ok() {
                self.highlight.update(&self.registry);
            }
        }
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        if let Some(id) = self.manipulable_selection() {
            if self.registry.set_yaw(id, degrees.to_radians()).is_ok() {
                self.highlight.update(&self.registry);
            }
        }
    }

    fn manipulable_selection(&self) -> Option<ObjectId> {
        match self.mode {
            Mode::FirstPerson => None,
            _ => self.registry.selected(),
        }
    }

    pub fn selection_sliders(&self) -> Option<SelectionSliders> {
        self.registry.selected_object().map(|object| SelectionSliders {
            id: object.id,
            scale: object.transform.scale(),
            rotation_degrees: object.transform.yaw().to_degrees().rem_euclid(360.0),
        })
    }

    pub fn begin_ui_interaction(&mut self, now: Instant) {
        self.ui.begin_interaction(now);
    }

    pub fn end_ui_interaction(&mut self, now: Instant) {
        self.ui.end_interaction(now);
    }

    pub fn start_gesture(&mut self, touches: [Vec2; 2]) {
        self.gesture = self.registry.selected_object().and_then(|object| {
            PinchTwist::start(touches, object.transform.scale(), object.transform.yaw())
        });
    }

    pub fn update_gesture(&mut self, touches: [Vec2; 2]) {
        let (Some(gesture), Some(id)) = (self.gesture, self.manipulable_selection()) else {
            return;
        };

        let (scale, yaw) = gesture.apply(touches, self.gesture_scale_limits);
        if let Ok(object) = self.registry.get_mut(id) {
            object.transform.set_scale(scale);
            object.transform.set_yaw(yaw);
            self.highlight.update(&self.registry);
        }
    }

    pub fn end_gesture(&mut self) {
        self.gesture = None;
    }

    /// Clears every placed object. Leaves first-person mode first.
    pub fn reset(&mut self) {
        if self.mode == Mode::FirstPerson {
            self.exit_first_person();
        }

        self.registry.clear();
        self.gesture = None;
        self.highlight.hide();
        log::info!("All objects removed");
    }

    pub fn enter_first_person(&mut self) -> bool {
        let snapshot = self
            .registry
            .selected_object()
            .map(|object| (object.id, object.transform.clone()));

        if !self.transition(ModeEvent::EnterFirstPerson {
            has_selection: snapshot.is_some(),
        }) {
            log::info!("No object selected for first-person mode");
            return false;
        }
        let Some((worn, saved)) = snapshot else {
            return false;
        };

        if let Err(e) = self
            .registry
            .set_scale(worn, saved.scale() * self.first_person_scale)
        {
            log::error!("Cannot scale worn object: {}", e);
        }
        self.registry.set_visibility_except(worn, false);

        self.first_person = Some(FirstPersonSession {
            worn,
            saved,
            intent: MovementIntent::default(),
        });
        self.reticle = None;
        self.gesture = None;
        self.highlight.hide();

        log::info!("Entering first-person mode in object #{}", worn);
        true
    }

    pub fn exit_first_person(&mut self) -> bool {
        if !self.transition(ModeEvent::ExitFirstPerson) {
            return false;
        }

        if let Some(session) = self.first_person.take() {
            if let Ok(object) = self.registry.get_mut(session.worn) {
                object.transform = session.saved;
            }
            self.registry.show_all();
            log::info!("Exiting first-person mode");
        }

        self.highlight.update(&self.registry);
        true
    }

    pub fn set_movement(&mut self, direction: Direction, active: bool) {
        if let Some(session) = self.first_person.as_mut() {
            session.intent.set(direction, active);
        }
    }

    /// One frame of first-person movement. Zero outside first-person mode.
    pub fn walk(&mut self, engine: &MovementEngine, basis: &HorizontalBasis) -> Vec3 {
        let Some(session) = &self.first_person else {
            return Vec3::ZERO;
        };

        engine.step(&mut self.registry, Some(session.worn), &session.intent, basis)
    }

    /// Drops everything scoped to the AR session and returns to idle.
    pub fn end_session(&mut self) {
        self.first_person = None;
        self.registry = Registry::new();
        self.reticle = None;
        self.gesture = None;
        self.highlight.hide();
        self.transition(ModeEvent::SessionEnded);
    }
}
