//! The single owned context an AR frontend drives: session start and end,
//! per-frame updates, model loads and the interior viewer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;

use crate::anchor::{SpatialPlatform, XrFrame};
use crate::assets::{AssetLoader, LoadEvent, LoadStatus, LoadTicket, ModelSource};
use crate::config::ViewerConfig;
use crate::error::{AssetError, SessionError};
use crate::interior::{FloorCatalog, InteriorViewer};
use crate::manipulation::{ManipulationController, TapOutcome};
use crate::math::Ray;
use crate::mode::{Mode, ModeEvent};
use crate::movement::{HorizontalBasis, MovementEngine};
use crate::scene_graph::ModelTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPurpose {
    Placement { model: usize },
    Floor(u32),
}

pub struct ArContext<P: SpatialPlatform> {
    platform: P,
    config: ViewerConfig,
    controller: ManipulationController,
    engine: MovementEngine,
    loader: AssetLoader,
    floors: FloorCatalog,
    active_template: Option<Arc<ModelTemplate>>,
    pending: Option<(LoadTicket, LoadPurpose)>,
    interior: Option<InteriorViewer>,
    last_error: Option<AssetError>,
}

impl<P: SpatialPlatform> ArContext<P> {
    pub fn new(platform: P, source: impl ModelSource, config: ViewerConfig) -> Self {
        Self {
            platform,
            controller: ManipulationController::new(&config),
            engine: MovementEngine::new(config.movement.clone()),
            loader: AssetLoader::new(source),
            floors: FloorCatalog::new(config.floors.clone()),
            config,
            active_template: None,
            pending: None,
            interior: None,
            last_error: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn controller(&self) -> &ManipulationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ManipulationController {
        &mut self.controller
    }

    pub fn interior(&self) -> Option<&InteriorViewer> {
        self.interior.as_ref()
    }

    pub fn interior_mut(&mut self) -> Option<&mut InteriorViewer> {
        self.interior.as_mut()
    }

    pub fn active_template(&self) -> Option<&Arc<ModelTemplate>> {
        self.active_template.as_ref()
    }

    pub fn pending_load(&self) -> Option<LoadPurpose> {
        self.pending.map(|(_, purpose)| purpose)
    }

    /// The most recent asset failure, kept for the UI to report.
    pub fn last_error(&self) -> Option<&AssetError> {
        self.last_error.as_ref()
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.engine.set_speed_multiplier(multiplier);
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.mode().has_session() {
            return Err(SessionError::AlreadyRunning);
        }
        if !self.platform.is_ar_supported() {
            log::error!("{}", SessionError::Unsupported);
            return Err(SessionError::Unsupported);
        }
        if self.mode() == Mode::Interior {
            self.exit_interior();
        }

        let started = self
            .platform
            .request_session()
            .and_then(|()| self.platform.request_hit_test_source());

        if let Err(e) = started {
            log::error!("{}", e);
            self.cleanup();
            return Err(e);
        }

        self.controller.transition(ModeEvent::SessionStarted);
        log::info!("AR session started");
        Ok(())
    }

    /// Asks the platform to end the session and runs the cleanup path.
    pub fn end_session(&mut self) {
        self.platform.end_session();
        self.on_session_end();
    }

    /// Handles the platform's session-end event. Safe to call more than once.
    pub fn on_session_end(&mut self) {
        if self.mode() == Mode::Interior {
            log::debug!("Session end ignored in interior viewer");
            return;
        }

        self.cleanup();
        log::info!("AR session ended");
    }

    fn cleanup(&mut self) {
        self.platform.release();
        self.loader.cancel();
        self.pending = None;
        self.controller.end_session();
    }

    pub fn on_frame(&mut self, frame: &XrFrame) -> Vec3 {
        self.poll_loads();

        match self.mode() {
            Mode::FirstPerson => {
                let basis = frame
                    .viewer_pose
                    .as_ref()
                    .map(HorizontalBasis::from_pose)
                    .unwrap_or_default();
                self.controller.walk(&self.engine, &basis)
            }
            Mode::Placing => {
                self.controller.on_surface_detected(frame.best_surface_pose());
                Vec3::ZERO
            }
            Mode::Interior => {
                if let Some(interior) = self.interior.as_mut() {
                    interior.camera.update();
                }
                Vec3::ZERO
            }
            Mode::Idle => Vec3::ZERO,
        }
    }

    pub fn tap(&mut self, pick_ray: Option<Ray>, now: Instant) -> TapOutcome {
        self.controller
            .on_primary_action(pick_ray, self.active_template.as_ref(), now)
    }

    /// Requests the catalog model at `index` for placement.
    pub fn select_model(&mut self, index: usize) -> Option<LoadTicket> {
        let Some(entry) = self.config.models.get(index) else {
            log::warn!("No model at catalog index {}", index);
            return None;
        };

        log::info!("Loading model {} from {}", entry.name, entry.url);
        let ticket = self.loader.request(&entry.url);
        self.pending = Some((ticket, LoadPurpose::Placement { model: index }));
        Some(ticket)
    }

    /// Switches to the desk viewer for `floor`, leaving any AR session.
    pub fn enter_interior(&mut self, floor: u32) -> bool {
        if self.mode().has_session() {
            self.end_session();
        }
        if self.mode() == Mode::Interior {
            self.exit_interior();
        }

        let Some(url) = self.floors.url(floor).map(str::to_owned) else {
            log::warn!("Unknown floor {}", floor);
            return false;
        };
        if !self.controller.transition(ModeEvent::EnterInterior) {
            return false;
        }

        self.interior = Some(InteriorViewer::new(floor));
        let ticket = self.loader.request(&url);
        self.pending = Some((ticket, LoadPurpose::Floor(floor)));
        log::info!("Entering interior viewer for floor {}", floor);
        true
    }

    pub fn exit_interior(&mut self) -> bool {
        if self.interior.take().is_none() {
            return false;
        }
        if matches!(self.pending, Some((_, LoadPurpose::Floor(_)))) {
            self.loader.cancel();
            self.pending = None;
        }

        self.controller.transition(ModeEvent::ExitInterior);
        log::info!("Interior viewer closed");
        true
    }

    /// Applies a finished load if one has arrived.
    pub fn poll_loads(&mut self) -> Option<LoadPurpose> {
        let event = self.loader.poll()?;
        self.apply_load(event)
    }

    /// Blocks until the pending load completes or `timeout` passes.
    pub fn wait_for_load(&mut self, timeout: Duration) -> Option<LoadPurpose> {
        let event = self.loader.wait(timeout)?;
        self.apply_load(event)
    }

    fn apply_load(&mut self, event: LoadEvent) -> Option<LoadPurpose> {
        let purpose = match self.pending.take() {
            Some((ticket, purpose)) if ticket == event.ticket => purpose,
            other => {
                self.pending = other;
                log::debug!("Ignoring unexpected load result for {}", event.url);
                return None;
            }
        };

        if let LoadStatus::Loaded(_) = event.status {
            self.last_error = None;
        }

        match (purpose, event.status) {
            (LoadPurpose::Placement { .. }, LoadStatus::Loaded(template)) => {
                log::info!("Model {} ready for placement", template.name);
                self.active_template = Some(template);
                self.controller.deselect();
            }
            (LoadPurpose::Floor(_), LoadStatus::Loaded(template)) => {
                if let Some(interior) = self.interior.as_mut() {
                    interior.show(template);
                }
            }
            (_, LoadStatus::Failed(reason)) => {
                let error = AssetError::Load {
                    url: event.url,
                    reason,
                };
                log::error!("{}", error);
                self.last_error = Some(error);

                if let LoadPurpose::Floor(_) = purpose {
                    self.exit_interior();
                }
            }
            (_, LoadStatus::Pending) => {
                self.pending = Some((event.ticket, purpose));
                return None;
            }
        }

        Some(purpose)
    }
}
