use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use glam::{Quat, Vec3};

use walkthrough::anchor::{HeadlessPlatform, Pose, XrFrame};
use walkthrough::assets::{GltfSource, ModelSource};
use walkthrough::config::{ModelEntry, ViewerConfig};
use walkthrough::manipulation::TapOutcome;
use walkthrough::movement::Direction;
use walkthrough::scene_graph::{primitives, ModelTemplate};
use walkthrough::session::ArContext;

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);
const WALK_FRAMES: usize = 120;

/// Serves glTF files when given a directory, otherwise a generated room for every url.
struct DemoSource {
    files: Option<GltfSource>,
}

impl ModelSource for DemoSource {
    fn load(&self, url: &str) -> anyhow::Result<ModelTemplate> {
        match &self.files {
            Some(files) => files.load(url),
            None => Ok(primitives::room(url, Vec3::new(4.0, 3.0, 4.0)).with_base_scale(0.05)),
        }
    }
}

pub struct DemoState {
    context: ArContext<HeadlessPlatform>,
}

impl DemoState {
    pub fn new(model: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = ViewerConfig::default();
        config.movement.collide_with_worn = true;

        let files = match model {
            Some(path) => {
                let file = path
                    .file_name()
                    .context("Model path has no file name")?
                    .to_string_lossy()
                    .into_owned();
                let root = path.parent().unwrap_or_else(|| Path::new("."));

                config.models = vec![ModelEntry::new(file.clone(), file.clone())];
                config.floors = vec![(1, file)];
                Some(GltfSource::new(root))
            }
            None => None,
        };

        Ok(Self {
            context: ArContext::new(HeadlessPlatform::new(), DemoSource { files }, config),
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let ctx = &mut self.context;
        ctx.start()?;

        ctx.select_model(0).context("Empty model catalog")?;
        ctx.wait_for_load(LOAD_TIMEOUT)
            .context("Timed out waiting for model")?;
        if let Some(error) = ctx.last_error() {
            anyhow::bail!("{}", error);
        }

        // The surface sits right under the viewer so the room surrounds the player.
        let surface = Pose::new(Vec3::new(0.0, -0.85, 0.0), Quat::IDENTITY);
        ctx.on_frame(&XrFrame {
            viewer_pose: Some(Pose::IDENTITY),
            hit_results: vec![surface],
        });

        let id = match ctx.tap(None, Instant::now()) {
            TapOutcome::Placed(id) => id,
            other => anyhow::bail!("Placement failed: {:?}", other),
        };
        ctx.controller_mut().set_rotation(30.0);
        log::info!("Sliders: {:?}", ctx.controller().selection_sliders());

        anyhow::ensure!(
            ctx.controller_mut().enter_first_person(),
            "Could not enter first-person mode"
        );
        ctx.controller_mut().set_movement(Direction::Forward, true);

        let walking = XrFrame {
            viewer_pose: Some(Pose::IDENTITY),
            hit_results: Vec::new(),
        };
        let mut walked = Vec3::ZERO;
        for frame in 0..WALK_FRAMES {
            let step = ctx.on_frame(&walking);
            walked += step;
            if frame % 20 == 0 {
                log::debug!("Frame {}: moved world by {}", frame, step);
            }
        }
        log::info!(
            "Walked {:.2} m of {:.2} m requested",
            walked.length(),
            WALK_FRAMES as f32 * ctx.config().movement.move_speed()
        );

        ctx.controller_mut().exit_first_person();
        let restored = ctx.controller().registry().get(id)?;
        log::info!("Object #{} back at {}", id, restored.transform.translation());

        ctx.end_session();

        if ctx.enter_interior(1) {
            ctx.wait_for_load(LOAD_TIMEOUT);
            if let Some(interior) = ctx.interior_mut() {
                interior.camera.rotate(1.0, 0.2);
                interior.camera.zoom(0.5);
            }
            for _ in 0..60 {
                ctx.on_frame(&XrFrame::default());
            }
            if let Some(interior) = ctx.interior() {
                log::info!(
                    "Orbit camera settled at {} ({:.2} m from target)",
                    interior.camera.eye,
                    interior.camera.distance()
                );
            }
            ctx.exit_interior();
        }

        log::info!("Demo finished in {} mode", ctx.mode());
        Ok(())
    }
}
