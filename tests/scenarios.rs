use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::{Quat, Vec3};

use walkthrough::anchor::{HeadlessPlatform, Pose, XrFrame};
use walkthrough::assets::ModelSource;
use walkthrough::config::{MovementConfig, ViewerConfig};
use walkthrough::manipulation::{ManipulationController, TapOutcome};
use walkthrough::mode::{Mode, ModeEvent};
use walkthrough::movement::{Direction, HorizontalBasis, MovementEngine, MovementIntent};
use walkthrough::registry::{ObjectId, Registry};
use walkthrough::scene_graph::{primitives, ModelTemplate, SceneNode, Transform};
use walkthrough::session::ArContext;

fn single_mesh_template(name: &str, mesh: walkthrough::scene_graph::SurfaceMesh) -> ModelTemplate {
    let mut template = ModelTemplate::new(name, format!("{}.glb", name));
    let mesh = template.add_mesh(mesh);
    template.add_node(SceneNode::surface(name, Transform::identity(), mesh));
    template
}

fn block() -> Arc<ModelTemplate> {
    Arc::new(single_mesh_template(
        "block",
        primitives::cuboid("block", Vec3::splat(0.5)),
    ))
}

#[test]
fn place_scale_and_delete() {
    let mut controller = ManipulationController::new(&ViewerConfig::default());
    assert!(controller.transition(ModeEvent::SessionStarted));

    let p = Vec3::new(0.5, 0.0, -1.5);
    controller.on_surface_detected(Some(Pose::new(p, Quat::IDENTITY)));

    let template = block();
    let outcome = controller.on_primary_action(None, Some(&template), Instant::now());
    assert_eq!(outcome, TapOutcome::Placed(ObjectId(0)));

    let registry = controller.registry();
    assert_eq!(registry.len(), 1);
    let object = registry.get(ObjectId(0)).unwrap();
    assert!(object.transform.translation().abs_diff_eq(p, 1e-6));
    assert_eq!(registry.selected(), Some(ObjectId(0)));

    let before = controller.highlight().size;
    controller.set_scale(2.0);
    let after = controller.highlight().size;
    assert!(controller.highlight().visible);
    assert!(after.abs_diff_eq(before * 2.0, 1e-5));

    assert_eq!(controller.delete(), Some(ObjectId(0)));
    assert!(controller.registry().is_empty());
    assert_eq!(controller.registry().selected(), None);
    assert!(!controller.highlight().visible);
}

#[test]
fn wall_ahead_limits_fast_walk() {
    let mut registry = Registry::new();
    let wall = Arc::new(single_mesh_template(
        "wall",
        primitives::quad(
            "wall",
            [
                Vec3::new(-2.0, -1.0, -1.0),
                Vec3::new(2.0, -1.0, -1.0),
                Vec3::new(2.0, 3.0, -1.0),
                Vec3::new(-2.0, 3.0, -1.0),
            ],
        ),
    ));
    registry.place(&Pose::IDENTITY, &wall);
    let worn = registry.place(&Pose::new(Vec3::new(0.0, 0.0, 10.0), Quat::IDENTITY), &block());

    let engine = MovementEngine::new(MovementConfig {
        base_speed: 1.5,
        ..MovementConfig::default()
    });
    let mut intent = MovementIntent::default();
    intent.set(Direction::Forward, true);

    let applied = engine.step(
        &mut registry,
        Some(worn),
        &intent,
        &HorizontalBasis::default(),
    );

    assert!(applied.length() < 1.5);
    let position = registry.get(worn).unwrap().transform.translation();
    assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0) + applied, 1e-6));
}

#[test]
fn first_person_round_trip_restores_transform() {
    let mut controller = ManipulationController::new(&ViewerConfig::default());
    controller.transition(ModeEvent::SessionStarted);
    controller.on_surface_detected(Some(Pose::new(
        Vec3::new(1.0, 0.0, -2.0),
        Quat::from_rotation_y(0.4),
    )));
    let template = block();
    controller.on_primary_action(None, Some(&template), Instant::now());
    controller.set_scale(0.3);

    let saved = controller.registry().get(ObjectId(0)).unwrap().transform.clone();
    assert!(controller.enter_first_person());
    assert_eq!(controller.mode(), Mode::FirstPerson);
    assert!(controller.exit_first_person());

    let restored = &controller.registry().get(ObjectId(0)).unwrap().transform;
    assert_eq!(*restored, saved);
    assert_eq!(controller.mode(), Mode::Placing);
}

struct SlowSource;

impl ModelSource for SlowSource {
    fn load(&self, url: &str) -> anyhow::Result<ModelTemplate> {
        thread::sleep(Duration::from_millis(100));
        Ok(primitives::room(url, Vec3::splat(3.0)))
    }
}

#[test]
fn session_end_during_load() {
    let mut ctx = ArContext::new(HeadlessPlatform::new(), SlowSource, ViewerConfig::default());
    ctx.start().unwrap();
    assert!(ctx.select_model(2).is_some());

    ctx.end_session();
    assert_eq!(ctx.mode(), Mode::Idle);

    thread::sleep(Duration::from_millis(300));
    ctx.on_frame(&XrFrame::default());

    assert_eq!(ctx.mode(), Mode::Idle);
    assert!(ctx.active_template().is_none());
    assert!(ctx.controller().registry().is_empty());
    assert!(!ctx.platform().session_active);
}
