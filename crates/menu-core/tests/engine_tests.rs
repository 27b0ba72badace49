// Host-side tests for the engine lifecycle.
// A recording renderer stands in for the GPU; frames are stepped at fixed dt.

use chrono::{TimeZone, Utc};
use glam::{Quat, Vec3};
use menu_core::{
    run_fixed, DecodedImage, DragPhase, ImageLoader, MenuConfig, MenuEngine, MenuItem, RenderError,
    Release, SceneFrame, SceneRenderer, SlotState, TextureSink, TileInstance, Viewport,
};
use std::cell::RefCell;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct RecordingRenderer {
    resizes: Vec<(u32, u32)>,
    uploads: Vec<usize>,
    draws: Vec<Vec<TileInstance>>,
    reject_uploads: bool,
}

impl SceneRenderer for RecordingRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn upload_texture(&mut self, slot: usize, _image: &DecodedImage) -> Result<(), RenderError> {
        if self.reject_uploads {
            return Err(RenderError::Upload {
                slot,
                reason: "rejected".into(),
            });
        }
        self.uploads.push(slot);
        Ok(())
    }

    fn draw(&mut self, frame: &SceneFrame<'_>) -> Result<(), RenderError> {
        self.draws.push(frame.instances.to_vec());
        Ok(())
    }
}

#[derive(Default)]
struct StashLoader {
    requests: Vec<(usize, String)>,
    sinks: Vec<TextureSink>,
}

impl ImageLoader for StashLoader {
    fn request(&mut self, slot: usize, source: &str, sink: TextureSink) {
        self.requests.push((slot, source.to_string()));
        self.sinks.push(sink);
    }
}

fn items(n: usize) -> Vec<MenuItem> {
    (0..n)
        .map(|i| MenuItem {
            image: format!("img/{i}.png"),
            title: format!("Item {i}"),
            date: Utc.with_ymd_and_hms(2024, 1, 1 + i as u32 % 28, 12, 0, 0).unwrap(),
            link: Some(format!("https://example.com/{i}")),
            locale: "en-US".into(),
        })
        .collect()
}

type Engine = MenuEngine<RecordingRenderer>;

fn engine_with(n: usize) -> (Engine, Rc<RefCell<Vec<usize>>>, Rc<RefCell<Vec<bool>>>) {
    let mut engine = MenuEngine::new(RecordingRenderer::default(), items(n), MenuConfig::default());
    let active = Rc::new(RefCell::new(Vec::new()));
    let moving = Rc::new(RefCell::new(Vec::new()));
    let a = active.clone();
    engine.add_active_observer(move |i: usize, _item: &MenuItem| a.borrow_mut().push(i));
    let m = moving.clone();
    engine.add_moving_observer(move |v: bool| m.borrow_mut().push(v));
    (engine, active, moving)
}

fn start(engine: &mut Engine) -> StashLoader {
    let mut loader = StashLoader::default();
    engine.run(&mut loader, |_| {});
    loader
}

fn fling(engine: &mut Engine, dx: f32, frames: usize) {
    engine.pointer_down(0.0, 0.0);
    for k in 1..=frames {
        engine.pointer_move(dx * k as f32, 0.0);
        engine.advance(DT);
    }
    engine.pointer_up(dx * frames as f32, 0.0);
}

fn settle(engine: &mut Engine, max_frames: usize) -> usize {
    for n in 0..max_frames {
        if !engine.is_moving() {
            return n;
        }
        engine.advance(DT);
    }
    max_frames
}

#[test]
fn active_item_reported_once_at_start_and_not_at_rest() {
    let (mut engine, active, moving) = engine_with(5);
    start(&mut engine);
    assert_eq!(active.borrow().len(), 1);
    run_fixed(&mut engine, 240, DT);
    assert_eq!(active.borrow().len(), 1);
    assert!(moving.borrow().is_empty());
    assert_eq!(engine.active_index(), Some(active.borrow()[0]));
}

#[test]
fn active_changes_never_repeat_consecutively() {
    let (mut engine, active, _) = engine_with(7);
    start(&mut engine);
    fling(&mut engine, 25.0, 12);
    settle(&mut engine, 1200);
    let log = active.borrow();
    assert!(log.len() > 1, "a long fling should pass several items");
    assert!(log.windows(2).all(|w| w[0] != w[1]));
    assert_eq!(engine.active_index(), log.last().copied());
}

#[test]
fn hook_runs_after_initial_resolution() {
    let (mut engine, active, _) = engine_with(3);
    let mut seen = None;
    engine.run(&mut StashLoader::default(), |e| seen = e.active_index());
    assert!(seen.is_some());
    assert_eq!(seen, active.borrow().first().copied());
}

#[test]
fn single_item_fires_once_regardless_of_rotation() {
    let (mut engine, active, _) = engine_with(1);
    start(&mut engine);
    fling(&mut engine, 40.0, 20);
    settle(&mut engine, 1200);
    engine.set_orientation(Quat::from_rotation_x(2.0));
    run_fixed(&mut engine, 10, DT);
    assert_eq!(*active.borrow(), vec![0]);
}

#[test]
fn empty_list_runs_draws_nothing_and_never_fires() {
    let (mut engine, active, moving) = engine_with(0);
    let loader = start(&mut engine);
    assert!(loader.requests.is_empty());
    assert!(engine.resize(Viewport::new(640.0, 480.0, 1.0)));
    run_fixed(&mut engine, 30, DT);
    fling(&mut engine, 30.0, 5);
    settle(&mut engine, 1200);
    assert!(engine.resize(Viewport::new(320.0, 200.0, 2.0)));
    assert!(!engine.resize(Viewport::new(0.0, 0.0, 1.0)));
    assert!(active.borrow().is_empty());
    assert!(engine.renderer().draws.iter().all(|d| d.is_empty()));
    assert_eq!(engine.active_index(), None);
    // Moving still reports; only item callbacks are suppressed.
    assert_eq!(*moving.borrow(), vec![true, false]);
}

#[test]
fn zero_or_negative_resize_is_a_no_op() {
    let (mut engine, _, _) = engine_with(4);
    assert!(engine.resize(Viewport::new(800.0, 600.0, 2.0)));
    assert_eq!(engine.renderer().resizes, vec![(1600, 1200)]);
    let aspect = engine.camera().aspect;

    assert!(!engine.resize(Viewport::new(0.0, 0.0, 2.0)));
    assert!(!engine.resize(Viewport::new(-10.0, 300.0, 1.0)));
    assert!(!engine.resize(Viewport::new(300.0, 0.2, 1.0)));
    assert_eq!(engine.renderer().resizes, vec![(1600, 1200)]);
    assert_eq!(engine.camera().aspect, aspect);
    assert_eq!(engine.viewport(), Some((1600, 1200)));

    // Same size again is accepted without touching the renderer.
    assert!(engine.resize(Viewport::new(800.0, 600.0, 2.0)));
    assert_eq!(engine.renderer().resizes.len(), 1);
}

#[test]
fn resize_before_run_is_safe() {
    let (mut engine, active, _) = engine_with(3);
    assert!(engine.resize(Viewport::new(1024.0, 768.0, 1.0)));
    start(&mut engine);
    engine.advance(DT);
    assert_eq!(active.borrow().len(), 1);
    assert!((engine.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
}

#[test]
fn moving_callback_fires_on_transitions_only() {
    let (mut engine, _, moving) = engine_with(5);
    start(&mut engine);
    engine.advance(DT);
    assert!(moving.borrow().is_empty());

    fling(&mut engine, 20.0, 10);
    assert_eq!(*moving.borrow(), vec![true]);
    assert_eq!(engine.phase(), DragPhase::Inertial);

    let frames = settle(&mut engine, 1200);
    assert!(frames < 1200);
    run_fixed(&mut engine, 30, DT);
    assert_eq!(*moving.borrow(), vec![true, false]);
}

#[test]
fn tap_does_not_rotate_or_change_active_item() {
    let (mut engine, active, _) = engine_with(5);
    start(&mut engine);
    engine.advance(DT);
    engine.pointer_down(100.0, 100.0);
    engine.pointer_move(101.0, 101.0);
    let release = engine.pointer_up(102.0, 101.0);
    assert_eq!(release, Release::Tap);
    run_fixed(&mut engine, 10, DT);
    assert_eq!(engine.orientation(), Quat::IDENTITY);
    assert_eq!(engine.phase(), DragPhase::Idle);
    assert_eq!(active.borrow().len(), 1);
}

#[test]
fn textures_requested_once_per_item_and_uploaded_on_next_frame() {
    let (mut engine, _, _) = engine_with(3);
    let mut loader = start(&mut engine);
    assert_eq!(
        loader.requests,
        vec![
            (0, "img/0.png".to_string()),
            (1, "img/1.png".to_string()),
            (2, "img/2.png".to_string()),
        ]
    );

    let sink = loader.sinks.remove(1);
    let image = DecodedImage {
        width: 2,
        height: 2,
        rgba: vec![200; 16],
    };
    assert!(sink.complete(Ok(image)));
    assert_eq!(engine.texture_state(1), Some(SlotState::Ready));
    assert!(engine.renderer().uploads.is_empty());

    engine.advance(DT);
    assert_eq!(engine.renderer().uploads, vec![1]);
    engine.advance(DT);
    assert_eq!(engine.renderer().uploads, vec![1]);
    assert_eq!(engine.texture_state(0), Some(SlotState::Pending));
}

#[test]
fn rejected_upload_leaves_placeholder_and_frames_continue() {
    let renderer = RecordingRenderer {
        reject_uploads: true,
        ..Default::default()
    };
    let mut engine = MenuEngine::new(renderer, items(2), MenuConfig::default());
    let mut loader = StashLoader::default();
    engine.run(&mut loader, |_| {});
    let image = DecodedImage {
        width: 1,
        height: 1,
        rgba: vec![0; 4],
    };
    assert!(loader.sinks.remove(0).complete(Ok(image)));
    run_fixed(&mut engine, 3, DT);
    assert_eq!(engine.texture_state(0), Some(SlotState::Failed));
    assert_eq!(engine.renderer().draws.len(), 3);
}

#[test]
fn completion_after_teardown_is_ignored() {
    let (mut engine, _, _) = engine_with(2);
    let loader = start(&mut engine);
    let late = engine.texture_sink(1);
    assert!(engine.texture_sink(2).is_none());
    drop(engine);

    let image = DecodedImage {
        width: 1,
        height: 1,
        rgba: vec![0; 4],
    };
    for sink in loader.sinks {
        assert!(!sink.is_live());
        assert!(!sink.complete(Ok(image.clone())));
    }
    assert!(late.is_some_and(|s| !s.complete(Err(menu_core::TextureError::Empty))));
}

#[test]
fn only_tiles_near_the_view_are_drawn() {
    let (mut engine, _, _) = engine_with(100);
    start(&mut engine);
    engine.resize(Viewport::new(800.0, 600.0, 1.0));
    engine.advance(DT);

    let drawn = engine.renderer().draws.last().cloned().unwrap_or_default();
    let total = engine.layout().len();
    assert_eq!(total, 162);
    assert!(!drawn.is_empty() && drawn.len() < total, "{} of {total}", drawn.len());

    // Emphasised tiles are drawn last, and the active tile is fully emphasised.
    assert!(drawn.windows(2).all(|w| w[0].emphasis() <= w[1].emphasis()));
    let last = drawn.last().unwrap();
    assert_eq!(Some(last.slot()), engine.active_index());
    assert!(drawn.iter().all(|t| (0.0..=1.0).contains(&t.emphasis())));
}

#[test]
fn tiles_sit_on_the_sphere_and_do_not_overlap() {
    let (mut engine, _, _) = engine_with(42);
    start(&mut engine);
    engine.advance(DT);
    let radius = engine.config().sphere_radius;
    let sep = engine.layout().min_separation;
    for t in engine.renderer().draws[0].iter() {
        let c = Vec3::new(t.center_size[0], t.center_size[1], t.center_size[2]);
        assert!((c.length() - radius).abs() < 1e-4);
        if t.emphasis() == 0.0 {
            // Corner-to-centre angle stays under half the anchor spacing.
            let corner_angle = (t.half_size() * std::f32::consts::SQRT_2 / radius).atan();
            assert!(corner_angle < sep * 0.6);
        }
    }
}

#[test]
fn pointer_cancel_never_reports_tap() {
    let (mut engine, _, moving) = engine_with(5);
    start(&mut engine);
    engine.pointer_down(10.0, 10.0);
    engine.advance(DT);
    engine.pointer_cancel();
    engine.advance(DT);
    assert_eq!(engine.phase(), DragPhase::Idle);
    assert_eq!(*moving.borrow(), vec![true, false]);
    assert_eq!(engine.pointer_up(10.0, 10.0), Release::Ignored);
}

#[test]
fn second_run_is_ignored() {
    let (mut engine, active, _) = engine_with(3);
    assert!(!engine.is_started());
    let first = start(&mut engine);
    assert!(engine.is_started());
    let second = start(&mut engine);
    assert_eq!(first.requests.len(), 3);
    assert!(second.requests.is_empty());
    assert_eq!(active.borrow().len(), 1);
}

#[test]
fn oversized_anchor_padding_still_builds() {
    let cfg: MenuConfig =
        serde_json::from_str(&format!(r#"{{ "min_anchors": {} }}"#, u64::MAX)).unwrap();
    let mut engine = MenuEngine::new(RecordingRenderer::default(), items(8), cfg);
    assert_eq!(engine.layout().len(), 40_962);
    engine.resize(Viewport::new(800.0, 600.0, 1.0));
    engine.advance(DT);
    assert!(engine.camera().view_proj().is_finite());
    assert!(!engine.visible_tiles().is_empty());
}
