//! One gallery instance: layout, camera, interaction, textures and
//! notifications, stepped one frame at a time.
//!
//! Within a frame the order is fixed: interaction, then draw, then
//! active-item resolution, so the reported item always matches the
//! orientation that was just rendered.

use crate::camera::{Camera, Viewport};
use crate::config::MenuConfig;
use crate::constants::{EMPHASIS_SCALE, EMPHASIS_START_DOT, MAX_FRAME_DT_SEC};
use crate::geometry::{build_layout, SphereLayout};
use crate::input::{DragPhase, InteractionController, Release};
use crate::item::MenuItem;
use crate::observer::{ActiveItemObserver, MovingObserver, Observers};
use crate::render::{SceneFrame, SceneRenderer, TileInstance};
use crate::resolver::ActiveItemResolver;
use crate::scheduler::{clamp_dt, FrameDriver};
use crate::textures::{ImageLoader, SlotState, TextureSink, TextureTable};
use glam::{Quat, Vec2};
use std::cell::RefCell;
use std::rc::Rc;

pub struct MenuEngine<R: SceneRenderer> {
    renderer: R,
    items: Rc<[MenuItem]>,
    config: MenuConfig,
    layout: SphereLayout,
    tile_half_angle: f32,

    camera: Camera,
    input: InteractionController,
    resolver: ActiveItemResolver,
    observers: Observers,
    textures: Rc<RefCell<TextureTable>>,

    instances: Vec<TileInstance>,
    viewport: Option<(u32, u32)>,
    moving: bool,
    started: bool,
    draw_failing: bool,
    frame_count: u64,
}

impl<R: SceneRenderer> MenuEngine<R> {
    pub fn new(renderer: R, items: impl Into<Rc<[MenuItem]>>, config: MenuConfig) -> Self {
        let items = items.into();
        let config = config.sanitized();
        let layout = build_layout(items.len(), config.min_anchors);
        let tile_half_angle = layout.tile_half_angle(config.tile_fill);
        if items.is_empty() {
            log::warn!("[engine] no items; drawing an empty scene");
        } else {
            log::info!(
                "[engine] {} items on {} tiles, min separation {:.4} rad",
                items.len(),
                layout.len(),
                layout.min_separation
            );
        }
        Self {
            renderer,
            textures: Rc::new(RefCell::new(TextureTable::new(items.len()))),
            camera: Camera::new(config.fovy_radians),
            input: InteractionController::new(&config),
            resolver: ActiveItemResolver::new(),
            observers: Observers::default(),
            instances: Vec::with_capacity(layout.len()),
            items,
            config,
            layout,
            tile_half_angle,
            viewport: None,
            moving: false,
            started: false,
            draw_failing: false,
            frame_count: 0,
        }
    }

    // ---- observers ----

    pub fn add_active_observer(&mut self, observer: impl ActiveItemObserver + 'static) {
        self.observers.add_active(Box::new(observer));
    }

    pub fn add_moving_observer(&mut self, observer: impl MovingObserver + 'static) {
        self.observers.add_moving(Box::new(observer));
    }

    // ---- lifecycle ----

    /// One-time setup: request every item's image, resolve the initial
    /// active item, then hand `self` to `hook` (typically to start the
    /// host's frame loop). A second call is ignored.
    pub fn run<L, H>(&mut self, loader: &mut L, hook: H)
    where
        L: ImageLoader + ?Sized,
        H: FnOnce(&mut Self),
    {
        if self.started {
            log::warn!("[engine] run called twice; ignoring");
            return;
        }
        self.started = true;
        for (slot, item) in self.items.iter().enumerate() {
            loader.request(slot, &item.image, TextureSink::new(&self.textures, slot));
        }
        self.resolve_active();
        log::info!("[engine] running");
        hook(self);
    }

    /// Apply a new drawing-surface size. Empty or negative sizes are
    /// ignored. Returns true if the size was applied.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        let Some((w, h)) = viewport.physical_size() else {
            log::debug!("[engine] ignoring empty resize {viewport:?}");
            return false;
        };
        if self.viewport == Some((w, h)) {
            return true;
        }
        self.camera.set_viewport(w, h);
        self.renderer.resize(w, h);
        self.viewport = Some((w, h));
        log::info!("[engine] resize {w}x{h} (dpr {})", viewport.device_pixel_ratio);
        true
    }

    /// Step one frame.
    pub fn advance(&mut self, dt_sec: f32) {
        let dt = clamp_dt(dt_sec, MAX_FRAME_DT_SEC);
        self.frame_count += 1;

        self.input.update(dt, &mut self.camera.orientation);
        self.camera.update_zoom(
            self.input.angular_speed(),
            self.config.zoom_fov_per_speed,
            self.config.zoom_fov_max_extra,
            dt,
        );

        self.upload_completed_textures();
        self.build_instances();
        let frame = SceneFrame {
            view_proj: self.camera.view_proj(),
            instances: &self.instances,
        };
        match self.renderer.draw(&frame) {
            Ok(()) => {
                if self.draw_failing {
                    log::info!("[engine] drawing recovered");
                }
                self.draw_failing = false;
            }
            Err(e) => {
                if !self.draw_failing {
                    log::error!("[engine] draw failed: {e}");
                }
                self.draw_failing = true;
            }
        }

        self.resolve_active();
        self.sync_moving();
    }

    fn upload_completed_textures(&mut self) {
        let completed = self.textures.borrow_mut().take_completed();
        for (slot, image) in completed {
            if let Err(e) = self.renderer.upload_texture(slot, &image) {
                log::warn!("[textures] upload failed: {e}");
                self.textures.borrow_mut().mark_failed(slot);
            }
        }
    }

    fn build_instances(&mut self) {
        self.instances.clear();
        if self.layout.is_empty() {
            return;
        }
        let forward = self.camera.forward();
        let cull = self.camera.cull_dot(self.tile_half_angle);
        let base_half = self.config.sphere_radius * self.tile_half_angle.tan();
        for tile in &self.layout.tiles {
            let d = tile.anchor.dot(forward);
            if d < cull {
                continue;
            }
            let emphasis = ((d - EMPHASIS_START_DOT) / (1.0 - EMPHASIS_START_DOT)).clamp(0.0, 1.0);
            let (right, up) = tile.basis();
            self.instances.push(TileInstance::new(
                tile.anchor * self.config.sphere_radius,
                base_half * (1.0 + emphasis * EMPHASIS_SCALE),
                right,
                up,
                emphasis,
                tile.item_index,
            ));
        }
        // Emphasised tiles may grow over their neighbours; draw them last.
        self.instances
            .sort_by(|a, b| a.emphasis().total_cmp(&b.emphasis()));
    }

    fn resolve_active(&mut self) {
        let forward = self.camera.forward();
        if let Some(index) = self.resolver.resolve(&self.layout.tiles, forward) {
            let item = &self.items[index];
            log::info!("[engine] active item {index}: {}", item.title);
            self.observers.notify_active(index, item);
        }
    }

    fn sync_moving(&mut self) {
        let moving = self.input.is_moving();
        if moving != self.moving {
            self.moving = moving;
            log::info!("[engine] moving = {moving}");
            self.observers.notify_moving(moving);
        }
    }

    // ---- input ----

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.input.pointer_down(Vec2::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.input.pointer_move(Vec2::new(x, y))
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Release {
        let release = self.input.pointer_up(Vec2::new(x, y));
        if release == Release::Tap {
            if let Some(item) = self.active_item() {
                log::info!(
                    "[input] tap on '{}' (link: {})",
                    item.title,
                    item.link.as_deref().unwrap_or("none")
                );
            }
        }
        release
    }

    pub fn pointer_cancel(&mut self) {
        self.input.pointer_cancel();
    }

    // ---- accessors ----

    /// Handle a host loader can complete later; `None` for an unknown slot.
    pub fn texture_sink(&self, slot: usize) -> Option<TextureSink> {
        (slot < self.items.len()).then(|| TextureSink::new(&self.textures, slot))
    }

    pub fn texture_state(&self, slot: usize) -> Option<SlotState> {
        self.textures.borrow().slot_state(slot)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn layout(&self) -> &SphereLayout {
        &self.layout
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orientation(&self) -> Quat {
        self.camera.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.camera.orientation = orientation.normalize();
    }

    pub fn phase(&self) -> DragPhase {
        self.input.phase()
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn active_index(&self) -> Option<usize> {
        self.resolver.last_reported()
    }

    pub fn active_item(&self) -> Option<&MenuItem> {
        self.active_index().and_then(|i| self.items.get(i))
    }

    pub fn visible_tiles(&self) -> &[TileInstance] {
        &self.instances
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: SceneRenderer> FrameDriver for MenuEngine<R> {
    fn advance(&mut self, dt_sec: f32) {
        MenuEngine::advance(self, dt_sec);
    }
}

impl<R: SceneRenderer> Drop for MenuEngine<R> {
    fn drop(&mut self) {
        let pending = {
            let table = self.textures.borrow();
            (0..table.len())
                .filter(|&i| table.slot_state(i) == Some(SlotState::Pending))
                .count()
        };
        log::info!(
            "[engine] teardown after {} frames ({pending} texture loads abandoned)",
            self.frame_count
        );
    }
}
