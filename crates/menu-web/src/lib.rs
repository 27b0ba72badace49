#![cfg(target_arch = "wasm32")]
mod dom;
mod events;
mod frame;
mod observers;
mod overlay;
mod textures;

use events::{Listeners, SharedEngine};
use frame::FrameLoop;
use menu_core::{default_items, FrameTimer, GpuRenderer, MenuConfig, MenuEngine, MenuItem};
use observers::{JsObservers, Notice, NoticeQueue};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

const DEMO_CANVAS_ID: &str = "menu-canvas";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("menu-web starting");

    // Pages that ship the demo markup get a menu without any JS glue.
    let demo_canvas = dom::window_document()
        .and_then(|d| d.get_element_by_id(DEMO_CANVAS_ID))
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok());
    if let Some(canvas) = demo_canvas {
        spawn_local(async move {
            match build(canvas, Vec::new(), None, None, MenuConfig::default()).await {
                Ok(mut menu) => {
                    menu.run();
                    // The demo lives as long as the page.
                    std::mem::forget(menu);
                }
                Err(e) => log::error!("[init] demo menu failed: {:?}", e),
            }
        });
    }
    Ok(())
}

/// Build a menu on `canvas`.
///
/// `items` is an array of `{ image, title, date, link?, locale? }` (`date`
/// may be a `Date` or an ISO string); an empty or missing array falls back
/// to the built-in set. `config` is an optional partial tuning object.
#[wasm_bindgen(js_name = createMenu)]
pub async fn create_menu(
    canvas: web::HtmlCanvasElement,
    items: JsValue,
    on_active_change: Option<js_sys::Function>,
    on_moving_change: Option<js_sys::Function>,
    config: JsValue,
) -> Result<InfiniteMenu, JsValue> {
    let items = parse_json::<Vec<MenuItem>>(&items, "items")?.unwrap_or_default();
    let config = parse_json::<MenuConfig>(&config, "config")?.unwrap_or_default();
    build(canvas, items, on_active_change, on_moving_change, config)
        .await
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

fn parse_json<T: serde::de::DeserializeOwned>(value: &JsValue, what: &str) -> Result<Option<T>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let text: String = js_sys::JSON::stringify(value)?.into();
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("invalid {what}: {e}")))
}

async fn build(
    canvas: web::HtmlCanvasElement,
    items: Vec<MenuItem>,
    on_active: Option<js_sys::Function>,
    on_moving: Option<js_sys::Function>,
    config: MenuConfig,
) -> anyhow::Result<InfiniteMenu> {
    let items = if items.is_empty() {
        log::info!("[init] no items supplied; using defaults");
        default_items()
    } else {
        items
    };

    let viewport = dom::sync_canvas_backing_size(&canvas);
    let (w, h) = viewport.physical_size().unwrap_or((1, 1));
    let renderer = GpuRenderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), w, h)
        .await
        .map_err(|e| anyhow::anyhow!("WebGPU init failed: {e}"))?;

    let queue: NoticeQueue = Rc::new(RefCell::new(Default::default()));
    let mut engine = MenuEngine::new(renderer, items, config);
    {
        let q = queue.clone();
        engine.add_active_observer(move |i: usize, item: &MenuItem| {
            q.borrow_mut().push_back(Notice::Active(i, item.clone()));
        });
        let q = queue.clone();
        engine.add_moving_observer(move |moving: bool| {
            q.borrow_mut().push_back(Notice::Moving(moving));
        });
    }
    engine.resize(viewport);

    let engine: SharedEngine = Rc::new(RefCell::new(engine));
    let listeners = events::wire_input_handlers(&canvas, &engine);
    let observers = Rc::new(JsObservers {
        on_active,
        on_moving,
        overlay: dom::window_document().and_then(|d| overlay::Overlay::find(&d)),
    });
    Ok(InfiniteMenu {
        inner: Some(MenuHost {
            engine,
            canvas,
            queue,
            observers,
            listeners,
            frame_loop: None,
        }),
    })
}

struct MenuHost {
    engine: SharedEngine,
    canvas: web::HtmlCanvasElement,
    queue: NoticeQueue,
    observers: Rc<JsObservers>,
    listeners: Listeners,
    frame_loop: Option<FrameLoop>,
}

#[wasm_bindgen]
pub struct InfiniteMenu {
    inner: Option<MenuHost>,
}

#[wasm_bindgen]
impl InfiniteMenu {
    /// Start loading textures and animating. Calling it again is a no-op.
    pub fn run(&mut self) {
        let Some(host) = self.inner.as_mut() else {
            log::warn!("[menu] run after destroy");
            return;
        };
        if host.frame_loop.is_some() {
            return;
        }
        let mut loader = textures::FetchLoader;
        let mut frame_loop = None;
        {
            let engine = host.engine.clone();
            let queue = host.queue.clone();
            let observers = host.observers.clone();
            let Ok(mut e) = host.engine.try_borrow_mut() else {
                log::warn!("[menu] engine busy; run skipped");
                return;
            };
            e.run(&mut loader, |_| {
                let mut timer = FrameTimer::default();
                frame_loop = Some(FrameLoop::start(move || {
                    let dt = timer.tick();
                    if let Ok(mut e) = engine.try_borrow_mut() {
                        e.advance(dt);
                    }
                    observers.dispatch(&queue);
                }));
            });
        }
        // Deliver the initial active item outside this call so the callback
        // may use the menu handle.
        let observers = host.observers.clone();
        let queue = host.queue.clone();
        spawn_local(async move { observers.dispatch(&queue) });
        host.frame_loop = frame_loop;
    }

    /// Re-measure the canvas. Zero-sized layouts are ignored.
    pub fn resize(&mut self) {
        let Some(host) = self.inner.as_ref() else { return };
        let viewport = dom::sync_canvas_backing_size(&host.canvas);
        match host.engine.try_borrow_mut() {
            Ok(mut e) => {
                e.resize(viewport);
            }
            Err(_) => log::warn!("[menu] resize during frame ignored"),
        }
    }

    /// Stop the frame loop, detach listeners and release GPU resources.
    pub fn destroy(&mut self) {
        if let Some(host) = self.inner.take() {
            if let Some(l) = &host.frame_loop {
                l.stop();
            }
            drop(host);
            log::info!("[menu] destroyed");
        }
    }

    #[wasm_bindgen(getter, js_name = activeIndex)]
    pub fn active_index(&self) -> Option<u32> {
        let host = self.inner.as_ref()?;
        let e = host.engine.try_borrow().ok()?;
        e.active_index().map(|i| i as u32)
    }

    #[wasm_bindgen(getter, js_name = isMoving)]
    pub fn is_moving(&self) -> bool {
        self.inner
            .as_ref()
            .and_then(|h| h.engine.try_borrow().ok().map(|e| e.is_moving()))
            .unwrap_or(false)
    }
}

impl Drop for InfiniteMenu {
    fn drop(&mut self) {
        self.destroy();
    }
}
