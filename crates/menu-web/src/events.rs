use crate::dom;
use menu_core::{GpuRenderer, MenuEngine, Release};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type SharedEngine = Rc<RefCell<MenuEngine<GpuRenderer>>>;

struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

/// DOM listeners owned by one menu; dropping removes them all.
#[derive(Default)]
pub struct Listeners {
    list: Vec<Listener>,
}

impl Listeners {
    pub fn add(&mut self, target: &web::EventTarget, kind: &'static str, handler: impl FnMut(web::Event) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
            log::warn!("[events] could not listen for {kind}: {:?}", e);
            return;
        }
        self.list.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn clear(&mut self) {
        for l in self.list.drain(..) {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        self.clear();
    }
}

#[inline]
fn pointer_css(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        (ev.client_x() as f64 - rect.left()) as f32,
        (ev.client_y() as f64 - rect.top()) as f32,
    )
}

fn with_engine(engine: &SharedEngine, f: impl FnOnce(&mut MenuEngine<GpuRenderer>)) {
    match engine.try_borrow_mut() {
        Ok(mut e) => f(&mut e),
        Err(_) => log::warn!("[events] engine busy; input dropped"),
    }
}

/// Pointer input on the canvas, plus window resize and blur.
pub fn wire_input_handlers(canvas: &web::HtmlCanvasElement, engine: &SharedEngine) -> Listeners {
    let mut listeners = Listeners::default();
    let canvas_target: &web::EventTarget = canvas.as_ref();

    {
        let engine = engine.clone();
        let canvas_m = canvas.clone();
        listeners.add(canvas_target, "pointerdown", move |ev: web::Event| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else { return };
            if ev.button() != 0 {
                return;
            }
            let (x, y) = pointer_css(ev, &canvas_m);
            let _ = canvas_m.set_pointer_capture(ev.pointer_id());
            with_engine(&engine, |e| e.pointer_down(x, y));
            ev.prevent_default();
        });
    }
    {
        let engine = engine.clone();
        let canvas_m = canvas.clone();
        listeners.add(canvas_target, "pointermove", move |ev: web::Event| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else { return };
            let (x, y) = pointer_css(ev, &canvas_m);
            with_engine(&engine, |e| {
                e.pointer_move(x, y);
            });
        });
    }
    {
        let engine = engine.clone();
        let canvas_m = canvas.clone();
        listeners.add(canvas_target, "pointerup", move |ev: web::Event| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else { return };
            let (x, y) = pointer_css(ev, &canvas_m);
            let _ = canvas_m.release_pointer_capture(ev.pointer_id());
            with_engine(&engine, |e| {
                if e.pointer_up(x, y) == Release::Tap {
                    log::debug!("[events] tap at ({x:.0}, {y:.0})");
                }
            });
        });
    }
    {
        let engine = engine.clone();
        listeners.add(canvas_target, "pointercancel", move |_ev: web::Event| {
            with_engine(&engine, |e| e.pointer_cancel());
        });
    }

    if let Some(window) = web::window() {
        let window_target: &web::EventTarget = window.as_ref();
        {
            let engine = engine.clone();
            let canvas_r = canvas.clone();
            listeners.add(window_target, "resize", move |_ev: web::Event| {
                let viewport = dom::sync_canvas_backing_size(&canvas_r);
                with_engine(&engine, |e| {
                    e.resize(viewport);
                });
            });
        }
        {
            let engine = engine.clone();
            listeners.add(window_target, "blur", move |_ev: web::Event| {
                with_engine(&engine, |e| e.pointer_cancel());
            });
        }
    }
    log::info!("[events] {} listeners attached", listeners.len());
    listeners
}
