use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// requestAnimationFrame loop that can be cancelled.
///
/// The callback reschedules itself through a shared slot. Stopping cancels
/// the pending request and releases the closure; if that happens from inside
/// the callback, the release is deferred to a microtask.
pub struct FrameLoop {
    tick: Tick,
    handle: Rc<Cell<Option<i32>>>,
    stopped: Rc<Cell<bool>>,
    in_frame: Rc<Cell<bool>>,
}

impl FrameLoop {
    pub fn start(mut on_frame: impl FnMut() + 'static) -> Self {
        let tick: Tick = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));
        let stopped = Rc::new(Cell::new(false));
        let in_frame = Rc::new(Cell::new(false));

        let tick_clone = tick.clone();
        let handle_tick = handle.clone();
        let stopped_tick = stopped.clone();
        let in_frame_tick = in_frame.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            handle_tick.set(None);
            if stopped_tick.get() {
                return;
            }
            in_frame_tick.set(true);
            on_frame();
            in_frame_tick.set(false);
            if stopped_tick.get() {
                let slot = tick_clone.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    slot.borrow_mut().take();
                });
                return;
            }
            handle_tick.set(request_frame(&tick_clone));
        }) as Box<dyn FnMut(f64)>));

        handle.set(request_frame(&tick));
        log::info!("[frame] loop started");
        Self {
            tick,
            handle,
            stopped,
            in_frame,
        }
    }

    pub fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        if let (Some(id), Some(w)) = (self.handle.take(), web::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        if !self.in_frame.get() {
            self.tick.borrow_mut().take();
        }
        log::info!("[frame] loop stopped");
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(tick: &Tick) -> Option<i32> {
    let w = web::window()?;
    let slot = tick.borrow();
    let closure = slot.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}
