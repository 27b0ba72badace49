//! Engine notifications are queued during a frame and delivered to JS
//! once the engine is no longer borrowed, so callbacks may call back into
//! the menu (resize, destroy) safely.

use crate::overlay::Overlay;
use menu_core::MenuItem;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub enum Notice {
    Active(usize, MenuItem),
    Moving(bool),
}

pub type NoticeQueue = Rc<RefCell<VecDeque<Notice>>>;

pub struct JsObservers {
    pub on_active: Option<js_sys::Function>,
    pub on_moving: Option<js_sys::Function>,
    pub overlay: Option<Overlay>,
}

impl JsObservers {
    pub fn dispatch(&self, queue: &NoticeQueue) {
        loop {
            // Pop before calling out; the callback may push or drain.
            let next = queue.borrow_mut().pop_front();
            let Some(notice) = next else { break };
            match notice {
                Notice::Active(index, item) => {
                    if let Some(overlay) = &self.overlay {
                        overlay.show_item(&item);
                    }
                    if let Some(f) = &self.on_active {
                        let js_item = item_to_js(&item);
                        if let Err(e) = f.call2(&JsValue::NULL, &JsValue::from(index as u32), &js_item) {
                            log::error!("[observers] onActiveChange threw: {:?}", e);
                        }
                    }
                }
                Notice::Moving(moving) => {
                    if let Some(overlay) = &self.overlay {
                        overlay.set_moving(moving);
                    }
                    if let Some(f) = &self.on_moving {
                        if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_bool(moving)) {
                            log::error!("[observers] onMovingChange threw: {:?}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Plain JS object with the item's fields; `date` stays an RFC 3339 string.
pub fn item_to_js(item: &MenuItem) -> JsValue {
    match serde_json::to_string(item) {
        Ok(s) => js_sys::JSON::parse(&s).unwrap_or(JsValue::NULL),
        Err(e) => {
            log::warn!("[observers] item not serializable: {e}");
            JsValue::NULL
        }
    }
}
