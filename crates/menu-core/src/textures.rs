//! Per-item texture slots filled asynchronously by a host loader.
//!
//! The table is shared as `Rc<RefCell<TextureTable>>`. Loaders only ever see
//! a [`TextureSink`], which holds a weak reference: once the engine is gone
//! a late completion finds nothing to upgrade and is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image load failed: {0}")]
    Load(String),
    #[error("image has no pixels")]
    Empty,
}

/// Tightly packed RGBA8 pixels, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Ready,
    Failed,
}

/// Decode an encoded image (PNG or JPEG) into RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, TextureError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    Ok(DecodedImage {
        width,
        height,
        rgba: img.into_raw(),
    })
}

#[derive(Debug, Default)]
pub struct TextureTable {
    slots: Vec<SlotState>,
    completed: Vec<(usize, DecodedImage)>,
}

impl TextureTable {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![SlotState::Pending; slot_count],
            completed: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).copied()
    }

    pub fn ready_count(&self) -> usize {
        self.slots.iter().filter(|s| **s == SlotState::Ready).count()
    }

    /// Decoded images waiting for GPU upload, in completion order.
    pub fn take_completed(&mut self) -> Vec<(usize, DecodedImage)> {
        std::mem::take(&mut self.completed)
    }

    pub fn mark_failed(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = SlotState::Failed;
        }
    }

    fn store(&mut self, slot: usize, result: Result<DecodedImage, TextureError>) -> bool {
        let Some(state) = self.slots.get_mut(slot) else {
            log::warn!("[textures] completion for unknown slot {slot}");
            return false;
        };
        if *state != SlotState::Pending {
            log::debug!("[textures] slot {slot} already settled, ignoring");
            return false;
        }
        match result {
            Ok(image) => {
                log::info!("[textures] slot {slot} ready ({}x{})", image.width, image.height);
                *state = SlotState::Ready;
                self.completed.push((slot, image));
            }
            Err(e) => {
                log::warn!("[textures] slot {slot} failed: {e}");
                *state = SlotState::Failed;
            }
        }
        true
    }
}

/// Write handle for exactly one slot.
#[derive(Debug)]
pub struct TextureSink {
    table: Weak<RefCell<TextureTable>>,
    slot: usize,
}

impl TextureSink {
    pub fn new(table: &Rc<RefCell<TextureTable>>, slot: usize) -> Self {
        Self {
            table: Rc::downgrade(table),
            slot,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// True while the owning table is still alive.
    pub fn is_live(&self) -> bool {
        self.table.strong_count() > 0
    }

    /// Deliver the load result. Returns false if the table was torn down
    /// (or is busy) and the result was discarded.
    pub fn complete(self, result: Result<DecodedImage, TextureError>) -> bool {
        let Some(table) = self.table.upgrade() else {
            log::debug!("[textures] slot {} finished after teardown", self.slot);
            return false;
        };
        let Ok(mut table) = table.try_borrow_mut() else {
            log::warn!("[textures] slot {} completed re-entrantly, dropped", self.slot);
            return false;
        };
        table.store(self.slot, result)
    }
}

/// Host-side image fetching. `source` is the item's opaque image reference.
pub trait ImageLoader {
    fn request(&mut self, slot: usize, source: &str, sink: TextureSink);
}

// =============================================================================
// Tests
// =============================================================================
