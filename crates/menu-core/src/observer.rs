//! Notification seams between the engine and its host.

use crate::item::MenuItem;
use smallvec::SmallVec;

/// Receives active-item notifications.
pub trait ActiveItemObserver {
    fn active_item_changed(&mut self, index: usize, item: &MenuItem);
}

/// Receives moving-state notifications.
pub trait MovingObserver {
    fn moving_changed(&mut self, moving: bool);
}

impl<F> ActiveItemObserver for F
where
    F: FnMut(usize, &MenuItem),
{
    fn active_item_changed(&mut self, index: usize, item: &MenuItem) {
        self(index, item)
    }
}

impl<F> MovingObserver for F
where
    F: FnMut(bool),
{
    fn moving_changed(&mut self, moving: bool) {
        self(moving)
    }
}

/// Registered observers; a host usually attaches one or two of each.
#[derive(Default)]
pub struct Observers {
    active: SmallVec<[Box<dyn ActiveItemObserver>; 2]>,
    moving: SmallVec<[Box<dyn MovingObserver>; 2]>,
}

impl Observers {
    pub fn add_active(&mut self, observer: Box<dyn ActiveItemObserver>) {
        self.active.push(observer);
    }

    pub fn add_moving(&mut self, observer: Box<dyn MovingObserver>) {
        self.moving.push(observer);
    }

    pub fn notify_active(&mut self, index: usize, item: &MenuItem) {
        for o in self.active.iter_mut() {
            o.active_item_changed(index, item);
        }
    }

    pub fn notify_moving(&mut self, moving: bool) {
        for o in self.moving.iter_mut() {
            o.moving_changed(moving);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.moving.is_empty()
    }
}
