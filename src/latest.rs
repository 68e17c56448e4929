//! Single-slot published values shared between interrupt and foreground.

use core::cell::RefCell;
use critical_section::Mutex;

/// Overwrite-on-publish cell.
///
/// The producing event handler swaps in a whole record under a critical
/// section, so a foreground reader observes either the fully-old or the
/// fully-new value, never a torn one. Unread values are discarded on the
/// next publish; no history is kept.
pub struct Latest<T> {
    slot: Mutex<RefCell<Option<T>>>,
}

impl<T> Latest<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Replace the published value, discarding any unread one.
    pub fn publish(&self, value: T) {
        critical_section::with(|cs| {
            *self.slot.borrow_ref_mut(cs) = Some(value);
        });
    }

    /// Remove and return the published value.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
    }
}

impl<T: Clone> Latest<T> {
    /// Clone of the published value, leaving it in place.
    pub fn get(&self) -> Option<T> {
        critical_section::with(|cs| self.slot.borrow_ref(cs).as_ref().cloned())
    }
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}
