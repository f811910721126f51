//! Interrupt-safe single callback slot

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use hal::timer::TimerCallback;

/// One optional `fn()` shared between thread and interrupt context
///
/// Stored as a type-erased pointer so a single atomic store or load moves the
/// whole reference; no lock is taken, so the interrupt side never waits.
#[derive(Debug)]
pub struct CallbackSlot {
    ptr: AtomicPtr<()>,
}

impl CallbackSlot {
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Replace the registered callback.
    pub fn set(&self, callback: TimerCallback) {
        self.ptr.store(callback as *mut (), Ordering::Release);
    }

    pub fn clear(&self) {
        self.ptr.store(ptr::null_mut(), Ordering::Release);
    }

    pub fn get(&self) -> Option<TimerCallback> {
        let raw = self.ptr.load(Ordering::Acquire);
        if raw.is_null() {
            None
        } else {
            // SAFETY: only `TimerCallback` pointers or null are ever stored.
            Some(unsafe { core::mem::transmute::<*mut (), TimerCallback>(raw) })
        }
    }

    /// Call the registered callback, if any. Returns whether one ran.
    pub fn invoke(&self) -> bool {
        match self.get() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}
