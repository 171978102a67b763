//! Shared mouse state.
//!
//! Written by producers (button and direction handlers), read by the
//! emission engine each tick. Velocity is continuous: a non-zero `(dx, dy)`
//! is re-reported every tick until a producer sets it back to zero.

use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU8, Ordering};

use crate::hid::MouseButtons;

/// Point-in-time copy of the mouse state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseSnapshot {
    pub buttons: MouseButtons,
    pub dx: i8,
    pub dy: i8,
}

impl MouseSnapshot {
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.dx != 0 || self.dy != 0
    }
}

/// Thread-safe mouse velocity and button state.
pub struct MouseState {
    dx: AtomicI8,
    dy: AtomicI8,
    buttons: AtomicU8,
    /// Set by every producer write, cleared by the consumer once reported.
    dirty: AtomicBool,
}

impl MouseState {
    /// Create a resting mouse (no motion, no buttons, clean).
    pub const fn new() -> Self {
        Self {
            dx: AtomicI8::new(0),
            dy: AtomicI8::new(0),
            buttons: AtomicU8::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    /// Set the per-tick velocity (producer side).
    #[inline]
    pub fn set_velocity(&self, dx: i8, dy: i8) {
        self.dx.store(dx, Ordering::Relaxed);
        self.dy.store(dy, Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);
    }

    /// Set the held buttons (producer side).
    #[inline]
    pub fn set_buttons(&self, buttons: MouseButtons) {
        self.buttons.store(buttons.bits(), Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);
    }

    /// Stop motion and release all buttons.
    #[inline]
    pub fn stop(&self) {
        self.dx.store(0, Ordering::Relaxed);
        self.dy.store(0, Ordering::Relaxed);
        self.buttons.store(0, Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);
    }

    /// Read the current state without touching `dirty`.
    #[inline]
    pub fn snapshot(&self) -> MouseSnapshot {
        MouseSnapshot {
            buttons: MouseButtons::from_bits_retain(self.buttons.load(Ordering::Relaxed)),
            dx: self.dx.load(Ordering::Relaxed),
            dy: self.dy.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Consumer side: the state to report this tick, if any.
    ///
    /// Returns a snapshot when `dirty` was set or the mouse is moving, and
    /// clears `dirty`. Velocity is left untouched.
    #[inline]
    pub fn take_report(&self) -> Option<MouseSnapshot> {
        let was_dirty = self.dirty.swap(false, Ordering::AcqRel);
        let snapshot = self.snapshot();

        if was_dirty || snapshot.is_moving() {
            Some(snapshot)
        } else {
            None
        }
    }

    /// Consumer side: re-arm `dirty` after a report could not be sent.
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}
