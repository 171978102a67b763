//! Module: event
//!
//! Purpose: KeyEvent, the atomic unit moved through the macro queue.
//!
//! Architecture:
//! - Compact `Copy` value, immutable once enqueued
//! - One event = one press/release pair, or one pure delay
//! - `delay_ms` on a real key is waited *after* its release
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

use crate::hid::{keyboard_press, usage_id, KeyboardReport, KeyboardUsage, Modifiers};

/// A single queued keyboard action.
///
/// Memory layout:
/// ```text
/// [modifier:1][keycode:1][pad:2][delay_ms:4] = 8 bytes
/// ```
///
/// A *pure delay* has no modifier, no keycode and a positive delay. Every
/// other combination is a real key action, including the all-zero event
/// (an empty press followed by a release).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Modifier keys held together with `keycode`
    pub modifier: Modifiers,

    /// HID usage ID (0 = no key)
    pub keycode: u8,

    /// Wait after release, or the delay length for a pure delay
    pub delay_ms: u32,
}

impl KeyEvent {
    /// All-zero event, used to initialize queue slots.
    pub const EMPTY: Self = Self::new(Modifiers::empty(), 0, 0);

    /// Create an event from its raw parts.
    pub const fn new(modifier: Modifiers, keycode: u8, delay_ms: u32) -> Self {
        Self {
            modifier,
            keycode,
            delay_ms,
        }
    }

    /// Plain key tap.
    pub const fn key(usage: KeyboardUsage) -> Self {
        Self::new(Modifiers::empty(), usage_id(usage), 0)
    }

    /// Key tap with modifiers held (e.g. Ctrl+S).
    pub const fn chord(modifier: Modifiers, usage: KeyboardUsage) -> Self {
        Self::new(modifier, usage_id(usage), 0)
    }

    /// Pure delay marker. A zero delay yields an empty key action instead.
    pub const fn delay(ms: u32) -> Self {
        Self::new(Modifiers::empty(), 0, ms)
    }

    /// Same action, followed by a wait after release.
    pub const fn then_wait(self, ms: u32) -> Self {
        Self::new(self.modifier, self.keycode, ms)
    }

    /// True for a pure delay marker.
    #[inline]
    pub const fn is_delay(&self) -> bool {
        self.modifier.bits() == 0 && self.keycode == 0 && self.delay_ms > 0
    }

    /// Keyboard report that presses this event's key.
    #[inline]
    pub const fn press_report(&self) -> KeyboardReport {
        keyboard_press(self.modifier, self.keycode)
    }
}

impl Default for KeyEvent {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::KeyboardUsage::{KeyboardAa, KeyboardSs};

    #[test]
    fn test_pure_delay_detection() {
        assert!(KeyEvent::delay(500).is_delay());
        assert!(!KeyEvent::delay(0).is_delay());
        assert!(!KeyEvent::key(KeyboardAa).is_delay());
        assert!(!KeyEvent::key(KeyboardAa).then_wait(100).is_delay());
        assert!(!KeyEvent::new(Modifiers::LEFT_SHIFT, 0, 100).is_delay());
    }

    #[test]
    fn test_then_wait_keeps_action() {
        let ev = KeyEvent::chord(Modifiers::LEFT_CTRL, KeyboardSs).then_wait(250);
        assert_eq!(ev.modifier, Modifiers::LEFT_CTRL);
        assert_eq!(ev.keycode, usage_id(KeyboardSs));
        assert_eq!(ev.delay_ms, 250);
    }

    #[test]
    fn test_press_report() {
        let report = KeyEvent::chord(Modifiers::LEFT_CTRL, KeyboardSs).press_report();
        assert_eq!(report.modifier, Modifiers::LEFT_CTRL.bits());
        assert_eq!(report.keycodes, [0x16, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_event_size() {
        assert_eq!(core::mem::size_of::<KeyEvent>(), 8);
    }
}
