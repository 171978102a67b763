//! Keyboard usage IDs and modifier/button masks.
//!
//! Usage IDs come from `usbd_hid`'s [`KeyboardUsage`] (Keyboard/Keypad
//! page 0x07). The two bitmask bytes that lead the reports are typed here.

use bitflags::bitflags;

pub use usbd_hid::descriptor::KeyboardUsage;

bitflags! {
    /// Keyboard modifier byte (byte 0 of the boot keyboard report).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 0x01;
        const LEFT_SHIFT = 0x02;
        const LEFT_ALT = 0x04;
        const LEFT_GUI = 0x08;
        const RIGHT_CTRL = 0x10;
        const RIGHT_SHIFT = 0x20;
        const RIGHT_ALT = 0x40;
        const RIGHT_GUI = 0x80;
    }
}

bitflags! {
    /// Mouse button byte (byte 0 of the mouse report).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
        const BACKWARD = 0x08;
        const FORWARD = 0x10;
    }
}

/// Raw usage ID of `usage`, as stored in [`KeyEvent`](crate::KeyEvent).
#[inline]
pub const fn usage_id(usage: KeyboardUsage) -> u8 {
    usage as u8
}
