//! HID input reports and the composite report descriptor.
//!
//! Both wire shapes are `usbd_hid`'s own report types:
//!
//! ```text
//! Keyboard, ID 1 (8 input bytes):
//!   [modifier:1][reserved:1][keycode:6]
//!
//! Mouse, ID 2 (5 input bytes):
//!   [buttons:1][x:1][y:1][wheel:1][pan:1]
//! ```
//!
//! One interface carries both collections, so the descriptor is generated
//! from [`PanelReport`] with a report ID on each collection. The transport
//! sends the ID beside the serialized report.

use usbd_hid::descriptor::generator_prelude::*;

pub use usbd_hid::descriptor::{AsInputReport, KeyboardReport, MouseReport, SerializedDescriptor};

use super::keycode::{Modifiers, MouseButtons};

/// Report ID of the keyboard collection.
pub const REPORT_ID_KEYBOARD: u8 = 1;

/// Report ID of the mouse collection.
pub const REPORT_ID_MOUSE: u8 = 2;

/// Keyboard input report length on the wire (without report ID).
pub const KEYBOARD_REPORT_LEN: usize = 8;

/// Mouse input report length on the wire (without report ID).
pub const MOUSE_REPORT_LEN: usize = 5;

/// Composite keyboard + mouse layout, used for its descriptor only.
///
/// Reports are sent as [`KeyboardReport`] and [`MouseReport`]; the field
/// groups below describe exactly those two shapes.
#[gen_hid_descriptor(
    (collection = APPLICATION, usage_page = GENERIC_DESKTOP, usage = KEYBOARD, report_id = 0x01,) = {
        (usage_page = KEYBOARD, usage_min = 0xE0, usage_max = 0xE7) = {
            #[packed_bits 8] #[item_settings data,variable,absolute] modifier=input;
        };
        (usage_min = 0x00, usage_max = 0xFF) = {
            #[item_settings constant,variable,absolute] reserved=input;
        };
        (usage_page = LEDS, usage_min = 0x01, usage_max = 0x05) = {
            #[packed_bits 5] #[item_settings data,variable,absolute] leds=output;
        };
        (usage_page = KEYBOARD, usage_min = 0x00, usage_max = 0xDD) = {
            #[item_settings data,array,absolute] keycodes=input;
        };
    },
    (collection = APPLICATION, usage_page = GENERIC_DESKTOP, usage = MOUSE, report_id = 0x02,) = {
        (collection = PHYSICAL, usage = POINTER) = {
            (usage_page = BUTTON, usage_min = BUTTON_1, usage_max = BUTTON_8) = {
                #[packed_bits 8] #[item_settings data,variable,absolute] buttons=input;
            };
            (usage_page = GENERIC_DESKTOP,) = {
                (usage = X,) = {
                    #[item_settings data,variable,relative] x=input;
                };
                (usage = Y,) = {
                    #[item_settings data,variable,relative] y=input;
                };
                (usage = WHEEL,) = {
                    #[item_settings data,variable,relative] wheel=input;
                };
            };
            (usage_page = CONSUMER,) = {
                (usage = AC_PAN,) = {
                    #[item_settings data,variable,relative] pan=input;
                };
            };
        };
    }
)]
#[allow(dead_code)]
pub struct PanelReport {
    modifier: u8,
    reserved: u8,
    leds: u8,
    keycodes: [u8; 6],
    buttons: u8,
    x: i8,
    y: i8,
    wheel: i8,
    pan: i8,
}

/// Report descriptor served to the host.
#[inline]
pub fn report_descriptor() -> &'static [u8] {
    PanelReport::desc()
}

/// All keys released.
pub const KEYBOARD_RELEASED: KeyboardReport = keyboard_press(Modifiers::empty(), 0);

/// No buttons, no motion.
pub const MOUSE_RELEASED: MouseReport = mouse_report(MouseButtons::empty(), 0, 0);

/// Single key press, usage ID in the first slot.
pub const fn keyboard_press(modifier: Modifiers, keycode: u8) -> KeyboardReport {
    KeyboardReport {
        modifier: modifier.bits(),
        reserved: 0,
        leds: 0,
        keycodes: [keycode, 0, 0, 0, 0, 0],
    }
}

/// True if no modifier and no key is held.
pub fn is_released(report: &KeyboardReport) -> bool {
    report.modifier == 0 && report.keycodes.iter().all(|&k| k == 0)
}

/// Buttons and motion; wheel and pan stay zero.
pub const fn mouse_report(buttons: MouseButtons, x: i8, y: i8) -> MouseReport {
    MouseReport {
        buttons: buttons.bits(),
        x,
        y,
        wheel: 0,
        pan: 0,
    }
}

/// Input report serialization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("report does not fit a {capacity}-byte buffer")]
pub struct EncodeError {
    pub capacity: usize,
}

/// Serialize the input fields of `report` into `buf`.
///
/// Output fields (keyboard LEDs) are skipped. Returns the byte count.
pub fn encode<R: AsInputReport>(report: &R, buf: &mut [u8]) -> Result<usize, EncodeError> {
    ssmarshal::serialize(buf, report).map_err(|_| EncodeError {
        capacity: buf.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::keycode::{usage_id, KeyboardUsage};

    #[test]
    fn test_keyboard_report_layout() {
        let report = keyboard_press(Modifiers::LEFT_CTRL, usage_id(KeyboardUsage::KeyboardSs));
        let mut buf = [0xAAu8; 16];
        assert_eq!(encode(&report, &mut buf), Ok(KEYBOARD_REPORT_LEN));
        assert_eq!(buf[..KEYBOARD_REPORT_LEN], [0x01, 0x00, 0x16, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_released_report_is_all_zero() {
        let mut buf = [0xAAu8; KEYBOARD_REPORT_LEN];
        assert_eq!(encode(&KEYBOARD_RELEASED, &mut buf), Ok(KEYBOARD_REPORT_LEN));
        assert_eq!(buf, [0u8; KEYBOARD_REPORT_LEN]);
        assert!(is_released(&KEYBOARD_RELEASED));
        assert!(!is_released(&keyboard_press(Modifiers::empty(), 0x04)));
        assert!(!is_released(&keyboard_press(Modifiers::LEFT_SHIFT, 0)));
    }

    #[test]
    fn test_mouse_report_layout() {
        let mut buf = [0u8; MOUSE_REPORT_LEN];
        let report = mouse_report(MouseButtons::RIGHT, -5, 3);
        assert_eq!(encode(&report, &mut buf), Ok(MOUSE_REPORT_LEN));
        assert_eq!(buf, [0x02, 0xFB, 0x03, 0x00, 0x00]);

        assert_eq!(encode(&MOUSE_RELEASED, &mut buf), Ok(MOUSE_REPORT_LEN));
        assert_eq!(buf, [0u8; MOUSE_REPORT_LEN]);
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let mut buf = [0u8; 4];
        let report = keyboard_press(Modifiers::empty(), 0x04);
        assert_eq!(encode(&report, &mut buf), Err(EncodeError { capacity: 4 }));
    }

    #[test]
    fn test_descriptor_carries_both_report_ids() {
        let desc = report_descriptor();
        // Report ID global item (0x85) for each collection, keyboard first
        let ids: Vec<u8> = desc
            .windows(2)
            .filter(|w| w[0] == 0x85)
            .map(|w| w[1])
            .collect();
        assert_eq!(ids, [REPORT_ID_KEYBOARD, REPORT_ID_MOUSE]);

        // Two application collections
        let apps = desc.windows(2).filter(|w| *w == [0xA1, 0x01]).count();
        assert_eq!(apps, 2);
    }
}
