//! HID vocabulary: usage IDs, modifier/button masks, report layouts.

pub mod keycode;
pub mod report;

pub use keycode::{usage_id, KeyboardUsage, Modifiers, MouseButtons};
pub use report::{
    encode, is_released, keyboard_press, mouse_report, report_descriptor, EncodeError,
    KeyboardReport, MouseReport, KEYBOARD_RELEASED, KEYBOARD_REPORT_LEN, MOUSE_RELEASED,
    MOUSE_REPORT_LEN, REPORT_ID_KEYBOARD, REPORT_ID_MOUSE,
};
