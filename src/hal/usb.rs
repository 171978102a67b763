//! HID transport boundary.
//!
//! The engine and the click primitive only see this trait. The device build
//! binds it to TinyUSB (`hal::tinyusb`); tests bind it to a recording mock.

use crate::hid::{KeyboardReport, MouseReport};

/// Readiness check and report submission for one composite HID interface.
pub trait HidTransport {
    /// True when the interface can accept another report right now.
    fn is_ready(&mut self) -> bool;

    /// Submit a keyboard report. Returns `false` if the stack refused it.
    fn send_keyboard(&mut self, report: &KeyboardReport) -> bool;

    /// Submit a mouse report. Returns `false` if the stack refused it.
    fn send_mouse(&mut self, report: &MouseReport) -> bool;

    /// Let the USB stack make progress while a caller spins on
    /// [`is_ready`](Self::is_ready). Stacks driven by their own task can
    /// leave this empty.
    fn service(&mut self) {}
}

impl<T: HidTransport + ?Sized> HidTransport for &mut T {
    fn is_ready(&mut self) -> bool {
        (**self).is_ready()
    }

    fn send_keyboard(&mut self, report: &KeyboardReport) -> bool {
        (**self).send_keyboard(report)
    }

    fn send_mouse(&mut self, report: &MouseReport) -> bool {
        (**self).send_mouse(report)
    }

    fn service(&mut self) {
        (**self).service()
    }
}
