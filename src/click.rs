//! Immediate, blocking HID primitives.
//!
//! These bypass the macro queue and the engine: the caller blocks until
//! both reports are out. Call them from the same task that polls the
//! engine (never from interrupt context) so the two never interleave.

use embedded_hal::delay::DelayNs;

use crate::event::KeyEvent;
use crate::hal::HidTransport;
use crate::hid::{mouse_report, MouseButtons, KEYBOARD_RELEASED, MOUSE_RELEASED};

/// Spin until the transport can take a report, letting the stack run.
fn wait_ready<T: HidTransport + ?Sized>(transport: &mut T) {
    while !transport.is_ready() {
        transport.service();
    }
}

/// Press `buttons`, hold for `hold_ms`, release all buttons.
///
/// Returns `true` if both reports were accepted.
pub fn click_now<T, D>(transport: &mut T, delay: &mut D, buttons: MouseButtons, hold_ms: u32) -> bool
where
    T: HidTransport + ?Sized,
    D: DelayNs + ?Sized,
{
    wait_ready(transport);
    let pressed = transport.send_mouse(&mouse_report(buttons, 0, 0));

    delay.delay_ms(hold_ms);

    wait_ready(transport);
    let released = transport.send_mouse(&MOUSE_RELEASED);

    pressed && released
}

/// Press `key` (with its modifiers), hold for `hold_ms`, release.
///
/// `key.delay_ms` plays no part; pure delays send an empty press.
pub fn tap_key_now<T, D>(transport: &mut T, delay: &mut D, key: KeyEvent, hold_ms: u32) -> bool
where
    T: HidTransport + ?Sized,
    D: DelayNs + ?Sized,
{
    wait_ready(transport);
    let pressed = transport.send_keyboard(&key.press_report());

    delay.delay_ms(hold_ms);

    wait_ready(transport);
    let released = transport.send_keyboard(&KEYBOARD_RELEASED);

    pressed && released
}
