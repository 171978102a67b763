//! Shared test doubles

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use touch_hid_panel::hid::{usage_id, KeyboardReport, KeyboardUsage, Modifiers, MouseButtons, MouseReport};
use touch_hid_panel::HidTransport;

/// Keyboard report as seen by the host: modifier byte and key slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keys {
    pub modifier: u8,
    pub keycodes: [u8; 6],
}

/// Mouse report as seen by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pointer {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
    pub pan: i8,
}

/// All keys up.
pub const RELEASE: Keys = Keys {
    modifier: 0,
    keycodes: [0; 6],
};

/// No buttons, no motion.
pub const POINTER_IDLE: Pointer = pointer_const(0, 0, 0);

const fn pointer_const(buttons: u8, x: i8, y: i8) -> Pointer {
    Pointer {
        buttons,
        x,
        y,
        wheel: 0,
        pan: 0,
    }
}

/// One key pressed with `modifier` held.
pub fn press(modifier: Modifiers, usage: KeyboardUsage) -> Keys {
    Keys {
        modifier: modifier.bits(),
        keycodes: [usage_id(usage), 0, 0, 0, 0, 0],
    }
}

/// Usage IDs, for comparing with [`MockTransport::pressed_keys`].
pub fn ids(usages: impl IntoIterator<Item = KeyboardUsage>) -> Vec<u8> {
    usages.into_iter().map(usage_id).collect()
}

/// Buttons held and relative motion.
pub fn pointer(buttons: MouseButtons, x: i8, y: i8) -> Pointer {
    pointer_const(buttons.bits(), x, y)
}

impl From<&KeyboardReport> for Keys {
    fn from(report: &KeyboardReport) -> Self {
        Self {
            modifier: report.modifier,
            keycodes: report.keycodes,
        }
    }
}

impl From<&MouseReport> for Pointer {
    fn from(report: &MouseReport) -> Self {
        Self {
            buttons: report.buttons,
            x: report.x,
            y: report.y,
            wheel: report.wheel,
            pan: report.pan,
        }
    }
}

/// One report seen by the mock, in send order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sent {
    Keyboard(Keys),
    Mouse(Pointer),
}

/// Recording transport with a scripted `is_ready`.
#[derive(Default)]
pub struct MockTransport {
    /// `is_ready` answers, front first; once empty, `ready_default` applies.
    pub ready_script: VecDeque<bool>,
    pub ready_default: bool,
    /// Refuse every send while set.
    pub refuse: bool,
    pub sent: Vec<Sent>,
    pub ready_calls: u32,
    pub serviced: u32,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            ready_default: true,
            ..Default::default()
        }
    }

    pub fn scripted(script: &[bool]) -> Self {
        Self {
            ready_script: script.iter().copied().collect(),
            ready_default: true,
            ..Default::default()
        }
    }

    pub fn keyboard(&self) -> Vec<Keys> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Keyboard(r) => Some(*r),
                Sent::Mouse(_) => None,
            })
            .collect()
    }

    pub fn mouse(&self) -> Vec<Pointer> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Mouse(r) => Some(*r),
                Sent::Keyboard(_) => None,
            })
            .collect()
    }

    /// Keycodes of the press reports only.
    pub fn pressed_keys(&self) -> Vec<u8> {
        self.keyboard()
            .iter()
            .filter(|r| **r != RELEASE)
            .map(|r| r.keycodes[0])
            .collect()
    }
}

impl HidTransport for MockTransport {
    fn is_ready(&mut self) -> bool {
        self.ready_calls += 1;
        self.ready_script.pop_front().unwrap_or(self.ready_default)
    }

    fn send_keyboard(&mut self, report: &KeyboardReport) -> bool {
        if self.refuse {
            return false;
        }
        self.sent.push(Sent::Keyboard(report.into()));
        true
    }

    fn send_mouse(&mut self, report: &MouseReport) -> bool {
        if self.refuse {
            return false;
        }
        self.sent.push(Sent::Mouse(report.into()));
        true
    }

    fn service(&mut self) {
        self.serviced += 1;
    }
}

/// Delay that only adds up the requested time.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// `fmt::Write` into a `String`.
#[derive(Default)]
pub struct TestOutput(pub String);

impl core::fmt::Write for TestOutput {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.push_str(s);
        Ok(())
    }
}

impl TestOutput {
    pub fn contains(&self, s: &str) -> bool {
        self.0.contains(s)
    }
}
