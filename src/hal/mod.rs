//! Hardware Abstraction Layer for the panel firmware.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Business logic stays in core modules, HAL is just I/O.

pub mod usb;

#[cfg(target_os = "espidf")]
pub mod tinyusb;

pub use usb::HidTransport;

#[cfg(target_os = "espidf")]
pub use tinyusb::TinyUsbTransport;
