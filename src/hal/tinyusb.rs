//! TinyUSB binding of [`HidTransport`] (ESP-IDF `esp_tinyusb` component).
//!
//! One HID interface carries both collections; reports are told apart by
//! report ID. The TinyUSB device task runs on its own FreeRTOS task, so
//! [`service`](HidTransport::service) only yields a tick.

use alloc::boxed::Box;
use core::ffi::c_void;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::sys::{esp, tinyusb, EspError};

use super::usb::HidTransport;
use crate::hid::{
    encode, report_descriptor, KeyboardReport, MouseReport, KEYBOARD_REPORT_LEN, MOUSE_REPORT_LEN,
    REPORT_ID_KEYBOARD, REPORT_ID_MOUSE,
};

const CONFIG_TOTAL_LEN: u16 = 9 + 9 + 9 + 7;
const HID_EP_IN: u8 = 0x81;
const HID_EP_SIZE: u8 = 16;

/// Configuration descriptor: one HID interface, one interrupt IN endpoint.
///
/// The HID class descriptor embeds the generated report descriptor's
/// length, so this is assembled once at install and kept for the session.
fn config_descriptor() -> &'static [u8] {
    let report_len = report_descriptor().len() as u16;

    #[rustfmt::skip]
    let descriptor: [u8; CONFIG_TOTAL_LEN as usize] = [
        // Configuration: 1 interface, bus powered, remote wakeup, 100 mA
        9, 0x02, CONFIG_TOTAL_LEN as u8, (CONFIG_TOTAL_LEN >> 8) as u8, 1, 1, 0, 0xA0, 50,
        // Interface 0: HID, no boot subclass
        9, 0x04, 0, 0, 1, 0x03, 0x00, 0x00, 0,
        // HID 1.11, one report descriptor
        9, 0x21, 0x11, 0x01, 0, 1, 0x22, report_len as u8, (report_len >> 8) as u8,
        // Endpoint IN, interrupt, 10 ms
        7, 0x05, HID_EP_IN, 0x03, HID_EP_SIZE, 0, 10,
    ];
    Box::leak(Box::new(descriptor))
}

/// Send one serialized input report under `report_id`.
fn send_report(instance: u8, report_id: u8, bytes: &[u8]) -> bool {
    // SAFETY: TinyUSB copies the report into its endpoint buffer.
    unsafe {
        tinyusb::tud_hid_n_report(
            instance,
            report_id,
            bytes.as_ptr() as *const c_void,
            bytes.len() as u16,
        )
    }
}

/// HID transport over the TinyUSB device stack.
pub struct TinyUsbTransport {
    instance: u8,
}

impl TinyUsbTransport {
    /// Install the TinyUSB driver with the panel's HID descriptors.
    ///
    /// Call once at startup; the device enumerates asynchronously.
    pub fn install() -> Result<Self, EspError> {
        let mut config = tinyusb::tinyusb_config_t::default();
        config.__bindgen_anon_2.configuration_descriptor = config_descriptor().as_ptr();
        config.external_phy = false;

        // SAFETY: descriptors are 'static and the config is read during the call.
        esp!(unsafe { tinyusb::tinyusb_driver_install(&config) })?;

        Ok(Self { instance: 0 })
    }

    /// True once the host has configured the device.
    pub fn is_mounted(&self) -> bool {
        // SAFETY: plain status query, callable from any task.
        unsafe { tinyusb::tud_mounted() }
    }
}

impl HidTransport for TinyUsbTransport {
    fn is_ready(&mut self) -> bool {
        // SAFETY: plain status query, callable from any task.
        unsafe { tinyusb::tud_hid_n_ready(self.instance) }
    }

    fn send_keyboard(&mut self, report: &KeyboardReport) -> bool {
        let mut bytes = [0u8; KEYBOARD_REPORT_LEN];
        match encode(report, &mut bytes) {
            Ok(len) => send_report(self.instance, REPORT_ID_KEYBOARD, &bytes[..len]),
            Err(_) => false,
        }
    }

    fn send_mouse(&mut self, report: &MouseReport) -> bool {
        let mut bytes = [0u8; MOUSE_REPORT_LEN];
        match encode(report, &mut bytes) {
            Ok(len) => send_report(self.instance, REPORT_ID_MOUSE, &bytes[..len]),
            Err(_) => false,
        }
    }

    fn service(&mut self) {
        FreeRtos::delay_ms(1);
    }
}

/// TinyUSB callback: report descriptor for GET_DESCRIPTOR(Report).
#[no_mangle]
pub extern "C" fn tud_hid_descriptor_report_cb(_instance: u8) -> *const u8 {
    report_descriptor().as_ptr()
}

/// TinyUSB callback: GET_REPORT. Not supported, STALLs the request.
#[no_mangle]
pub extern "C" fn tud_hid_get_report_cb(
    _instance: u8,
    _report_id: u8,
    _report_type: u32,
    _buffer: *mut u8,
    _reqlen: u16,
) -> u16 {
    0
}

/// TinyUSB callback: SET_REPORT (keyboard LEDs). Ignored.
#[no_mangle]
pub extern "C" fn tud_hid_set_report_cb(
    _instance: u8,
    _report_id: u8,
    _report_type: u32,
    _buffer: *const u8,
    _bufsize: u16,
) {
}
