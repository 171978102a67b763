//! TouchHidPanel - firmware entry point
//!
//! 1. Logger, NVS configuration, TinyUSB
//! 2. Macro store built once
//! 3. One loop: engine poll, boot button, serial console, log drain
//!
//! The touch UI runs in its own component and feeds `PanelAction`s
//! through the same `Panel` as the boot button.

#![no_std]
#![no_main]

use core::fmt;

use esp_idf_svc::hal::delay::{FreeRtos, NON_BLOCK};
use esp_idf_svc::hal::gpio::{PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys as esp_idf_sys;

use touch_hid_panel::{
    config::{nvs::ConfigStore, ConfigPersistence, MigrationResult, NvsError, CONFIG},
    console::{Console, ConsoleContext, VERSION},
    engine::EmissionEngine,
    hal::TinyUsbTransport,
    log_drain::{drain_to_log, DropReporter},
    macros::{build_default_macros, LazyMacroStore},
    panel_info, Panel, PanelAction, EngineStats, MacroQueue, MouseState, ENGINE_LOG, INPUT_LOG,
};

// Shared between producers and the consumer loop
static QUEUE: MacroQueue = MacroQueue::new();
static MOUSE: MouseState = MouseState::new();
static STATS: EngineStats = EngineStats::new();

/// Boot button: GPIO0, active low.
const BUTTON_MACRO: usize = 0;

/// Milliseconds since boot.
fn now_ms() -> u64 {
    // SAFETY: esp_timer is started by the bootloader
    let us = unsafe { esp_idf_sys::esp_timer_get_time() };
    (us / 1000) as u64
}

/// `fmt::Write` over the console UART.
struct UartWriter<'a, 'd>(&'a UartDriver<'d>);

impl fmt::Write for UartWriter<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for chunk in s.split_inclusive('\n') {
            match chunk.strip_suffix('\n') {
                Some(line) => {
                    self.0.write(line.as_bytes()).map_err(|_| fmt::Error)?;
                    self.0.write(b"\r\n").map_err(|_| fmt::Error)?;
                }
                None => {
                    self.0.write(chunk.as_bytes()).map_err(|_| fmt::Error)?;
                }
            }
        }
        Ok(())
    }
}

/// `save` target that remembers why NVS could not be opened.
enum Persistence {
    Nvs(ConfigStore),
    Unavailable,
}

impl ConfigPersistence for Persistence {
    fn save(&mut self, config: &touch_hid_panel::config::PanelConfig) -> Result<(), NvsError> {
        match self {
            Persistence::Nvs(store) => store.save(config),
            Persistence::Unavailable => Err(NvsError::NotAvailable),
        }
    }
}

fn open_config() -> Persistence {
    let store = EspDefaultNvsPartition::take()
        .map_err(NvsError::InitFailed)
        .and_then(ConfigStore::open);

    match store {
        Ok(mut store) => {
            match store.load(&CONFIG) {
                Ok(MigrationResult::FreshInstall) => log::info!("config: defaults"),
                Ok(MigrationResult::UpToDate) => log::info!("config: loaded from NVS"),
                Ok(MigrationResult::Migrated { from_version, to_version }) => {
                    log::info!("config: migrated v{} -> v{}", from_version, to_version)
                }
                Err(e) => log::warn!("config: {}, using defaults", e),
            }
            Persistence::Nvs(store)
        }
        Err(e) => {
            log::error!("config: NVS unavailable: {}", e);
            Persistence::Unavailable
        }
    }
}

#[no_mangle]
fn main() {
    esp_idf_sys::link_patches();
    EspLogger::initialize_default();
    log::info!("{}", VERSION);

    let mut persistence = open_config();

    let mut usb = match TinyUsbTransport::install() {
        Ok(usb) => usb,
        Err(e) => {
            log::error!("TinyUSB install failed: {}", e);
            return;
        }
    };

    let peripherals = match Peripherals::take() {
        Ok(p) => p,
        Err(e) => {
            log::error!("peripherals unavailable: {}", e);
            return;
        }
    };

    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<esp_idf_svc::hal::gpio::AnyIOPin>::None,
        Option::<esp_idf_svc::hal::gpio::AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(115_200)),
    );
    let uart = match uart {
        Ok(uart) => uart,
        Err(e) => {
            log::error!("console UART failed: {}", e);
            return;
        }
    };

    let mut button = match PinDriver::input(peripherals.pins.gpio0) {
        Ok(pin) => pin,
        Err(e) => {
            log::error!("boot button unavailable: {}", e);
            return;
        }
    };
    if let Err(e) = button.set_pull(Pull::Up) {
        log::warn!("boot button pull-up: {}", e);
    }

    let macros = LazyMacroStore::new(build_default_macros);
    let store = macros.get();
    let panel = Panel::new(store, &QUEUE, &MOUSE, &STATS);
    log::info!("{} macros ready", panel.macro_count());

    let mut engine = EmissionEngine::new(&QUEUE, &MOUSE, &STATS, &ENGINE_LOG);
    let mut console = Console::new();
    let mut delay = FreeRtos;
    let mut drops = DropReporter::new();
    let mut button_was_down = false;
    let mut mounted = usb.is_mounted();

    console.print_banner(&mut UartWriter(&uart));

    loop {
        let now = now_ms();

        // New host session: start the engine clean
        let now_mounted = usb.is_mounted();
        if now_mounted && !mounted {
            panel_info!(INPUT_LOG, now, "usb: mounted");
            engine.reset();
        }
        mounted = now_mounted;

        engine.poll(now, &mut usb);

        // Boot button edge
        let down = button.is_low();
        if down && !button_was_down {
            panel_info!(INPUT_LOG, now, "button: macro {}", BUTTON_MACRO);
            panel.dispatch(PanelAction::RunMacro(BUTTON_MACRO), &mut usb, &mut delay);
        }
        button_was_down = down;

        // Console input, non-blocking
        let mut byte = [0u8; 1];
        while let Ok(1) = uart.read(&mut byte, NON_BLOCK) {
            let mut ctx = ConsoleContext {
                store,
                queue: &QUEUE,
                mouse: &MOUSE,
                stats: &STATS,
                config: &CONFIG,
                persist: &mut persistence,
            };
            console.process_byte(byte[0], &mut ctx, &mut UartWriter(&uart));
        }

        drain_to_log(&ENGINE_LOG, "engine");
        drain_to_log(&INPUT_LOG, "input");
        drops.poll(now, &ENGINE_LOG, &INPUT_LOG);

        FreeRtos::delay_ms(1);
    }
}
