//! # TouchHidPanel
//!
//! Touchscreen panel firmware that types macros and drives the mouse over
//! USB HID.
//!
//! ## Architecture
//!
//! ```text
//! touch callbacks ─┐                         ┌─▶ keyboard reports
//! serial console ──┼─▶ MacroQueue ─┐         │
//!   (producers)    │               ├─▶ EmissionEngine ─▶ HidTransport
//!                  └─▶ MouseState ─┘   (polled consumer)
//! ```
//!
//! - Producers only enqueue events or mutate mouse state, never block
//! - One polled consumer turns them into paced HID reports
//! - No mutexes: queue cursors and mouse fields are atomics
//! - Immediate clicks ([`click`]) bypass the queue from the consumer's task

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod action;
pub mod ascii;
pub mod click;
pub mod config;
pub mod console;
pub mod engine;
pub mod event;
pub mod hal;
pub mod hid;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod macros;
pub mod mouse;
pub mod queue;
pub mod stats;

pub use action::{Direction, Panel, PanelAction};
pub use config::CONFIG;
pub use engine::{EmissionEngine, EmissionState};
pub use event::KeyEvent;
pub use hal::HidTransport;
pub use log_globals::{ENGINE_LOG, INPUT_LOG};
pub use macros::{LazyMacroStore, MacroBuilder, MacroDefinition, MacroError, MacroStore};
pub use mouse::MouseState;
pub use queue::MacroQueue;
pub use stats::EngineStats;
