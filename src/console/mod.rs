//! Serial console for macros, mouse control, configuration and diagnostics
//!
//! Polled from the main loop, no dedicated task.
//! No heap allocation: fixed line buffer, formatted output goes straight
//! to the caller's writer.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod parser;

pub use commands::{execute, ConsoleContext, COMMANDS};
pub use console::{Console, VERSION};
pub use error::ConsoleError;
pub use line_buffer::LineBuffer;
pub use parser::{parse_line, ParsedCommand};
