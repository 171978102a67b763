//! Global log stream instances.
//!
//! One stream per side of the macro queue, each drained by the logger task.

use crate::logging::LogStream;

/// Engine log stream.
///
/// Written by the polled emission task only.
pub static ENGINE_LOG: LogStream = LogStream::new();

/// Input log stream.
///
/// Written by UI callbacks and the serial console (several producers).
pub static INPUT_LOG: LogStream = LogStream::new();
