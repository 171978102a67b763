//! Forwards buffered log entries to the `log` facade.
//!
//! On the device the facade is backed by `esp_idf_svc::log::EspLogger`, so
//! entries end up on the ESP-IDF console next to the system logs. On the host
//! the facade is a no-op unless a test installs a logger.

use core::fmt::Write;

use crate::logging::{BufWriter, LogEntry, LogStream};

/// Interval between dropped-message reports.
pub const DROP_REPORT_INTERVAL_MS: u64 = 10_000;

/// Format an entry as `[timestamp_ms] LEVEL: message\n`.
///
/// Returns the number of bytes written; output is truncated at `buf.len()`.
pub fn format_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = writeln!(
        writer,
        "[{:10}] {}: {}",
        entry.timestamp_ms,
        entry.level.as_str(),
        entry.message()
    );
    writer.pos
}

/// Drain every pending entry of `stream` into the `log` facade.
///
/// Returns how many entries were forwarded.
pub fn drain_to_log<const N: usize>(stream: &LogStream<N>, target: &str) -> usize {
    let mut count = 0;
    while let Some(entry) = stream.drain() {
        log::log!(target: target, entry.level, "[{}] {}", entry.timestamp_ms, entry.message());
        count += 1;
    }
    count
}

/// Periodic report of messages lost to full log streams.
#[derive(Debug, Default)]
pub struct DropReporter {
    last_report_ms: u64,
}

impl DropReporter {
    pub const fn new() -> Self {
        Self { last_report_ms: 0 }
    }

    /// Report and reset drop counters once per [`DROP_REPORT_INTERVAL_MS`].
    ///
    /// Returns `Some((engine, input))` when a non-zero report was emitted.
    pub fn poll<const A: usize, const B: usize>(
        &mut self,
        now_ms: u64,
        engine: &LogStream<A>,
        input: &LogStream<B>,
    ) -> Option<(u32, u32)> {
        if now_ms.saturating_sub(self.last_report_ms) < DROP_REPORT_INTERVAL_MS {
            return None;
        }
        self.last_report_ms = now_ms;

        let engine_dropped = engine.dropped();
        let input_dropped = input.dropped();
        if engine_dropped == 0 && input_dropped == 0 {
            return None;
        }

        log::warn!("log messages dropped: engine={}, input={}", engine_dropped, input_dropped);
        engine.reset_dropped();
        input.reset_dropped();
        Some((engine_dropped, input_dropped))
    }
}
