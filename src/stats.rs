//! Emission counters for the panel engine.
//!
//! Nothing here changes engine behavior: a failed send is still treated as
//! sent, a dropped event is still gone. The counters only make those
//! outcomes observable from the console and the logs.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Which report kind failed most recently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ReportKind {
    /// No send has failed since boot.
    None = 0,

    /// Keyboard press or release report.
    Keyboard = 1,

    /// Mouse report.
    Mouse = 2,
}

impl ReportKind {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ReportKind::Keyboard,
            2 => ReportKind::Mouse,
            _ => ReportKind::None,
        }
    }
}

/// Thread-safe engine statistics.
///
/// Written by the consumer task and by producers (`macros_started`), read
/// by the console.
///
/// ```ignore
/// static STATS: EngineStats = EngineStats::new();
///
/// // In the console:
/// let s = STATS.snapshot();
/// writeln!(out, "kbd={} mouse={}", s.keyboard_reports, s.mouse_reports)?;
/// ```
pub struct EngineStats {
    /// Keyboard reports accepted by the transport.
    keyboard_reports: AtomicU32,

    /// Mouse reports accepted by the transport.
    mouse_reports: AtomicU32,

    /// Reports the transport refused (either kind).
    send_failures: AtomicU32,

    /// Kind of the last refused report.
    last_failure: AtomicU8,

    /// Mouse reports postponed because the transport was busy.
    mouse_deferrals: AtomicU32,

    /// Macros handed to the queue by producers.
    macros_started: AtomicU32,
}

impl EngineStats {
    pub const fn new() -> Self {
        Self {
            keyboard_reports: AtomicU32::new(0),
            mouse_reports: AtomicU32::new(0),
            send_failures: AtomicU32::new(0),
            last_failure: AtomicU8::new(0),
            mouse_deferrals: AtomicU32::new(0),
            macros_started: AtomicU32::new(0),
        }
    }

    /// Record the outcome of one send.
    #[inline]
    pub fn record_send(&self, kind: ReportKind, ok: bool) {
        if ok {
            match kind {
                ReportKind::Keyboard => self.keyboard_reports.fetch_add(1, Ordering::Relaxed),
                ReportKind::Mouse => self.mouse_reports.fetch_add(1, Ordering::Relaxed),
                ReportKind::None => return,
            };
        } else {
            self.last_failure.store(kind as u8, Ordering::Relaxed);
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_mouse_deferral(&self) {
        self.mouse_deferrals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_macro_started(&self) {
        self.macros_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn keyboard_reports(&self) -> u32 {
        self.keyboard_reports.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mouse_reports(&self) -> u32 {
        self.mouse_reports.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn send_failures(&self) -> u32 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            keyboard_reports: self.keyboard_reports(),
            mouse_reports: self.mouse_reports(),
            send_failures: self.send_failures(),
            last_failure: ReportKind::from_u8(self.last_failure.load(Ordering::Relaxed)),
            mouse_deferrals: self.mouse_deferrals.load(Ordering::Relaxed),
            macros_started: self.macros_started.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of engine statistics at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub keyboard_reports: u32,
    pub mouse_reports: u32,
    pub send_failures: u32,
    pub last_failure: ReportKind,
    pub mouse_deferrals: u32,
    pub macros_started: u32,
}
