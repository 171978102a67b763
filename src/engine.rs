//! Report emission state machine.
//!
//! The single consumer of the macro queue and the mouse state. Polled from
//! one task; every tick takes at most one keyboard step, so a press and its
//! release always go out in different ticks.
//!
//! # Keyboard states
//!
//! ```text
//!            dequeue(key) / send press
//!   ┌──────┐ ─────────────────────────▶ ┌─────────┐
//!   │ Idle │                            │ KeyHeld │
//!   └──────┘ ◀───────────────────────── └─────────┘
//!     │  ▲      send release, no delay       │
//!     │  │                                   │ send release,
//!     │  │ delay elapsed   ┌──────────┐      │ delay_ms > 0
//!     │  └──────────────── │ Delaying │ ◀────┘
//!     └──────────────────▶ └──────────┘
//!       dequeue(pure delay)
//! ```
//!
//! Mouse reports are independent of the keyboard state: a tick sends one
//! whenever the state changed or the velocity is non-zero.

use crate::config::{PanelConfig, CONFIG};
use crate::event::KeyEvent;
use crate::hal::HidTransport;
use crate::hid::{mouse_report, KeyboardReport, KEYBOARD_RELEASED};
use crate::logging::{LogStream, LOG_BUFFER_SIZE};
use crate::mouse::MouseState;
use crate::queue::{MacroQueue, DEFAULT_QUEUE_SIZE};
use crate::stats::{EngineStats, ReportKind};
use crate::{panel_debug, panel_warn};

/// Lower bound of the tick interval, whatever the configuration says.
pub const MIN_POLL_INTERVAL_MS: u32 = 10;

/// Keyboard side of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmissionState {
    /// Nothing held, next tick may dequeue.
    Idle,

    /// Press report sent for this event, release pending.
    KeyHeld(KeyEvent),

    /// Waiting, no keyboard traffic.
    Delaying { start_ms: u64, duration_ms: u32 },
}

/// Polled HID report emitter.
///
/// # Example
///
/// ```ignore
/// static QUEUE: MacroQueue = MacroQueue::new();
/// static MOUSE: MouseState = MouseState::new();
/// static STATS: EngineStats = EngineStats::new();
///
/// let mut engine = EmissionEngine::new(&QUEUE, &MOUSE, &STATS, &ENGINE_LOG);
///
/// loop {
///     engine.poll(now_ms(), &mut usb);
///     FreeRtos::delay_ms(1);
/// }
/// ```
pub struct EmissionEngine<'a, const N: usize = DEFAULT_QUEUE_SIZE, const L: usize = LOG_BUFFER_SIZE> {
    queue: &'a MacroQueue<N>,
    mouse: &'a MouseState,
    stats: &'a EngineStats,
    log: &'a LogStream<L>,
    config: &'a PanelConfig,
    state: EmissionState,
    last_run_ms: Option<u64>,
    seen_dropped: u32,
}

impl<'a, const N: usize, const L: usize> EmissionEngine<'a, N, L> {
    /// Create an idle engine reading the global [`CONFIG`].
    pub fn new(
        queue: &'a MacroQueue<N>,
        mouse: &'a MouseState,
        stats: &'a EngineStats,
        log: &'a LogStream<L>,
    ) -> Self {
        Self {
            queue,
            mouse,
            stats,
            log,
            config: &CONFIG,
            state: EmissionState::Idle,
            last_run_ms: None,
            seen_dropped: queue.dropped(),
        }
    }

    /// Read timing from `config` instead of the global instance.
    pub fn with_config(mut self, config: &'a PanelConfig) -> Self {
        self.config = config;
        self
    }

    /// Run a tick if the poll interval has elapsed since the last one.
    ///
    /// The first call always ticks. Missed intervals are not caught up: the
    /// next tick is scheduled from `now_ms`.
    ///
    /// Returns `true` if a tick ran.
    pub fn poll<T: HidTransport + ?Sized>(&mut self, now_ms: u64, transport: &mut T) -> bool {
        let interval = u64::from(self.config.poll_interval_ms().max(MIN_POLL_INTERVAL_MS));

        if let Some(last) = self.last_run_ms {
            if now_ms.saturating_sub(last) < interval {
                return false;
            }
        }

        self.last_run_ms = Some(now_ms);
        self.tick(now_ms, transport);
        true
    }

    /// One emission step, regardless of cadence.
    pub fn tick<T: HidTransport + ?Sized>(&mut self, now_ms: u64, transport: &mut T) {
        self.check_dropped(now_ms);

        if !transport.is_ready() {
            return;
        }

        let keyboard_sent = match self.state {
            EmissionState::KeyHeld(event) => self.tick_held(now_ms, event, transport),
            EmissionState::Delaying { start_ms, duration_ms } => {
                self.tick_delaying(now_ms, start_ms, duration_ms)
            }
            EmissionState::Idle => self.tick_idle(now_ms, transport),
        };

        self.tick_mouse(now_ms, keyboard_sent, transport);
    }

    /// Current keyboard state.
    #[inline]
    pub fn state(&self) -> EmissionState {
        self.state
    }

    /// Time of the last tick run by [`poll`](Self::poll).
    #[inline]
    pub fn last_run_ms(&self) -> Option<u64> {
        self.last_run_ms
    }

    /// Back to `Idle` with a fresh cadence.
    ///
    /// A key in `KeyHeld` is forgotten, not released; call between host
    /// sessions (e.g. on USB resume), not mid-macro.
    pub fn reset(&mut self) {
        self.state = EmissionState::Idle;
        self.last_run_ms = None;
    }

    // --- Private methods ---

    fn tick_held<T: HidTransport + ?Sized>(
        &mut self,
        now_ms: u64,
        event: KeyEvent,
        transport: &mut T,
    ) -> bool {
        self.send_keyboard(now_ms, &KEYBOARD_RELEASED, transport);

        self.state = if event.delay_ms > 0 {
            EmissionState::Delaying {
                start_ms: now_ms,
                duration_ms: event.delay_ms,
            }
        } else {
            EmissionState::Idle
        };
        true
    }

    fn tick_delaying(&mut self, now_ms: u64, start_ms: u64, duration_ms: u32) -> bool {
        if now_ms.saturating_sub(start_ms) >= u64::from(duration_ms) {
            self.state = EmissionState::Idle;
        }
        false
    }

    fn tick_idle<T: HidTransport + ?Sized>(&mut self, now_ms: u64, transport: &mut T) -> bool {
        let Some(event) = self.queue.dequeue() else {
            return false;
        };

        if event.is_delay() {
            panel_debug!(self.log, now_ms, "delay {} ms", event.delay_ms);
            self.state = EmissionState::Delaying {
                start_ms: now_ms,
                duration_ms: event.delay_ms,
            };
            return false;
        }

        self.send_keyboard(now_ms, &event.press_report(), transport);
        self.state = EmissionState::KeyHeld(event);
        true
    }

    fn tick_mouse<T: HidTransport + ?Sized>(
        &mut self,
        now_ms: u64,
        keyboard_sent: bool,
        transport: &mut T,
    ) {
        if !self.mouse.is_dirty() && !self.mouse.snapshot().is_moving() {
            return;
        }

        // The keyboard report may have used the only free slot
        if keyboard_sent && !transport.is_ready() {
            self.stats.record_mouse_deferral();
            return;
        }

        let Some(snapshot) = self.mouse.take_report() else {
            return;
        };

        let report = mouse_report(snapshot.buttons, snapshot.dx, snapshot.dy);
        let ok = transport.send_mouse(&report);
        self.stats.record_send(ReportKind::Mouse, ok);

        if !ok {
            self.mouse.mark_dirty();
            panel_warn!(self.log, now_ms, "mouse report refused");
        }
    }

    /// A refused keyboard report is counted but the state still advances.
    fn send_keyboard<T: HidTransport + ?Sized>(
        &mut self,
        now_ms: u64,
        report: &KeyboardReport,
        transport: &mut T,
    ) {
        let ok = transport.send_keyboard(report);
        self.stats.record_send(ReportKind::Keyboard, ok);

        if !ok {
            panel_warn!(self.log, now_ms, "keyboard report refused: {:?}", report.keycodes);
        }
    }

    fn check_dropped(&mut self, now_ms: u64) {
        let dropped = self.queue.dropped();
        if dropped != self.seen_dropped {
            panel_warn!(
                self.log,
                now_ms,
                "macro queue full, {} events dropped",
                dropped.wrapping_sub(self.seen_dropped)
            );
            self.seen_dropped = dropped;
        }
    }
}
