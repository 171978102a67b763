//! UI action boundary.
//!
//! Touch callbacks translate widget events into [`PanelAction`]s and hand
//! them to [`Panel::dispatch`]. The panel is producer-side only: it writes
//! the macro queue and the mouse state, and performs immediate clicks.

use embedded_hal::delay::DelayNs;

use crate::click;
use crate::config::{PanelConfig, CONFIG};
use crate::event::KeyEvent;
use crate::hal::HidTransport;
use crate::hid::MouseButtons;
use crate::macros::MacroStore;
use crate::mouse::MouseState;
use crate::queue::{MacroQueue, DEFAULT_QUEUE_SIZE};
use crate::stats::EngineStats;

/// Directional pad button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Velocity for this direction at `speed` per tick.
    pub fn velocity(self, speed: u8) -> (i8, i8) {
        let s = speed.min(i8::MAX as u8) as i8;
        match self {
            Direction::Up => (0, -s),
            Direction::Down => (0, s),
            Direction::Left => (-s, 0),
            Direction::Right => (s, 0),
        }
    }
}

/// Something the user asked for on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    /// Queue every step of macro `n`.
    RunMacro(usize),
    /// Immediate press/release of these buttons.
    Click(MouseButtons),
    /// Immediate tap of one key, outside the macro queue.
    TapKey(KeyEvent),
    /// Continuous motion until changed.
    SetVelocity { dx: i8, dy: i8 },
    /// Directional pad pressed, at the configured speed.
    Move(Direction),
    /// Hold these buttons (empty releases).
    SetButtons(MouseButtons),
    /// Stop motion, release buttons.
    Stop,
}

/// Producer facade over the shared state.
pub struct Panel<'a, const N: usize = DEFAULT_QUEUE_SIZE> {
    store: Option<&'a MacroStore>,
    queue: &'a MacroQueue<N>,
    mouse: &'a MouseState,
    stats: &'a EngineStats,
    config: &'a PanelConfig,
}

impl<'a, const N: usize> Panel<'a, N> {
    /// `store` is `None` when the macro set failed to build; macro actions
    /// then do nothing.
    pub fn new(
        store: Option<&'a MacroStore>,
        queue: &'a MacroQueue<N>,
        mouse: &'a MouseState,
        stats: &'a EngineStats,
    ) -> Self {
        Self {
            store,
            queue,
            mouse,
            stats,
            config: &CONFIG,
        }
    }

    pub fn with_config(mut self, config: &'a PanelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> Option<&'a MacroStore> {
        self.store
    }

    /// Number of macros available to buttons.
    pub fn macro_count(&self) -> usize {
        self.store.map_or(0, MacroStore::count)
    }

    /// Queue macro `index`. Returns `false` for an unknown index or a
    /// missing store; nothing is queued then.
    pub fn run_macro(&self, index: usize) -> bool {
        let Some(store) = self.store else {
            return false;
        };
        let queued = store.enqueue_all(index, self.queue);
        if queued {
            self.stats.record_macro_started();
        }
        queued
    }

    /// Apply one action.
    ///
    /// Only `Click` and `TapKey` touch the transport (and block for the
    /// configured hold time); every other action just updates shared state
    /// for the engine.
    pub fn dispatch<T, D>(&self, action: PanelAction, transport: &mut T, delay: &mut D) -> bool
    where
        T: HidTransport + ?Sized,
        D: DelayNs + ?Sized,
    {
        match action {
            PanelAction::RunMacro(index) => return self.run_macro(index),
            PanelAction::Click(buttons) => {
                return click::click_now(transport, delay, buttons, self.config.click_hold_ms());
            }
            PanelAction::TapKey(key) => {
                return click::tap_key_now(transport, delay, key, self.config.click_hold_ms());
            }
            PanelAction::SetVelocity { dx, dy } => self.mouse.set_velocity(dx, dy),
            PanelAction::Move(direction) => {
                let (dx, dy) = direction.velocity(self.config.mouse_speed());
                self.mouse.set_velocity(dx, dy);
            }
            PanelAction::SetButtons(buttons) => self.mouse.set_buttons(buttons),
            PanelAction::Stop => self.mouse.stop(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::BUILTIN_STORE;

    #[test]
    fn test_direction_velocity() {
        assert_eq!(Direction::Up.velocity(5), (0, -5));
        assert_eq!(Direction::Down.velocity(5), (0, 5));
        assert_eq!(Direction::Left.velocity(5), (-5, 0));
        assert_eq!(Direction::Right.velocity(200), (127, 0));
    }

    #[test]
    fn test_run_macro_counts() {
        let queue = MacroQueue::<64>::new();
        let mouse = MouseState::new();
        let stats = EngineStats::new();
        let panel = Panel::new(Some(&BUILTIN_STORE), &queue, &mouse, &stats);

        assert!(panel.run_macro(1));
        assert_eq!(queue.len(), 3);
        assert!(!panel.run_macro(99));
        assert_eq!(stats.snapshot().macros_started, 1);
    }

    #[test]
    fn test_missing_store() {
        let queue = MacroQueue::<64>::new();
        let mouse = MouseState::new();
        let stats = EngineStats::new();
        let panel = Panel::new(None, &queue, &mouse, &stats);

        assert_eq!(panel.macro_count(), 0);
        assert!(!panel.run_macro(0));
        assert!(queue.is_empty());
    }
}
