//! Module: macros::definition
//!
//! Purpose: one named, ordered sequence of key events.
//!
//! Architecture:
//! - Static macros borrow `'static` data, built ones own their buffers
//!   (`Cow` covers both without a second type)
//! - Immutable once constructed
//! - Building uses `try_reserve`, so an exhausted heap is an error value,
//!   never an abort

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use crate::ascii;
use crate::event::KeyEvent;
use crate::hid::{KeyboardUsage, Modifiers};

/// Macro construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    /// The heap could not satisfy a reservation.
    #[error("out of memory reserving {requested} more elements")]
    OutOfMemory { requested: usize },
}

impl MacroError {
    fn oom(requested: usize) -> Self {
        MacroError::OutOfMemory { requested }
    }
}

/// A named macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    label: Cow<'static, str>,
    description: Option<Cow<'static, str>>,
    steps: Cow<'static, [KeyEvent]>,
}

impl MacroDefinition {
    /// Macro over compile-time data.
    pub const fn from_static(
        label: &'static str,
        description: Option<&'static str>,
        steps: &'static [KeyEvent],
    ) -> Self {
        let description = match description {
            Some(d) => Some(Cow::Borrowed(d)),
            None => None,
        };
        Self {
            label: Cow::Borrowed(label),
            description,
            steps: Cow::Borrowed(steps),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[KeyEvent] {
        &self.steps
    }

    /// Sum of all delays (pure and post-release) in the macro.
    pub fn total_delay_ms(&self) -> u64 {
        self.steps.iter().map(|e| u64::from(e.delay_ms)).sum()
    }
}

/// Concatenate two event tables at compile time.
///
/// `C` must equal `A + B`.
pub const fn join<const A: usize, const B: usize, const C: usize>(
    a: [KeyEvent; A],
    b: [KeyEvent; B],
) -> [KeyEvent; C] {
    assert!(A + B == C, "joined length must be the sum of both parts");
    let mut out = [KeyEvent::EMPTY; C];
    let mut i = 0;
    while i < A {
        out[i] = a[i];
        i += 1;
    }
    let mut j = 0;
    while j < B {
        out[A + j] = b[j];
        j += 1;
    }
    out
}

/// Run-time macro assembly.
///
/// Appends are chainable; the first allocation failure is kept and
/// returned by [`build`](Self::build), later appends are skipped.
///
/// ```
/// use touch_hid_panel::hid::{KeyboardUsage, Modifiers};
/// use touch_hid_panel::macros::MacroBuilder;
///
/// let terminal = MacroBuilder::new("Terminal")
///     .chord(Modifiers::LEFT_CTRL | Modifiers::LEFT_ALT, KeyboardUsage::KeyboardTt)
///     .delay(500)
///     .text("htop\n")
///     .build()
///     .unwrap();
/// assert_eq!(terminal.steps().len(), 7);
/// ```
#[derive(Debug)]
pub struct MacroBuilder {
    label: String,
    description: Option<String>,
    steps: Vec<KeyEvent>,
    error: Option<MacroError>,
}

impl MacroBuilder {
    pub fn new(label: &str) -> Self {
        let mut builder = Self {
            label: String::new(),
            description: None,
            steps: Vec::new(),
            error: None,
        };
        match builder.label.try_reserve_exact(label.len()) {
            Ok(()) => builder.label.push_str(label),
            Err(_) => builder.error = Some(MacroError::oom(label.len())),
        }
        builder
    }

    /// Attach a description.
    pub fn description(mut self, text: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let mut owned = String::new();
        match owned.try_reserve_exact(text.len()) {
            Ok(()) => {
                owned.push_str(text);
                self.description = Some(owned);
            }
            Err(_) => self.error = Some(MacroError::oom(text.len())),
        }
        self
    }

    /// Append typed text. Characters without a key are skipped.
    pub fn text(mut self, text: &str) -> Self {
        let count = text.chars().filter(|&c| ascii::translate(c).is_some()).count();
        if self.reserve(count) {
            self.steps.extend(ascii::expand(text));
        }
        self
    }

    /// Append explicit events verbatim.
    pub fn steps(mut self, events: &[KeyEvent]) -> Self {
        if self.reserve(events.len()) {
            self.steps.extend_from_slice(events);
        }
        self
    }

    /// Append a plain key tap.
    pub fn key(self, usage: KeyboardUsage) -> Self {
        self.steps(&[KeyEvent::key(usage)])
    }

    /// Append a key tap with modifiers held.
    pub fn chord(self, modifier: Modifiers, usage: KeyboardUsage) -> Self {
        self.steps(&[KeyEvent::chord(modifier, usage)])
    }

    /// Append a pure delay. A zero delay appends nothing.
    pub fn delay(self, ms: u32) -> Self {
        if ms == 0 {
            return self;
        }
        self.steps(&[KeyEvent::delay(ms)])
    }

    /// Finish the macro.
    pub fn build(self) -> Result<MacroDefinition, MacroError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(MacroDefinition {
            label: Cow::Owned(self.label),
            description: self.description.map(Cow::Owned),
            steps: Cow::Owned(self.steps),
        })
    }

    fn reserve(&mut self, additional: usize) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.steps.try_reserve(additional) {
            Ok(()) => true,
            Err(_) => {
                self.error = Some(MacroError::oom(additional));
                false
            }
        }
    }
}
