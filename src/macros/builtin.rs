//! Macros shipped with the firmware.
//!
//! `BUILTIN_MACROS` is expanded entirely at compile time and lives in
//! flash. [`build_default_macros`] assembles the on-screen button set at
//! run time and is meant to be wrapped in a [`LazyMacroStore`].
//!
//! [`LazyMacroStore`]: super::LazyMacroStore

use alloc::vec::Vec;

use super::definition::{join, MacroBuilder, MacroDefinition, MacroError};
use super::store::MacroStore;
use crate::ascii::{text_events, translatable_len};
use crate::event::KeyEvent;
use crate::hid::KeyboardUsage as K;
use crate::hid::Modifiers;

const EMAIL_TEXT: &str = "user@example.com";

static TYPING: [KeyEvent; 6] = text_events("typing");
static HI: [KeyEvent; 3] = text_events("Hi!");
static EMAIL: [KeyEvent; translatable_len(EMAIL_TEXT)] = text_events(EMAIL_TEXT);

static ENTERR: [KeyEvent; 9] = [
    KeyEvent::key(K::KeyboardEe),
    KeyEvent::key(K::KeyboardNn),
    KeyEvent::key(K::KeyboardTt),
    KeyEvent::key(K::KeyboardEe),
    KeyEvent::key(K::KeyboardRr),
    KeyEvent::key(K::KeyboardRr),
    KeyEvent::key(K::KeyboardEnter),
    KeyEvent::key(K::KeyboardBackspace),
    KeyEvent::key(K::KeyboardBackspace),
];

const ADVANCED_TEXT: [KeyEvent; 11] = text_events("Hello World");
const ADVANCED_KEYS: [KeyEvent; 5] = [
    KeyEvent::key(K::KeyboardEnter),
    KeyEvent::key(K::KeyboardTab),
    KeyEvent::key(K::KeyboardEnter),
    KeyEvent::key(K::KeyboardEnter),
    KeyEvent::chord(Modifiers::LEFT_CTRL, K::KeyboardSs),
];
static ADVANCED: [KeyEvent; 16] = join(ADVANCED_TEXT, ADVANCED_KEYS);

/// Compile-time macro table.
pub static BUILTIN_MACROS: [MacroDefinition; 5] = [
    MacroDefinition::from_static("Typing", None, &TYPING),
    MacroDefinition::from_static("Hi!", None, &HI),
    MacroDefinition::from_static("Email", Some("Types the contact address"), &EMAIL),
    MacroDefinition::from_static("Enterr", Some("Types 'enterr', Enter, erases two"), &ENTERR),
    MacroDefinition::from_static("Advanced", Some("Text, navigation keys, then Ctrl+S"), &ADVANCED),
];

/// Store over [`BUILTIN_MACROS`].
pub static BUILTIN_STORE: MacroStore = MacroStore::from_static(&BUILTIN_MACROS);

/// Assemble the on-screen button macros.
pub fn build_default_macros() -> Result<MacroStore, MacroError> {
    let mut macros = Vec::new();
    macros
        .try_reserve_exact(5)
        .map_err(|_| MacroError::OutOfMemory { requested: 5 })?;

    macros.push(MacroBuilder::new("Hi!").text("Hi!").build()?);

    macros.push(
        MacroBuilder::new("Email")
            .description("Types the contact address")
            .text(EMAIL_TEXT)
            .build()?,
    );

    macros.push(
        MacroBuilder::new("Save")
            .description("Ctrl+S")
            .chord(Modifiers::LEFT_CTRL, K::KeyboardSs)
            .build()?,
    );

    macros.push(
        MacroBuilder::new("Terminal")
            .description("Opens a terminal and starts htop")
            .chord(Modifiers::LEFT_CTRL | Modifiers::LEFT_ALT, K::KeyboardTt)
            .delay(800)
            .text("htop\n")
            .build()?,
    );

    macros.push(
        MacroBuilder::new("Greeting")
            .description("Two lines half a second apart")
            .text("Hello,\n")
            .delay(500)
            .text("nice to meet you!\n")
            .build()?,
    );

    Ok(MacroStore::from_vec(macros))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii;

    #[test]
    fn test_builtin_labels() {
        let labels: Vec<_> = BUILTIN_STORE.iter().map(|m| m.label()).collect();
        assert_eq!(labels, ["Typing", "Hi!", "Email", "Enterr", "Advanced"]);
    }

    #[test]
    fn test_builtin_text_matches_runtime_expansion() {
        let email: Vec<_> = ascii::expand(EMAIL_TEXT).collect();
        assert_eq!(BUILTIN_STORE.get(2).unwrap().steps(), &email[..]);
    }

    #[test]
    fn test_advanced_ends_with_save() {
        let steps = BUILTIN_STORE.get(4).unwrap().steps();
        assert_eq!(steps.len(), 16);
        assert_eq!(steps[0], KeyEvent::chord(Modifiers::LEFT_SHIFT, K::KeyboardHh));
        assert_eq!(steps[15], KeyEvent::chord(Modifiers::LEFT_CTRL, K::KeyboardSs));
    }

    #[test]
    fn test_builtins_fit_default_queue() {
        for m in BUILTIN_STORE.iter() {
            assert!(m.steps().len() < crate::queue::DEFAULT_QUEUE_SIZE, "{}", m.label());
        }
    }

    #[test]
    fn test_default_macros() {
        let store = build_default_macros().unwrap();
        assert_eq!(store.count(), 5);
        assert_eq!(store.label(3), Some("Terminal"));
        assert_eq!(store.description(0), None);

        let terminal = store.get(3).unwrap().steps();
        assert_eq!(terminal[0], KeyEvent::chord(Modifiers::LEFT_CTRL | Modifiers::LEFT_ALT, K::KeyboardTt));
        assert!(terminal[1].is_delay());

        let greeting = store.get(4).unwrap();
        assert_eq!(greeting.total_delay_ms(), 500);
    }
}
