//! Macro definitions and the store that feeds them into the queue.
//!
//! Two ways to get a [`MacroDefinition`]:
//! - compile time: [`MacroDefinition::from_static`] over a `const` event
//!   table (see [`builtin`])
//! - run time: [`MacroBuilder`], which allocates fallibly and is usually
//!   driven through a [`LazyMacroStore`]

pub mod builtin;
pub mod definition;
pub mod store;

pub use builtin::{build_default_macros, BUILTIN_MACROS, BUILTIN_STORE};
pub use definition::{join, MacroBuilder, MacroDefinition, MacroError};
pub use store::{LazyMacroStore, MacroStore};
