//! Macro store: indexed lookup and queueing of macro definitions.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::cell::OnceCell;

use super::definition::{MacroDefinition, MacroError};
use crate::queue::MacroQueue;

/// Indexed, immutable collection of macros.
#[derive(Debug, Clone)]
pub struct MacroStore {
    macros: Cow<'static, [MacroDefinition]>,
}

impl MacroStore {
    /// Store over a compile-time table.
    pub const fn from_static(table: &'static [MacroDefinition]) -> Self {
        Self {
            macros: Cow::Borrowed(table),
        }
    }

    /// Store owning run-time built macros.
    pub fn from_vec(macros: Vec<MacroDefinition>) -> Self {
        Self {
            macros: Cow::Owned(macros),
        }
    }

    pub fn count(&self) -> usize {
        self.macros.len()
    }

    pub fn get(&self, index: usize) -> Option<&MacroDefinition> {
        self.macros.get(index)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.get(index).map(MacroDefinition::label)
    }

    /// Description of a macro; `None` for a bad index or a macro without one.
    pub fn description(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(MacroDefinition::description)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.macros.iter()
    }

    /// Push every step of macro `index` into `queue`, in order.
    ///
    /// Returns `false` (and enqueues nothing) for an out-of-range index.
    /// Steps that do not fit are dropped by the queue.
    pub fn enqueue_all<const N: usize>(&self, index: usize, queue: &MacroQueue<N>) -> bool {
        let Some(definition) = self.get(index) else {
            return false;
        };
        for &step in definition.steps() {
            queue.enqueue(step);
        }
        true
    }
}

/// Builder function for a [`LazyMacroStore`].
pub type StoreBuilder = fn() -> Result<MacroStore, MacroError>;

/// Macro store built on first access, then reused.
///
/// The build runs at most once. If it fails the store stays absent and
/// every later access returns `None` without retrying.
pub struct LazyMacroStore {
    cell: OnceCell<Option<MacroStore>>,
    build: StoreBuilder,
}

impl LazyMacroStore {
    pub const fn new(build: StoreBuilder) -> Self {
        Self {
            cell: OnceCell::new(),
            build,
        }
    }

    /// The store, building it on the first call.
    pub fn get(&self) -> Option<&MacroStore> {
        self.cell
            .get_or_init(|| match (self.build)() {
                Ok(store) => Some(store),
                Err(e) => {
                    log::warn!("macro store build failed: {}", e);
                    None
                }
            })
            .as_ref()
    }

    /// True once a build has been attempted.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyEvent;
    use crate::hid::KeyboardUsage as K;
    use crate::macros::MacroBuilder;
    use core::sync::atomic::{AtomicU32, Ordering};

    static AB: [KeyEvent; 2] = [KeyEvent::key(K::KeyboardAa), KeyEvent::key(K::KeyboardBb)];
    static TABLE: [MacroDefinition; 2] = [
        MacroDefinition::from_static("AB", Some("types ab"), &AB),
        MacroDefinition::from_static("Empty", None, &[]),
    ];

    #[test]
    fn test_lookup() {
        let store = MacroStore::from_static(&TABLE);
        assert_eq!(store.count(), 2);
        assert_eq!(store.label(0), Some("AB"));
        assert_eq!(store.description(0), Some("types ab"));
        assert_eq!(store.description(1), None);
        assert_eq!(store.label(2), None);
        assert_eq!(store.description(9), None);
    }

    #[test]
    fn test_enqueue_all_in_order() {
        let store = MacroStore::from_static(&TABLE);
        let queue = MacroQueue::<8>::new();

        assert!(store.enqueue_all(0, &queue));
        assert_eq!(queue.dequeue(), Some(KeyEvent::key(K::KeyboardAa)));
        assert_eq!(queue.dequeue(), Some(KeyEvent::key(K::KeyboardBb)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_out_of_range_is_noop() {
        let store = MacroStore::from_static(&TABLE);
        let queue = MacroQueue::<8>::new();
        queue.enqueue(KeyEvent::key(K::KeyboardZz));
        let (head, tail) = (queue.head(), queue.tail());

        assert!(!store.enqueue_all(2, &queue));
        assert_eq!((queue.head(), queue.tail()), (head, tail));
    }

    static BUILDS: AtomicU32 = AtomicU32::new(0);

    fn counting_build() -> Result<MacroStore, MacroError> {
        BUILDS.fetch_add(1, Ordering::Relaxed);
        let def = MacroBuilder::new("x").text("x").build()?;
        Ok(MacroStore::from_vec(vec![def]))
    }

    #[test]
    fn test_lazy_builds_once() {
        let lazy = LazyMacroStore::new(counting_build);
        assert!(!lazy.is_initialized());

        let first = lazy.get().map(|s| s as *const MacroStore);
        let second = lazy.get().map(|s| s as *const MacroStore);

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(BUILDS.load(Ordering::Relaxed), 1);
    }

    static FAILED_BUILDS: AtomicU32 = AtomicU32::new(0);

    fn failing_build() -> Result<MacroStore, MacroError> {
        FAILED_BUILDS.fetch_add(1, Ordering::Relaxed);
        Err(MacroError::OutOfMemory { requested: 64 })
    }

    #[test]
    fn test_lazy_failure_stays_absent() {
        let lazy = LazyMacroStore::new(failing_build);
        assert!(lazy.get().is_none());
        assert!(lazy.get().is_none());
        assert!(lazy.is_initialized());
        assert_eq!(FAILED_BUILDS.load(Ordering::Relaxed), 1);
    }
}
