//! Lock-free SPSC (Single Producer, Single Consumer) macro queue.
//!
//! Every key event a macro produces flows through here.
//!
//! # Architecture
//!
//! ```text
//! UI callbacks / ISR ──▶ MacroQueue ──▶ EmissionEngine (polled)
//!   (producer)           (lock-free)       (consumer)
//! ```
//!
//! # Rules
//!
//! - Only the producer advances `head`, only the consumer advances `tail`
//! - Only atomic operations for synchronization, no mutex
//! - No operation blocks
//! - A full queue drops the new event silently; queued events are never lost

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::event::KeyEvent;

/// Default queue size: 64 slots, 63 usable.
pub const DEFAULT_QUEUE_SIZE: usize = 64;

/// Bounded ring buffer of key events.
///
/// One slot is always kept free so that full (`head + 1 == tail`) and empty
/// (`head == tail`) are distinguishable; a `MacroQueue<N>` holds `N - 1`
/// events.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Single producer calls [`enqueue`](Self::enqueue) (a usage rule, not checked by the type system)
/// - Single consumer calls [`dequeue`](Self::dequeue)
/// - A slot is written only while it is outside `tail..head`, read only inside
///
/// # Memory Ordering
///
/// - Producer writes the slot, then publishes `head` with `Release`
/// - Consumer loads `head` with `Acquire` before reading the slot
/// - Consumer publishes `tail` with `Release`, producer loads it with `Acquire`
pub struct MacroQueue<const N: usize = DEFAULT_QUEUE_SIZE> {
    slots: [UnsafeCell<KeyEvent>; N],

    /// Next free write slot (producer-owned).
    head: AtomicUsize,

    /// Next unread slot (consumer-owned).
    tail: AtomicUsize,

    /// Events refused because the queue was full.
    dropped: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic coordination.
// No slot is accessed by both sides at the same time within the rules above.
unsafe impl<const N: usize> Sync for MacroQueue<N> {}
unsafe impl<const N: usize> Send for MacroQueue<N> {}

impl<const N: usize> MacroQueue<N> {
    /// Mask for wrapping cursors. N must be a power of 2.
    const MASK: usize = N - 1;

    /// Create a new empty queue.
    ///
    /// # Panics
    ///
    /// Fails at compile time if N is not a power of 2 or is smaller than 2.
    pub const fn new() -> Self {
        const {
            assert!(N.is_power_of_two() && N >= 2, "Queue size must be a power of 2, at least 2")
        };

        Self {
            slots: [const { UnsafeCell::new(KeyEvent::EMPTY) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Append an event (producer side).
    ///
    /// If the queue is full the event is dropped and only the
    /// [`dropped`](Self::dropped) counter records it.
    ///
    /// # Timing
    ///
    /// O(1), never blocks, never allocates. Safe from interrupt context.
    #[inline]
    pub fn enqueue(&self, event: KeyEvent) {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & Self::MASK;

        if next == self.tail.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        // SAFETY: Single producer; slot `head` is outside the readable range
        // until `head` is published below.
        unsafe {
            self.slots[head].get().write(event);
        }

        self.head.store(next, Ordering::Release);
    }

    /// Pop the oldest event (consumer side). Never blocks.
    #[inline]
    pub fn dequeue(&self) -> Option<KeyEvent> {
        let tail = self.tail.load(Ordering::Relaxed);

        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Single consumer; slot `tail` was published by the producer
        // and is not rewritten until `tail` moves past it.
        let event = unsafe { self.slots[tail].get().read() };

        self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
        Some(event)
    }

    /// Number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & Self::MASK
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == Self::MASK
    }

    /// Usable capacity (one slot reserved).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Current write cursor.
    #[inline]
    pub fn head(&self) -> usize {
        self.head.load(Ordering::Acquire)
    }

    /// Current read cursor.
    #[inline]
    pub fn tail(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Events dropped on a full queue since boot.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for MacroQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::{KeyboardUsage as K, Modifiers};

    #[test]
    fn test_queue_basic_fifo() {
        let queue = MacroQueue::<8>::new();
        assert!(queue.is_empty());

        queue.enqueue(KeyEvent::key(K::KeyboardAa));
        queue.enqueue(KeyEvent::key(K::KeyboardBb));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.dequeue(), Some(KeyEvent::key(K::KeyboardAa)));
        assert_eq!(queue.dequeue(), Some(KeyEvent::key(K::KeyboardBb)));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_queue_reserves_one_slot() {
        let queue = MacroQueue::<4>::new();
        assert_eq!(queue.capacity(), 3);

        for code in 1..=3 {
            queue.enqueue(KeyEvent::new(Modifiers::empty(), code, 0));
        }
        assert!(queue.is_full());
        assert_eq!(queue.dropped(), 0);

        queue.enqueue(KeyEvent::new(Modifiers::empty(), 99, 0));
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_queue_wraps_cursors() {
        let queue = MacroQueue::<4>::new();

        for round in 0..10u8 {
            queue.enqueue(KeyEvent::new(Modifiers::empty(), round, 0));
            queue.enqueue(KeyEvent::new(Modifiers::empty(), round + 100, 0));
            assert_eq!(queue.dequeue().map(|e| e.keycode), Some(round));
            assert_eq!(queue.dequeue().map(|e| e.keycode), Some(round + 100));
        }

        assert!(queue.head() < 4);
        assert_eq!(queue.head(), queue.tail());
    }

    #[test]
    fn test_queue_room_after_dequeue() {
        let queue = MacroQueue::<4>::new();
        for code in 1..=3 {
            queue.enqueue(KeyEvent::new(Modifiers::empty(), code, 0));
        }
        queue.dequeue();
        queue.enqueue(KeyEvent::key(4.into()));
        assert_eq!(queue.dropped(), 0);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_spsc_threads_preserve_order() {
        use std::sync::Arc;
        use std::thread;

        let queue = Arc::new(MacroQueue::<16>::new());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..1000u32 {
                    // Spin until there is room so no event is dropped
                    while queue.is_full() {
                        thread::yield_now();
                    }
                    queue.enqueue(KeyEvent::delay(i + 1));
                }
            })
        };

        let mut expected = 1;
        while expected <= 1000 {
            if let Some(ev) = queue.dequeue() {
                assert_eq!(ev.delay_ms, expected);
                expected += 1;
            } else {
                thread::yield_now();
            }
        }

        producer.join().unwrap();
        assert_eq!(queue.dropped(), 0);
    }
}
