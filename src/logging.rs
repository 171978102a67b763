//! Non-blocking logging for the panel firmware.
//!
//! # Architecture
//!
//! ```text
//! Engine / UI / console     LogStream             Logger task
//! ─────────────────────     ─────────             ───────────
//!
//! panel_info!() ──────────▶ [L0][L1][L2] ───────▶ log facade (EspLogger)
//! non-blocking              lock-free ring        blocking ok
//! ```
//!
//! # Rules
//!
//! - The engine tick and input callbacks never call the `log` facade directly
//! - They use the `panel_*!` macros, which only copy bytes into a ring slot
//! - Messages are dropped (and counted) when the ring is full
//! - Messages longer than [`MAX_MSG_LEN`] are truncated

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

pub use log::Level;

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// A single log entry.
#[derive(Clone, Copy, Debug)]
pub struct LogEntry {
    /// Milliseconds since boot.
    pub timestamp_ms: u64,
    pub level: Level,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_ms: 0,
        level: Level::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text. Invalid UTF-8 (a truncated multi-byte char) is cut at
    /// the last valid boundary.
    pub fn message(&self) -> &str {
        let bytes = &self.msg[..self.len as usize];
        match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

struct Slot {
    /// Lap marker: `pos` when free for writer `pos`, `pos + 1` once filled.
    seq: AtomicU32,
    entry: UnsafeCell<LogEntry>,
}

/// Lock-free log stream (multiple producers, single consumer).
///
/// - Producers claim a slot with a CAS on `write_idx`
/// - A slot becomes visible to the consumer only after its `seq` is published
/// - Push never blocks (drops message if full)
/// - Drain runs in the logger task at leisure
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Each slot is written by exactly one producer (the one whose CAS
// claimed it) and read by the single consumer only after `seq` says so.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        const { assert!(N.is_power_of_two(), "Log buffer size must be power of 2") };

        let mut slots = [const {
            Slot {
                seq: AtomicU32::new(0),
                entry: UnsafeCell::new(LogEntry::EMPTY),
            }
        }; N];

        let mut i = 0;
        while i < N {
            slots[i].seq = AtomicU32::new(i as u32);
            i += 1;
        }

        Self {
            slots,
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry. Never blocks.
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    pub fn push(&self, timestamp_ms: u64, level: Level, msg: &[u8]) -> bool {
        let mut pos = self.write_idx.load(Ordering::Relaxed);

        let slot = loop {
            let slot = &self.slots[(pos as usize) & Self::MASK];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos) as i32;

            if diff == 0 {
                match self.write_idx.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break slot,
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            } else {
                pos = self.write_idx.load(Ordering::Relaxed);
            }
        };

        // SAFETY: the CAS above gave this producer exclusive ownership of
        // the slot until `seq` is published.
        unsafe {
            let entry = &mut *slot.entry.get();
            let len = msg.len().min(MAX_MSG_LEN);
            entry.timestamp_ms = timestamp_ms;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        slot.seq.store(pos.wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain next log entry (single consumer).
    ///
    /// Returns `None` if no entries available.
    pub fn drain(&self) -> Option<LogEntry> {
        let pos = self.read_idx.load(Ordering::Relaxed);
        let slot = &self.slots[(pos as usize) & Self::MASK];

        if slot.seq.load(Ordering::Acquire) != pos.wrapping_add(1) {
            return None;
        }

        // SAFETY: `seq` shows the producer finished writing this slot, and
        // no producer reuses it until `seq` is advanced below.
        let entry = unsafe { *slot.entry.get() };

        slot.seq.store(pos.wrapping_add(N as u32), Ordering::Release);
        self.read_idx.store(pos.wrapping_add(1), Ordering::Relaxed);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        let pos = self.read_idx.load(Ordering::Relaxed);
        self.slots[(pos as usize) & Self::MASK].seq.load(Ordering::Acquire) == pos.wrapping_add(1)
    }

    /// Number of claimed slots not yet drained (includes slots being written).
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the end of the buffer.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `fmt::Write` adapter over a fixed byte slice.
pub(crate) struct BufWriter<'a> {
    pub(crate) buf: &'a mut [u8],
    pub(crate) pos: usize,
}

impl core::fmt::Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Non-blocking log macro.
///
/// ```ignore
/// panel_log!(Level::Info, ENGINE_LOG, now_ms, "macro {} queued", index);
/// ```
#[macro_export]
macro_rules! panel_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! panel_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::panel_log!($crate::logging::Level::Info, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! panel_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::panel_log!($crate::logging::Level::Warn, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! panel_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::panel_log!($crate::logging::Level::Error, $stream, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! panel_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::panel_log!($crate::logging::Level::Debug, $stream, $timestamp, $($arg)*)
    };
}

/// Maximum verbosity.
#[macro_export]
macro_rules! panel_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::panel_log!($crate::logging::Level::Trace, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, Level::Info, b"test message"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_ms, 1000);
        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.message(), "test message");

        assert!(!stream.has_entries());
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::<4>::new();

        for ts in 1..=4 {
            assert!(stream.push(ts, Level::Info, b"x"));
        }

        assert!(!stream.push(5, Level::Info, b"5"));
        assert_eq!(stream.dropped(), 1);
        assert_eq!(stream.pending(), 4);

        // A drop must not corrupt the ring
        assert_eq!(stream.drain().map(|e| e.timestamp_ms), Some(1));
        assert!(stream.push(6, Level::Info, b"6"));

        let rest: Vec<_> = core::iter::from_fn(|| stream.drain())
            .map(|e| e.timestamp_ms)
            .collect();
        assert_eq!(rest, vec![2, 3, 4, 6]);
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'a'; MAX_MSG_LEN + 20];
        stream.push(0, Level::Warn, &long);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_message_cut_at_char_boundary() {
        let mut entry = LogEntry::default();
        let text = "ok \u{e9}".as_bytes();
        entry.msg[..text.len() - 1].copy_from_slice(&text[..text.len() - 1]);
        entry.len = (text.len() - 1) as u8;
        assert_eq!(entry.message(), "ok ");
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("Hello {}", 42));
        assert_eq!(&buf[..len], b"Hello 42");

        let mut tiny = [0u8; 4];
        let len = format_to_buffer(&mut tiny, format_args!("Hello {}", 42));
        assert_eq!(&tiny[..len], b"Hell");
    }

    #[test]
    fn test_macros_push() {
        let stream = LogStream::<8>::new();
        crate::panel_warn!(stream, 7, "queue dropped {} events", 3);
        crate::panel_debug!(stream, 8, "tick");

        let first = stream.drain().unwrap();
        assert_eq!(first.level, Level::Warn);
        assert_eq!(first.message(), "queue dropped 3 events");
        assert_eq!(stream.drain().unwrap().level, Level::Debug);
    }

    #[test]
    fn test_multiple_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let mut handles = vec![];

        for i in 0..4 {
            let stream = Arc::clone(&stream);
            handles.push(thread::spawn(move || {
                for j in 0..10 {
                    let msg = format!("Thread {} msg {}", i, j);
                    assert!(stream.push(j, Level::Info, msg.as_bytes()));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut count = 0;
        while let Some(entry) = stream.drain() {
            assert!(entry.message().starts_with("Thread "));
            count += 1;
        }
        assert_eq!(count, 40);
    }

    #[test]
    fn test_concurrent_producer_and_consumer() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<32>::new());
        let done = Arc::new(AtomicBool::new(false));
        let mut handles = vec![];

        for i in 0..4u64 {
            let stream = Arc::clone(&stream);
            handles.push(thread::spawn(move || {
                for j in 0..200u64 {
                    stream.push(i * 1000 + j, Level::Info, b"msg");
                }
            }));
        }

        let consumer = {
            let stream = Arc::clone(&stream);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut count = 0u32;
                loop {
                    match stream.drain() {
                        Some(entry) => {
                            assert_eq!(entry.message(), "msg");
                            count += 1;
                        }
                        None if done.load(Ordering::Acquire) => break,
                        None => thread::yield_now(),
                    }
                }
                count
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        done.store(true, Ordering::Release);

        let received = consumer.join().unwrap();
        assert_eq!(received + stream.dropped(), 800);
    }
}
