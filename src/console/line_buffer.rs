//! Line buffer for console input

/// Default line capacity
pub const LINE_SIZE: usize = 64;

/// Fixed-capacity ASCII line
pub struct LineBuffer<const N: usize = LINE_SIZE> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self { buf: [0u8; N], len: 0 }
    }

    /// Append a printable ASCII byte. Returns `false` (byte not stored)
    /// when full or not printable.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len >= N || !(0x20..=0x7E).contains(&c) {
            return false;
        }
        self.buf[self.len] = c;
        self.len += 1;
        true
    }

    /// Remove the last byte. Returns `false` if already empty.
    pub fn backspace(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.len -= 1;
        true
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Contents; only printable ASCII is ever stored, so always valid UTF-8
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
