//! Fixed-capacity line accumulator
//!
//! Collects the acquisition device's reply one byte at a time. The
//! terminator is kept in the line, so an accepted reply reads `OK\r`.

use heapless::Vec;

use crate::frame::FRAME_TERMINATOR;

/// Errors from [`LineBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// The line does not fit, or a byte arrived after the terminator
    Overflow,
}

/// Receive buffer holding at most one line of `N` bytes
#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const N: usize> {
    buf: Vec<u8, N>,
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append a byte
    ///
    /// Returns `Ok(true)` once the terminator has been stored.
    pub fn push(&mut self, byte: u8) -> Result<bool, LineError> {
        if self.is_complete() {
            return Err(LineError::Overflow);
        }
        self.buf.push(byte).map_err(|_| LineError::Overflow)?;
        Ok(byte == FRAME_TERMINATOR)
    }

    /// Whether the buffered bytes end with the terminator
    pub fn is_complete(&self) -> bool {
        self.buf.last() == Some(&FRAME_TERMINATOR)
    }

    /// Buffered bytes, including the terminator once complete
    pub fn line(&self) -> &[u8] {
        &self.buf
    }

    /// Discard everything buffered
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
