//! Link error types

use openept_protocol::{FrameError, LineError};

/// Errors returned by [`Link`](crate::Link) operations
///
/// `E` is the transport's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// A send, sync or init operation on the transport failed
    Transport(E),
    /// No reply terminator arrived in any attempt
    Timeout,
    /// The acquisition device answered with something other than `OK\r`
    Rejected,
    /// The reply did not fit the receive buffer
    BufferOverflow,
    /// An energy-point name or info message contains `'\r'`
    InvalidPayload,
}

impl<E> LinkError<E> {
    /// Whether the acquisition device never answered
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkError::Timeout)
    }

    /// Whether the transport itself failed
    pub fn is_transport(&self) -> bool {
        matches!(self, LinkError::Transport(_))
    }
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(_: FrameError) -> Self {
        // Outgoing frames are streamed, so a bad payload is the only
        // encoding failure that can reach the link
        LinkError::InvalidPayload
    }
}

impl<E> From<LineError> for LinkError<E> {
    fn from(e: LineError) -> Self {
        match e {
            LineError::Overflow => LinkError::BufferOverflow,
        }
    }
}
