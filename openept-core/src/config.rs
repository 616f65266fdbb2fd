//! Link configuration
//!
//! Everything here is fixed at construction; nothing is persisted.

/// Default capacity of the receive buffer, in bytes
///
/// Enough for `OK\r` plus any diagnostic text an acquisition device
/// appends to a rejection.
pub const RECEIVE_BUFFER_SIZE: usize = 64;

/// Default number of times a START/STOP is sent when no reply arrives
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Handshake behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Total attempts per handshake, counting the first
    ///
    /// Only read failures (no terminator received) trigger another
    /// attempt. A rejection ends the handshake at once.
    pub max_attempts: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl LinkConfig {
    /// Create a config; `max_attempts` is raised to at least 1
    pub const fn new(max_attempts: u8) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    /// Send each command once and give up on the first read failure
    pub const fn single_attempt() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(LinkConfig::default().max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(LinkConfig::new(0).max_attempts, 1);
        assert_eq!(LinkConfig::single_attempt().max_attempts, 1);
        assert_eq!(LinkConfig::new(7).max_attempts, 7);
    }
}
