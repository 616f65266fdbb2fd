//! UART serial communication abstractions
//!
//! Provides blocking serial traits that can be implemented by
//! chip-specific HALs, plus [`poll_until`] for building a receive
//! timeout on top of a non-blocking read.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write a single byte to the UART
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write_blocking(&[byte])
    }
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled or an error occurs. A receive
    /// timeout, where the implementation has one, is reported as an error.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// 115200 8N1, what the acquisition device listens with out of the box
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Default framing at a different baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Outcome of one non-blocking receive attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxPoll<E> {
    /// A byte was waiting
    Ready(u8),
    /// Nothing received yet
    Pending,
    /// The receiver reported an error
    Failed(E),
}

/// Why [`poll_until`] returned without a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError<E> {
    /// The deadline passed first
    Timeout,
    /// The receiver failed
    Rx(E),
}

/// Poll a non-blocking receiver until a byte arrives or `expired` is true
///
/// `expired` is only consulted after an empty poll, so a byte that is
/// already waiting is returned even when the deadline has passed.
pub fn poll_until<E>(
    mut poll: impl FnMut() -> RxPoll<E>,
    mut expired: impl FnMut() -> bool,
) -> Result<u8, PollError<E>> {
    loop {
        match poll() {
            RxPoll::Ready(byte) => return Ok(byte),
            RxPoll::Failed(e) => return Err(PollError::Rx(e)),
            RxPoll::Pending => {
                if expired() {
                    return Err(PollError::Timeout);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_115200_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_with_baudrate_keeps_framing() {
        let config = UartConfig::with_baudrate(9600);
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.parity, Parity::None);
    }

    #[test]
    fn test_poll_until_returns_first_byte() {
        let mut polls = 0;
        let result: Result<u8, PollError<()>> = poll_until(
            || {
                polls += 1;
                if polls < 4 {
                    RxPoll::Pending
                } else {
                    RxPoll::Ready(b'O')
                }
            },
            || false,
        );
        assert_eq!(result, Ok(b'O'));
        assert_eq!(polls, 4);
    }

    #[test]
    fn test_poll_until_times_out() {
        let mut checks = 0;
        let result: Result<u8, PollError<()>> = poll_until(
            || RxPoll::Pending,
            || {
                checks += 1;
                checks == 3
            },
        );
        assert_eq!(result, Err(PollError::Timeout));
        assert_eq!(checks, 3);
    }

    #[test]
    fn test_poll_until_prefers_waiting_byte() {
        let result: Result<u8, PollError<()>> = poll_until(|| RxPoll::Ready(b'\r'), || true);
        assert_eq!(result, Ok(b'\r'));
    }

    #[test]
    fn test_poll_until_reports_rx_error() {
        let result = poll_until(|| RxPoll::Failed("overrun"), || false);
        assert_eq!(result, Err(PollError::Rx("overrun")));
    }
}
