//! UART driver for STM32
//!
//! Wraps a blocking embassy USART so it implements the `openept-hal`
//! serial traits. Reads poll the receiver against a per-byte deadline
//! and fail with [`UartBusError::Timeout`] when it passes, so a silent
//! acquisition device ends a handshake attempt instead of hanging it.

use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::{self, Error as UsartError, Uart};
use embassy_time::{Duration, Instant};
use openept_hal::uart::{
    poll_until, DataBits, Parity, PollError, RxPoll, StopBits, UartConfig, UartRx, UartTx,
};

/// Time to wait for each reply byte
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Buffer too long for a single transfer
    BufferTooLong,
    /// No byte arrived before the read deadline
    Timeout,
    /// Other error
    Other,
}

impl From<UsartError> for UartBusError {
    fn from(e: UsartError) -> Self {
        match e {
            UsartError::Framing => UartBusError::Framing,
            UsartError::Noise => UartBusError::Noise,
            UsartError::Overrun => UartBusError::Overrun,
            UsartError::Parity => UartBusError::Parity,
            UsartError::BufferTooLong => UartBusError::BufferTooLong,
            _ => UartBusError::Other,
        }
    }
}

/// Convert the board-independent UART settings into an embassy config
pub fn usart_config(cfg: &UartConfig) -> usart::Config {
    let mut config = usart::Config::default();
    config.baudrate = cfg.baudrate;
    config.data_bits = match cfg.data_bits {
        DataBits::Seven => usart::DataBits::DataBits7,
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    config.parity = match cfg.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    config.stop_bits = match cfg.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    config
}

/// Blocking USART bound to the `openept-hal` serial traits
pub struct Stm32Serial<'d> {
    tx: usart::UartTx<'d, Blocking>,
    rx: usart::UartRx<'d, Blocking>,
    read_timeout: Duration,
}

impl<'d> Stm32Serial<'d> {
    /// Wrap an already configured blocking USART with the default timeout
    pub fn new(uart: Uart<'d, Blocking>) -> Self {
        Self::with_timeout(uart, DEFAULT_READ_TIMEOUT)
    }

    /// Wrap a blocking USART, failing reads after `read_timeout` per byte
    pub fn with_timeout(uart: Uart<'d, Blocking>, read_timeout: Duration) -> Self {
        let (tx, rx) = uart.split();
        Self {
            tx,
            rx,
            read_timeout,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

impl UartTx for Stm32Serial<'_> {
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.blocking_write(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush()?;
        Ok(())
    }
}

impl UartRx for Stm32Serial<'_> {
    type Error = UartBusError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        for slot in buf.iter_mut() {
            let deadline = Instant::now() + self.read_timeout;
            let rx = &mut self.rx;
            let byte = poll_until(
                || match rx.nb_read() {
                    Ok(byte) => RxPoll::Ready(byte),
                    Err(nb::Error::WouldBlock) => RxPoll::Pending,
                    Err(nb::Error::Other(e)) => RxPoll::Failed(e),
                },
                || Instant::now() >= deadline,
            );
            *slot = match byte {
                Ok(byte) => byte,
                Err(PollError::Timeout) => return Err(UartBusError::Timeout),
                Err(PollError::Rx(e)) => return Err(e.into()),
            };
        }
        Ok(buf.len())
    }
}
