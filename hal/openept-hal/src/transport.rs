//! Byte transport consumed by the link engine
//!
//! A [`Transport`] moves single bytes to and from the acquisition device
//! and drives the sync line. It knows nothing about framing.
//!
//! [`SerialTransport`] is the usual implementation: one UART for the
//! bytes and one output pin for the sync line.

use crate::gpio::OutputPin;
use crate::uart::{UartRx, UartTx};

/// Serial link plus sync line
///
/// Every operation is blocking. `read` blocks until a byte arrives or
/// the implementation's receive timeout expires; a timeout is an error.
pub trait Transport {
    /// Error type for all transport operations
    type Error;

    /// One-time setup before the first frame
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Transmit one byte
    fn send(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Receive one byte
    fn read(&mut self) -> Result<u8, Self::Error>;

    /// Drive the sync line high
    fn sync_up(&mut self) -> Result<(), Self::Error>;

    /// Drive the sync line low
    fn sync_down(&mut self) -> Result<(), Self::Error>;

    /// Invert the sync line
    fn sync_toggle(&mut self) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn send(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::send(self, byte)
    }

    fn read(&mut self) -> Result<u8, Self::Error> {
        T::read(self)
    }

    fn sync_up(&mut self) -> Result<(), Self::Error> {
        T::sync_up(self)
    }

    fn sync_down(&mut self) -> Result<(), Self::Error> {
        T::sync_down(self)
    }

    fn sync_toggle(&mut self) -> Result<(), Self::Error> {
        T::sync_toggle(self)
    }
}

/// Error from a [`SerialTransport`] operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError<E> {
    /// The UART reported an error (including receive timeout)
    Uart(E),
    /// The sync pin did not read back the level just written
    SyncReadback,
}

/// [`Transport`] over a UART and a sync output pin
pub struct SerialTransport<U, P> {
    uart: U,
    sync: P,
    verify_sync: bool,
}

impl<U, P, E> SerialTransport<U, P>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
    P: OutputPin,
{
    /// Create a transport that verifies every sync edge by read-back
    pub fn new(uart: U, sync: P) -> Self {
        Self {
            uart,
            sync,
            verify_sync: true,
        }
    }

    /// Create a transport that trusts the sync pin without reading it back
    ///
    /// For pins whose output register cannot be read (some port
    /// expanders, write-only shift registers).
    pub fn new_unverified(uart: U, sync: P) -> Self {
        Self {
            uart,
            sync,
            verify_sync: false,
        }
    }

    /// Current sync pin level as reported by the pin
    pub fn sync_is_high(&self) -> bool {
        self.sync.is_set_high()
    }

    /// Release the UART and pin
    pub fn release(self) -> (U, P) {
        (self.uart, self.sync)
    }

    fn check_sync(&self, expect_high: bool) -> Result<(), SerialError<E>> {
        if self.verify_sync && self.sync.is_set_high() != expect_high {
            return Err(SerialError::SyncReadback);
        }
        Ok(())
    }
}

impl<U, P, E> Transport for SerialTransport<U, P>
where
    U: UartTx<Error = E> + UartRx<Error = E>,
    P: OutputPin,
{
    type Error = SerialError<E>;

    fn init(&mut self) -> Result<(), Self::Error> {
        // Sync line starts low so the first fast mark is a rising edge
        self.sync.set_low();
        self.check_sync(false)?;
        self.uart.flush().map_err(SerialError::Uart)
    }

    fn send(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.uart.write_byte(byte).map_err(SerialError::Uart)
    }

    fn read(&mut self) -> Result<u8, Self::Error> {
        self.uart.read_byte().map_err(SerialError::Uart)
    }

    fn sync_up(&mut self) -> Result<(), Self::Error> {
        self.sync.set_high();
        self.check_sync(true)
    }

    fn sync_down(&mut self) -> Result<(), Self::Error> {
        self.sync.set_low();
        self.check_sync(false)
    }

    fn sync_toggle(&mut self) -> Result<(), Self::Error> {
        let expect_high = !self.sync.is_set_high();
        self.sync.toggle();
        self.check_sync(expect_high)
    }
}
