//! Sync line output for STM32
//!
//! `is_set_high` reads the output data register back, which is what
//! `SerialTransport` checks after every sync edge.

use embassy_stm32::gpio::Output;
use openept_hal::gpio::OutputPin;

/// Push-pull output driving the sync line
pub struct SyncPin<'d> {
    pin: Output<'d>,
}

impl<'d> SyncPin<'d> {
    /// Wrap a configured output pin
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for SyncPin<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
