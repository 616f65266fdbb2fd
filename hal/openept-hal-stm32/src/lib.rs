//! STM32-specific HAL for the OpenEPT Energy Device link
//!
//! This crate binds `embassy-stm32` peripherals to the `openept-hal`
//! traits so they can back a [`SerialTransport`]. Boards used so far:
//!
//! - NUCLEO-H755ZI-Q (USART2 on PD5/PA3, sync line on PA5)
//!
//! # Features
//!
//! - `stm32h755zi-cm7` - Enable support for the STM32H755 Cortex-M7 core
//! - `stm32f401re` - Enable support for the STM32F401RE
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod gpio;
pub mod uart;

pub use gpio::SyncPin;
pub use uart::{usart_config, Stm32Serial, UartBusError, DEFAULT_READ_TIMEOUT};

// Re-export shared types from openept-hal
pub use openept_hal::{SerialTransport, UartConfig};

/// Transport type used by STM32 boards
pub type Stm32Transport<'d> = SerialTransport<Stm32Serial<'d>, SyncPin<'d>>;
