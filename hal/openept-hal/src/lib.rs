//! OpenEPT Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the Energy Device link is built
//! on. Chip-specific HALs (STM32, ...) implement the pin and UART traits;
//! [`SerialTransport`] combines them into the [`Transport`] the link engine
//! consumes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  openept-core (Link engine)             │
//! └─────────────────────────────────────────┘
//!                     │  Transport
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  openept-hal (this crate - traits)      │
//! │  SerialTransport = UART + sync pin      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  openept-hal-stm32 (or any other chip)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Sync line output
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`uart::poll_until`] - Deadline-bounded receive over a non-blocking read
//! - [`transport::Transport`] - Byte link plus sync line

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod transport;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use transport::{SerialError, SerialTransport, Transport};
pub use uart::{poll_until, PollError, RxPoll, UartConfig, UartRx, UartTx};
