//! Board and demo constants for the NUCLEO-H755ZI-Q
//!
//! Pin assignments live in `main.rs` where the peripherals are taken:
//! USART2 TX on PD5, RX on PA3 (ST-LINK VCP header), sync line on PA5.

use openept_hal::UartConfig;

/// Baud rate the acquisition device listens at
pub const LINK_BAUDRATE: u32 = 115_200;

/// Handshake attempts before giving up on START/STOP
pub const LINK_ATTEMPTS: u8 = 3;

/// Wait for each reply byte before an attempt counts as unanswered
pub const READ_TIMEOUT_MS: u64 = 1000;

/// Delay between the two marks of one demo iteration
pub const MARK_INTERVAL_MS: u64 = 100;

/// Delay at the end of each demo iteration
pub const ITERATION_PERIOD_MS: u64 = 1000;

/// The session is stopped and restarted every this many iterations
pub const RESTART_EVERY: u32 = 5;

/// Pause between STOP and the next START
pub const RESTART_PAUSE_MS: u64 = 2000;

/// Delay before retrying a START that failed
pub const START_RETRY_MS: u64 = 500;

/// Capacity of a formatted energy point name
pub const NAME_CAPACITY: usize = 32;

/// UART settings for the link (8N1)
pub fn link_uart() -> UartConfig {
    UartConfig::with_baudrate(LINK_BAUDRATE)
}
