//! Board-agnostic core of the OpenEPT Energy Device library
//!
//! This crate contains the link engine that runs on the device under
//! test and does not depend on specific hardware:
//!
//! - [`Link`]: START/STOP handshake, fast and slow energy-point marking,
//!   info messages
//! - Link and sync line state tracking
//! - [`LinkConfig`] and error types
//! - [`FakeTransport`], an in-memory transport for tests and host tools
//!
//! ```text
//! application ──► Link<T> ──► T: Transport ──► UART + sync pin
//! ```

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod config;
pub mod error;
pub mod fake;
pub mod link;
pub mod state;

pub use config::{LinkConfig, DEFAULT_MAX_ATTEMPTS, RECEIVE_BUFFER_SIZE};
pub use error::LinkError;
pub use fake::{FakeError, FakeTransport, WireEvent};
pub use link::Link;
pub use state::{LinkEvent, LinkState, SyncLevel};

// Re-export the transport contract so applications need only this crate
pub use openept_hal::Transport;
