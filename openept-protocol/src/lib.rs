//! OpenEPT Energy Device wire protocol
//!
//! This crate defines the text protocol an Energy Device (the device
//! under test) speaks to an OpenEPT acquisition device over a serial
//! line. The acquisition device measures power externally and uses these
//! messages, together with edges on a separate sync line, to attribute
//! energy to named code regions ("energy points").
//!
//! # Protocol Overview
//!
//! Every message is one carriage-return terminated line:
//! ```text
//! ┌──────┬─────┬──────────────────┬────┐
//! │ TYPE │ ':' │ PAYLOAD          │ CR │
//! │ 1B   │ 1B  │ 0..N B, no CR    │ 1B │
//! └──────┴─────┴──────────────────┴────┘
//! ```
//!
//! | Type  | Meaning                      | Example               |
//! |-------|------------------------------|-----------------------|
//! | `'0'` | Control command / slow mark  | `0:START\r\r`         |
//! | `'1'` | Energy point name            | `1:regionA\r`         |
//! | `'2'` | Informational text           | `2:WiFi connected\r`  |
//!
//! The acquisition device answers control commands with a line; only a
//! line starting with `OK\r` is an acceptance.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod line;
pub mod messages;

pub use frame::{
    Frame, FrameBytes, FrameError, FrameParser, MsgType, ParsedFrame, FRAME_SEPARATOR,
    FRAME_TERMINATOR, MAX_PARSE_PAYLOAD,
};
pub use line::{LineBuffer, LineError};
pub use messages::{ControlCommand, Message, Response, ACK_OK};
