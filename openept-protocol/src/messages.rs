//! Message types for the Energy Device protocol
//!
//! - Device → Acquisition: control commands, energy points, info text
//! - Acquisition → Device: a one-line response to each control command

use crate::frame::{Frame, FrameError, MsgType};

/// Response line that accepts a control command
pub const ACK_OK: &[u8] = b"OK\r";

// Control payloads carry their own '\r'; with the frame terminator the
// wire shows "0:START\r\r". Acquisition firmware expects exactly that.
const START_PAYLOAD: &[u8] = b"START\r";
const STOP_PAYLOAD: &[u8] = b"STOP\r";

/// Link control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlCommand {
    /// Begin an acquisition session
    Start,
    /// End the acquisition session
    Stop,
}

impl ControlCommand {
    /// Payload sent inside the control frame
    pub fn payload(self) -> &'static [u8] {
        match self {
            ControlCommand::Start => START_PAYLOAD,
            ControlCommand::Stop => STOP_PAYLOAD,
        }
    }

    /// Control frame for this command
    pub fn to_frame(self) -> Frame<'static> {
        Frame::raw(MsgType::Control, self.payload())
    }

    /// Recognise a command from a parsed control payload
    ///
    /// Accepts the payload with or without its inner `'\r'`, since a line
    /// parser stops at the first one.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let trimmed = payload.strip_suffix(b"\r").unwrap_or(payload);
        match trimmed {
            b"START" => Some(ControlCommand::Start),
            b"STOP" => Some(ControlCommand::Stop),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlCommand::Start => "START",
            ControlCommand::Stop => "STOP",
        }
    }
}

/// Messages from the Energy Device to the acquisition device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message<'a> {
    /// START or STOP
    Control(ControlCommand),
    /// Energy point name, following a sync toggle
    EnergyPoint(&'a [u8]),
    /// Energy point name sent while the sync line is held high
    SlowEnergyPoint(&'a [u8]),
    /// Diagnostic text
    Info(&'a str),
}

impl<'a> Message<'a> {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame<'a>, FrameError> {
        match *self {
            Message::Control(cmd) => Ok(cmd.to_frame()),
            Message::EnergyPoint(name) => Frame::new(MsgType::EnergyPoint, name),
            Message::SlowEnergyPoint(name) => Frame::new(MsgType::Control, name),
            Message::Info(text) => Frame::new(MsgType::Info, text.as_bytes()),
        }
    }
}

/// Acquisition device's answer to a control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Line started with `OK\r`
    Ok,
    /// Any other line
    Rejected,
}

impl Response {
    /// Classify a received line
    ///
    /// Only the first three bytes matter; anything after `OK\r` is ignored.
    pub fn from_line(line: &[u8]) -> Self {
        if line.starts_with(ACK_OK) {
            Response::Ok
        } else {
            Response::Rejected
        }
    }

    pub fn is_ok(self) -> bool {
        self == Response::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn wire(frame: Frame<'_>) -> Vec<u8, 32> {
        frame.bytes().collect()
    }

    #[test]
    fn test_start_stop_wire_format() {
        assert_eq!(&wire(ControlCommand::Start.to_frame())[..], b"0:START\r\r");
        assert_eq!(&wire(ControlCommand::Stop.to_frame())[..], b"0:STOP\r\r");
    }

    #[test]
    fn test_control_from_payload() {
        assert_eq!(ControlCommand::from_payload(b"START"), Some(ControlCommand::Start));
        assert_eq!(ControlCommand::from_payload(b"STOP\r"), Some(ControlCommand::Stop));
        assert_eq!(ControlCommand::from_payload(b"regionA"), None);
    }

    #[test]
    fn test_message_frames() {
        let frame = Message::EnergyPoint(b"regionA").to_frame().unwrap();
        assert_eq!(&wire(frame)[..], b"1:regionA\r");

        let frame = Message::SlowEnergyPoint(b"bulk").to_frame().unwrap();
        assert_eq!(&wire(frame)[..], b"0:bulk\r");

        let frame = Message::Info("IP Addr:").to_frame().unwrap();
        assert_eq!(&wire(frame)[..], b"2:IP Addr:\r");
    }

    #[test]
    fn test_message_rejects_terminator() {
        assert_eq!(
            Message::Info("bad\r").to_frame(),
            Err(FrameError::EmbeddedTerminator)
        );
        assert_eq!(
            Message::EnergyPoint(b"a\rb").to_frame(),
            Err(FrameError::EmbeddedTerminator)
        );
    }

    #[test]
    fn test_response_from_line() {
        assert_eq!(Response::from_line(b"OK\r"), Response::Ok);
        assert_eq!(Response::from_line(b"OK\rtrailing"), Response::Ok);
        assert_eq!(Response::from_line(b"FAIL\r"), Response::Rejected);
        assert_eq!(Response::from_line(b"OK"), Response::Rejected);
        assert_eq!(Response::from_line(b"ok\r"), Response::Rejected);
        assert_eq!(Response::from_line(b""), Response::Rejected);
        assert!(Response::Ok.is_ok());
    }
}
