//! Frame encoding and decoding for the Energy Device protocol.
//!
//! Frame format:
//! - TYPE (1 byte): ASCII message type, see [`MsgType`]
//! - SEPARATOR (1 byte): `':'`
//! - PAYLOAD (0..N bytes): message text, never containing `'\r'`
//! - TERMINATOR (1 byte): `'\r'`
//!
//! Frames are streamed a byte at a time through [`Frame::bytes`], so the
//! sender needs no buffer and payloads have no size limit. The parser on
//! the receiving side does buffer, and bounds payloads to its capacity.

use heapless::Vec;

/// Byte between the type and the payload
pub const FRAME_SEPARATOR: u8 = b':';

/// Byte ending every frame
pub const FRAME_TERMINATOR: u8 = b'\r';

/// Default payload capacity of [`FrameParser`]
pub const MAX_PARSE_PAYLOAD: usize = 128;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload contains the frame terminator
    EmbeddedTerminator,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Unknown type byte or missing separator
    InvalidFrame,
    /// Payload exceeds the parser's capacity
    PayloadTooLarge,
}

/// Message type, sent as the first byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MsgType {
    /// Link control (START/STOP) and slow energy-point marks
    Control,
    /// Energy point name
    EnergyPoint,
    /// Free-text diagnostic message
    Info,
}

// Wire format values
const TYPE_CONTROL: u8 = b'0';
const TYPE_ENERGY_POINT: u8 = b'1';
const TYPE_INFO: u8 = b'2';

impl MsgType {
    /// Parse a type from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TYPE_CONTROL => Some(MsgType::Control),
            TYPE_ENERGY_POINT => Some(MsgType::EnergyPoint),
            TYPE_INFO => Some(MsgType::Info),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            MsgType::Control => TYPE_CONTROL,
            MsgType::EnergyPoint => TYPE_ENERGY_POINT,
            MsgType::Info => TYPE_INFO,
        }
    }
}

/// A frame ready to be sent
///
/// Borrows its payload; nothing is copied until the bytes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame<'a> {
    /// Message type
    pub msg_type: MsgType,
    /// Payload bytes, without separator or terminator
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Create a frame, rejecting payloads that contain `'\r'`
    pub fn new(msg_type: MsgType, payload: &'a [u8]) -> Result<Self, FrameError> {
        if payload.contains(&FRAME_TERMINATOR) {
            return Err(FrameError::EmbeddedTerminator);
        }
        Ok(Self { msg_type, payload })
    }

    /// Create a frame without checking the payload
    ///
    /// Control commands carry a literal `'\r'` inside their payload, which
    /// the acquisition side expects as a doubled terminator.
    pub(crate) const fn raw(msg_type: MsgType, payload: &'a [u8]) -> Self {
        Self { msg_type, payload }
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            payload: &[],
        }
    }

    /// Number of bytes on the wire
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 3 // TYPE + SEPARATOR + payload + TERMINATOR
    }

    /// Iterate over the wire bytes of this frame, in send order
    pub fn bytes(&self) -> FrameBytes<'a> {
        FrameBytes {
            frame: *self,
            state: EncodeState::Type,
        }
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        for (slot, byte) in buffer.iter_mut().zip(self.bytes()) {
            *slot = byte;
        }

        Ok(frame_len)
    }
}

/// Iterator over the wire bytes of a [`Frame`]
#[derive(Debug, Clone)]
pub struct FrameBytes<'a> {
    frame: Frame<'a>,
    state: EncodeState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeState {
    Type,
    Separator,
    Payload(usize),
    Terminator,
    Done,
}

impl Iterator for FrameBytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            match self.state {
                EncodeState::Type => {
                    self.state = EncodeState::Separator;
                    return Some(self.frame.msg_type.to_byte());
                }
                EncodeState::Separator => {
                    self.state = EncodeState::Payload(0);
                    return Some(FRAME_SEPARATOR);
                }
                EncodeState::Payload(idx) => match self.frame.payload.get(idx) {
                    Some(&byte) => {
                        self.state = EncodeState::Payload(idx + 1);
                        return Some(byte);
                    }
                    None => self.state = EncodeState::Terminator,
                },
                EncodeState::Terminator => {
                    self.state = EncodeState::Done;
                    return Some(FRAME_TERMINATOR);
                }
                EncodeState::Done => return None,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.frame.payload.len();
        let remaining = match self.state {
            EncodeState::Type => len + 3,
            EncodeState::Separator => len + 2,
            EncodeState::Payload(idx) => len - idx + 1,
            EncodeState::Terminator => 1,
            EncodeState::Done => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameBytes<'_> {}

/// A frame decoded by [`FrameParser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame<const N: usize = MAX_PARSE_PAYLOAD> {
    /// Message type
    pub msg_type: MsgType,
    /// Payload data
    pub payload: Vec<u8, N>,
}

impl<const N: usize> ParsedFrame<N> {
    /// Borrow as a sendable frame
    pub fn as_frame(&self) -> Frame<'_> {
        Frame::raw(self.msg_type, &self.payload)
    }
}

/// State machine for parsing frames, as the acquisition side does
///
/// Blank lines are skipped, so the doubled terminator after a control
/// command does not produce an error.
#[derive(Debug, Clone)]
pub struct FrameParser<const N: usize = MAX_PARSE_PAYLOAD> {
    state: ParseState,
    msg_type: MsgType,
    buffer: Vec<u8, N>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for TYPE byte
    WaitingForType,
    /// Got TYPE, waiting for SEPARATOR
    WaitingForSeparator,
    /// Reading payload bytes
    ReadingPayload,
    /// Skipping the rest of a bad line
    Discarding,
}

impl<const N: usize> Default for FrameParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameParser<N> {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForType,
            msg_type: MsgType::Control,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForType;
        self.buffer.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current
    /// line is malformed. After an error the rest of the line is skipped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<ParsedFrame<N>>, FrameError> {
        match self.state {
            ParseState::WaitingForType => {
                if byte == FRAME_TERMINATOR {
                    return Ok(None);
                }
                match MsgType::from_byte(byte) {
                    Some(msg_type) => {
                        self.msg_type = msg_type;
                        self.state = ParseState::WaitingForSeparator;
                        Ok(None)
                    }
                    None => {
                        self.state = ParseState::Discarding;
                        Err(FrameError::InvalidFrame)
                    }
                }
            }
            ParseState::WaitingForSeparator => {
                if byte == FRAME_SEPARATOR {
                    self.buffer.clear();
                    self.state = ParseState::ReadingPayload;
                    return Ok(None);
                }
                if byte == FRAME_TERMINATOR {
                    self.reset();
                } else {
                    self.state = ParseState::Discarding;
                }
                Err(FrameError::InvalidFrame)
            }
            ParseState::ReadingPayload => {
                if byte == FRAME_TERMINATOR {
                    let frame = ParsedFrame {
                        msg_type: self.msg_type,
                        payload: self.buffer.clone(),
                    };
                    self.reset();
                    return Ok(Some(frame));
                }
                if self.buffer.push(byte).is_err() {
                    self.state = ParseState::Discarding;
                    return Err(FrameError::PayloadTooLarge);
                }
                Ok(None)
            }
            ParseState::Discarding => {
                if byte == FRAME_TERMINATOR {
                    self.reset();
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<ParsedFrame<N>>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
