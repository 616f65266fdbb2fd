//! Energy Device link engine
//!
//! [`Link`] owns the transport, the receive buffer and the sync line
//! state for one connection to an acquisition device. Every operation
//! blocks until it has been fully written (and, for START/STOP, until the
//! reply has been read or the attempts run out).
//!
//! Marking disciplines:
//!
//! - **Fast** ([`Link::set_ep_fast`]): one sync toggle, then `1:<name>\r`.
//!   The edge is the timing reference; the name follows at UART speed.
//! - **Slow** ([`Link::set_ep_slow`]): sync high, `0:<name>\r`, sync low.
//!   The whole transmission is bracketed by the high level.

use openept_hal::Transport;
use openept_protocol::{
    ControlCommand, Frame, LineBuffer, LineError, Message, Response, FRAME_TERMINATOR,
};

use crate::config::{LinkConfig, RECEIVE_BUFFER_SIZE};
use crate::error::LinkError;
use crate::state::{LinkEvent, LinkState, SyncLevel};

/// Outcome of reading one reply line
enum ReadOutcome {
    /// Terminator received; the line is in the receive buffer
    Line,
    /// The transport failed before a terminator arrived
    NoReply,
}

/// Link to an acquisition device over transport `T`
///
/// `N` is the receive buffer capacity.
pub struct Link<T, const N: usize = RECEIVE_BUFFER_SIZE> {
    transport: T,
    config: LinkConfig,
    rx: LineBuffer<N>,
    state: LinkState,
    sync: SyncLevel,
}

impl<T: Transport, const N: usize> Link<T, N> {
    /// Create a link with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, LinkConfig::default())
    }

    /// Create a link with a specific configuration
    pub fn with_config(transport: T, config: LinkConfig) -> Self {
        Self {
            transport,
            config,
            rx: LineBuffer::new(),
            state: LinkState::Idle,
            sync: SyncLevel::Low,
        }
    }

    /// Initialize the transport and reset the link
    ///
    /// The sync line is driven low by the transport.
    pub fn init(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport.init().map_err(LinkError::Transport)?;
        self.rx.clear();
        self.state = LinkState::Idle;
        self.sync = SyncLevel::Low;
        debug!("link initialized");
        Ok(())
    }

    /// Send START and wait for the acquisition device to accept it
    pub fn start(&mut self) -> Result<(), LinkError<T::Error>> {
        self.handshake(ControlCommand::Start)
    }

    /// Send STOP and wait for the acquisition device to accept it
    pub fn stop(&mut self) -> Result<(), LinkError<T::Error>> {
        self.handshake(ControlCommand::Stop)
    }

    /// Mark an energy point with a single sync edge
    ///
    /// Toggles the sync line, then sends the name. No reply is awaited.
    pub fn set_ep_fast(&mut self, name: &[u8]) -> Result<(), LinkError<T::Error>> {
        let frame = Message::EnergyPoint(name).to_frame()?;
        self.record()?;
        self.send_frame(frame)
    }

    /// Mark an energy point with the sync line held high during the name
    ///
    /// On a send failure the line is left high.
    pub fn set_ep_slow(&mut self, name: &[u8]) -> Result<(), LinkError<T::Error>> {
        let frame = Message::SlowEnergyPoint(name).to_frame()?;
        self.sync_up()?;
        self.send_frame(frame)?;
        self.sync_down()
    }

    /// Toggle the sync line without sending a name
    ///
    /// The name can follow later with [`send_ep_name`](Self::send_ep_name);
    /// together they are equivalent to [`set_ep_fast`](Self::set_ep_fast).
    pub fn record(&mut self) -> Result<(), LinkError<T::Error>> {
        self.sync_toggle()
    }

    /// Send an energy point name without touching the sync line
    pub fn send_ep_name(&mut self, name: &[u8]) -> Result<(), LinkError<T::Error>> {
        let frame = Message::EnergyPoint(name).to_frame()?;
        self.send_frame(frame)
    }

    /// Send a diagnostic message
    pub fn send_info(&mut self, message: &str) -> Result<(), LinkError<T::Error>> {
        let frame = Message::Info(message).to_frame()?;
        self.send_frame(frame)
    }

    /// Drive the sync line high
    pub fn sync_up(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport.sync_up().map_err(LinkError::Transport)?;
        self.sync = SyncLevel::High;
        Ok(())
    }

    /// Drive the sync line low
    pub fn sync_down(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport.sync_down().map_err(LinkError::Transport)?;
        self.sync = SyncLevel::Low;
        Ok(())
    }

    /// Invert the sync line
    pub fn sync_toggle(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport.sync_toggle().map_err(LinkError::Transport)?;
        self.sync = self.sync.toggled();
        Ok(())
    }

    /// State the last handshake left the link in
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Sync line level as last driven by this link
    pub fn sync_level(&self) -> SyncLevel {
        self.sync
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Bytes left in the receive buffer (empty between handshakes)
    pub fn receive_buffer(&self) -> &[u8] {
        self.rx.line()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn release(self) -> T {
        self.transport
    }

    fn handshake(&mut self, cmd: ControlCommand) -> Result<(), LinkError<T::Error>> {
        let previous = self.state;
        self.state = self.state.transition(LinkEvent::Begin(cmd));

        match self.exchange(cmd) {
            Ok(()) => {
                self.state = self.state.transition(LinkEvent::Accepted);
                debug!("{=str} accepted", cmd.name());
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    /// Send `cmd` and read replies until accepted, rejected, or out of attempts
    fn exchange(&mut self, cmd: ControlCommand) -> Result<(), LinkError<T::Error>> {
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            self.rx.clear();
            trace!("sending {=str}, attempt {=u8}/{=u8}", cmd.name(), attempt, attempts);
            self.send_frame(cmd.to_frame())?;

            let outcome = self.read_line();
            match outcome {
                Ok(ReadOutcome::Line) => {
                    let response = Response::from_line(self.rx.line());
                    self.rx.clear();
                    return match response {
                        Response::Ok => Ok(()),
                        Response::Rejected => {
                            warn!("{=str} rejected", cmd.name());
                            Err(LinkError::Rejected)
                        }
                    };
                }
                Ok(ReadOutcome::NoReply) => {
                    warn!("no reply to {=str} (attempt {=u8}/{=u8})", cmd.name(), attempt, attempts);
                }
                Err(e) => {
                    self.rx.clear();
                    warn!("{=str} reply overflowed receive buffer", cmd.name());
                    return Err(e.into());
                }
            }
        }

        self.rx.clear();
        Err(LinkError::Timeout)
    }

    /// Accumulate bytes until the terminator or a read failure
    ///
    /// On overflow the rest of the line is drained so it cannot be read
    /// as the reply to the next command.
    fn read_line(&mut self) -> Result<ReadOutcome, LineError> {
        loop {
            let byte = match self.transport.read() {
                Ok(byte) => byte,
                Err(_) => return Ok(ReadOutcome::NoReply),
            };
            match self.rx.push(byte) {
                Ok(true) => return Ok(ReadOutcome::Line),
                Ok(false) => {}
                Err(e) => {
                    if byte != FRAME_TERMINATOR {
                        self.discard_line();
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Read and drop bytes up to the terminator or a read failure
    fn discard_line(&mut self) {
        while let Ok(byte) = self.transport.read() {
            if byte == FRAME_TERMINATOR {
                break;
            }
        }
    }

    /// Stream a frame to the transport, stopping at the first failure
    fn send_frame(&mut self, frame: Frame<'_>) -> Result<(), LinkError<T::Error>> {
        for byte in frame.bytes() {
            self.transport.send(byte).map_err(LinkError::Transport)?;
        }
        Ok(())
    }
}
