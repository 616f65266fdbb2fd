//! Link and sync line state
//!
//! The link state is informational. Every operation is allowed in every
//! state; the state only records where the last handshake left off.

use openept_protocol::ControlCommand;

/// Logical link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No session, or the last STOP was accepted
    #[default]
    Idle,
    /// START sent, waiting for the reply
    Starting,
    /// START accepted
    Linked,
    /// STOP sent, waiting for the reply
    Stopping,
}

/// Handshake progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// A control command is about to be sent
    Begin(ControlCommand),
    /// The acquisition device answered `OK`
    Accepted,
}

impl LinkState {
    /// Check if a START has been accepted and not yet stopped
    pub fn is_linked(&self) -> bool {
        matches!(self, LinkState::Linked)
    }

    /// Check if a handshake is in progress
    pub fn is_handshaking(&self) -> bool {
        matches!(self, LinkState::Starting | LinkState::Stopping)
    }

    /// Process an event and return the next state
    ///
    /// Failed handshakes have no event; the link restores the state it
    /// had before the command was sent.
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkState::*;

        match (self, event) {
            (_, LinkEvent::Begin(ControlCommand::Start)) => Starting,
            (_, LinkEvent::Begin(ControlCommand::Stop)) => Stopping,
            (Starting, LinkEvent::Accepted) => Linked,
            (Stopping, LinkEvent::Accepted) => Idle,
            (state, LinkEvent::Accepted) => state,
        }
    }
}

/// Level of the sync line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncLevel {
    #[default]
    Low,
    High,
}

impl SyncLevel {
    /// The opposite level
    pub fn toggled(self) -> Self {
        match self {
            SyncLevel::Low => SyncLevel::High,
            SyncLevel::High => SyncLevel::Low,
        }
    }

    pub fn is_high(self) -> bool {
        self == SyncLevel::High
    }
}

impl From<bool> for SyncLevel {
    fn from(high: bool) -> Self {
        if high {
            SyncLevel::High
        } else {
            SyncLevel::Low
        }
    }
}
