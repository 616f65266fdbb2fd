//! Fake transport for testing and host-side development
//!
//! Records every byte and sync operation instead of touching hardware,
//! and answers reads from a queue of scripted acquisition-device bytes.
//! An empty queue behaves like a receive timeout.

use heapless::{Deque, Vec};
use openept_hal::Transport;

/// Capacity of the recorded event log
pub const EVENT_LOG_SIZE: usize = 512;

/// Capacity of the scripted receive queue
pub const RX_QUEUE_SIZE: usize = 64;

/// One recorded transport operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireEvent {
    /// `init` was called
    Init,
    /// A byte was sent, with the sync line level at that moment
    Byte { byte: u8, sync_high: bool },
    SyncUp,
    SyncDown,
    SyncToggle,
}

/// Errors produced by [`FakeTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FakeError {
    /// Receive queue empty
    Timeout,
    /// Injected send failure
    SendFailed,
    /// Injected sync line failure
    SyncFailed,
    /// Injected init failure
    InitFailed,
    /// Event log or receive queue full
    Full,
}

/// In-memory [`Transport`]
#[derive(Debug, Default)]
pub struct FakeTransport {
    events: Vec<WireEvent, EVENT_LOG_SIZE>,
    rx: Deque<u8, RX_QUEUE_SIZE>,
    sync_high: bool,
    /// Sends left before every further send fails
    send_budget: Option<usize>,
    /// Sync operations left before every further one fails
    sync_budget: Option<usize>,
    fail_init: bool,
    reads: usize,
}

impl FakeTransport {
    /// Create a transport with an empty receive queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that will answer with `response`
    ///
    /// Fails with [`FakeError::Full`] if `response` does not fit the queue.
    pub fn with_response(response: &[u8]) -> Result<Self, FakeError> {
        let mut transport = Self::new();
        transport.queue_response(response)?;
        Ok(transport)
    }

    /// Append bytes to be returned by `read`
    pub fn queue_response(&mut self, bytes: &[u8]) -> Result<(), FakeError> {
        for &b in bytes {
            self.rx.push_back(b).map_err(|_| FakeError::Full)?;
        }
        Ok(())
    }

    /// Let `count` more sends succeed, then fail every send after that
    pub fn fail_sends_after(&mut self, count: usize) {
        self.send_budget = Some(count);
    }

    /// Let `count` more sync operations succeed, then fail every one after
    /// that without changing the line
    pub fn fail_syncs_after(&mut self, count: usize) {
        self.sync_budget = Some(count);
    }

    /// Make the next `init` fail
    pub fn fail_init(&mut self) {
        self.fail_init = true;
    }

    /// Every recorded operation, oldest first
    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    /// Only the bytes that were sent, in order
    pub fn sent_bytes(&self) -> Vec<u8, EVENT_LOG_SIZE> {
        self.events
            .iter()
            .filter_map(|e| match e {
                WireEvent::Byte { byte, .. } => Some(*byte),
                _ => None,
            })
            .collect()
    }

    /// Number of sync toggles recorded
    pub fn toggle_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, WireEvent::SyncToggle))
            .count()
    }

    /// Number of `read` calls, successful or not
    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Bytes still waiting in the receive queue
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Current sync line level
    pub fn sync_is_high(&self) -> bool {
        self.sync_high
    }

    /// Forget recorded events, keeping the queue and sync level
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.reads = 0;
    }

    fn take_sync_budget(&mut self) -> Result<(), FakeError> {
        if let Some(budget) = self.sync_budget.as_mut() {
            if *budget == 0 {
                return Err(FakeError::SyncFailed);
            }
            *budget -= 1;
        }
        Ok(())
    }

    fn record(&mut self, event: WireEvent) -> Result<(), FakeError> {
        self.events.push(event).map_err(|_| FakeError::Full)
    }
}

impl Transport for FakeTransport {
    type Error = FakeError;

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.fail_init {
            self.fail_init = false;
            return Err(FakeError::InitFailed);
        }
        self.sync_high = false;
        self.record(WireEvent::Init)
    }

    fn send(&mut self, byte: u8) -> Result<(), Self::Error> {
        if let Some(budget) = self.send_budget.as_mut() {
            if *budget == 0 {
                return Err(FakeError::SendFailed);
            }
            *budget -= 1;
        }
        let sync_high = self.sync_high;
        self.record(WireEvent::Byte { byte, sync_high })
    }

    fn read(&mut self) -> Result<u8, Self::Error> {
        self.reads += 1;
        self.rx.pop_front().ok_or(FakeError::Timeout)
    }

    fn sync_up(&mut self) -> Result<(), Self::Error> {
        self.take_sync_budget()?;
        self.sync_high = true;
        self.record(WireEvent::SyncUp)
    }

    fn sync_down(&mut self) -> Result<(), Self::Error> {
        self.take_sync_budget()?;
        self.sync_high = false;
        self.record(WireEvent::SyncDown)
    }

    fn sync_toggle(&mut self) -> Result<(), Self::Error> {
        self.take_sync_budget()?;
        self.sync_high = !self.sync_high;
        self.record(WireEvent::SyncToggle)
    }
}
