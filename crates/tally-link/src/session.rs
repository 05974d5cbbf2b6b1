//! Synchronous link session engine
//!
//! The session is the protocol state machine, free of I/O and timers so it
//! can be unit-tested in isolation. The async actor feeds it transport
//! bytes and timer expiry, and drains queued outbound lines with
//! [`LinkSession::take_output`].
//!
//! State transitions:
//!
//! - `Disconnected -> AwaitingHandshake` on [`LinkSession::open`]: a Ping is
//!   queued; the caller arms the handshake timer.
//! - `AwaitingHandshake -> Connected` on a decoded Pong; the caller cancels
//!   the timer and sends the first status frame.
//! - any state `-> Disconnected` on [`LinkSession::close`] or a timer fired
//!   into [`LinkSession::handle_timeout`].
//!
//! While not `Connected`, application sends (status, test) are silently
//! dropped; only the handshake Ping goes out.

use tracing::{debug, warn};

use tally_protocol::{encode_line, status_payload, LineCodec, MessageType, TallyState};

use crate::state::LinkState;

/// What a chunk of inbound bytes produced, beyond log lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A Pong completed the handshake
    HandshakeComplete,
    /// The device sent an Error frame; logged, no transition
    DeviceError { payload: Vec<u8> },
    /// A line failed to decode and was discarded
    FrameRejected { error: tally_protocol::FrameError },
}

/// Protocol state machine for one transmitter link
#[derive(Debug, Default)]
pub struct LinkSession {
    state: LinkState,
    codec: LineCodec,
    outbound: Vec<Vec<u8>>,
}

impl LinkSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Begin the handshake after a port was opened
    ///
    /// Queues the Ping; the caller must arm the handshake timer.
    pub fn open(&mut self) {
        self.state = LinkState::AwaitingHandshake;
        self.outbound.push(encode_line(MessageType::Ping, &[]));
    }

    /// Tear down: clear buffers and return to `Disconnected`
    pub fn close(&mut self) {
        self.state = LinkState::Disconnected;
        self.codec.clear();
        self.outbound.clear();
    }

    /// Handshake timer fired; returns true if it ended the session
    pub fn handle_timeout(&mut self) -> bool {
        if self.state == LinkState::AwaitingHandshake {
            self.close();
            true
        } else {
            false
        }
    }

    /// Feed inbound transport bytes and dispatch every decoded frame
    pub fn handle_data(&mut self, data: &[u8]) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.codec.push_bytes(data);

        while let Some(result) = self.codec.next_frame() {
            match result {
                Ok(frame) => match frame.message_type {
                    MessageType::Pong => {
                        if self.state == LinkState::AwaitingHandshake {
                            self.state = LinkState::Connected;
                            events.push(SessionEvent::HandshakeComplete);
                        } else {
                            debug!("Ignoring pong in state {:?}", self.state);
                        }
                    }
                    MessageType::Error => {
                        warn!("Transmitter reported an error: {:02X?}", frame.payload);
                        events.push(SessionEvent::DeviceError {
                            payload: frame.payload,
                        });
                    }
                    other => {
                        debug!("Ignoring inbound {:?} frame", other);
                    }
                },
                Err(error) => {
                    warn!("Discarding invalid line: {}", error);
                    events.push(SessionEvent::FrameRejected { error });
                }
            }
        }

        events
    }

    /// Queue a status frame; dropped unless connected with a non-empty sequence
    pub fn send_status(&mut self, tallies: &[TallyState]) -> bool {
        if self.state != LinkState::Connected || tallies.is_empty() {
            return false;
        }
        self.outbound
            .push(encode_line(MessageType::Status, &status_payload(tallies)));
        true
    }

    /// Queue a manual test frame; dropped unless connected
    pub fn send_test(&mut self) -> bool {
        if self.state != LinkState::Connected {
            return false;
        }
        self.outbound.push(encode_line(MessageType::Test, &[0xFF]));
        true
    }

    /// Drain the queued outbound transport lines
    pub fn take_output(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbound)
    }
}
