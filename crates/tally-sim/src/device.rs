//! Virtual tally transmitter
//!
//! Speaks the device side of the wire protocol through the real codec:
//! answers Ping with Pong, records status sequences the way the hardware
//! keeps its per-camera table, and counts test triggers. A muted device
//! (no pong) exercises the host's handshake timeout path.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tally_protocol::{
    encode_line, parse_status_payload, LineCodec, MessageType, TallyState,
};

/// Configuration for creating a virtual transmitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualTallyConfig {
    /// Whether the device answers pings; false simulates dead hardware
    pub respond_to_ping: bool,
    /// Camera states preloaded before any status frame arrives
    #[serde(default)]
    pub initial_status: Vec<TallyState>,
}

impl Default for VirtualTallyConfig {
    fn default() -> Self {
        Self {
            respond_to_ping: true,
            initial_status: Vec::new(),
        }
    }
}

/// A simulated transmitter with protocol-accurate behavior
#[derive(Debug, Default)]
pub struct VirtualTally {
    codec: LineCodec,
    /// Pending output lines (device -> host)
    pending_output: VecDeque<Vec<u8>>,
    /// Last status sequence received, in camera order
    camera_status: Vec<TallyState>,
    /// Number of test triggers received
    test_count: u32,
    /// Lines that failed to decode or carried bad payloads
    rejected_count: u32,
    mute: bool,
}

impl VirtualTally {
    /// Create a responsive virtual transmitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from configuration
    pub fn from_config(config: VirtualTallyConfig) -> Self {
        Self {
            mute: !config.respond_to_ping,
            camera_status: config.initial_status,
            ..Self::default()
        }
    }

    /// Create a device that never answers the handshake
    pub fn muted() -> Self {
        Self::from_config(VirtualTallyConfig {
            respond_to_ping: false,
            ..VirtualTallyConfig::default()
        })
    }

    /// Feed host transport bytes into the device
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.codec.push_bytes(data);
        while let Some(result) = self.codec.next_frame() {
            match result {
                Ok(frame) => self.handle_frame(frame.message_type, &frame.payload),
                Err(e) => {
                    debug!("Virtual tally rejected a line: {}", e);
                    self.rejected_count += 1;
                }
            }
        }
    }

    fn handle_frame(&mut self, message_type: MessageType, payload: &[u8]) {
        match message_type {
            MessageType::Ping => {
                if !self.mute {
                    self.pending_output.push_back(encode_line(MessageType::Pong, &[]));
                }
            }
            MessageType::Status => match parse_status_payload(payload) {
                Some(tallies) => self.camera_status = tallies,
                None => {
                    debug!("Virtual tally received a malformed status payload");
                    self.rejected_count += 1;
                    self.pending_output
                        .push_back(encode_line(MessageType::Error, &[0x01]));
                }
            },
            MessageType::Test => {
                self.test_count += 1;
            }
            other => {
                debug!("Virtual tally ignoring {:?} frame", other);
            }
        }
    }

    /// Queue a device-originated error frame
    pub fn inject_error(&mut self, payload: &[u8]) {
        self.pending_output
            .push_back(encode_line(MessageType::Error, payload));
    }

    /// Next pending output line (device -> host)
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.pending_output.pop_front()
    }

    /// Drain all pending output into one byte stream
    pub fn take_all_output(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(line) = self.pending_output.pop_front() {
            out.extend_from_slice(&line);
        }
        out
    }

    /// Last recorded status sequence, in camera order
    pub fn camera_status(&self) -> &[TallyState] {
        &self.camera_status
    }

    /// State of one camera slot (zero-based)
    pub fn tally_for(&self, camera: usize) -> Option<TallyState> {
        self.camera_status.get(camera).copied()
    }

    /// Number of test triggers seen
    pub fn test_count(&self) -> u32 {
        self.test_count
    }

    /// Number of lines the device threw away
    pub fn rejected_count(&self) -> u32 {
        self.rejected_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_protocol::status_payload;

    #[test]
    fn answers_ping_with_pong() {
        let mut device = VirtualTally::new();
        device.push_bytes(&encode_line(MessageType::Ping, &[]));

        let reply = device.take_output().unwrap();
        let mut codec = LineCodec::new();
        codec.push_bytes(&reply);
        let frame = codec.next_frame().unwrap().unwrap();
        assert_eq!(frame.message_type, MessageType::Pong);
        assert!(device.take_output().is_none());
    }

    #[test]
    fn muted_device_stays_silent() {
        let mut device = VirtualTally::muted();
        device.push_bytes(&encode_line(MessageType::Ping, &[]));
        assert!(device.take_output().is_none());
    }

    #[test]
    fn records_status_frames() {
        let mut device = VirtualTally::new();
        let tallies = [TallyState::Program, TallyState::Preview, TallyState::Standby];
        device.push_bytes(&encode_line(MessageType::Status, &status_payload(&tallies)));

        assert_eq!(device.camera_status(), &tallies);
        assert_eq!(device.tally_for(0), Some(TallyState::Program));
        assert_eq!(device.tally_for(3), None);
    }

    #[test]
    fn malformed_status_payload_is_answered_with_error() {
        let mut device = VirtualTally::new();
        // Count byte claims three cameras, one state supplied
        device.push_bytes(&encode_line(MessageType::Status, &[3, 0]));

        assert_eq!(device.rejected_count(), 1);
        let reply = device.take_output().unwrap();
        let mut codec = LineCodec::new();
        codec.push_bytes(&reply);
        assert_eq!(
            codec.next_frame().unwrap().unwrap().message_type,
            MessageType::Error
        );
    }

    #[test]
    fn counts_test_triggers() {
        let mut device = VirtualTally::new();
        device.push_bytes(&encode_line(MessageType::Test, &[0xFF]));
        device.push_bytes(&encode_line(MessageType::Test, &[0xFF]));
        assert_eq!(device.test_count(), 2);
    }

    #[test]
    fn garbage_lines_are_counted_and_skipped() {
        let mut device = VirtualTally::new();
        device.push_bytes(b"nothex\n");
        device.push_bytes(&encode_line(MessageType::Ping, &[]));

        assert_eq!(device.rejected_count(), 1);
        assert!(device.take_output().is_some());
    }
}
