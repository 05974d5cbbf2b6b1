//! Streaming transport codec
//!
//! Inbound serial bytes arrive in arbitrary chunks. The codec accumulates
//! them, splits on line feeds, hex-decodes each complete line and decodes
//! the result into a [`Frame`]. Decode failures are yielded to the caller so
//! the session can log them; they never stall the stream.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::FrameError;
use crate::frame::{decode_frame, Frame, LINE_TERMINATOR};

/// Buffered bytes allowed without a line feed before the buffer is dropped
///
/// A desynchronized stream (wrong baud rate, device rebooting mid-line)
/// would otherwise grow the buffer without bound; valid frames are far
/// shorter than this.
pub const MAX_PENDING_BYTES: usize = 20;

/// Split buffered bytes into decoded frames and the unconsumed remainder
///
/// Every line-feed-terminated segment is hex-decoded and frame-decoded; each
/// yields either a frame or the error describing why it was discarded. The
/// remainder holds the bytes after the last line feed, or nothing when those
/// exceed [`MAX_PENDING_BYTES`].
pub fn extract_frames(buffer: &[u8]) -> (Vec<Result<Frame, FrameError>>, Vec<u8>) {
    let mut results = Vec::new();
    let mut start = 0;

    for (i, &b) in buffer.iter().enumerate() {
        if b == LINE_TERMINATOR {
            results.push(decode_line(&buffer[start..i]));
            start = i + 1;
        }
    }

    let remainder = &buffer[start..];
    if remainder.len() > MAX_PENDING_BYTES {
        debug!(
            "Dropping {} buffered bytes with no line feed",
            remainder.len()
        );
        (results, Vec::new())
    } else {
        (results, remainder.to_vec())
    }
}

fn decode_line(line: &[u8]) -> Result<Frame, FrameError> {
    let raw = hex::decode(line)
        .map_err(|_| FrameError::InvalidHex(String::from_utf8_lossy(line).into_owned()))?;
    decode_frame(&raw)
}

/// Streaming codec over the hex/line transport
///
/// Push raw bytes in, pull decode results out.
#[derive(Debug, Default)]
pub struct LineCodec {
    buffer: Vec<u8>,
    decoded: VecDeque<Result<Frame, FrameError>>,
}

impl LineCodec {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
            decoded: VecDeque::new(),
        }
    }

    /// Append raw transport bytes and decode any completed lines
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        let (results, remainder) = extract_frames(&self.buffer);
        self.buffer = remainder;
        self.decoded.extend(results);
    }

    /// Next decode result, if a complete line has been seen
    pub fn next_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        self.decoded.pop_front()
    }

    /// Bytes held waiting for a line feed
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered bytes and undelivered results
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.decoded.clear();
    }
}
