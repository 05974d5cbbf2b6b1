//! Error types for frame decoding

use thiserror::Error;

/// Errors that can occur while decoding a transport line into a frame
///
/// All of these are recoverable: the offending line is discarded and the
/// stream keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Frame shorter than the minimum of length + type + 2 CRC bytes
    #[error("malformed frame: {0} bytes")]
    MalformedFrame(usize),

    /// Length byte disagrees with the decoded byte count
    #[error("length byte says {declared} but frame has {actual} bytes")]
    LengthMismatch { declared: u8, actual: usize },

    /// Recomputed CRC differs from the trailing CRC bytes
    #[error("checksum mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// Line was not valid hexadecimal
    #[error("line is not valid hex: {0:?}")]
    InvalidHex(String),
}
