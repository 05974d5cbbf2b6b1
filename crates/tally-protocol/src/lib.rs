//! Tally Transmitter Wire Protocol
//!
//! This crate implements the binary protocol spoken between the host and the
//! serial tally transmitter. A frame is `[length][type][payload..][crc16]`,
//! hex-encoded to ASCII and sent one frame per line-feed-terminated line.
//!
//! The crate is pure: no I/O, no async. The link engine feeds raw transport
//! bytes into [`LineCodec`] and takes decoded [`Frame`]s back out.
//!
//! # Example
//!
//! ```rust
//! use tally_protocol::{encode_line, decode_frame, Frame, MessageType};
//!
//! let line = encode_line(MessageType::Ping, &[]);
//! assert_eq!(line, b"0403fd87\n");
//! ```

pub mod codec;
pub mod error;
pub mod frame;
pub mod tally;

pub use codec::{extract_frames, LineCodec, MAX_PENDING_BYTES};
pub use error::FrameError;
pub use frame::{crc16, decode_frame, encode_frame, encode_line, Frame, MessageType};
pub use tally::{compute_status, parse_status_payload, status_payload, TallyState};
