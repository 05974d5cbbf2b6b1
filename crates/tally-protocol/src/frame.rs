//! Frame layout, CRC16 and the hex/line transport wrapping
//!
//! On-wire layout after hex decoding, in order:
//!
//! - `length`: one byte, total frame length including itself and the CRC
//! - `type`: one byte message type
//! - `payload`: zero or more bytes
//! - `crc`: CRC16 over everything above, low byte first
//!
//! Transport encoding is lowercase hex of the binary frame, one frame per
//! line, terminated by a single line feed (0x0A).

use crate::error::FrameError;

/// Line feed terminating each transport line
pub const LINE_TERMINATOR: u8 = 0x0A;

/// Minimum frame size: length + type + 2 CRC bytes
const MIN_FRAME_LEN: usize = 4;

/// Message types understood by the transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    /// Acknowledge (reserved, unused by the host)
    Ok,
    /// Manual test trigger, payload `[0xFF]`
    Test,
    /// Tally status, payload `[count, tally_1..tally_count]`
    Status,
    /// Handshake request, empty payload
    Ping,
    /// Handshake reply from the device, empty payload
    Pong,
    /// Error report from the device, payload is device-defined
    Error,
    /// Anything else; carried through so the session can log and ignore it
    Unknown(u8),
}

impl MessageType {
    /// Wire byte for this message type
    pub const fn byte(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::Test => 0x01,
            Self::Status => 0x02,
            Self::Ping => 0x03,
            Self::Pong => 0x04,
            Self::Error => 0xFF,
            Self::Unknown(b) => b,
        }
    }

    /// Classify a wire byte
    pub const fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Ok,
            0x01 => Self::Test,
            0x02 => Self::Status,
            0x03 => Self::Ping,
            0x04 => Self::Pong,
            0xFF => Self::Error,
            other => Self::Unknown(other),
        }
    }
}

/// A decoded frame: message type plus payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(message_type: MessageType, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            message_type,
            payload: payload.into(),
        }
    }
}

/// CRC16 used by the transmitter (poly 0x8001 variant, init 0)
///
/// For each byte: xor it into the high half, then for eight rounds shift
/// left and, when bit 15 was set before the shift, xor 0x8001 afterwards.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &b in data {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc <<= 1;
                crc ^= 0x8001;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Encode a frame to its binary form (no hex wrapping)
///
/// The length byte counts the whole frame, so payloads are capped at
/// `255 - 4` bytes; real payloads are a handful of tally states.
pub fn encode_frame(message_type: MessageType, payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= u8::MAX as usize - MIN_FRAME_LEN);
    let mut bytes = Vec::with_capacity(payload.len() + MIN_FRAME_LEN);
    bytes.push((payload.len() + MIN_FRAME_LEN) as u8);
    bytes.push(message_type.byte());
    bytes.extend_from_slice(payload);

    let crc = crc16(&bytes);
    bytes.push((crc & 0xFF) as u8);
    bytes.push((crc >> 8) as u8);
    bytes
}

/// Encode a frame to a complete transport line (lowercase hex + line feed)
pub fn encode_line(message_type: MessageType, payload: &[u8]) -> Vec<u8> {
    let mut line = hex::encode(encode_frame(message_type, payload)).into_bytes();
    line.push(LINE_TERMINATOR);
    line
}

/// Decode a binary frame (after hex decoding, without the line feed)
pub fn decode_frame(raw: &[u8]) -> Result<Frame, FrameError> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(FrameError::MalformedFrame(raw.len()));
    }

    if raw[0] as usize != raw.len() {
        return Err(FrameError::LengthMismatch {
            declared: raw[0],
            actual: raw.len(),
        });
    }

    let body = &raw[..raw.len() - 2];
    let expected = crc16(body);
    let actual = raw[raw.len() - 2] as u16 | ((raw[raw.len() - 1] as u16) << 8);
    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(Frame {
        message_type: MessageType::from_byte(raw[1]),
        payload: raw[2..raw.len() - 2].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn crc_fixed_vectors() {
        assert_eq!(crc16(&[0x00]), 0x0000);
        assert_eq!(crc16(&[0x01]), 0x8001);
    }

    #[test]
    fn ping_frame_bytes() {
        assert_eq!(encode_frame(MessageType::Ping, &[]), [0x04, 0x03, 0xFD, 0x87]);
        assert_eq!(encode_line(MessageType::Ping, &[]), b"0403fd87\n");
    }

    #[test]
    fn decode_rejects_short_frames() {
        assert_eq!(
            decode_frame(&[0x03, 0x03, 0xFD]),
            Err(FrameError::MalformedFrame(3))
        );
    }

    #[test]
    fn decode_rejects_length_mismatch() {
        // Declared five bytes, only four supplied
        let mut frame = encode_frame(MessageType::Ping, &[]);
        frame[0] = 0x05;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::LengthMismatch {
                declared: 0x05,
                actual: 4
            })
        );
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        let mut frame = encode_frame(MessageType::Status, &[0x01, 0x02]);
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn decode_carries_unknown_types_through() {
        let frame = encode_frame(MessageType::Unknown(0x7C), &[0xAA]);
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.message_type, MessageType::Unknown(0x7C));
        assert_eq!(decoded.payload, vec![0xAA]);
    }

    fn any_message_type() -> impl Strategy<Value = MessageType> {
        prop_oneof![
            Just(MessageType::Ok),
            Just(MessageType::Test),
            Just(MessageType::Status),
            Just(MessageType::Ping),
            Just(MessageType::Pong),
            Just(MessageType::Error),
        ]
    }

    proptest! {
        #[test]
        fn round_trip(message_type in any_message_type(), payload in proptest::collection::vec(any::<u8>(), 0..32)) {
            let frame = encode_frame(message_type, &payload);
            let decoded = decode_frame(&frame).unwrap();
            prop_assert_eq!(decoded.message_type, message_type);
            prop_assert_eq!(decoded.payload, payload);
        }

        #[test]
        fn single_bit_flip_is_rejected(
            payload in proptest::collection::vec(any::<u8>(), 0..16),
            bit in 0usize..8,
            byte_pick in any::<prop::sample::Index>(),
        ) {
            let mut frame = encode_frame(MessageType::Status, &payload);
            let byte = byte_pick.index(frame.len());
            frame[byte] ^= 1 << bit;

            let result = decode_frame(&frame);
            if byte == 0 {
                let is_length_mismatch = matches!(result, Err(FrameError::LengthMismatch { .. }));
                prop_assert!(is_length_mismatch);
            } else {
                let is_checksum_mismatch = matches!(result, Err(FrameError::ChecksumMismatch { .. }));
                prop_assert!(is_checksum_mismatch);
            }
        }
    }
}
