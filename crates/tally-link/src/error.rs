//! Error types for the link engine

use thiserror::Error;

/// Reasons a transmitter session is torn down
///
/// Any of these forces the session back to `Disconnected` and releases the
/// port. None of them is retried automatically; the next attempt happens
/// when a new candidate port shows up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No Pong arrived before the handshake deadline
    #[error("no response from the transmitter")]
    HandshakeTimeout,

    /// The serial transport reported an I/O error
    #[error("serial transport error: {0}")]
    Transport(String),

    /// The serial port was closed
    #[error("serial port closed")]
    PortClosed,

    /// The serial port was removed from the system
    #[error("serial port removed from system")]
    PortRemoved,
}

/// Result codes the switcher API reports for a connect attempt
pub mod connect_codes {
    pub const SUCCESS: u32 = 0;
    pub const NO_RESPONSE: u32 = 0x6366_6E72;
    pub const INCOMPATIBLE_FIRMWARE: u32 = 0x6366_6966;
}

/// A failed switcher connect attempt, classified
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailure {
    /// The switcher did not answer at the given address
    #[error("no response from switcher")]
    NoResponse,

    /// The switcher answered but its firmware is unsupported
    #[error("switcher has incompatible firmware")]
    IncompatibleFirmware,

    /// Any other result code
    #[error("failed to connect to switcher: code 0x{0:08X}")]
    Unknown(u32),
}

impl ConnectFailure {
    /// Classify a raw switcher result code
    pub fn check(code: u32) -> Result<(), ConnectFailure> {
        match code {
            connect_codes::SUCCESS => Ok(()),
            connect_codes::NO_RESPONSE => Err(ConnectFailure::NoResponse),
            connect_codes::INCOMPATIBLE_FIRMWARE => Err(ConnectFailure::IncompatibleFirmware),
            other => Err(ConnectFailure::Unknown(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_connect_codes() {
        assert_eq!(ConnectFailure::check(0), Ok(()));
        assert_eq!(
            ConnectFailure::check(0x6366_6E72),
            Err(ConnectFailure::NoResponse)
        );
        assert_eq!(
            ConnectFailure::check(0x6366_6966),
            Err(ConnectFailure::IncompatibleFirmware)
        );
        assert_eq!(
            ConnectFailure::check(0xDEAD_BEEF),
            Err(ConnectFailure::Unknown(0xDEAD_BEEF))
        );
    }
}
