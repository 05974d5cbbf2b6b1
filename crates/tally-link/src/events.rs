//! Unified event stream for the link engine
//!
//! Everything observable about the link (lifecycle, outgoing status, frames
//! the device rejected or complained about) is emitted through a single
//! event channel, so a host frontend has one stream to watch.

use tally_protocol::{FrameError, TallyState};

use crate::error::LinkError;

/// Events emitted by the link actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Handshake completed; the transmitter is live
    Connected {
        /// Port the session runs on
        port: String,
    },

    /// Session torn down and the port released
    Disconnected {
        /// Port the session ran on
        port: String,
        /// Why the session ended
        reason: LinkError,
    },

    /// A status frame went out
    StatusSent {
        /// Tally sequence that was sent, in camera order
        tallies: Vec<TallyState>,
    },

    /// A manual test frame went out
    TestSent,

    /// The device reported an error; the payload is device-defined
    ///
    /// No state transition follows. Whether this should escalate is a
    /// product decision; the observed device behavior is advisory only.
    DeviceError { payload: Vec<u8> },

    /// An inbound line failed to decode and was discarded
    FrameRejected { error: FrameError },
}
