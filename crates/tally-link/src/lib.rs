//! Tally Link Engine
//!
//! This crate owns the stateful half of the tally bridge: the reactive
//! switcher snapshot, the transmitter link session with its Ping/Pong
//! handshake, and the glue that turns switcher bus changes into status
//! frames on the wire.
//!
//! # Architecture
//!
//! All transitions are funneled into one actor task so that transport bytes,
//! port lifecycle, the handshake timer and switcher updates are processed on
//! a single serialized context:
//!
//! ```text
//! SwitcherApi callbacks -> SwitcherStore -> watch<SwitcherSnapshot> ---+
//!                                                                     v
//! serial reader -------- LinkCommand::DataReceived ------------> run_link_actor
//! port lifecycle ------- LinkCommand::Port* ---------------------^     |
//!                                                                      v
//!                                                  writer channel -> serial port
//! ```
//!
//! The actor emits every observable change through a unified [`LinkEvent`]
//! stream.

pub mod actor;
pub mod autoconnect;
pub mod error;
pub mod events;
pub mod session;
pub mod state;
pub mod switcher;

pub use actor::{run_link_actor, LinkCommand, LinkConfig};
pub use autoconnect::{run_auto_connect, UsbDeviceEvent};
pub use error::{ConnectFailure, LinkError};
pub use events::LinkEvent;
pub use session::{LinkSession, SessionEvent};
pub use state::{LinkState, PortType, SwitcherInput, SwitcherSnapshot};
pub use switcher::{run_switcher_task, SwitcherApi, SwitcherEvent, SwitcherStore};
