//! Tally Simulation Library
//!
//! This crate provides a simulation layer for testing the tally bridge
//! without physical hardware. It includes:
//!
//! - **VirtualTally**: protocol-accurate transmitter device (answers pings,
//!   records status frames)
//! - **VirtualSwitcher**: a `SwitcherApi` implementation with settable
//!   preview/program buses and callback emission
//!
//! # Example
//!
//! ```rust
//! use tally_sim::VirtualTally;
//! use tally_protocol::{encode_line, MessageType};
//!
//! let mut device = VirtualTally::new();
//! device.push_bytes(&encode_line(MessageType::Ping, &[]));
//!
//! // The device answers with a pong line
//! assert!(device.take_output().is_some());
//! ```

pub mod device;
pub mod switcher;

pub use device::{VirtualTally, VirtualTallyConfig};
pub use switcher::VirtualSwitcher;
