//! Tally Transmitter Detection Library
//!
//! This crate provides serial port enumeration and selection of the tally
//! transmitter among the attached serial devices. The transmitter is
//! identified passively by the USB id of its serial adapter; no bytes are
//! written to candidate ports.
//!
//! # Example
//!
//! ```rust,no_run
//! use tally_detect::{select_port, PortScanner};
//!
//! let scanner = PortScanner::new();
//! let ports = scanner.enumerate_ports().unwrap();
//!
//! if let Some(port) = select_port(&ports, false) {
//!     println!("transmitter candidate: {}", port.port);
//! }
//! ```

pub mod error;
pub mod scanner;
pub mod selector;
pub mod usb_ids;

pub use error::DetectError;
pub use scanner::{PortScanner, ScannerConfig, SerialPortInfo};
pub use selector::select_port;
