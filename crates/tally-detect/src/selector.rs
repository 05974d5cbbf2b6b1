//! Candidate port selection
//!
//! The host drives exactly one transmitter link at a time. Whenever new
//! candidates appear the selector picks at most one port; it is never
//! consulted on removal (the link's own disconnect path handles that).

use tracing::debug;

use crate::scanner::SerialPortInfo;
use crate::usb_ids::is_transmitter;

/// Pick the transmitter port among the candidates, if any
///
/// Returns `None` while a session already holds a port. Otherwise returns
/// the first candidate carrying the transmitter's USB identity, in the order
/// the enumerator reported them.
pub fn select_port(candidates: &[SerialPortInfo], already_connected: bool) -> Option<&SerialPortInfo> {
    if already_connected {
        return None;
    }

    let selected = candidates.iter().find(|c| is_transmitter(c.vid, c.pid));
    if let Some(port) = selected {
        debug!("Selected transmitter candidate {}", port.port);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, vid: u16, pid: u16) -> SerialPortInfo {
        SerialPortInfo {
            port: name.to_string(),
            vid: Some(vid),
            pid: Some(pid),
            serial_number: None,
            manufacturer: None,
            product: None,
        }
    }

    #[test]
    fn picks_first_transmitter_in_enumeration_order() {
        let candidates = vec![
            port("/dev/ttyUSB0", 0x10C4, 0xEA60),
            port("/dev/ttyUSB1", 0x0403, 0x6001),
            port("/dev/ttyUSB2", 0x0403, 0x6001),
        ];

        let selected = select_port(&candidates, false).unwrap();
        assert_eq!(selected.port, "/dev/ttyUSB1");
    }

    #[test]
    fn ignores_everything_while_connected() {
        let candidates = vec![port("/dev/ttyUSB0", 0x0403, 0x6001)];
        assert!(select_port(&candidates, true).is_none());
    }

    #[test]
    fn no_match_yields_none() {
        let candidates = vec![port("/dev/ttyUSB0", 0x1A86, 0x7523)];
        assert!(select_port(&candidates, false).is_none());
    }

    #[test]
    fn non_usb_ports_are_skipped() {
        let candidates = vec![SerialPortInfo {
            port: "/dev/ttyS0".to_string(),
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        }];
        assert!(select_port(&candidates, false).is_none());
    }
}
