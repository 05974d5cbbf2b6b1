//! Transmitter port discovery
//!
//! On platforms with a native USB watcher, port arrival events would drive
//! this directly; the host falls back to periodic rescans from the
//! supervisor loop. Either way, a candidate is only ever opened while no
//! session holds a port.

use tokio::sync::mpsc;
use tracing::warn;

use tally_detect::{select_port, PortScanner};
use tally_link::LinkCommand;

use crate::serial_io::TransmitterIo;

/// Scan for the transmitter and hand a freshly opened port to the actor
///
/// Returns true when a port was opened and the handshake kicked off.
pub async fn try_attach_transmitter(
    scanner: &PortScanner,
    baud_rate: u32,
    port_override: Option<&str>,
    link_tx: &mpsc::Sender<LinkCommand>,
) -> bool {
    let candidate = match port_override {
        Some(port) => Some(port.to_string()),
        None => {
            let ports = match scanner.enumerate_ports() {
                Ok(ports) => ports,
                Err(e) => {
                    warn!("Port enumeration failed: {}", e);
                    return false;
                }
            };
            select_port(&ports, false).map(|p| p.port.clone())
        }
    };

    let Some(port) = candidate else {
        return false;
    };

    match TransmitterIo::connect(&port, baud_rate, link_tx.clone()) {
        Ok((io, writer_tx)) => {
            tokio::spawn(io.run_io_loop());
            let _ = link_tx
                .send(LinkCommand::PortOpened {
                    port,
                    writer: writer_tx,
                })
                .await;
            true
        }
        Err(e) => {
            warn!("Failed to open {}: {}", port, e);
            false
        }
    }
}
