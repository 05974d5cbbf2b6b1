//! Link actor
//!
//! This module provides the async actor that owns the transmitter session.
//! Transport bytes, port lifecycle, the handshake timer and switcher
//! snapshot changes are all delivered into one `select!` loop, so every
//! transition runs on a single serialized context.
//!
//! The serial I/O side talks to the actor through channels: inbound bytes
//! arrive as [`LinkCommand::DataReceived`], outbound lines leave through the
//! writer channel registered with [`LinkCommand::PortOpened`]. Writes are
//! fire-and-forget; a failed write tears the session down.

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use tally_protocol::{compute_status, TallyState};

use crate::error::LinkError;
use crate::events::LinkEvent;
use crate::session::{LinkSession, SessionEvent};
use crate::state::{LinkState, SwitcherSnapshot};

/// Tuning knobs for the link actor
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// How long to wait for the Pong after opening a port
    pub handshake_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_millis(500),
        }
    }
}

/// Commands sent to the link actor
#[derive(Debug)]
pub enum LinkCommand {
    /// A candidate port was opened; begin the handshake
    PortOpened {
        /// Port name, for events and logging
        port: String,
        /// Channel carrying outbound transport lines to the serial writer
        writer: mpsc::Sender<Vec<u8>>,
    },

    /// Raw bytes read from the port
    DataReceived {
        /// Raw bytes, in whatever chunks the transport produced
        data: Vec<u8>,
    },

    /// The transport reported an I/O error
    PortError {
        /// Error description from the transport
        message: String,
    },

    /// The port was closed
    PortClosed,

    /// The port was removed from the system
    PortRemoved,

    /// Manual test trigger for the transmitter
    SendTest,

    /// Shutdown the actor
    Shutdown,
}

/// Internal state for the link actor
struct LinkActorState {
    session: LinkSession,
    /// Writer half of the open port, if one is held
    writer: Option<mpsc::Sender<Vec<u8>>>,
    /// Name of the held port
    port: Option<String>,
    /// Handshake deadline while awaiting the Pong
    deadline: Option<Instant>,
    /// Last tally sequence put on the wire, for duplicate suppression
    last_status: Option<Vec<TallyState>>,
}

impl LinkActorState {
    fn new() -> Self {
        Self {
            session: LinkSession::new(),
            writer: None,
            port: None,
            deadline: None,
            last_status: None,
        }
    }

    fn port_name(&self) -> String {
        self.port.clone().unwrap_or_default()
    }
}

/// Run the link actor until shutdown
///
/// * `cmd_rx` — commands from the serial I/O side and the host
/// * `snapshot_rx` — switcher snapshots published by the store
/// * `event_tx` — unified event stream out
pub async fn run_link_actor(
    config: LinkConfig,
    mut cmd_rx: mpsc::Receiver<LinkCommand>,
    mut snapshot_rx: watch::Receiver<SwitcherSnapshot>,
    event_tx: mpsc::Sender<LinkEvent>,
) {
    let mut state = LinkActorState::new();
    let mut snapshot_open = true;
    info!("Link actor started");

    loop {
        let deadline = state.deadline;
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                if !handle_command(&config, &mut state, cmd, &snapshot_rx, &event_tx).await {
                    break;
                }
            }

            changed = snapshot_rx.changed(), if snapshot_open => {
                if changed.is_err() {
                    // Store dropped; keep serving port commands
                    snapshot_open = false;
                    continue;
                }
                let snapshot = snapshot_rx.borrow_and_update().clone();
                send_status(&mut state, &event_tx, &snapshot).await;
            }

            _ = async { sleep_until(deadline.unwrap_or_else(Instant::now)).await }, if deadline.is_some() => {
                if state.session.handle_timeout() {
                    warn!("Handshake timed out on {}", state.port_name());
                    teardown(&mut state, &event_tx, LinkError::HandshakeTimeout).await;
                }
            }
        }
    }

    info!("Link actor stopped");
}

/// Process one command; returns false on shutdown
async fn handle_command(
    config: &LinkConfig,
    state: &mut LinkActorState,
    cmd: LinkCommand,
    snapshot_rx: &watch::Receiver<SwitcherSnapshot>,
    event_tx: &mpsc::Sender<LinkEvent>,
) -> bool {
    match cmd {
        LinkCommand::PortOpened { port, writer } => {
            if state.writer.is_some() {
                warn!(
                    "Ignoring port {}: a session already holds {}",
                    port,
                    state.port_name()
                );
                return true;
            }

            info!("Port {} opened, starting handshake", port);
            state.writer = Some(writer);
            state.port = Some(port);
            state.session.open();
            state.deadline = Some(Instant::now() + config.handshake_timeout);
            flush(state, event_tx).await;
        }

        LinkCommand::DataReceived { data } => {
            if state.writer.is_none() {
                // Bytes from a port we already released
                return true;
            }
            debug!("IN  <- {:02X?}", &data[..data.len().min(64)]);

            for event in state.session.handle_data(&data) {
                match event {
                    SessionEvent::HandshakeComplete => {
                        state.deadline = None;
                        info!("Transmitter connected on {}", state.port_name());
                        let _ = event_tx
                            .send(LinkEvent::Connected {
                                port: state.port_name(),
                            })
                            .await;

                        // First status goes out right away so the lights
                        // match the switcher before anything changes
                        let snapshot = snapshot_rx.borrow().clone();
                        send_status(state, event_tx, &snapshot).await;
                    }
                    SessionEvent::DeviceError { payload } => {
                        let _ = event_tx.send(LinkEvent::DeviceError { payload }).await;
                    }
                    SessionEvent::FrameRejected { error } => {
                        let _ = event_tx.send(LinkEvent::FrameRejected { error }).await;
                    }
                }
            }
        }

        LinkCommand::PortError { message } => {
            teardown(state, event_tx, LinkError::Transport(message)).await;
        }

        LinkCommand::PortClosed => {
            teardown(state, event_tx, LinkError::PortClosed).await;
        }

        LinkCommand::PortRemoved => {
            teardown(state, event_tx, LinkError::PortRemoved).await;
        }

        LinkCommand::SendTest => {
            if state.session.send_test() {
                flush(state, event_tx).await;
                let _ = event_tx.send(LinkEvent::TestSent).await;
            } else {
                debug!("Dropping test command; transmitter not connected");
            }
        }

        LinkCommand::Shutdown => return false,
    }

    true
}

/// Recompute the tally sequence and send it when it changed
async fn send_status(
    state: &mut LinkActorState,
    event_tx: &mpsc::Sender<LinkEvent>,
    snapshot: &SwitcherSnapshot,
) {
    if state.session.state() != LinkState::Connected {
        return;
    }

    let tallies = compute_status(
        &snapshot.external_ids(),
        snapshot.preview_id,
        snapshot.program_id,
    );
    if state.last_status.as_ref() == Some(&tallies) {
        return;
    }

    if state.session.send_status(&tallies) {
        flush(state, event_tx).await;
        state.last_status = Some(tallies.clone());
        let _ = event_tx.send(LinkEvent::StatusSent { tallies }).await;
    }
}

/// Push queued outbound lines to the serial writer
async fn flush(state: &mut LinkActorState, event_tx: &mpsc::Sender<LinkEvent>) {
    let lines = state.session.take_output();
    let Some(writer) = state.writer.clone() else {
        return;
    };

    for line in lines {
        debug!("OUT -> {}", String::from_utf8_lossy(&line).trim_end());
        if writer.send(line).await.is_err() {
            teardown(
                state,
                event_tx,
                LinkError::Transport("writer channel closed".to_string()),
            )
            .await;
            return;
        }
    }
}

/// Release the port and report the session's end
async fn teardown(state: &mut LinkActorState, event_tx: &mpsc::Sender<LinkEvent>, reason: LinkError) {
    if state.writer.is_none() && state.session.state() == LinkState::Disconnected {
        return;
    }

    let port = state.port.take().unwrap_or_default();
    warn!("Link on {} closed: {}", port, reason);

    state.session.close();
    state.writer = None;
    state.deadline = None;
    state.last_status = None;

    let _ = event_tx.send(LinkEvent::Disconnected { port, reason }).await;
}
