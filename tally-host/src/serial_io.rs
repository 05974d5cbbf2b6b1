//! Async serial I/O for the transmitter link
//!
//! The open port lives in its own spawned task. Inbound bytes are forwarded
//! to the link actor as commands; outbound lines arrive through the writer
//! channel the actor holds. The task ends when the writer channel closes
//! (the actor released the port) or the transport fails, and every failure
//! is reported back as a port lifecycle command.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use tally_link::LinkCommand;

/// Serial connection to the tally transmitter
pub struct TransmitterIo {
    port_name: String,
    stream: SerialStream,
    link_tx: mpsc::Sender<LinkCommand>,
    writer_rx: mpsc::Receiver<Vec<u8>>,
    buffer: Vec<u8>,
}

impl TransmitterIo {
    /// Open the port and create the writer channel for the actor
    pub fn connect(
        port_name: &str,
        baud_rate: u32,
        link_tx: mpsc::Sender<LinkCommand>,
    ) -> Result<(Self, mpsc::Sender<Vec<u8>>), tokio_serial::Error> {
        let stream = tokio_serial::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open_native_async()?;

        let (writer_tx, writer_rx) = mpsc::channel(64);
        Ok((
            Self {
                port_name: port_name.to_string(),
                stream,
                link_tx,
                writer_rx,
                buffer: vec![0u8; 1024],
            },
            writer_tx,
        ))
    }

    /// Run until the actor releases the port or the transport fails
    pub async fn run_io_loop(mut self) {
        info!("Starting transmitter I/O on {}", self.port_name);

        loop {
            tokio::select! {
                line = self.writer_rx.recv() => {
                    match line {
                        Some(data) => {
                            if let Err(e) = self.write(&data).await {
                                warn!("Write error on {}: {}", self.port_name, e);
                                let _ = self.link_tx.send(LinkCommand::PortError {
                                    message: e.to_string(),
                                }).await;
                                break;
                            }
                        }
                        None => {
                            debug!("Writer channel closed for {}", self.port_name);
                            let _ = self.link_tx.send(LinkCommand::PortClosed).await;
                            break;
                        }
                    }
                }

                result = self.stream.read(&mut self.buffer) => {
                    match result {
                        Ok(0) => {
                            // EOF usually means the adapter was unplugged
                            warn!("Serial port {} went away", self.port_name);
                            let _ = self.link_tx.send(LinkCommand::PortRemoved).await;
                            break;
                        }
                        Ok(n) => {
                            let data = self.buffer[..n].to_vec();
                            debug!("Read {} bytes from {}", n, self.port_name);
                            let _ = self.link_tx.send(LinkCommand::DataReceived { data }).await;
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                        Err(e) => {
                            warn!("Read error on {}: {}", self.port_name, e);
                            let _ = self.link_tx.send(LinkCommand::PortError {
                                message: e.to_string(),
                            }).await;
                            break;
                        }
                    }
                }
            }
        }

        info!("Transmitter I/O ended for {}", self.port_name);
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), std::io::Error> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
