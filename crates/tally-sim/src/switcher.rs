//! Virtual switcher
//!
//! A `SwitcherApi` implementation with settable buses, used for bench mode
//! and the integration tests. Mutations emit the same callbacks a real
//! switcher adapter would deliver.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use tally_link::{ConnectFailure, PortType, SwitcherApi, SwitcherEvent, SwitcherInput};

struct Inner {
    product_name: String,
    inputs: Vec<SwitcherInput>,
    preview: u64,
    program: u64,
    connected: bool,
    /// Result code every connect attempt reports, 0 for success
    connect_code: u32,
}

/// A simulated switcher with settable preview/program buses
#[derive(Clone)]
pub struct VirtualSwitcher {
    inner: Arc<Mutex<Inner>>,
    event_tx: mpsc::Sender<SwitcherEvent>,
}

impl VirtualSwitcher {
    /// Create a switcher with `cameras` external inputs plus the usual
    /// internal generators
    pub fn new(cameras: usize, event_tx: mpsc::Sender<SwitcherEvent>) -> Self {
        let mut inputs: Vec<SwitcherInput> = (1..=cameras as u64)
            .map(|id| SwitcherInput::external(id, format!("CAM {}", id)))
            .collect();
        inputs.push(SwitcherInput::new(1000, "Color Bars", PortType::ColorBars));
        inputs.push(SwitcherInput::new(3010, "Media Player 1", PortType::MediaPlayer));

        Self {
            inner: Arc::new(Mutex::new(Inner {
                product_name: "Virtual Switcher".to_string(),
                inputs,
                preview: 1.min(cameras as u64),
                program: 1.min(cameras as u64),
                connected: false,
                connect_code: 0,
            })),
            event_tx,
        }
    }

    /// Make every connect attempt fail with the given result code
    pub fn fail_connects_with(&self, code: u32) {
        self.inner.lock().unwrap().connect_code = code;
    }

    /// Put an input on the program bus
    pub fn set_program(&self, id: u64) {
        self.inner.lock().unwrap().program = id;
        self.emit(SwitcherEvent::ProgramChanged);
    }

    /// Put an input on the preview bus
    pub fn set_preview(&self, id: u64) {
        self.inner.lock().unwrap().preview = id;
        self.emit(SwitcherEvent::PreviewChanged);
    }

    /// Rename an input
    pub fn rename_input(&self, id: u64, name: impl Into<String>) {
        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(input) = inner.inputs.iter_mut().find(|i| i.id == id) {
                input.name = name.into();
            } else {
                warn!("Rename of unknown input {}", id);
                return;
            }
        }
        self.emit(SwitcherEvent::InputNamesChanged);
    }

    /// Drop the connection, like a network loss would
    pub fn drop_connection(&self) {
        self.inner.lock().unwrap().connected = false;
        self.emit(SwitcherEvent::Disconnected);
    }

    fn emit(&self, event: SwitcherEvent) {
        if self.event_tx.try_send(event).is_err() {
            debug!("Dropping switcher event {:?}: channel full or closed", event);
        }
    }
}

impl SwitcherApi for VirtualSwitcher {
    fn connect(&self, address: &str) -> Result<(), ConnectFailure> {
        let mut inner = self.inner.lock().unwrap();
        debug!("Virtual switcher connect to {:?}", address);
        ConnectFailure::check(inner.connect_code)?;
        inner.connected = true;
        Ok(())
    }

    fn product_name(&self) -> Option<String> {
        Some(self.inner.lock().unwrap().product_name.clone())
    }

    fn inputs(&self) -> Vec<SwitcherInput> {
        self.inner.lock().unwrap().inputs.clone()
    }

    fn preview_input(&self) -> u64 {
        self.inner.lock().unwrap().preview
    }

    fn program_input(&self) -> u64 {
        self.inner.lock().unwrap().program
    }
}
