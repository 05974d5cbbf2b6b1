//! Automatic switcher connection on USB hotplug
//!
//! When switcher hardware appears on the USB bus the host quietly tries to
//! connect over the local transport. Failures are suppressed: the user never
//! asked, so they get no alert; the attempt simply repeats on the next
//! matching hotplug event. Removal events carry no action here — the
//! switcher adapter reports its own disconnects.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use tally_detect::usb_ids::is_switcher_device;

use crate::switcher::SwitcherStore;

/// USB hotplug notifications, as delivered by a platform watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbDeviceEvent {
    /// A device appeared
    Added { vendor_id: u16, class_id: u16 },
    /// A device went away
    Removed,
}

/// React to hotplug events with quiet switcher connects
pub async fn run_auto_connect(store: Arc<SwitcherStore>, mut usb_rx: mpsc::Receiver<UsbDeviceEvent>) {
    while let Some(event) = usb_rx.recv().await {
        match event {
            UsbDeviceEvent::Added {
                vendor_id,
                class_id,
            } => {
                if !is_switcher_device(vendor_id, class_id) {
                    continue;
                }
                if store.snapshot().connected {
                    continue;
                }

                info!("Switcher hardware attached, attempting automatic connection");
                // Local USB transport; no address
                if let Err(e) = store.connect("") {
                    debug!("Automatic switcher connection failed: {}", e);
                }
            }
            UsbDeviceEvent::Removed => {}
        }
    }
    debug!("USB hotplug channel closed");
}
