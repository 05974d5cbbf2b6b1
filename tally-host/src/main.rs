//! Tally Host
//!
//! Headless bridge between a video switcher and a serial tally transmitter.
//! Wires the snapshot store, the link actor and the serial I/O together,
//! rescans for the transmitter while disconnected, and offers a small bench
//! REPL driving the virtual switcher so the hardware can be exercised
//! without a production switcher attached.

mod serial_io;
mod settings;
mod watcher;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_detect::PortScanner;
use tally_link::{
    run_auto_connect, run_link_actor, run_switcher_task, LinkCommand, LinkConfig, LinkEvent,
    SwitcherStore, UsbDeviceEvent,
};
use tally_sim::VirtualSwitcher;

use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tally_host=info,tally_protocol=info,tally_detect=info,tally_link=info,tally_sim=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path))
            .with_context(|| format!("loading settings from {}", path))?,
        None => Settings::default(),
    };

    tracing::info!("Starting tally host");

    // Bench switcher; a production adapter implements SwitcherApi the same way
    let (switcher_event_tx, switcher_event_rx) = mpsc::channel(64);
    let switcher = VirtualSwitcher::new(settings.cameras, switcher_event_tx);
    let (store, snapshot_rx) = SwitcherStore::new(Arc::new(switcher.clone()));
    tokio::spawn(run_switcher_task(store.clone(), switcher_event_rx));

    // Hotplug feed; a native USB watcher would send into usb_tx, the REPL
    // can simulate it
    let (usb_tx, usb_rx) = mpsc::channel(16);
    tokio::spawn(run_auto_connect(store.clone(), usb_rx));

    let (link_tx, link_rx) = mpsc::channel(256);
    let (event_tx, mut event_rx) = mpsc::channel(256);
    tokio::spawn(run_link_actor(
        LinkConfig::default(),
        link_rx,
        snapshot_rx,
        event_tx,
    ));

    // User-initiated connect: failures are surfaced, not suppressed
    match store.connect(&settings.switcher_address) {
        Ok(()) => {
            let snapshot = store.snapshot();
            println!(
                "switcher: {} ({} inputs)",
                snapshot.product_name,
                snapshot.inputs.len()
            );
        }
        Err(e) => eprintln!("failed to connect to switcher: {}", e),
    }

    let scanner = PortScanner::new();
    let mut rescan = tokio::time::interval(Duration::from_millis(settings.rescan_interval_ms));
    rescan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut link_active = false;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    print_help();

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    LinkEvent::Connected { port } => {
                        link_active = true;
                        println!("transmitter connected on {}", port);
                    }
                    LinkEvent::Disconnected { port, reason } => {
                        link_active = false;
                        println!("transmitter on {} disconnected: {}", port, reason);
                    }
                    LinkEvent::StatusSent { tallies } => {
                        tracing::debug!("status sent: {:?}", tallies);
                    }
                    LinkEvent::TestSent => println!("test frame sent"),
                    LinkEvent::DeviceError { payload } => {
                        println!("device error: {:02x?}", payload);
                    }
                    LinkEvent::FrameRejected { error } => {
                        tracing::debug!("frame rejected: {}", error);
                    }
                }
            }

            _ = rescan.tick() => {
                if !link_active {
                    link_active = watcher::try_attach_transmitter(
                        &scanner,
                        settings.baud_rate,
                        settings.port.as_deref(),
                        &link_tx,
                    )
                    .await;
                }
                if !store.snapshot().connected {
                    // Quiet retry standing in for a native hotplug feed
                    if let Err(e) = store.connect(&settings.switcher_address) {
                        tracing::debug!("Switcher reconnect failed: {}", e);
                    }
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_command(line.trim(), &switcher, &link_tx, &usb_tx).await {
                            break;
                        }
                    }
                    // No terminal attached; keep bridging without the REPL
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
        }
    }

    Ok(())
}

/// Run one bench REPL command; returns false to quit
async fn handle_command(
    line: &str,
    switcher: &VirtualSwitcher,
    link_tx: &mpsc::Sender<LinkCommand>,
    usb_tx: &mpsc::Sender<UsbDeviceEvent>,
) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("pgm") => match parts.next().and_then(|s| s.parse().ok()) {
            Some(id) => switcher.set_program(id),
            None => println!("usage: pgm <input-id>"),
        },
        Some("pvw") => match parts.next().and_then(|s| s.parse().ok()) {
            Some(id) => switcher.set_preview(id),
            None => println!("usage: pvw <input-id>"),
        },
        Some("name") => {
            let id = parts.next().and_then(|s| s.parse().ok());
            let name = parts.collect::<Vec<_>>().join(" ");
            match id {
                Some(id) if !name.is_empty() => switcher.rename_input(id, name),
                _ => println!("usage: name <input-id> <new name>"),
            }
        }
        Some("test") => {
            let _ = link_tx.send(LinkCommand::SendTest).await;
        }
        Some("hotplug") => {
            // Simulate the switcher appearing on the USB bus
            let _ = usb_tx
                .send(UsbDeviceEvent::Added {
                    vendor_id: tally_detect::usb_ids::switcher::VID,
                    class_id: tally_detect::usb_ids::switcher::DEVICE_CLASS,
                })
                .await;
        }
        Some("drop") => switcher.drop_connection(),
        Some("help") => print_help(),
        Some("quit") | Some("exit") => return false,
        Some(other) => println!("unknown command: {}", other),
        None => {}
    }
    true
}

fn print_help() {
    println!("commands:");
    println!("  pgm <id>          put input on the program bus");
    println!("  pvw <id>          put input on the preview bus");
    println!("  name <id> <name>  rename an input");
    println!("  test              send a test frame to the transmitter");
    println!("  hotplug           simulate switcher hardware attaching");
    println!("  drop              drop the switcher connection");
    println!("  quit              exit");
}
