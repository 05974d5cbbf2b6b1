//! Switcher capability trait and reactive snapshot store
//!
//! The switcher control library is an external collaborator; the engine
//! only sees the small [`SwitcherApi`] capability plus a stream of
//! [`SwitcherEvent`] callbacks. The [`SwitcherStore`] owns the current
//! [`SwitcherSnapshot`] and republishes a fresh copy through a watch channel
//! on every mutation; observers never see in-place changes.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::error::ConnectFailure;
use crate::state::{SwitcherInput, SwitcherSnapshot};

/// What the engine needs from a switcher control library
///
/// Implemented by an adapter owning the native handle; the engine never
/// depends on the adapter's representation.
pub trait SwitcherApi: Send + Sync {
    /// Connect to the switcher at `address` (empty for the local USB
    /// transport). The result code is already classified.
    fn connect(&self, address: &str) -> Result<(), ConnectFailure>;

    /// Product name of the connected switcher, if it reports one
    fn product_name(&self) -> Option<String>;

    /// Current input list, in switcher order
    fn inputs(&self) -> Vec<SwitcherInput>;

    /// Input id on the preview bus
    fn preview_input(&self) -> u64;

    /// Input id on the program bus
    fn program_input(&self) -> u64;
}

/// Callbacks the switcher adapter delivers, as channel messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitcherEvent {
    /// The switcher connection dropped
    Disconnected,
    /// The program bus changed
    ProgramChanged,
    /// The preview bus changed
    PreviewChanged,
    /// Input names (and possibly the list) changed
    InputNamesChanged,
}

/// Owner of the switcher snapshot
///
/// Mutated only here; everyone else subscribes and clones.
pub struct SwitcherStore {
    api: Arc<dyn SwitcherApi>,
    tx: watch::Sender<SwitcherSnapshot>,
}

impl SwitcherStore {
    /// Create a store around an adapter, returning a snapshot subscription
    pub fn new(api: Arc<dyn SwitcherApi>) -> (Arc<Self>, watch::Receiver<SwitcherSnapshot>) {
        let (tx, rx) = watch::channel(SwitcherSnapshot::default());
        (Arc::new(Self { api, tx }), rx)
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> SwitcherSnapshot {
        self.tx.borrow().clone()
    }

    /// Additional snapshot subscription
    pub fn subscribe(&self) -> watch::Receiver<SwitcherSnapshot> {
        self.tx.subscribe()
    }

    /// Connect and, on success, publish a fully refreshed snapshot
    ///
    /// Failures are returned for the caller to surface or suppress; a quiet
    /// auto-connect logs them at debug, a user-initiated one shows them.
    pub fn connect(&self, address: &str) -> Result<(), ConnectFailure> {
        self.api.connect(address)?;

        let snapshot = SwitcherSnapshot {
            connected: true,
            product_name: self
                .api
                .product_name()
                .unwrap_or_else(|| "N/A".to_string()),
            inputs: self.api.inputs(),
            preview_id: self.api.preview_input(),
            program_id: self.api.program_input(),
        };
        info!(
            "Connected to {} ({} inputs)",
            snapshot.product_name,
            snapshot.inputs.len()
        );
        self.tx.send_replace(snapshot);
        Ok(())
    }

    /// Apply one switcher callback and publish the updated snapshot
    pub fn apply_event(&self, event: SwitcherEvent) {
        let mut snapshot = self.snapshot();
        match event {
            SwitcherEvent::Disconnected => {
                info!("Switcher disconnected");
                snapshot.connected = false;
            }
            SwitcherEvent::ProgramChanged => {
                snapshot.program_id = self.api.program_input();
            }
            SwitcherEvent::PreviewChanged => {
                snapshot.preview_id = self.api.preview_input();
            }
            SwitcherEvent::InputNamesChanged => {
                // A rename can reorder or grow the list; re-read the buses
                // too so ids stay consistent with the new list
                snapshot.inputs = self.api.inputs();
                snapshot.preview_id = self.api.preview_input();
                snapshot.program_id = self.api.program_input();
            }
        }
        self.tx.send_replace(snapshot);
    }
}

/// Drain switcher callbacks into the store
pub async fn run_switcher_task(store: Arc<SwitcherStore>, mut event_rx: mpsc::Receiver<SwitcherEvent>) {
    while let Some(event) = event_rx.recv().await {
        debug!("Switcher event: {:?}", event);
        store.apply_event(event);
    }
    debug!("Switcher event channel closed");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::PortType;
    use std::sync::Mutex;

    /// Minimal scripted switcher for store tests
    pub(crate) struct StubSwitcher {
        pub connect_result: Result<(), ConnectFailure>,
        pub inner: Mutex<StubState>,
    }

    pub(crate) struct StubState {
        pub inputs: Vec<SwitcherInput>,
        pub preview: u64,
        pub program: u64,
        pub connect_calls: u32,
    }

    impl StubSwitcher {
        pub(crate) fn new(inputs: Vec<SwitcherInput>, preview: u64, program: u64) -> Arc<Self> {
            Arc::new(Self {
                connect_result: Ok(()),
                inner: Mutex::new(StubState {
                    inputs,
                    preview,
                    program,
                    connect_calls: 0,
                }),
            })
        }

        pub(crate) fn failing(failure: ConnectFailure) -> Arc<Self> {
            Arc::new(Self {
                connect_result: Err(failure),
                inner: Mutex::new(StubState {
                    inputs: Vec::new(),
                    preview: 0,
                    program: 0,
                    connect_calls: 0,
                }),
            })
        }
    }

    impl SwitcherApi for StubSwitcher {
        fn connect(&self, _address: &str) -> Result<(), ConnectFailure> {
            self.inner.lock().unwrap().connect_calls += 1;
            self.connect_result
        }

        fn product_name(&self) -> Option<String> {
            Some("Stub Switcher".to_string())
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

    fn two_cameras() -> Vec<SwitcherInput> {
        vec![
            SwitcherInput::external(1, "CAM 1"),
            SwitcherInput::external(2, "CAM 2"),
        ]
    }

    #[test]
    fn connect_publishes_full_snapshot() {
        let api = StubSwitcher::new(two_cameras(), 1, 2);
        let (store, rx) = SwitcherStore::new(api);

        store.connect("192.168.1.240").unwrap();

        let snapshot = rx.borrow().clone();
        assert!(snapshot.connected);
        assert_eq!(snapshot.product_name, "Stub Switcher");
        assert_eq!(snapshot.external_ids(), vec![1, 2]);
        assert_eq!(snapshot.preview_id, 1);
        assert_eq!(snapshot.program_id, 2);
    }

    #[test]
    fn connect_failure_leaves_snapshot_untouched() {
        let api = StubSwitcher::failing(ConnectFailure::NoResponse);
        let (store, rx) = SwitcherStore::new(api);

        assert_eq!(store.connect(""), Err(ConnectFailure::NoResponse));
        assert!(!rx.borrow().connected);
    }

    #[test]
    fn program_change_rereads_the_bus() {
        let api = StubSwitcher::new(two_cameras(), 1, 2);
        let (store, rx) = SwitcherStore::new(api.clone());
        store.connect("").unwrap();

        api.inner.lock().unwrap().program = 1;
        store.apply_event(SwitcherEvent::ProgramChanged);

        assert_eq!(rx.borrow().program_id, 1);
    }

    #[test]
    fn rename_refreshes_inputs_and_both_buses() {
        let api = StubSwitcher::new(two_cameras(), 1, 2);
        let (store, rx) = SwitcherStore::new(api.clone());
        store.connect("").unwrap();

        {
            let mut inner = api.inner.lock().unwrap();
            inner.inputs = vec![
                SwitcherInput::external(1, "Wide"),
                SwitcherInput::external(2, "Tight"),
                SwitcherInput::new(1000, "Bars", PortType::ColorBars),
            ];
            inner.preview = 2;
        }
        store.apply_event(SwitcherEvent::InputNamesChanged);

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.inputs.len(), 3);
        assert_eq!(snapshot.inputs[0].name, "Wide");
        assert_eq!(snapshot.preview_id, 2);
    }

    #[test]
    fn disconnect_clears_only_the_flag() {
        let api = StubSwitcher::new(two_cameras(), 1, 2);
        let (store, rx) = SwitcherStore::new(api);
        store.connect("").unwrap();

        store.apply_event(SwitcherEvent::Disconnected);

        let snapshot = rx.borrow().clone();
        assert!(!snapshot.connected);
        // Last known inputs stay around for display
        assert_eq!(snapshot.inputs.len(), 2);
    }

    #[tokio::test]
    async fn switcher_task_applies_events_in_order() {
        let api = StubSwitcher::new(two_cameras(), 1, 2);
        let (store, rx) = SwitcherStore::new(api.clone());
        store.connect("").unwrap();

        let (event_tx, event_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_switcher_task(store, event_rx));

        api.inner.lock().unwrap().preview = 2;
        event_tx.send(SwitcherEvent::PreviewChanged).await.unwrap();
        event_tx.send(SwitcherEvent::Disconnected).await.unwrap();
        drop(event_tx);
        task.await.unwrap();

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.preview_id, 2);
        assert!(!snapshot.connected);
    }
}
