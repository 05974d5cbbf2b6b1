//! Switcher snapshot and link state types

/// Kind of source behind a switcher input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    /// An external camera input; these are the ones tallied
    External,
    /// Internal black generator
    Black,
    /// Internal color bars generator
    ColorBars,
    /// Internal media player
    MediaPlayer,
    /// Anything else the switcher exposes
    Other,
}

/// One switcher input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherInput {
    pub id: u64,
    pub name: String,
    pub port_type: PortType,
}

impl SwitcherInput {
    pub fn new(id: u64, name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            id,
            name: name.into(),
            port_type,
        }
    }

    /// Shorthand for an external camera input
    pub fn external(id: u64, name: impl Into<String>) -> Self {
        Self::new(id, name, PortType::External)
    }
}

/// Immutable view of the switcher at one point in time
///
/// Replaced wholesale on every switcher callback and published through a
/// watch channel; observers clone, never mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherSnapshot {
    pub connected: bool,
    pub product_name: String,
    pub inputs: Vec<SwitcherInput>,
    pub preview_id: u64,
    pub program_id: u64,
}

impl Default for SwitcherSnapshot {
    fn default() -> Self {
        Self {
            connected: false,
            product_name: "N/A".to_string(),
            inputs: Vec::new(),
            preview_id: 0,
            program_id: 0,
        }
    }
}

impl SwitcherSnapshot {
    /// Ids of the external inputs, in input list order
    pub fn external_ids(&self) -> Vec<u64> {
        self.inputs
            .iter()
            .filter(|i| i.port_type == PortType::External)
            .map(|i| i.id)
            .collect()
    }
}

/// Where the transmitter link currently stands
///
/// The handshake deadline itself lives with the actor's timer; receiving a
/// valid Pong cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No port held
    #[default]
    Disconnected,
    /// Port open, Ping sent, waiting for Pong
    AwaitingHandshake,
    /// Handshake done; status frames may flow
    Connected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_ids_preserve_input_order() {
        let snapshot = SwitcherSnapshot {
            inputs: vec![
                SwitcherInput::external(5, "CAM 5"),
                SwitcherInput::new(1000, "Bars", PortType::ColorBars),
                SwitcherInput::external(2, "CAM 2"),
            ],
            ..Default::default()
        };
        assert_eq!(snapshot.external_ids(), vec![5, 2]);
    }

    #[test]
    fn default_snapshot_is_disconnected() {
        let snapshot = SwitcherSnapshot::default();
        assert!(!snapshot.connected);
        assert_eq!(snapshot.product_name, "N/A");
        assert!(snapshot.external_ids().is_empty());
    }
}
