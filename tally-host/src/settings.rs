//! Host settings

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Host configuration, loaded from an optional JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Serial baud rate for the transmitter link
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
    /// Fixed port path, bypassing USB id selection
    #[serde(default)]
    pub port: Option<String>,
    /// Switcher address; empty means the local USB transport
    #[serde(default)]
    pub switcher_address: String,
    /// How often to rescan for the transmitter while disconnected
    #[serde(default = "default_rescan_ms")]
    pub rescan_interval_ms: u64,
    /// External camera inputs on the bench switcher
    #[serde(default = "default_cameras")]
    pub cameras: usize,
}

fn default_baud() -> u32 {
    115_200
}

fn default_rescan_ms() -> u64 {
    2_000
}

fn default_cameras() -> usize {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            baud_rate: default_baud(),
            port: None,
            switcher_address: String::new(),
            rescan_interval_ms: default_rescan_ms(),
            cameras: default_cameras(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"port": "/dev/ttyUSB3"}"#).unwrap();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.port.as_deref(), Some("/dev/ttyUSB3"));
        assert_eq!(settings.cameras, 4);
    }

    #[test]
    fn round_trips_through_json() {
        let settings = Settings {
            baud_rate: 57_600,
            port: None,
            switcher_address: "192.168.10.240".to_string(),
            rescan_interval_ms: 5_000,
            cameras: 8,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);
    }
}
