use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub accessory: AccessoryConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryConfig {
    pub name: String,
    pub microphone: bool,
    pub speaker: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub state_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accessory: AccessoryConfig {
                name: "Front Door".to_string(),
                microphone: true,
                speaker: false,
            },
            storage: StorageConfig {
                state_dir: default_state_dir(),
            },
        }
    }
}

/// Platform data directory for persisted service maps, with a temp-dir
/// fallback for environments without one.
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("virtual-accessory-bridge")
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("ACCESSORY_NAME") {
            config.accessory.name = name;
        }
        if let Ok(microphone) = std::env::var("ACCESSORY_MICROPHONE")
            && let Ok(m) = microphone.parse()
        {
            config.accessory.microphone = m;
        }
        if let Ok(speaker) = std::env::var("ACCESSORY_SPEAKER")
            && let Ok(s) = speaker.parse()
        {
            config.accessory.speaker = s;
        }
        if let Ok(dir) = std::env::var("STATE_DIR") {
            config.storage.state_dir = PathBuf::from(dir);
        }

        config
    }

    /// File the service map store reads and writes.
    pub fn service_map_path(&self) -> PathBuf {
        self.storage.state_dir.join("service-maps.json")
    }
}
