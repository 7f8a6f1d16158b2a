//! Service-map persistence across restarts.
//!
//! Each controller's service map is serialized as role name → service
//! identity plus current characteristic values, keyed by the controller's
//! persistence identifier. Rehydration rebuilds services with their
//! persisted instance ids so references stay stable across restarts.
//! Event characteristics are never captured; their values are ephemeral.

use crate::accessory::characteristic::{CharacteristicType, CharacteristicValue};
use crate::accessory::service::{Service, ServiceType};
use crate::accessory::service_map::{ServiceMap, ServiceRole};
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Persisted identity and values of one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedService {
    pub service_type: ServiceType,
    pub instance_id: Uuid,
    pub primary: bool,
    #[serde(default)]
    pub characteristics: BTreeMap<CharacteristicType, CharacteristicValue>,
}

/// Persisted service map of one controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedServiceMap {
    pub services: BTreeMap<ServiceRole, PersistedService>,
    pub saved_at: DateTime<Utc>,
}

impl PersistedServiceMap {
    /// Snapshot a live service map for storage.
    pub fn capture(services: &ServiceMap) -> Self {
        let mut persisted = BTreeMap::new();
        for (role, service) in services.iter() {
            let characteristics = service
                .characteristics()
                .filter(|characteristic| !characteristic.characteristic_type().is_event())
                .filter_map(|characteristic| {
                    characteristic
                        .stored_value()
                        .map(|value| (characteristic.characteristic_type(), value))
                })
                .collect();
            persisted.insert(
                role,
                PersistedService {
                    service_type: service.service_type(),
                    instance_id: service.instance_id(),
                    primary: service.is_primary(),
                    characteristics,
                },
            );
        }
        Self {
            services: persisted,
            saved_at: Utc::now(),
        }
    }

    /// Rebuild a live service map, preserving every persisted identity.
    pub fn rehydrate(&self) -> ServiceMap {
        let mut services = ServiceMap::new();
        for (&role, persisted) in &self.services {
            let service = Service::with_instance_id(persisted.service_type, persisted.instance_id);
            if persisted.primary {
                service.set_primary();
            }
            for (&characteristic_type, value) in &persisted.characteristics {
                match service.characteristic(characteristic_type) {
                    Some(characteristic) => characteristic.store_value(value.clone()),
                    None => warn!(
                        "Persisted {} value for {} service has no characteristic to restore into",
                        characteristic_type, persisted.service_type
                    ),
                }
            }
            services.insert(role, Arc::new(service));
        }
        services
    }
}

/// On-disk shape: controller id → persisted service map.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct PersistedControllers {
    controllers: BTreeMap<String, PersistedServiceMap>,
}

impl PersistedControllers {
    fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<PersistedControllers>(&bytes) {
                Ok(state) => {
                    info!(
                        "Loaded {} persisted service map(s) from {:?}",
                        state.controllers.len(),
                        path
                    );
                    state
                }
                Err(e) => {
                    warn!("Failed to parse service map file: {}", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No persisted service maps found (first run)");
                Self::default()
            }
            Err(e) => {
                error!("Failed to read service map file: {}", e);
                Self::default()
            }
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        info!(
            "Saved {} service map(s) to {:?}",
            self.controllers.len(),
            path
        );
        Ok(())
    }
}

/// Store wrapper with write-through saves.
pub struct ServiceMapStore {
    path: PathBuf,
    state: RwLock<PersistedControllers>,
}

impl ServiceMapStore {
    pub fn new(path: PathBuf) -> Self {
        let state = PersistedControllers::load(&path);
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    /// The persisted service map for a controller, if one exists.
    pub fn get(&self, controller_id: &str) -> Option<PersistedServiceMap> {
        self.state.read().controllers.get(controller_id).cloned()
    }

    pub fn contains(&self, controller_id: &str) -> bool {
        self.state.read().controllers.contains_key(controller_id)
    }

    /// Capture and persist a controller's live service map.
    pub fn save(&self, controller_id: &str, services: &ServiceMap) -> Result<()> {
        let mut state = self.state.write();
        state
            .controllers
            .insert(controller_id.to_string(), PersistedServiceMap::capture(services));
        state.save(&self.path)
    }

    /// Drop a controller's persisted state. Removing an absent entry is a
    /// no-op.
    pub fn remove(&self, controller_id: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.controllers.remove(controller_id).is_none() {
            return Ok(());
        }
        state.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::camera::CameraControllerOptions;
    use crate::controller::doorbell::DoorbellController;
    use crate::controller::AccessoryController;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("accessory-bridge-test-{}", Uuid::new_v4()))
            .join("service-maps.json")
    }

    fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_round_trip_preserves_service_identity() {
        let path = temp_store_path();
        let mut controller = DoorbellController::new(CameraControllerOptions {
            microphone: true,
            speaker: false,
        });
        let services = controller.construct_services();
        let doorbell_id = services.get(ServiceRole::Doorbell).unwrap().instance_id();

        let store = ServiceMapStore::new(path.clone());
        store.save("camera", &services).unwrap();

        // Fresh store instance re-reads the file from disk.
        let reopened = ServiceMapStore::new(path.clone());
        let rehydrated = reopened.get("camera").unwrap().rehydrate();

        let doorbell = rehydrated.get(ServiceRole::Doorbell).unwrap();
        assert_eq!(doorbell.instance_id(), doorbell_id);
        assert!(doorbell.is_primary());

        let microphone = rehydrated.get(ServiceRole::Microphone).unwrap();
        assert_eq!(
            microphone
                .characteristic(CharacteristicType::Mute)
                .unwrap()
                .stored_value(),
            Some(CharacteristicValue::Bool(false))
        );

        cleanup(&path);
    }

    #[test]
    fn test_press_event_values_are_never_captured() {
        let path = temp_store_path();
        let mut controller = DoorbellController::new(CameraControllerOptions::default());
        let services = controller.construct_services();
        controller.configure_services();
        controller.ring_doorbell();

        let captured = PersistedServiceMap::capture(&services);
        let doorbell = &captured.services[&ServiceRole::Doorbell];
        assert!(!doorbell
            .characteristics
            .contains_key(&CharacteristicType::PressEvent));

        cleanup(&path);
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let path = temp_store_path();
        let store = ServiceMapStore::new(path.clone());
        assert!(store.get("camera").is_none());
        assert!(!store.contains("camera"));
        cleanup(&path);
    }

    #[test]
    fn test_remove_deletes_persisted_entry() {
        let path = temp_store_path();
        let mut controller = DoorbellController::new(CameraControllerOptions::default());
        let services = controller.construct_services();

        let store = ServiceMapStore::new(path.clone());
        store.save("camera", &services).unwrap();
        assert!(store.contains("camera"));

        store.remove("camera").unwrap();
        assert!(!store.contains("camera"));
        // Removing again is a no-op.
        store.remove("camera").unwrap();

        let reopened = ServiceMapStore::new(path.clone());
        assert!(!reopened.contains("camera"));
        cleanup(&path);
    }
}
