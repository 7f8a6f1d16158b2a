//! Service instances and their characteristic sets.

use crate::accessory::characteristic::{Characteristic, CharacteristicType, CharacteristicValue};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strum::Display;
use uuid::Uuid;

/// Well-known service types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Doorbell,
    StreamManagement,
    Microphone,
    Speaker,
}

impl ServiceType {
    /// The characteristic set every service of this type carries.
    pub fn default_characteristics(self) -> &'static [CharacteristicType] {
        match self {
            ServiceType::Doorbell => &[CharacteristicType::PressEvent],
            ServiceType::StreamManagement => {
                &[CharacteristicType::StreamingStatus, CharacteristicType::Active]
            }
            ServiceType::Microphone | ServiceType::Speaker => &[CharacteristicType::Mute],
        }
    }
}

/// An addressable unit exposing one or more characteristics.
///
/// Identity is type + instance id and must survive restarts: rehydration
/// reconstructs a service with the persisted instance id so persisted
/// references keep resolving to the same logical service.
pub struct Service {
    service_type: ServiceType,
    instance_id: Uuid,
    primary: AtomicBool,
    characteristics: BTreeMap<CharacteristicType, Arc<Characteristic>>,
}

impl Service {
    /// Create a fresh service with a new instance id and the default
    /// characteristic set for its type.
    pub fn new(service_type: ServiceType) -> Self {
        Self::with_instance_id(service_type, Uuid::new_v4())
    }

    /// Create a service with a known instance id (rehydration path).
    pub fn with_instance_id(service_type: ServiceType, instance_id: Uuid) -> Self {
        let characteristics = service_type
            .default_characteristics()
            .iter()
            .map(|&characteristic_type| {
                (
                    characteristic_type,
                    Arc::new(Characteristic::new(characteristic_type)),
                )
            })
            .collect();
        Self {
            service_type,
            instance_id,
            primary: AtomicBool::new(false),
            characteristics,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Flag this service as the accessory's principal user-facing one.
    pub fn set_primary(&self) {
        self.primary.store(true, Ordering::SeqCst);
    }

    pub fn is_primary(&self) -> bool {
        self.primary.load(Ordering::SeqCst)
    }

    /// Look up a characteristic by type.
    pub fn characteristic(&self, characteristic_type: CharacteristicType) -> Option<&Arc<Characteristic>> {
        self.characteristics.get(&characteristic_type)
    }

    /// Iterate over all characteristics of this service.
    pub fn characteristics(&self) -> impl Iterator<Item = &Arc<Characteristic>> {
        self.characteristics.values()
    }

    /// Push an updated value on one of this service's characteristics,
    /// notifying subscribers.
    pub fn update_characteristic(
        &self,
        characteristic_type: CharacteristicType,
        value: CharacteristicValue,
    ) {
        match self.characteristic(characteristic_type) {
            Some(characteristic) => characteristic.update_value(value),
            None => warn!(
                "Service {} has no {} characteristic",
                self.service_type, characteristic_type
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_characteristic_sets() {
        let doorbell = Service::new(ServiceType::Doorbell);
        assert!(doorbell.characteristic(CharacteristicType::PressEvent).is_some());
        assert!(doorbell.characteristic(CharacteristicType::Mute).is_none());

        let stream = Service::new(ServiceType::StreamManagement);
        assert!(stream.characteristic(CharacteristicType::StreamingStatus).is_some());
        assert!(stream.characteristic(CharacteristicType::Active).is_some());
    }

    #[test]
    fn test_fresh_services_get_distinct_instance_ids() {
        let first = Service::new(ServiceType::Doorbell);
        let second = Service::new(ServiceType::Doorbell);
        assert_ne!(first.instance_id(), second.instance_id());
    }

    #[test]
    fn test_with_instance_id_preserves_identity() {
        let id = Uuid::new_v4();
        let service = Service::with_instance_id(ServiceType::Microphone, id);
        assert_eq!(service.instance_id(), id);
        assert_eq!(service.service_type(), ServiceType::Microphone);
    }

    #[test]
    fn test_primary_flag() {
        let service = Service::new(ServiceType::Doorbell);
        assert!(!service.is_primary());
        service.set_primary();
        assert!(service.is_primary());
    }
}
