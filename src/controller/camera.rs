//! Camera controller: the base accessory variant.
//!
//! Owns the stream management role plus optional microphone and speaker
//! roles. Stream negotiation itself lives behind the transport layer; here
//! streaming state is surfaced as characteristic values only.

use crate::accessory::characteristic::{CharacteristicType, CharacteristicValue};
use crate::accessory::service::{Service, ServiceType};
use crate::accessory::service_map::{ServiceMap, ServiceRole};
use crate::controller::{AccessoryController, ServiceMapChange};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use strum::{Display, FromRepr};

/// Persistence identifier shared by the camera and doorbell variants.
pub const CAMERA_CONTROLLER_ID: &str = "camera";

/// Live streaming status surfaced on the stream management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum StreamingStatus {
    Available = 0,
    InUse = 1,
    Unavailable = 2,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraControllerOptions {
    /// Expose a microphone service on the accessory
    pub microphone: bool,
    /// Expose a speaker service on the accessory
    pub speaker: bool,
}

pub struct CameraController {
    options: CameraControllerOptions,
    stream_management: Option<Arc<Service>>,
    microphone: Option<Arc<Service>>,
    speaker: Option<Arc<Service>>,
    /// Shared with the streaming-status read handler
    streaming_status: Arc<AtomicU8>,
}

impl CameraController {
    pub fn new(options: CameraControllerOptions) -> Self {
        Self {
            options,
            stream_management: None,
            microphone: None,
            speaker: None,
            streaming_status: Arc::new(AtomicU8::new(StreamingStatus::Available as u8)),
        }
    }

    pub fn streaming_status(&self) -> StreamingStatus {
        StreamingStatus::from_repr(self.streaming_status.load(Ordering::SeqCst))
            .unwrap_or(StreamingStatus::Unavailable)
    }

    /// Update the live streaming status and push it to subscribers.
    pub fn set_streaming_status(&self, status: StreamingStatus) {
        self.streaming_status.store(status as u8, Ordering::SeqCst);
        if let Some(stream) = &self.stream_management {
            stream.update_characteristic(
                CharacteristicType::StreamingStatus,
                CharacteristicValue::UInt8(status as u8),
            );
        }
    }

    /// Adopt the role's existing service, create a missing one, or drop a
    /// role the current options no longer declare.
    fn reconcile_optional(
        services: &mut ServiceMap,
        role: ServiceRole,
        service_type: ServiceType,
        wanted: bool,
        change: &mut ServiceMapChange,
    ) -> Option<Arc<Service>> {
        match (services.get(role).cloned(), wanted) {
            (Some(service), true) => Some(service),
            (None, true) => {
                let service = build_service(service_type);
                services.insert(role, service.clone());
                *change = ServiceMapChange::Updated;
                Some(service)
            }
            (Some(_), false) => {
                info!("Dropping undeclared {} service during rehydration", role);
                services.remove(role);
                *change = ServiceMapChange::Updated;
                None
            }
            (None, false) => None,
        }
    }
}

impl AccessoryController for CameraController {
    fn controller_id(&self) -> &'static str {
        CAMERA_CONTROLLER_ID
    }

    fn construct_services(&mut self) -> ServiceMap {
        let mut services = ServiceMap::new();

        let stream = build_service(ServiceType::StreamManagement);
        services.insert(ServiceRole::StreamManagement, stream.clone());
        self.stream_management = Some(stream);

        if self.options.microphone {
            let microphone = build_service(ServiceType::Microphone);
            services.insert(ServiceRole::Microphone, microphone.clone());
            self.microphone = Some(microphone);
        }
        if self.options.speaker {
            let speaker = build_service(ServiceType::Speaker);
            services.insert(ServiceRole::Speaker, speaker.clone());
            self.speaker = Some(speaker);
        }

        services
    }

    fn init_with_services(&mut self, services: &mut ServiceMap) -> ServiceMapChange {
        let mut change = ServiceMapChange::Unchanged;

        // Stream management is unconditional for this variant.
        let stream = match services.get(ServiceRole::StreamManagement).cloned() {
            Some(stream) => stream,
            None => {
                let stream = build_service(ServiceType::StreamManagement);
                services.insert(ServiceRole::StreamManagement, stream.clone());
                change = ServiceMapChange::Updated;
                stream
            }
        };
        self.stream_management = Some(stream);

        self.microphone = Self::reconcile_optional(
            services,
            ServiceRole::Microphone,
            ServiceType::Microphone,
            self.options.microphone,
            &mut change,
        );
        self.speaker = Self::reconcile_optional(
            services,
            ServiceRole::Speaker,
            ServiceType::Speaker,
            self.options.speaker,
            &mut change,
        );

        change
    }

    fn configure_services(&mut self) {
        let stream = self
            .stream_management
            .as_ref()
            .expect("camera controller configured before construct or init");
        let status = self.streaming_status.clone();
        stream
            .characteristic(CharacteristicType::StreamingStatus)
            .expect("stream management service carries a streaming status characteristic")
            .on_read(move || Some(CharacteristicValue::UInt8(status.load(Ordering::SeqCst))));
    }

    fn handle_controller_removed(&mut self) {
        self.stream_management = None;
        self.microphone = None;
        self.speaker = None;
    }

    fn migrate_from_doorbell(&mut self, services: &mut ServiceMap) -> bool {
        if services.remove(ServiceRole::Doorbell).is_some() {
            info!("Dropped doorbell service while rehydrating as a plain camera");
            return true;
        }
        false
    }
}

/// Construct a service of the given type with its initial values seeded.
pub(crate) fn build_service(service_type: ServiceType) -> Arc<Service> {
    let service = Service::new(service_type);
    for characteristic in service.characteristics() {
        let initial = match characteristic.characteristic_type() {
            CharacteristicType::Active => Some(CharacteristicValue::Bool(true)),
            CharacteristicType::Mute => Some(CharacteristicValue::Bool(false)),
            _ => None,
        };
        if let Some(value) = initial {
            characteristic.store_value(value);
        }
    }
    Arc::new(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_respects_options() {
        let mut controller = CameraController::new(CameraControllerOptions {
            microphone: true,
            speaker: false,
        });
        let services = controller.construct_services();

        assert!(services.contains(ServiceRole::StreamManagement));
        assert!(services.contains(ServiceRole::Microphone));
        assert!(!services.contains(ServiceRole::Speaker));
        assert!(!services.contains(ServiceRole::Doorbell));
    }

    #[test]
    fn test_init_recreates_missing_stream_management() {
        let mut controller = CameraController::new(CameraControllerOptions::default());
        let mut services = ServiceMap::new();

        let change = controller.init_with_services(&mut services);
        assert!(change.is_updated());
        assert!(services.contains(ServiceRole::StreamManagement));
    }

    #[test]
    fn test_init_adopts_existing_services_untouched() {
        let mut first = CameraController::new(CameraControllerOptions::default());
        let mut services = first.construct_services();
        let original_id = services
            .get(ServiceRole::StreamManagement)
            .unwrap()
            .instance_id();

        let mut second = CameraController::new(CameraControllerOptions::default());
        let change = second.init_with_services(&mut services);
        assert_eq!(change, ServiceMapChange::Unchanged);
        assert_eq!(
            services
                .get(ServiceRole::StreamManagement)
                .unwrap()
                .instance_id(),
            original_id
        );
    }

    #[test]
    fn test_init_drops_undeclared_roles() {
        let mut with_audio = CameraController::new(CameraControllerOptions {
            microphone: true,
            speaker: true,
        });
        let mut services = with_audio.construct_services();

        let mut without_audio = CameraController::new(CameraControllerOptions::default());
        let change = without_audio.init_with_services(&mut services);
        assert!(change.is_updated());
        assert!(!services.contains(ServiceRole::Microphone));
        assert!(!services.contains(ServiceRole::Speaker));
    }

    #[test]
    fn test_migrate_from_doorbell_strips_stale_role() {
        let mut controller = CameraController::new(CameraControllerOptions::default());
        let mut services = ServiceMap::new();
        services.insert(
            ServiceRole::Doorbell,
            build_service(ServiceType::Doorbell),
        );

        assert!(controller.migrate_from_doorbell(&mut services));
        assert!(!services.contains(ServiceRole::Doorbell));
        // Second pass has nothing left to migrate.
        assert!(!controller.migrate_from_doorbell(&mut services));
    }

    #[test]
    fn test_streaming_status_read_tracks_live_state() {
        let mut controller = CameraController::new(CameraControllerOptions::default());
        let services = controller.construct_services();
        controller.configure_services();

        let status = services
            .get(ServiceRole::StreamManagement)
            .unwrap()
            .characteristic(CharacteristicType::StreamingStatus)
            .unwrap()
            .clone();
        assert_eq!(status.read(), Some(CharacteristicValue::UInt8(0)));

        controller.set_streaming_status(StreamingStatus::InUse);
        assert_eq!(status.read(), Some(CharacteristicValue::UInt8(1)));
    }
}
