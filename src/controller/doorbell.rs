//! Doorbell capability overlay for the camera controller.
//!
//! Cameras and doorbells are close enough siblings that they deliberately
//! share one persistence identifier: a service map serialized under either
//! variant rehydrates under the other. Switching an accessory between the
//! two keeps every camera-side service and only adds or drops the doorbell
//! role. The doorbell side of that contract lives here; the camera side is
//! its [`migrate_from_doorbell`](crate::controller::AccessoryController::migrate_from_doorbell)
//! implementation.

use crate::accessory::characteristic::{CharacteristicType, PressKind};
use crate::accessory::service::{Service, ServiceType};
use crate::accessory::service_map::{ServiceMap, ServiceRole};
use crate::controller::camera::{CameraController, CameraControllerOptions};
use crate::controller::{AccessoryController, ServiceMapChange};
use log::info;
use std::sync::Arc;

/// Camera controller extended with a doorbell press-event service.
pub struct DoorbellController {
    camera: CameraController,
    doorbell: Option<Arc<Service>>,
}

impl DoorbellController {
    pub fn new(options: CameraControllerOptions) -> Self {
        Self::from_camera(CameraController::new(options))
    }

    /// Wrap an existing camera controller with doorbell capability.
    pub fn from_camera(camera: CameraController) -> Self {
        Self {
            camera,
            doorbell: None,
        }
    }

    /// The doorbell service, once constructed or adopted.
    pub fn doorbell_service(&self) -> Option<&Arc<Service>> {
        self.doorbell.as_ref()
    }

    /// Push a single-press event to every subscriber of the press-event
    /// characteristic. Fire-and-forget; press events are ephemeral and
    /// never persisted.
    ///
    /// # Panics
    ///
    /// Panics when called before `construct_services` or
    /// `init_with_services` has run. That is a caller contract violation,
    /// not a recoverable condition.
    pub fn ring_doorbell(&self) {
        let doorbell = self
            .doorbell
            .as_ref()
            .expect("doorbell controller rung before construct or init");
        info!("Doorbell pressed");
        doorbell.update_characteristic(CharacteristicType::PressEvent, PressKind::Single.into());
    }

    fn build_doorbell_service() -> Arc<Service> {
        let service = Service::new(ServiceType::Doorbell);
        service.set_primary();
        Arc::new(service)
    }
}

impl AccessoryController for DoorbellController {
    fn controller_id(&self) -> &'static str {
        // Shared with the plain camera variant; the collision is what makes
        // cross-variant rehydration work (see module docs).
        self.camera.controller_id()
    }

    fn construct_services(&mut self) -> ServiceMap {
        let doorbell = Self::build_doorbell_service();
        self.doorbell = Some(doorbell.clone());

        let mut services = self.camera.construct_services();
        services.insert(ServiceRole::Doorbell, doorbell);
        services
    }

    fn init_with_services(&mut self, services: &mut ServiceMap) -> ServiceMapChange {
        let camera_change = self.camera.init_with_services(services);

        match services.get(ServiceRole::Doorbell).cloned() {
            Some(doorbell) => {
                self.doorbell = Some(doorbell);
                camera_change
            }
            None => {
                // The map was persisted by the plain camera variant; add the
                // missing role and have the caller persist the addition.
                let doorbell = Self::build_doorbell_service();
                services.insert(ServiceRole::Doorbell, doorbell.clone());
                self.doorbell = Some(doorbell);
                ServiceMapChange::Updated
            }
        }
    }

    fn configure_services(&mut self) {
        self.camera.configure_services();

        self.doorbell
            .as_ref()
            .expect("doorbell controller configured before construct or init")
            .characteristic(CharacteristicType::PressEvent)
            .expect("doorbell service carries a press event characteristic")
            // Polling readers always see "nothing currently pressed";
            // presses surface only through the notification path.
            .on_read(|| None);
    }

    fn handle_controller_removed(&mut self) {
        self.camera.handle_controller_removed();
        self.doorbell = None;
    }

    fn migrate_from_doorbell(&mut self, _services: &mut ServiceMap) -> bool {
        // This variant declares the doorbell role itself; migrating away
        // from it belongs to the plain camera variant.
        false
    }
}
