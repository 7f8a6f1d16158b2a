//! Accessory lifecycle dispatch.
//!
//! Drives a controller through construct-or-rehydrate followed by
//! configure, persisting the service map whenever the lifecycle reports a
//! structural change. All lifecycle calls run synchronously, at most one
//! in flight per accessory.

use crate::accessory::service::Service;
use crate::accessory::service_map::{ServiceMap, ServiceRole};
use crate::controller::AccessoryController;
use crate::error::{AccessoryError, Result};
use crate::persist::ServiceMapStore;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

/// One physical or virtual device, owning the live service map of its
/// controller for the accessory's lifetime.
pub struct Accessory {
    name: String,
    store: Arc<ServiceMapStore>,
    services: RwLock<ServiceMap>,
}

impl Accessory {
    pub fn new(name: impl Into<String>, store: Arc<ServiceMapStore>) -> Self {
        Self {
            name: name.into(),
            store,
            services: RwLock::new(ServiceMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the controller lifecycle: fresh construction or rehydration
    /// (with cross-variant migration), then live event wiring.
    ///
    /// A map persisted under a related variant is reconciled here: the
    /// controller's migration hook runs first, then `init_with_services`;
    /// if either reports a change the updated map is persisted before
    /// handlers are wired.
    pub fn configure_controller(&self, controller: &mut dyn AccessoryController) -> Result<()> {
        let controller_id = controller.controller_id();

        let services = match self.store.get(controller_id) {
            Some(persisted) => {
                info!(
                    "Rehydrating '{}' controller for accessory '{}' ({} persisted service(s))",
                    controller_id,
                    self.name,
                    persisted.services.len()
                );
                let mut services = persisted.rehydrate();
                let migrated = controller.migrate_from_doorbell(&mut services);
                let change = controller.init_with_services(&mut services);
                if migrated || change.is_updated() {
                    self.store.save(controller_id, &services)?;
                }
                services
            }
            None => {
                info!(
                    "Constructing fresh '{}' controller for accessory '{}'",
                    controller_id, self.name
                );
                let services = controller.construct_services();
                self.store.save(controller_id, &services)?;
                services
            }
        };

        controller.configure_services();
        *self.services.write() = services;
        Ok(())
    }

    /// The live service registered under a role, if any.
    pub fn service(&self, role: ServiceRole) -> Option<Arc<Service>> {
        self.services.read().get(role).cloned()
    }

    /// Persist the current service map (identity plus characteristic
    /// values) under the given controller id.
    pub fn persist(&self, controller_id: &str) -> Result<()> {
        let services = self.services.read();
        if services.is_empty() {
            return Err(AccessoryError::NotConfigured(self.name.clone()));
        }
        self.store.save(controller_id, &services)
    }

    /// Tear the controller down and drop its persisted state.
    pub fn remove_controller(&self, controller: &mut dyn AccessoryController) -> Result<()> {
        info!(
            "Removing '{}' controller from accessory '{}'",
            controller.controller_id(),
            self.name
        );
        controller.handle_controller_removed();
        self.store.remove(controller.controller_id())?;
        *self.services.write() = ServiceMap::new();
        Ok(())
    }
}
