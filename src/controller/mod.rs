//! Accessory controller variants and their lifecycle contract.
//!
//! A controller owns the service graph for one capability set. The
//! framework drives every controller through the same synchronous
//! lifecycle, exactly once per accessory lifetime and in this order:
//!
//! 1. [`AccessoryController::construct_services`] (fresh accessory) *or*
//!    [`AccessoryController::init_with_services`] (rehydration from a
//!    persisted map)
//! 2. [`AccessoryController::configure_services`] (wire live handlers)
//!
//! Variants are composed, not subclassed: the doorbell controller wraps a
//! camera controller value and extends each lifecycle call.

pub mod camera;
pub mod doorbell;

pub use camera::{CameraController, CameraControllerOptions, StreamingStatus};
pub use doorbell::DoorbellController;

use crate::accessory::service_map::ServiceMap;

/// Outcome of rehydrating a controller from a persisted service map.
///
/// The two variants are meaningfully different signals, not interchangeable:
/// `Updated` obliges the caller to persist the (mutated) map, `Unchanged`
/// means there is nothing new to store.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMapChange {
    Unchanged,
    Updated,
}

impl ServiceMapChange {
    pub fn is_updated(self) -> bool {
        matches!(self, ServiceMapChange::Updated)
    }
}

/// Lifecycle contract implemented by every accessory-capability variant.
pub trait AccessoryController {
    /// Stable identifier this controller's service map is persisted under.
    ///
    /// Related variants may deliberately share an identifier so that a map
    /// serialized under one of them rehydrates under the other (see
    /// [`doorbell`]).
    fn controller_id(&self) -> &'static str;

    /// Build the service graph for a fresh accessory.
    ///
    /// Pure construction: no persisted state is touched. Called at most
    /// once per accessory lifetime.
    fn construct_services(&mut self) -> ServiceMap;

    /// Adopt a rehydrated service map, reconciling it with the roles this
    /// variant declares.
    ///
    /// Existing instances for declared roles must be adopted untouched
    /// (identity-preserving); missing ones are created and inserted, and
    /// roles the variant no longer declares may be dropped. Any mutation
    /// must be reported as [`ServiceMapChange::Updated`].
    fn init_with_services(&mut self, services: &mut ServiceMap) -> ServiceMapChange;

    /// Wire live event handlers onto the constructed or adopted services.
    fn configure_services(&mut self);

    /// The accessory is being removed; release service references.
    fn handle_controller_removed(&mut self);

    /// Reconcile a map that may have been persisted by a doorbell-capable
    /// sibling, dropping the doorbell role when this variant does not
    /// declare it.
    ///
    /// Invoked by the lifecycle dispatcher before
    /// [`AccessoryController::init_with_services`]. Returns whether the map
    /// was changed (obliging the caller to persist it).
    fn migrate_from_doorbell(&mut self, services: &mut ServiceMap) -> bool;
}
