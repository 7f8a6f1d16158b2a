//! Persistence for accessory service maps.

pub mod store;

pub use store::{PersistedService, PersistedServiceMap, ServiceMapStore};
