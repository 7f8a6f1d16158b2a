//! Accessory service model: characteristics, services, the service map,
//! and the lifecycle dispatch that ties a controller to persisted state.

pub mod characteristic;
pub mod runtime;
pub mod service;
pub mod service_map;

pub use characteristic::{Characteristic, CharacteristicType, CharacteristicValue, PressKind};
pub use runtime::Accessory;
pub use service::{Service, ServiceType};
pub use service_map::{ServiceMap, ServiceRole};
