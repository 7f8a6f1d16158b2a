//! The service map: role name to service instance for one accessory.

use crate::accessory::service::Service;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use strum::Display;

/// Stable role names services are keyed under.
///
/// Roles identify a service's functional purpose and are the persistence
/// keys that keep a map round-trippable across restarts and across
/// controller variant migrations. They are not display names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    Doorbell,
    StreamManagement,
    Microphone,
    Speaker,
}

/// Keyed collection of an accessory's services.
///
/// A role maps to at most one service instance at any time; absence of a
/// role means "not yet constructed for this accessory".
#[derive(Default)]
pub struct ServiceMap {
    services: BTreeMap<ServiceRole, Arc<Service>>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a service under a role, returning the displaced instance if
    /// the role was already taken.
    pub fn insert(&mut self, role: ServiceRole, service: Arc<Service>) -> Option<Arc<Service>> {
        self.services.insert(role, service)
    }

    pub fn get(&self, role: ServiceRole) -> Option<&Arc<Service>> {
        self.services.get(&role)
    }

    pub fn remove(&mut self, role: ServiceRole) -> Option<Arc<Service>> {
        self.services.remove(&role)
    }

    pub fn contains(&self, role: ServiceRole) -> bool {
        self.services.contains_key(&role)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServiceRole, &Arc<Service>)> {
        self.services.iter().map(|(&role, service)| (role, service))
    }

    pub fn roles(&self) -> impl Iterator<Item = ServiceRole> {
        self.services.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::service::ServiceType;

    #[test]
    fn test_at_most_one_service_per_role() {
        let mut map = ServiceMap::new();
        let first = Arc::new(Service::new(ServiceType::Doorbell));
        let second = Arc::new(Service::new(ServiceType::Doorbell));

        assert!(map.insert(ServiceRole::Doorbell, first.clone()).is_none());
        let displaced = map.insert(ServiceRole::Doorbell, second).unwrap();
        assert_eq!(displaced.instance_id(), first.instance_id());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_absent_role_means_not_constructed() {
        let mut map = ServiceMap::new();
        assert!(!map.contains(ServiceRole::Microphone));
        assert!(map.get(ServiceRole::Microphone).is_none());

        map.insert(
            ServiceRole::Microphone,
            Arc::new(Service::new(ServiceType::Microphone)),
        );
        assert!(map.contains(ServiceRole::Microphone));
        assert!(map.remove(ServiceRole::Microphone).is_some());
        assert!(map.is_empty());
    }
}
