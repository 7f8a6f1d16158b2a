//! Doorbell press simulation for development and testing.
//!
//! Stands in for a physical button or an upstream integration by ringing
//! the doorbell on a fixed interval.

use crate::controller::DoorbellController;
use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

/// Spawn a task that rings the doorbell periodically.
///
/// The first ring fires immediately. Returns a `JoinHandle` that can be
/// used to abort the simulation task.
pub fn run_press_simulation(
    doorbell: Arc<DoorbellController>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(every);
        loop {
            interval.tick().await;
            info!("[Sim] Ringing doorbell");
            doorbell.ring_doorbell();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::characteristic::CharacteristicType;
    use crate::accessory::service_map::ServiceRole;
    use crate::controller::camera::CameraControllerOptions;
    use crate::controller::AccessoryController;

    #[test]
    fn test_simulation_rings_the_doorbell() {
        tokio_test::block_on(async {
            let mut controller = DoorbellController::new(CameraControllerOptions::default());
            let services = controller.construct_services();
            controller.configure_services();

            let mut presses = services
                .get(ServiceRole::Doorbell)
                .unwrap()
                .characteristic(CharacteristicType::PressEvent)
                .unwrap()
                .subscribe();

            let simulation =
                run_press_simulation(Arc::new(controller), Duration::from_millis(10));
            // The first tick fires immediately; one delivery is enough.
            let delivered = presses.recv().await;
            assert!(delivered.is_ok());
            simulation.abort();
        });
    }
}
