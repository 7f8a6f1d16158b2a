use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use virtual_accessory_bridge::accessory::{Accessory, CharacteristicType, ServiceRole};
use virtual_accessory_bridge::config::Config;
use virtual_accessory_bridge::controller::camera::CameraControllerOptions;
use virtual_accessory_bridge::controller::{AccessoryController, DoorbellController};
use virtual_accessory_bridge::input::run_press_simulation;
use virtual_accessory_bridge::persist::ServiceMapStore;

#[derive(Parser, Debug)]
#[command(
    name = "virtual-accessory-bridge",
    about = "Virtual doorbell accessory with persisted service maps"
)]
struct Args {
    /// Accessory display name
    #[arg(long, env = "ACCESSORY_NAME")]
    name: Option<String>,

    /// Directory for persisted service maps
    #[arg(long, env = "STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Seconds between simulated doorbell presses (0 disables the simulation)
    #[arg(long, default_value_t = 30)]
    ring_interval: u64,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();
    info!("Starting Virtual Accessory Bridge");

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(name) = args.name {
        config.accessory.name = name;
    }
    if let Some(state_dir) = args.state_dir {
        config.storage.state_dir = state_dir;
    }
    info!("Configuration loaded:");
    info!("  Accessory Name: {}", config.accessory.name);
    info!("  State File: {:?}", config.service_map_path());
    info!("  Microphone: {}", config.accessory.microphone);
    info!("  Speaker: {}", config.accessory.speaker);

    let store = Arc::new(ServiceMapStore::new(config.service_map_path()));
    let accessory = Accessory::new(config.accessory.name.clone(), store);

    let mut doorbell = DoorbellController::new(CameraControllerOptions {
        microphone: config.accessory.microphone,
        speaker: config.accessory.speaker,
    });
    if let Err(e) = accessory.configure_controller(&mut doorbell) {
        log::error!("Failed to configure doorbell controller: {}", e);
        std::process::exit(1);
    }

    // Log press events the way a subscribed remote observer would see them.
    let mut presses = accessory
        .service(ServiceRole::Doorbell)
        .and_then(|service| service.characteristic(CharacteristicType::PressEvent).cloned())
        .expect("doorbell service missing after configuration")
        .subscribe();
    tokio::spawn(async move {
        while let Ok(value) = presses.recv().await {
            info!("Press event delivered to subscribers: {:?}", value);
        }
    });

    let doorbell = Arc::new(doorbell);
    let simulation = (args.ring_interval > 0).then(|| {
        run_press_simulation(
            doorbell.clone(),
            Duration::from_secs(args.ring_interval),
        )
    });

    info!("Virtual Accessory Bridge is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => log::error!("Failed to listen for shutdown signal: {}", e),
    }

    if let Some(simulation) = simulation {
        simulation.abort();
    }
    if let Err(e) = accessory.persist(doorbell.controller_id()) {
        log::error!("Failed to persist service maps on shutdown: {}", e);
    }

    info!("Virtual Accessory Bridge stopped");
}
