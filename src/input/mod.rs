//! Input sources that drive accessory state.

pub mod simulation;

pub use simulation::run_press_simulation;
