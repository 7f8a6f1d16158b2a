//! Virtual accessory bridge library.
//!
//! Models physical or virtual devices as accessories: collections of
//! services and characteristics built by controller variants, persisted
//! across restarts, and migrated when an accessory's declared capability
//! set changes (camera ↔ doorbell).

pub mod accessory;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod persist;
