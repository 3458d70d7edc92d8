//! Health Policy Sim - municipal budget policy simulation
//!
//! Models how budget allocations across a handful of policy levers move
//! zone-level public-health indicators year over year.

pub mod baseline;
pub mod catalog;
pub mod core;
pub mod simulation;
