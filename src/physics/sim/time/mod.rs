// src/physics/sim/time/mod.rs
pub mod resources;
pub mod systems;

pub use resources::{ModelTime, StepHistory, StepRecord};
