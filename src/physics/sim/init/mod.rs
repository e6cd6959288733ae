// src/physics/sim/init/mod.rs
pub mod scenario;

pub use scenario::{ElementSpec, Motion, Scenario};
