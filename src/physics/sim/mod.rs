// src/physics/sim/mod.rs
pub mod init;
pub mod integrator;
pub mod resources;
pub mod state;
pub mod systems;
pub mod time;
pub mod world;

pub use resources::{Planet, PhysConsts, SimulationParameters};
pub use state::SimulationState;
pub use world::World;
