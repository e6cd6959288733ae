// src/physics/ice/mod.rs
pub mod element;
pub mod link;
pub mod material;
pub mod stress;

pub use element::{Element, ElementFlags, ForceAccumulator, lift_to_sphere};
pub use link::Link;
pub use material::{Layer, Material};
pub use stress::{Stress, StressRange};
