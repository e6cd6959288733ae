// src/physics/mod.rs
pub mod contact;
pub mod error;
pub mod forcing;
pub mod ice;
pub mod sim;

pub use error::{SimError, SimResult};
