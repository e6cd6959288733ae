// src/debug/mod.rs
pub mod snapshot;
pub mod visualization;

pub use snapshot::{WorldSnapshot, snapshot_json, write_restart, write_snapshot};
pub use visualization::write_state_svg;
