// src/physics/contact/mod.rs
pub mod broad_phase;
pub mod detector;
pub mod force;
pub mod frame;
pub mod gate;
pub mod record;

pub use broad_phase::{all_pairs, sweep_and_prune};
pub use detector::{ContactDetector, SharedEdges, find_edges};
pub use force::{Interaction, compute_contact_forces};
pub use frame::PairFrame;
pub use gate::{DetectionGate, DetectionMethod, GateState};
pub use record::{Contact, ContactKind};
