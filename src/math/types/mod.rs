// src/math/types/mod.rs
pub mod bounds;

pub use bounds::*;

// Re-export häufig verwendete externe Typen
pub use bevy::math::{DVec2, DVec3};

// Einheitliche Typen für das gesamte Modul (f64, die Simulation läuft auf Planetenskala)
pub type Point2D = DVec2;
pub type Point3D = DVec3;
