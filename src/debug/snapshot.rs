// src/debug/snapshot.rs
//
// JSON-Abzug des Zustands für die Auswertung außerhalb der Simulation.

use crate::math::geometry::sphere::Quaternion;
use crate::math::types::Point3D;
use crate::math::utils::angles;
use crate::physics::contact::Contact;
use crate::physics::error::SimResult;
use crate::physics::ice::{Element, Stress};
use crate::physics::sim::World;
use bevy::log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: usize,
    pub flags: u32,
    pub stress: Stress,
    pub q: Quaternion,
    pub w: Point3D,
    pub v: Point3D,
    /// Zentrum in Grad
    pub lat: f64,
    pub lon: f64,
}

impl From<&Element> for ElementSnapshot {
    fn from(e: &Element) -> Self {
        let (lat, lon) = e.lat_lon();
        Self {
            id: e.id,
            flags: e.flags.bits(),
            stress: e.stress,
            q: e.q,
            w: e.w,
            v: e.v,
            lat: angles::rad_to_deg(lat),
            lon: angles::rad_to_deg(lon),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub step: u64,
    pub elapsed: f64,
    pub elements: Vec<ElementSnapshot>,
    pub contacts: Vec<Contact>,
}

impl From<&World> for WorldSnapshot {
    fn from(world: &World) -> Self {
        Self {
            step: world.time.n,
            elapsed: world.time.elapsed,
            elements: world.elements.iter().map(ElementSnapshot::from).collect(),
            contacts: world.contacts.contacts().to_vec(),
        }
    }
}

pub fn snapshot_json(world: &World) -> SimResult<String> {
    Ok(serde_json::to_string_pretty(&WorldSnapshot::from(world))?)
}

/// Schreibt `snapshot_<step>.json` nach `dir`
pub fn write_snapshot(world: &World, dir: &Path) -> SimResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("snapshot_{:06}.json", world.time.n));
    std::fs::write(&path, snapshot_json(world)?)?;
    info!("Snapshot '{}' written", path.display());
    Ok(path)
}

/// Schreibt den vollständigen Zustand als `restart_<step>.json` nach `dir`
pub fn write_restart(world: &World, dir: &Path) -> SimResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("restart_{:06}.json", world.time.n));
    std::fs::write(&path, world.restart_json()?)?;
    info!("Restart file '{}' written", path.display());
    Ok(path)
}
