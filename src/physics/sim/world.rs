// src/physics/sim/world.rs
//
// Gesamter Simulationszustand. Wird als Referenz in jede Kernoperation
// gereicht; es gibt keinen globalen Zustand.

use super::integrator;
use super::resources::{ForcingParameters, PhysConsts, Planet, SimulationParameters};
use super::time::{ModelTime, StepRecord};
use crate::physics::contact::{self, ContactDetector, ContactKind};
use crate::physics::error::{SimError, SimResult};
use crate::physics::forcing;
use crate::physics::ice::{Element, ForceAccumulator, Link, Material, StressRange};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Stabiler Element-Speicher, Index == id
    pub elements: Vec<Element>,
    /// Kraftspeicher parallel zu `elements`
    #[serde(skip)]
    pub forces: Vec<ForceAccumulator>,
    pub contacts: ContactDetector,
    pub materials: Vec<Material>,
    pub links: Vec<Link>,
    pub planet: Planet,
    pub consts: PhysConsts,
    pub forcing: ForcingParameters,
    pub time: ModelTime,
    pub freeze_at_step: Option<u64>,
}

impl World {
    pub fn new(
        elements: Vec<Element>,
        materials: Vec<Material>,
        links: Vec<Link>,
        params: &SimulationParameters,
    ) -> SimResult<Self> {
        check_ids(&elements)?;
        let forces = vec![ForceAccumulator::default(); elements.len()];
        Ok(Self {
            elements,
            forces,
            contacts: ContactDetector::new(params.detection.method, params.detection.gate),
            materials,
            links,
            planet: params.planet(),
            consts: params.consts,
            forcing: params.forcing.clone(),
            time: ModelTime::new(params.dt_seconds, params.total_steps),
            freeze_at_step: params.freeze_at_step,
        })
    }

    /// Stellt einen mit [`World::restart_json`] geschriebenen Zustand wieder
    /// her. Die Kraftspeicher werden neu angelegt, Masse und Trägheit neu
    /// berechnet.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let mut world: World = serde_json::from_str(json)?;
        check_ids(&world.elements)?;
        let len = world.elements.len();
        let pairs = world.contacts.contacts().iter().map(|c| c.pair).chain(world.links.iter().copied());
        for pair in pairs {
            if pair.i2() >= len {
                return Err(SimError::ElementOutOfRange { id: pair.i2(), len });
            }
        }
        world.clear_accumulators();
        world.update_mass_properties()?;
        Ok(world)
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let world = Self::from_json_str(&text)?;
        info!(
            "Restart '{}' loaded at step {} (t = {:.0} s): {} elements, {} contacts",
            path.display(),
            world.time.n,
            world.time.elapsed,
            world.elements.len(),
            world.contacts.len()
        );
        Ok(world)
    }

    /// Vollständiger Zustand als JSON, ohne Kraftspeicher
    pub fn restart_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Ein Erkennungszyklus (Gate, Clear, Breitphase, Commit)
    pub fn detect(&mut self) -> bool {
        self.contacts.detect(&self.elements, &self.time)
    }

    pub fn freeze(&mut self, tolerance: f64) -> SimResult<usize> {
        self.contacts.freeze(&self.elements, tolerance)
    }

    pub fn freeze_links(&mut self) -> SimResult<usize> {
        self.contacts
            .freeze_links(&self.elements, &self.links, self.consts.link_tolerance, self.time.n)
    }

    pub fn apply_forcing(&mut self) {
        forcing::apply_forcing(
            &self.elements,
            &mut self.forces,
            &self.forcing.wind,
            &self.forcing.current,
            &self.forcing,
            &self.planet,
        );
    }

    pub fn compute_contact_forces(&mut self) -> SimResult<()> {
        contact::compute_contact_forces(
            &self.elements,
            &mut self.forces,
            self.contacts.contacts_mut(),
            &self.materials,
            &self.planet,
            &self.consts,
        )
    }

    /// Übernimmt die Spannung dieses Schritts aus den Akkumulatoren in die Elemente
    pub fn record_stress(&mut self) {
        for (e, acc) in self.elements.iter_mut().zip(&self.forces) {
            e.stress = acc.stress;
        }
    }

    pub fn integrate(&mut self, dt: f64) -> SimResult<()> {
        integrator::integrate(&mut self.elements, &self.forces, dt, &self.planet)
    }

    pub fn clear_accumulators(&mut self) {
        self.forces.resize(self.elements.len(), ForceAccumulator::default());
        self.forces.iter_mut().for_each(ForceAccumulator::clear);
    }

    /// Masse und Trägheit aus Fläche und Material, fehlerhafte Elemente ausgenommen
    pub fn update_mass_properties(&mut self) -> SimResult<()> {
        for e in self.elements.iter_mut().filter(|e| !e.is_errored()) {
            let material = self.materials.get(e.mat_id).ok_or_else(|| {
                SimError::scenario(format!("element {} references missing material {}", e.id, e.mat_id))
            })?;
            e.update_mass(material, &self.planet);
        }
        Ok(())
    }

    /// Kennzahlen des aktuellen Zustands
    pub fn diagnostics(&self) -> StepRecord {
        let active = || self.elements.iter().filter(|e| !e.is_errored());
        let (max_speed, kinetic_energy) = active().fold((0.0_f64, 0.0), |(speed, energy), e| {
            (speed.max(e.v.length()), energy + e.kinetic_energy())
        });
        StepRecord {
            step: self.time.n,
            elapsed: self.time.elapsed,
            max_speed,
            kinetic_energy,
            collisions: self.contacts.count(ContactKind::Collision),
            joints: self.contacts.count(ContactKind::Joint),
            stress: StressRange::of(active().map(|e| e.stress)).unwrap_or_default(),
        }
    }

    /// Vorbereitung vor dem ersten Schritt: Masse, vorgegebene Joints,
    /// erste Erkennung.
    pub fn initialize(&mut self) -> SimResult<()> {
        self.clear_accumulators();
        self.update_mass_properties()?;
        self.freeze_links()?;
        self.detect();
        Ok(())
    }

    /// Ein vollständiger Zeitschritt. Liefert die Kennzahlen nach der
    /// Integration; die Zeit ist danach bereits fortgeschrieben.
    pub fn step(&mut self) -> SimResult<StepRecord> {
        self.detect();
        if self.freeze_at_step == Some(self.time.n) {
            self.freeze(self.consts.freeze_tolerance)?;
        }

        self.apply_forcing();
        self.compute_contact_forces()?;
        self.record_stress();
        self.integrate(self.time.dt)?;
        self.update_mass_properties()?;

        let record = self.diagnostics();
        self.clear_accumulators();
        self.time.advance();
        Ok(record)
    }
}

/// Index im Speicher und `id` müssen übereinstimmen
fn check_ids(elements: &[Element]) -> SimResult<()> {
    for (idx, e) in elements.iter().enumerate() {
        if e.id != idx {
            return Err(SimError::scenario(format!("element at index {} carries id {}", idx, e.id)));
        }
    }
    Ok(())
}
