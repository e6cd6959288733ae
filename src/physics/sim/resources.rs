// src/physics/sim/resources.rs
use crate::physics::contact::{DetectionGate, DetectionMethod};
use crate::physics::forcing::FieldSpec;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Planetenradius und abgeleitete Größen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Planet {
    pub r: f64,
    pub r_rec: f64,
    pub r2: f64,
    pub r2_rec: f64,
}

impl Planet {
    pub fn new(radius: f64) -> Self {
        Self {
            r: radius,
            r_rec: 1.0 / radius,
            r2: radius * radius,
            r2_rec: 1.0 / (radius * radius),
        }
    }
}

impl Default for Planet {
    fn default() -> Self {
        Self::new(EARTH_RADIUS_M)
    }
}

impl From<f64> for Planet {
    fn from(radius: f64) -> Self {
        Planet::new(radius)
    }
}

impl From<Planet> for f64 {
    fn from(planet: Planet) -> Self {
        planet.r
    }
}

/// Konstanten des Kontaktkraftmodells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysConsts {
    /// Skalierung der elastischen Kontaktkraft
    pub rigidity: f64,
    /// Skalierung der viskosen Kontaktkraft
    pub viscosity: f64,
    /// Skalierung des Reibungsmoments
    pub rotatability: f64,
    /// Dämpfungsgewicht
    pub etha: f64,
    /// Exponent des Flächengesetzes (< 1: sublinear)
    pub contact_exponent: f64,
    /// Steifigkeit permanenter Verbindungen
    pub joint_stiffness: f64,
    /// Aufblähfaktor für `freeze`
    pub freeze_tolerance: f64,
    /// Aufblähfaktor beim Verankern vorgegebener Links
    pub link_tolerance: f64,
}

impl Default for PhysConsts {
    fn default() -> Self {
        Self {
            rigidity: 1.0,
            viscosity: 1.0,
            rotatability: 1.0,
            etha: 1.0e-3,
            contact_exponent: 0.5,
            joint_stiffness: 1.0,
            freeze_tolerance: 0.05,
            link_tolerance: 0.1,
        }
    }
}

/// Parameter des Antriebs durch Wind und Strömung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingParameters {
    pub wind_drag: f64,
    pub water_drag: f64,
    pub wind: FieldSpec,
    pub current: FieldSpec,
}

impl Default for ForcingParameters {
    fn default() -> Self {
        Self {
            wind_drag: 0.0016,
            water_drag: 0.0045,
            wind: FieldSpec::None,
            current: FieldSpec::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub method: DetectionMethod,
    pub gate: DetectionGate,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    // --- Zeitsteuerung ---
    pub dt_seconds: f64,
    pub total_steps: u64,

    // --- Globale Planeten-/Physik-Parameter ---
    pub planet_radius_m: f64,
    pub consts: PhysConsts,
    pub forcing: ForcingParameters,
    pub detection: DetectionSettings,
    /// Schritt, an dem `freeze` einmalig ausgeführt wird
    pub freeze_at_step: Option<u64>,

    // --- Ausgabe & Debug ---
    /// Schritte zwischen Snapshots, 0 = nie
    pub save_every: u64,
    /// Schritte zwischen vollständigen Restart-Abzügen, 0 = nie
    pub restart_every: u64,
    pub diagnostics_every: u64,
    pub output_dir: String,
    pub log_filter: String,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            // Zeit
            dt_seconds: 600.0,
            total_steps: 1000,

            // Planet/Physik
            planet_radius_m: EARTH_RADIUS_M,
            consts: PhysConsts::default(),
            forcing: ForcingParameters::default(),
            detection: DetectionSettings::default(),
            freeze_at_step: None,

            // Ausgabe
            save_every: 0,
            restart_every: 0,
            diagnostics_every: 100,
            output_dir: "output".to_string(),
            log_filter: "info,floe_dynamics=debug".to_string(),
        }
    }
}

impl SimulationParameters {
    pub fn planet(&self) -> Planet {
        Planet::new(self.planet_radius_m)
    }
}
