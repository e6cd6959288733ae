// src/physics/contact/gate.rs
//
// Entscheidet pro Schritt, ob die Kontaktliste neu aufgebaut wird.

use crate::physics::sim::time::ModelTime;
use serde::{Deserialize, Serialize};

/// Strategie der Breitphase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// O(n²), Referenz für kleine Populationen
    AllPairs,
    #[default]
    SweepAndPrune,
}

/// Wann eine Erkennung stattfindet
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionGate {
    #[default]
    Always,
    /// Alle `n` Schritte
    EveryNSteps(u64),
    /// Alle `s` Sekunden Modellzeit
    EveryInterval(f64),
    /// Sobald das schnellste Element seit der letzten Erkennung mehr als
    /// diese Strecke (m) zurückgelegt haben kann
    SpeedTriggered(f64),
}

/// Zustand des Gates zwischen zwei Erkennungen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GateState {
    last_step: Option<u64>,
    last_time: Option<f64>,
    travelled: f64,
}

impl GateState {
    /// Der erste Aufruf erkennt immer.
    pub fn should_detect(&mut self, gate: DetectionGate, time: &ModelTime, max_speed: f64) -> bool {
        let fire = match gate {
            DetectionGate::Always => true,
            DetectionGate::EveryNSteps(n) => self
                .last_step
                .is_none_or(|last| time.n >= last.saturating_add(n)),
            DetectionGate::EveryInterval(seconds) => self
                .last_time
                .is_none_or(|last| time.elapsed >= last + seconds),
            DetectionGate::SpeedTriggered(threshold) => {
                if self.last_step.is_some() {
                    self.travelled += time.dt * max_speed;
                }
                self.last_step.is_none() || self.travelled > threshold
            }
        };

        if fire {
            self.last_step = Some(time.n);
            self.last_time = Some(time.elapsed);
            self.travelled = 0.0;
        }
        fire
    }
}
