// src/physics/sim/time/resources.rs
use crate::physics::ice::StressRange;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Modellzeit: Schrittweite, Schrittzähler und vergangene Sekunden
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTime {
    /// Schrittweite (s)
    pub dt: f64,
    /// Index des aktuellen Schritts
    pub n: u64,
    /// Vergangene Modellzeit (s)
    pub elapsed: f64,
    pub total_steps: u64,
}

impl Default for ModelTime {
    fn default() -> Self {
        Self::new(600.0, 1000)
    }
}

impl ModelTime {
    pub fn new(dt: f64, total_steps: u64) -> Self {
        Self {
            dt,
            n: 0,
            elapsed: 0.0,
            total_steps,
        }
    }

    pub fn advance(&mut self) {
        self.n += 1;
        // aus n berechnet, damit sich kein Rundungsfehler aufsummiert
        self.elapsed = self.n as f64 * self.dt;
    }

    pub fn is_finished(&self) -> bool {
        self.n >= self.total_steps
    }

    /// `every == 0` bedeutet nie
    pub fn is_save_step(&self, every: u64) -> bool {
        every != 0 && self.n % every == 0
    }
}

/// Kennzahlen eines Schritts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub elapsed: f64,
    /// Höchste Oberflächengeschwindigkeit (m/s)
    pub max_speed: f64,
    pub kinetic_energy: f64,
    pub collisions: usize,
    pub joints: usize,
    /// Extremwerte der Elementspannung (Pa)
    #[serde(default)]
    pub stress: StressRange,
}

/// Begrenzte Historie der letzten Schritte (älteste fällt heraus)
#[derive(Resource, Debug, Clone)]
pub struct StepHistory {
    pub records: VecDeque<StepRecord>,
    pub max_size: usize,
}

impl Default for StepHistory {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl StepHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        if self.max_size == 0 {
            return;
        }
        if self.records.len() == self.max_size {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn latest(&self) -> Option<&StepRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Eintrag, dessen Modellzeit `target` am nächsten liegt
    pub fn find_closest(&self, target: f64) -> Option<&StepRecord> {
        self.records
            .iter()
            .min_by(|a, b| (a.elapsed - target).abs().total_cmp(&(b.elapsed - target).abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_time_advance() {
        let mut t = ModelTime::new(0.1, 3);
        for _ in 0..3 {
            assert!(!t.is_finished());
            t.advance();
        }
        assert!(t.is_finished());
        assert_eq!(t.n, 3);
        assert_eq!(t.elapsed, 3.0 * 0.1);
    }

    #[test]
    fn test_save_step() {
        let mut t = ModelTime::new(1.0, 10);
        assert!(!t.is_save_step(0));
        assert!(t.is_save_step(5));
        t.advance();
        assert!(!t.is_save_step(5));
    }

    #[test]
    fn test_history_drops_oldest() {
        let mut h = StepHistory::new(2);
        for step in 0..3 {
            h.push(StepRecord {
                step,
                elapsed: step as f64 * 10.0,
                ..Default::default()
            });
        }
        assert_eq!(h.len(), 2);
        assert_eq!(h.records.front().map(|r| r.step), Some(1));
        assert_eq!(h.latest().map(|r| r.step), Some(2));
        assert_eq!(h.find_closest(12.0).map(|r| r.step), Some(1));
    }
}
