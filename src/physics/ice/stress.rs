// src/physics/ice/stress.rs
//
// Grobe Spannungsabschätzung je Element aus den Kontaktkräften über die
// gemeinsamen Kanten. Keine Bruchmechanik, nur Auswertung.

use crate::math::types::Point2D;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Spannungskomponenten im lokalen System eines Elements (Pa)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stress {
    pub xx: f64,
    pub yy: f64,
    pub xy: f64,
    pub yx: f64,
}

impl Stress {
    /// Beitrag einer Kraft `force` (N), die über eine Kante mit Außennormale
    /// `normal` und Querschnitt `section` (Dicke · Kantenlänge, m²) wirkt.
    pub fn from_edge_force(force: Point2D, normal: Point2D, section: f64) -> Self {
        Self {
            xx: force.x * normal.x / section,
            yy: force.y * normal.y / section,
            xy: -force.x * normal.y / section,
            yx: force.y * normal.x / section,
        }
    }

    fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            xx: f(self.xx, other.xx),
            yy: f(self.yy, other.yy),
            xy: f(self.xy, other.xy),
            yx: f(self.yx, other.yx),
        }
    }

    /// Komponentenweises Minimum
    pub fn min(self, other: Self) -> Self {
        self.zip_with(other, f64::min)
    }

    /// Komponentenweises Maximum
    pub fn max(self, other: Self) -> Self {
        self.zip_with(other, f64::max)
    }
}

impl AddAssign for Stress {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.zip_with(rhs, |a, b| a + b);
    }
}

/// Komponentenweise Extremwerte über alle Elemente
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressRange {
    pub min: Stress,
    pub max: Stress,
}

impl StressRange {
    /// `None` für eine leere Menge
    pub fn of(stresses: impl IntoIterator<Item = Stress>) -> Option<Self> {
        stresses.into_iter().fold(None, |range, s| {
            Some(match range {
                None => Self { min: s, max: s },
                Some(r) => Self {
                    min: r.min.min(s),
                    max: r.max.max(s),
                },
            })
        })
    }
}
