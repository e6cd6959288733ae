// src/physics/contact/record.rs
use crate::math::types::Point2D;
use crate::physics::ice::Link;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Art eines Kontakts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    #[default]
    None,
    /// Transient, wird bei jeder Erkennung neu aufgebaut
    Collision,
    /// Permanente Verbindung, übersteht jedes `clear`
    Joint,
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContactKind::None => "none",
            ContactKind::Collision => "collision",
            ContactKind::Joint => "joint",
        };
        f.write_str(name)
    }
}

/// Ein wechselwirkendes Elementpaar.
///
/// Geordnet nach `(i1, i2)`; der Kontaktspeicher hält diese Ordnung, damit
/// Kandidatenlisten per Merge abgeglichen werden können.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub pair: Link,
    pub kind: ContactKind,
    /// Schritt der Erzeugung
    pub step: u64,
    /// Überlappungsfläche der letzten Kraftberechnung (Einheitskugel)
    pub area: f64,
    /// Reserviert für materialabhängige Festigkeit, bleibt 1.0
    pub durability: f64,
    /// Reserviert, wird nicht fortgeschrieben
    pub generation: u32,

    /// Ankerpunkte im Rahmen von `i1` (p1, p2) und `i2` (p3, p4)
    pub p1: Point2D,
    pub p2: Point2D,
    pub p3: Point2D,
    pub p4: Point2D,

    /// Vertex-Indizes der gemeinsamen Kanten
    pub v11: usize,
    pub v12: usize,
    pub v21: usize,
    pub v22: usize,

    /// Breite und Länge der Verbindung beim Einfrieren
    pub init_wid: f64,
    pub init_len: f64,
}

impl Contact {
    pub fn new(pair: Link, kind: ContactKind, step: u64) -> Self {
        Self {
            pair,
            kind,
            step,
            area: 0.0,
            durability: 1.0,
            generation: 0,
            p1: Point2D::ZERO,
            p2: Point2D::ZERO,
            p3: Point2D::ZERO,
            p4: Point2D::ZERO,
            v11: 0,
            v12: 0,
            v21: 0,
            v22: 0,
            init_wid: 0.0,
            init_len: 0.0,
        }
    }

    pub fn collision(pair: Link, step: u64) -> Self {
        Self::new(pair, ContactKind::Collision, step)
    }

    pub fn i1(&self) -> usize {
        self.pair.i1()
    }

    pub fn i2(&self) -> usize {
        self.pair.i2()
    }

    /// Sortierschlüssel
    pub fn key(&self) -> (usize, usize) {
        (self.pair.i1(), self.pair.i2())
    }

    pub fn is_joint(&self) -> bool {
        self.kind == ContactKind::Joint
    }

    /// Ankerpunkt im Rahmen von `i1`
    pub fn anchor_first(&self) -> Point2D {
        (self.p1 + self.p2) * 0.5
    }

    /// Ankerpunkt im Rahmen von `i2`
    pub fn anchor_second(&self) -> Point2D {
        (self.p3 + self.p4) * 0.5
    }
}
