// src/math/geometry/polygon/core.rs

use crate::math::{error::*, types::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Konvexes Polygon in einer lokalen Tangentialebene.
///
/// Die Vertices sind implizit geschlossen: der letzte Vertex ist mit dem ersten
/// verbunden und wird nicht dupliziert gespeichert. Erwartete Orientierung ist CCW.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point2D>,
}

impl Polygon {
    /// Erstellt ein Polygon, benötigt mindestens 3 Vertices
    pub fn new(vertices: Vec<Point2D>) -> MathResult<Self> {
        if vertices.len() < 3 {
            return Err(MathError::InsufficientPoints {
                expected: 3,
                actual: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// Gibt einen Slice der Vertices zurück.
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Kante `i` als (Start, Ende), zyklisch
    pub fn edge(&self, i: usize) -> (Point2D, Point2D) {
        let n = self.vertices.len();
        (self.vertices[i % n], self.vertices[(i + 1) % n])
    }

    /// Kopie mit umgekehrter Vertex-Reihenfolge
    pub fn reversed(&self) -> Self {
        let mut copy = self.clone();
        copy.vertices.reverse();
        copy
    }

    /// Kopie, um `offset` verschoben
    pub fn translated(&self, offset: Point2D) -> Self {
        Self {
            vertices: self.vertices.iter().map(|&v| v + offset).collect(),
        }
    }

    /// Kopie, um `factor` um `center` skaliert
    pub fn scaled_about(&self, center: Point2D, factor: f64) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|&v| center + (v - center) * factor)
                .collect(),
        }
    }
}

/// Display-Implementierung für Debugging.
impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({} vertices)", self.vertices.len())
    }
}

impl TryFrom<Vec<Point2D>> for Polygon {
    type Error = MathError;

    fn try_from(vertices: Vec<Point2D>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Polygon> for Vec<Point2D> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

impl<'a> IntoIterator for &'a Polygon {
    type Item = &'a Point2D;
    type IntoIter = std::slice::Iter<'a, Point2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}
