// src/math/geometry/polygon/validation.rs

use super::PolygonProperties;
use crate::math::{error::*, types::*, utils::simple_geometry::cross_product_2d};

/// Polygon-Validator für Eingabegeometrie: Punktanzahl, Fläche, Umlaufsinn, Konvexität
#[derive(Debug, Clone, Copy)]
pub struct PolygonValidator {
    /// Minimale (positive) Fläche, darunter gilt das Polygon als entartet
    min_area: f64,
}

impl Default for PolygonValidator {
    fn default() -> Self {
        Self {
            min_area: 1e-18,
        }
    }
}

impl PolygonValidator {
    pub fn validate_vertices(&self, vertices: &[Point2D]) -> MathResult<()> {
        if vertices.len() < 3 {
            return Err(MathError::InsufficientPoints {
                expected: 3,
                actual: vertices.len(),
            });
        }
        let area = vertices.area();
        if area < -self.min_area {
            return Err(MathError::ClockwiseWinding);
        }
        if area <= self.min_area {
            return Err(MathError::DegeneratePolygon { area });
        }
        if let Some(vertex) = first_reflex_vertex(vertices) {
            return Err(MathError::NonConvexPolygon { vertex });
        }
        Ok(())
    }
}

/// Erster Vertex, an dem ein CCW-Polygon nach rechts abknickt
fn first_reflex_vertex(vertices: &[Point2D]) -> Option<usize> {
    let n = vertices.len();
    (0..n).find(|&i| {
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];
        cross_product_2d(vertices[i] - prev, next - vertices[i]) < 0.0
    })
}
