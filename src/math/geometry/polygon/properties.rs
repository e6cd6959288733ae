// src/math/geometry/polygon/properties.rs

use crate::math::geometry::polygon::Polygon;
use crate::math::types::*;
use crate::math::utils::simple_geometry::cross_product_2d as cross;

/// Trait für Polygon-Eigenschaften.
///
/// Fläche und Schwerpunkt werden per Triangulierung relativ zu Vertex 0
/// berechnet, das Trägheitsmoment relativ zum Schwerpunkt.
pub trait PolygonProperties {
    /// Vorzeichenbehaftete Fläche, positiv für CCW
    fn area(&self) -> f64;

    /// Flächenschwerpunkt
    fn centroid(&self) -> Point2D;

    /// Polares Flächenträgheitsmoment um den Schwerpunkt
    fn moment_of_inertia(&self) -> f64;

    /// Liegt der Punkt links von (oder auf) jeder Kante? Nur für CCW-Polygone.
    fn contains(&self, point: Point2D) -> bool;

    fn is_convex(&self) -> bool;

    /// Kein Vertex liegt, vom Schwerpunkt aus gesehen, im Uhrzeigersinn vom vorherigen
    fn is_ccw_oriented(&self) -> bool;

    fn orientation(&self) -> PolygonOrientation {
        let area = self.area();
        if area > 0.0 {
            PolygonOrientation::CounterClockwise
        } else if area < 0.0 {
            PolygonOrientation::Clockwise
        } else {
            PolygonOrientation::Collinear
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonOrientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

impl PolygonProperties for [Point2D] {
    fn area(&self) -> f64 {
        if self.len() < 3 {
            return 0.0;
        }
        let o = self[0];
        let a: f64 = self
            .windows(2)
            .skip(1)
            .map(|w| cross(w[0] - o, w[1] - o))
            .sum();
        a * 0.5
    }

    fn centroid(&self) -> Point2D {
        if self.len() < 3 {
            return Point2D::ZERO;
        }
        let area = self.area();
        let o = self[0];
        if area == 0.0 {
            // Entartet: Vertex-Mittel
            return self.iter().fold(Point2D::ZERO, |acc, &v| acc + v) / self.len() as f64;
        }

        // (tv1 + tv2 + 0)/3 * [tv1 x tv2]/2
        let cen = self
            .windows(2)
            .skip(1)
            .map(|w| {
                let (tv1, tv2) = (w[0] - o, w[1] - o);
                (tv1 + tv2) * cross(tv1, tv2) / 6.0
            })
            .fold(Point2D::ZERO, |acc, v| acc + v);
        o + cen / area
    }

    fn moment_of_inertia(&self) -> f64 {
        if self.len() < 3 {
            return 0.0;
        }
        let n = self.len();
        let o = self.centroid();
        let a = self.area();

        let mut res = 0.0;
        let mut s = 0.0;
        for i in 0..n {
            let tv1 = self[i] - o;
            let tv2 = self[(i + 1) % n] - o;
            let c = cross(tv1, tv2);
            s += c.abs();
            res += c * (tv1.dot(tv1) + tv1.dot(tv2) + tv2.dot(tv2));
        }
        if s == 0.0 {
            return 0.0;
        }
        res * a / (6.0 * s)
    }

    fn contains(&self, point: Point2D) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            let pp = self[(i + 1) % n] - self[i];
            let po = point - self[i];
            cross(pp, po) >= 0.0
        })
    }

    fn is_convex(&self) -> bool {
        let n = self.len();
        if n < 3 {
            return false;
        }
        let mut td1 = cross(self[1] - self[0], self[2] - self[1]);
        for i in 1..n {
            let tv1 = self[(i + 1) % n] - self[i];
            let tv2 = self[(i + 2) % n] - self[(i + 1) % n];
            let td2 = cross(tv1, tv2);
            // Vorzeichenwechsel zwischen benachbarten Ecken
            if td2 * td1 < 0.0 {
                return false;
            }
            td1 = td2;
        }
        true
    }

    fn is_ccw_oriented(&self) -> bool {
        let n = self.len();
        if n < 3 {
            return false;
        }
        let o = self.centroid();
        (0..n).all(|i| cross(self[i] - o, self[(i + 1) % n] - o) >= 0.0)
    }
}

impl PolygonProperties for Polygon {
    fn area(&self) -> f64 {
        self.vertices.area()
    }

    fn centroid(&self) -> Point2D {
        self.vertices.centroid()
    }

    fn moment_of_inertia(&self) -> f64 {
        self.vertices.moment_of_inertia()
    }

    fn contains(&self, point: Point2D) -> bool {
        PolygonProperties::contains(self.vertices.as_slice(), point)
    }

    fn is_convex(&self) -> bool {
        self.vertices.is_convex()
    }

    fn is_ccw_oriented(&self) -> bool {
        self.vertices.is_ccw_oriented()
    }
}
