// src/math/geometry/polygon/operations/intersection.rs
//
// Schnitt zweier konvexer Polygone in derselben Ebene. Das Ergebnis
// unterscheidet vier Fälle: kein Schnitt, Berührpunkt, Berührstrecke
// (Fläche 0) und echtes Schnittpolygon.

use crate::math::geometry::polygon::{Polygon, PolygonProperties};
use crate::math::types::*;
use crate::math::utils::constants;

/// Herkunft eines Schnittpunktes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    /// Vertex `index` des ersten Polygons liegt im zweiten
    VertexOfFirst(usize),
    /// Vertex `index` des zweiten Polygons liegt im ersten
    VertexOfSecond(usize),
    /// Schnitt der Kante `first` (erstes Polygon) mit Kante `second`
    Edge { first: usize, second: usize },
}

impl PointStatus {
    pub fn is_edge(&self) -> bool {
        matches!(self, PointStatus::Edge { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionPoint {
    pub point: Point2D,
    pub status: PointStatus,
}

/// Ergebnis von [`polygon_intersection`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Intersection {
    /// Bei >= 3 Punkten nach Winkel um ihren Mittelpunkt sortiert (CCW)
    pub points: Vec<IntersectionPoint>,
    pub center: Point2D,
    /// Fläche; 0 bei Berührung in Punkt oder Strecke
    pub area: f64,
    /// Länge der Berührstrecke (nur bei genau 2 Punkten)
    pub touch_length: f64,
}

impl Intersection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Echte Überlappung mit positiver Fläche
    pub fn is_overlap(&self) -> bool {
        self.points.len() >= 3 && self.area > 0.0
    }

    pub fn vertices(&self) -> Vec<Point2D> {
        self.points.iter().map(|p| p.point).collect()
    }

    /// Alle Punkte, die aus Kantenschnitten stammen
    pub fn edge_points(&self) -> impl Iterator<Item = &IntersectionPoint> {
        self.points.iter().filter(|p| p.status.is_edge())
    }
}

/// Schnittpunkt zweier Strecken (Cramersche Regel), Endpunkte eingeschlossen.
///
/// Parallele Strecken liefern immer `None`, auch wenn sie kollinear überlappen.
/// Als parallel gilt auch eine Determinante im Rundungsbereich der Kantenlängen.
pub fn segment_intersect(a1: Point2D, a2: Point2D, b1: Point2D, b2: Point2D) -> Option<Point2D> {
    let d = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    let scale = (a2 - a1).length() * (b2 - b1).length();
    if d.abs() <= constants::EPSILON * scale {
        return None;
    }
    let na = (b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x);
    let nb = (a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x);
    let ua = na / d;
    let ub = nb / d;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(a1 + (a2 - a1) * ua)
    } else {
        None
    }
}

fn push_unique(points: &mut Vec<IntersectionPoint>, point: Point2D, status: PointStatus) {
    let eps_sq = constants::MERGE_EPSILON * constants::MERGE_EPSILON;
    if points.iter().all(|p| p.point.distance_squared(point) > eps_sq) {
        points.push(IntersectionPoint { point, status });
    }
}

/// Schnitt zweier konvexer, CCW orientierter Polygone.
pub fn polygon_intersection(poly1: &Polygon, poly2: &Polygon) -> Intersection {
    let mut points: Vec<IntersectionPoint> = Vec::new();

    for (i, &v) in poly1.vertices.iter().enumerate() {
        if poly2.contains(v) {
            push_unique(&mut points, v, PointStatus::VertexOfFirst(i));
        }
    }
    for (j, &v) in poly2.vertices.iter().enumerate() {
        if poly1.contains(v) {
            push_unique(&mut points, v, PointStatus::VertexOfSecond(j));
        }
    }
    for i in 0..poly1.len() {
        let (a1, a2) = poly1.edge(i);
        for j in 0..poly2.len() {
            let (b1, b2) = poly2.edge(j);
            if let Some(x) = segment_intersect(a1, a2, b1, b2) {
                push_unique(&mut points, x, PointStatus::Edge { first: i, second: j });
            }
        }
    }

    match points.len() {
        0 => Intersection::default(),
        1 => Intersection {
            center: points[0].point,
            points,
            area: 0.0,
            touch_length: 0.0,
        },
        2 => Intersection {
            center: (points[0].point + points[1].point) * 0.5,
            touch_length: points[0].point.distance(points[1].point),
            points,
            area: 0.0,
        },
        n => {
            let mean = points.iter().fold(Point2D::ZERO, |acc, p| acc + p.point) / n as f64;
            points.sort_by(|a, b| {
                let pa = a.point - mean;
                let pb = b.point - mean;
                pa.y.atan2(pa.x).total_cmp(&pb.y.atan2(pb.x))
            });
            let vertices: Vec<Point2D> = points.iter().map(|p| p.point).collect();
            let area = vertices.area();
            Intersection {
                center: vertices.centroid(),
                points,
                area,
                touch_length: 0.0,
            }
        }
    }
}
