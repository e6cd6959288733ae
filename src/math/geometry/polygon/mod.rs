// src/math/geometry/polygon/mod.rs

// Deklaration der Untermodule für Polygon-spezifische Funktionalität
pub mod core; // Enthält die Polygon-Struktur selbst
pub mod properties; // Enthält den PolygonProperties-Trait
pub mod validation; // Prüfung von Eingabegeometrie

pub mod operations; // Schnitt konvexer Polygone

// Re-Exporte für den einfachen Zugriff auf die wichtigsten Polygon-Elemente
pub use self::core::Polygon;
pub use self::operations::intersection::{
    Intersection, IntersectionPoint, PointStatus, polygon_intersection, segment_intersect,
};
pub use self::properties::{PolygonOrientation, PolygonProperties};
pub use self::validation::PolygonValidator;
