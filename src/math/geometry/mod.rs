// src/math/geometry/mod.rs

// Deklaration der Haupt-Geometriemodule
pub mod polygon;
pub mod sphere;

// Polygon-Exporte
pub use self::polygon::{
    Intersection, IntersectionPoint, PointStatus, Polygon, PolygonOrientation,
    PolygonProperties, PolygonValidator, operations::intersection::{polygon_intersection, segment_intersect},
};

// Sphere-Exporte
pub use self::sphere::{GeographicCoordinates, Quaternion};
