// src/math/mod.rs
pub mod error;
pub mod geometry;
pub mod types;
pub mod utils;

// Re-exports für einfache Verwendung
pub use error::{MathError, MathResult};
pub use types::*;

// Öffentliche API
pub mod prelude {
    pub use super::{
        error::{MathError, MathResult},
        geometry::{
            polygon::{
                Intersection, IntersectionPoint, PointStatus, Polygon, PolygonProperties,
                PolygonValidator,
            },
            sphere::{coordinates::*, rotation::*},
        },
        types::*,
    };
}
