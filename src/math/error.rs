// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient points for operation: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Degenerate polygon: area {area:e} is not positive")]
    DegeneratePolygon { area: f64 },

    #[error("Polygon is not convex (vertex {vertex})")]
    NonConvexPolygon { vertex: usize },

    #[error("Polygon is wound clockwise, expected counter-clockwise")]
    ClockwiseWinding,

    #[error("Geometric calculation failed: {operation}")]
    GeometricFailure { operation: String },
}

pub type MathResult<T> = Result<T, MathError>;
