// src/physics/error.rs
use crate::math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// NaN/Inf in Orientierung oder Geschwindigkeiten, nicht behebbar
    #[error("Numerical corruption in element {id}")]
    NumericalCorruption { id: usize },

    #[error("Element id {id} out of range (store holds {len} elements)")]
    ElementOutOfRange { id: usize, len: usize },

    #[error("Invalid scenario: {message}")]
    Scenario { message: String },

    #[error("Geometry error: {0}")]
    Geometry(#[from] MathError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn scenario(message: impl Into<String>) -> Self {
        SimError::Scenario {
            message: message.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
