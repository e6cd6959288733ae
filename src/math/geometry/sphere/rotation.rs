// src/math/geometry/sphere/rotation.rs
use crate::math::{error::*, types::*, utils::*};
use serde::{Deserialize, Serialize};

/// Quaternion für 3D-Rotationen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Erstellt ein neues Quaternion
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Quaternion aus Skalar- und Vektoranteil
    pub fn from_scalar_vector(w: f64, v: Point3D) -> Self {
        Self::new(w, v.x, v.y, v.z)
    }

    /// Identitäts-Quaternion (keine Rotation)
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Erstellt Quaternion aus Achse und Winkel
    pub fn from_axis_angle(axis: Point3D, angle: f64) -> MathResult<Self> {
        let axis_length = axis.length();
        if axis_length < constants::EPSILON {
            return Err(MathError::InvalidConfiguration {
                message: "Rotation axis cannot be zero vector".to_string(),
            });
        }

        let normalized_axis = axis / axis_length;
        let half_angle = angle * 0.5;
        Ok(Self::from_scalar_vector(
            half_angle.cos(),
            normalized_axis * half_angle.sin(),
        ))
    }

    /// Kürzeste Rotation, die den Nordpol (0,0,1) auf `target` abbildet.
    ///
    /// Für den Südpol ist die kürzeste Rotation nicht eindeutig, dann wird
    /// um die x-Achse um π gedreht.
    pub fn from_north_to(target: Point3D) -> MathResult<Self> {
        use nalgebra::{UnitQuaternion, Vector3 as NVec3};

        if target.length_squared() < constants::EPSILON {
            return Err(MathError::InvalidConfiguration {
                message: "Cannot orient towards a zero vector".to_string(),
            });
        }
        let to = NVec3::new(target.x, target.y, target.z);
        match UnitQuaternion::rotation_between(&NVec3::z(), &to) {
            Some(rotation) => {
                let c = rotation.quaternion().coords;
                Ok(Self::new(c.w, c.x, c.y, c.z))
            }
            None => Self::from_axis_angle(Point3D::X, constants::PI),
        }
    }

    /// Vektoranteil
    pub fn vector(&self) -> Point3D {
        Point3D::new(self.x, self.y, self.z)
    }

    /// Länge des Quaternions
    pub fn length(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Normalisiert das Quaternion
    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length < constants::EPSILON {
            return Self::identity();
        }
        Self::new(
            self.w / length,
            self.x / length,
            self.y / length,
            self.z / length,
        )
    }

    /// Konjugat des Quaternions
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Multipliziert zwei Quaternions (Hamilton-Produkt)
    pub fn multiply(&self, other: &Quaternion) -> Self {
        Self::new(
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        )
    }

    /// Rotiert einen Vektor: q·v·q*
    pub fn rotate_vector(&self, vector: Point3D) -> Point3D {
        let quat_vector = Quaternion::from_scalar_vector(0.0, vector);
        self.multiply(&quat_vector)
            .multiply(&self.conjugate())
            .vector()
    }

    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Konvertiert zu Achse und Winkel
    pub fn to_axis_angle(&self) -> (Point3D, f64) {
        let normalized = self.normalize();
        let angle = 2.0 * normalized.w.clamp(-1.0, 1.0).acos();

        let sin_half_angle = (1.0 - normalized.w * normalized.w).max(0.0).sqrt();
        if sin_half_angle < constants::EPSILON {
            return (Point3D::X, 0.0);
        }

        (normalized.vector() / sin_half_angle, angle)
    }
}
