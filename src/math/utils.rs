// src/math/utils.rs

/// Mathematische Konstanten
pub mod constants {
    pub const EPSILON: f64 = 1e-12;
    /// Toleranz für das Zusammenfassen fast identischer Schnittpunkte
    pub const MERGE_EPSILON: f64 = 1e-12;
    pub const PI: f64 = std::f64::consts::PI;
    pub const PI_OVER_2: f64 = std::f64::consts::FRAC_PI_2;
}

/// Skalare Hilfsfunktionen
pub mod comparison {
    /// Lineare Interpolation
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }
}

/// Winkel-Hilfsfunktionen
pub mod angles {
    use super::constants::PI;

    /// Konvertiert Grad zu Radiant
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * PI / 180.0
    }

    /// Konvertiert Radiant zu Grad
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * 180.0 / PI
    }
}

/// Ebene Vektor-Hilfsfunktionen für lokale Tangentialebenen
pub mod simple_geometry {
    use crate::math::types::{Point2D, Point3D};
    use crate::math::utils::constants;

    /// Kreuzprodukt zweier 2D-Vektoren (Skalar)
    pub fn cross_product_2d(a: Point2D, b: Point2D) -> f64 {
        a.x * b.y - a.y * b.x
    }

    /// Dreht um 90° im Uhrzeigersinn
    pub fn rot90_cw(v: Point2D) -> Point2D {
        Point2D::new(v.y, -v.x)
    }

    /// Dreht um 90° gegen den Uhrzeigersinn
    pub fn rot90_ccw(v: Point2D) -> Point2D {
        Point2D::new(-v.y, v.x)
    }

    /// Einheitsvektor oder Null, wenn der Vektor (nahezu) verschwindet
    pub fn ort(v: Point2D) -> Point2D {
        let len = v.length();
        if len < constants::EPSILON {
            Point2D::ZERO
        } else {
            v / len
        }
    }

    /// Lokaler 3D-Vektor auf die Tangentialebene (z verworfen)
    pub fn lay_on_surface(v: Point3D) -> Point2D {
        Point2D::new(v.x, v.y)
    }

    /// Großkreisabstand zweier Einheitsvektoren aus ihrer Sehne
    pub fn great_circle_distance(a: Point3D, b: Point3D) -> f64 {
        let chord = (a - b).length().min(2.0);
        2.0 * (chord * 0.5).asin()
    }
}
