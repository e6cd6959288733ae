// src/math/geometry/sphere/coordinates.rs
//
// Globales Koordinatensystem: z zeigt zum Nordpol. Jedes Element hat eine
// lokale Tangentialebene, deren Normale (0,0,1) ("NORTH") im globalen System
// genau auf das Zentrum des Elements zeigt.

use super::rotation::Quaternion;
use crate::math::{types::*, utils::*};
use serde::{Deserialize, Serialize};

/// Lokale Normale der Tangentialebene
pub const NORTH: Point3D = Point3D::Z;

/// Sphärisch → kartesisch. `theta` ist der Polarwinkel von der z-Achse, `phi` der Azimut.
pub fn sph_to_cart(r: f64, theta: f64, phi: f64) -> Point3D {
    let sin_theta = theta.sin();
    Point3D::new(
        r * sin_theta * phi.cos(),
        r * sin_theta * phi.sin(),
        r * theta.cos(),
    )
}

/// Oberflächengeschwindigkeit (Ost/Nord-Komponenten) am Punkt (lat, lon) als 3D-Vektor.
pub fn geo_to_cart_surf_velo(lat: f64, lon: f64, east: f64, north: f64) -> Point3D {
    sph_to_cart(east, constants::PI_OVER_2, lon + constants::PI_OVER_2)
        + sph_to_cart(north, -lat, lon)
}

/// Lokal → global
pub fn loc_to_glob(q: &Quaternion, v: Point3D) -> Point3D {
    q.rotate_vector(v)
}

/// Global → lokal
pub fn glob_to_loc(q: &Quaternion, v: Point3D) -> Point3D {
    q.conjugate().rotate_vector(v)
}

/// Breite und Länge (Radiant) eines globalen Vektors.
///
/// Die Breite wird über atan2 berechnet und bleibt an den Polen stabil.
pub fn lat_lon_of(v: Point3D) -> (f64, f64) {
    let rho = (v.x * v.x + v.y * v.y).sqrt();
    let lat = constants::PI_OVER_2 - rho.atan2(v.z);
    let lon = if rho < constants::EPSILON {
        0.0
    } else {
        v.y.atan2(v.x)
    };
    (lat, lon)
}

/// Unterpunkt (lat, lon) eines Orientierungs-Quaternions
pub fn lat_lon_of_orientation(q: &Quaternion) -> (f64, f64) {
    lat_lon_of(loc_to_glob(q, NORTH))
}

/// Geografische Koordinaten (Grad) eines Punktes auf der Einheitskugel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicCoordinates {
    /// Längengrad in Grad
    pub lon: f64,
    /// Breitengrad in Grad
    pub lat: f64,
}

impl GeographicCoordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Einheitsvektor zu (lon, lat)
    pub fn to_cartesian(&self) -> Point3D {
        sph_to_cart(
            1.0,
            angles::deg_to_rad(90.0 - self.lat),
            angles::deg_to_rad(self.lon),
        )
    }

    pub fn from_cartesian(point: Point3D) -> Self {
        let (lat, lon) = lat_lon_of(point);
        Self {
            lon: angles::rad_to_deg(lon),
            lat: angles::rad_to_deg(lat),
        }
    }
}
