// src/physics/forcing.rs
//
// Antrieb durch Wind und Meeresströmung (quadratische Widerstandsgesetze).

use crate::math::geometry::sphere::{geo_to_cart_surf_velo, glob_to_loc};
use crate::math::types::*;
use crate::math::utils::{angles, comparison::lerp, simple_geometry::lay_on_surface};
use crate::physics::error::{SimError, SimResult};
use crate::physics::ice::{Element, ForceAccumulator};
use crate::physics::sim::resources::{ForcingParameters, Planet};
use serde::{Deserialize, Serialize};

/// Geschwindigkeitsfeld auf der Kugel
pub trait VectorField {
    /// Globale kartesische Geschwindigkeit (m/s) an (lat, lon) in Radiant
    fn velocity_at(&self, lat: f64, lon: f64) -> Point3D;
}

/// Überall null
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoField;

impl VectorField for NoField {
    fn velocity_at(&self, _lat: f64, _lon: f64) -> Point3D {
        Point3D::ZERO
    }
}

/// Konstante Ost-/Nordkomponente (m/s)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UniformField {
    pub east: f64,
    pub north: f64,
}

impl VectorField for UniformField {
    fn velocity_at(&self, lat: f64, lon: f64) -> Point3D {
        geo_to_cart_surf_velo(lat, lon, self.east, self.north)
    }
}

/// Reguläres lat/lon-Gitter (Grad) mit Ost-/Nordwerten je Knoten, Zeilen
/// nach Breite geordnet. Bilineare Interpolation, außerhalb null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridField {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub lat_size: usize,
    pub lon_size: usize,
    pub east: Vec<f64>,
    pub north: Vec<f64>,
}

impl GridField {
    pub fn validate(&self) -> SimResult<()> {
        let nodes = self.lat_size * self.lon_size;
        if self.lat_size < 2 || self.lon_size < 2 {
            return Err(SimError::scenario("vector grid needs at least 2x2 nodes"));
        }
        if self.east.len() != nodes || self.north.len() != nodes {
            return Err(SimError::scenario(format!(
                "vector grid expects {} values per component, got {} / {}",
                nodes,
                self.east.len(),
                self.north.len()
            )));
        }
        if self.max_lat <= self.min_lat || self.max_lon <= self.min_lon {
            return Err(SimError::scenario("vector grid bounds are empty"));
        }
        Ok(())
    }

    fn node(&self, lat_i: usize, lon_i: usize) -> (f64, f64) {
        let idx = lat_i * self.lon_size + lon_i;
        (self.east[idx], self.north[idx])
    }

    /// Interpolierte (Ost, Nord) an (lat, lon) in Grad, `None` außerhalb
    pub fn sample(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if self.validate().is_err() || lat < self.min_lat || lat > self.max_lat {
            return None;
        }
        // in [min_lon, min_lon + 360) falten, unabhängig von der Gitterkonvention
        let lon = self.min_lon + (lon - self.min_lon).rem_euclid(360.0);
        if lon > self.max_lon {
            return None;
        }

        let step_lat = (self.max_lat - self.min_lat) / (self.lat_size - 1) as f64;
        let step_lon = (self.max_lon - self.min_lon) / (self.lon_size - 1) as f64;
        let lat_i = (((lat - self.min_lat) / step_lat) as usize).min(self.lat_size - 2);
        let lon_i = (((lon - self.min_lon) / step_lon) as usize).min(self.lon_size - 2);

        let tx = (lon - (self.min_lon + lon_i as f64 * step_lon)) / step_lon;
        let ty = (lat - (self.min_lat + lat_i as f64 * step_lat)) / step_lat;

        let (lb_e, lb_n) = self.node(lat_i, lon_i);
        let (rb_e, rb_n) = self.node(lat_i, lon_i + 1);
        let (lt_e, lt_n) = self.node(lat_i + 1, lon_i);
        let (rt_e, rt_n) = self.node(lat_i + 1, lon_i + 1);

        let east = lerp(lerp(lb_e, rb_e, tx), lerp(lt_e, rt_e, tx), ty);
        let north = lerp(lerp(lb_n, rb_n, tx), lerp(lt_n, rt_n, tx), ty);
        Some((east, north))
    }
}

impl VectorField for GridField {
    fn velocity_at(&self, lat: f64, lon: f64) -> Point3D {
        let lat_deg = angles::rad_to_deg(lat);
        let lon_deg = angles::rad_to_deg(lon);
        match self.sample(lat_deg, lon_deg) {
            Some((east, north)) => geo_to_cart_surf_velo(lat, lon, east, north),
            None => Point3D::ZERO,
        }
    }
}

/// Konfigurierbare Feldquelle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSpec {
    #[default]
    None,
    Uniform(UniformField),
    Grid(GridField),
}

impl FieldSpec {
    pub fn validate(&self) -> SimResult<()> {
        match self {
            FieldSpec::Grid(grid) => grid.validate(),
            _ => Ok(()),
        }
    }
}

impl VectorField for FieldSpec {
    fn velocity_at(&self, lat: f64, lon: f64) -> Point3D {
        match self {
            FieldSpec::None => NoField.velocity_at(lat, lon),
            FieldSpec::Uniform(field) => field.velocity_at(lat, lon),
            FieldSpec::Grid(field) => field.velocity_at(lat, lon),
        }
    }
}

/// Wind- und Wasserwiderstand für alle freien Elemente. Schreibt nur in
/// die Kraftspeicher.
pub fn apply_forcing(
    elements: &[Element],
    forces: &mut [ForceAccumulator],
    wind: &impl VectorField,
    current: &impl VectorField,
    params: &ForcingParameters,
    planet: &Planet,
) {
    for (e, acc) in elements.iter().zip(forces.iter_mut()) {
        if !e.is_free() || e.is_errored() {
            continue;
        }
        let (lat, lon) = e.lat_lon();
        let area = e.physical_area(planet);

        let va = lay_on_surface(glob_to_loc(&e.q, wind.velocity_at(lat, lon)));
        acc.add_force(va * (params.wind_drag * va.length() * area));

        let vw = lay_on_surface(glob_to_loc(&e.q, current.velocity_at(lat, lon))) - lay_on_surface(e.v);
        acc.add_force(vw * (params.water_drag * vw.length() * area));
    }
}
