// src/physics/ice/element.rs
//
// Eisscholle als starres konvexes Polygon auf der Kugel. Die Position ergibt
// sich ausschließlich aus dem Orientierungs-Quaternion ("Pendel"): das Zentrum
// ist q·NORTH·q*.

use super::material::Material;
use super::stress::Stress;
use crate::math::{
    error::*,
    geometry::{
        polygon::{Polygon, PolygonProperties, PolygonValidator},
        sphere::{NORTH, Quaternion, glob_to_loc, lat_lon_of, loc_to_glob},
    },
    types::*,
};
use crate::physics::sim::resources::Planet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zustands-Bitmaske eines Elements, serialisiert als Zahl
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementFlags(u32);

bitflags::bitflags! {
    impl ElementFlags: u32 {
        const FREE = 0x1;
        const STEADY = 0x2;
        const STATIC = 0x4;
        const CONTROLLED = 0x8;
        const MONITORED = 0x10;
        const SPECIAL = 0x20;
        const PROCESSED = 0x40;
        const ERRORED = 0x80;

        /// Die drei Bewegungszustände
        const MOVE_MASK = Self::FREE.bits() | Self::STEADY.bits() | Self::STATIC.bits();
    }
}

impl ElementFlags {
    /// Setzt genau einen Bewegungszustand (FREE, STEADY oder STATIC)
    pub fn set_motion(&mut self, motion: Self) {
        self.remove(Self::MOVE_MASK);
        self.insert(motion & Self::MOVE_MASK);
    }
}

impl fmt::Display for ElementFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Kraft- und Drehmomentspeicher eines Elements (lokales System).
///
/// Wird zu Beginn jedes Schritts geleert, von allen Kraftbeiträgen summiert
/// und einmal vom Integrator verbraucht.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceAccumulator {
    /// Netto-Kraft (N), z-Komponente ungenutzt
    pub f: Point3D,
    /// Drehmoment um die lokale Normale (N·m)
    pub n: f64,
    /// Spannung aus den Kontaktkräften dieses Schritts (Pa)
    pub stress: Stress,
}

impl ForceAccumulator {
    pub fn add_force(&mut self, force: Point2D) {
        self.f.x += force.x;
        self.f.y += force.y;
    }

    pub fn add_torque(&mut self, torque: f64) {
        self.n += torque;
    }

    pub fn add_stress(&mut self, stress: Stress) {
        self.stress += stress;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Eisscholle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Index im Element-Speicher, ändert sich nie
    pub id: usize,
    pub flags: ElementFlags,
    pub mat_id: usize,
    #[serde(default)]
    pub group: usize,

    /// Lokal → global
    pub q: Quaternion,
    /// Winkelgeschwindigkeit (lokal, rad/s)
    pub w: Point3D,
    /// Oberflächengeschwindigkeit (lokal, m/s), abgeleitet aus `w`
    pub v: Point3D,

    /// Vertices in der lokalen Tangentialebene (Einheitskugel, CCW)
    pub shape: Polygon,
    /// Fläche auf der Einheitskugel
    pub area: f64,
    /// Geometrischer Trägheitskoeffizient (Trägheitsmoment / Masse auf der Einheitskugel)
    pub i: f64,
    /// Winkelradius der umschließenden Kugelkappe
    pub sbb_rmin: f64,

    /// Flächenanteile je Dickenintervall des Materials
    pub gh: Vec<f64>,
    pub h_main: f64,
    /// Masse (kg)
    pub m: f64,
    /// Trägheitsmoment (kg·m²)
    pub inertia: f64,
    /// Spannung aus den Kontaktkräften des letzten Schritts (Pa)
    #[serde(default)]
    pub stress: Stress,
}

impl Element {
    /// Baut ein Element aus Vertices auf der Kugel (global, beliebige Länge).
    ///
    /// Das Zentrum wird zweistufig bestimmt: erst um den Vertex-Mittelpunkt
    /// lokalisieren, dann den ebenen Flächenschwerpunkt auf die Kugel heben und
    /// um diesen erneut lokalisieren.
    pub fn from_global_vertices(
        id: usize,
        vertices: &[Point3D],
        mat_id: usize,
        gh: Vec<f64>,
    ) -> MathResult<Self> {
        if vertices.len() < 3 {
            return Err(MathError::InsufficientPoints {
                expected: 3,
                actual: vertices.len(),
            });
        }
        let unit: Vec<Point3D> = vertices.iter().map(|v| v.normalize()).collect();

        let pseudo_center = unit.iter().fold(Point3D::ZERO, |acc, v| acc + *v);
        let q0 = Quaternion::from_north_to(pseudo_center)?;
        let rough = localize(&q0, &unit)?;
        let validator = PolygonValidator::default();
        validator.validate_vertices(&rough)?;

        let c = rough.centroid();
        let lifted = loc_to_glob(&q0, lift_to_sphere(c));
        let q = Quaternion::from_north_to(lifted)?;

        let local = localize(&q, &unit)?;
        validator.validate_vertices(&local)?;

        let area = local.area();
        let i = local.moment_of_inertia() / area;
        let sbb_rmin = local
            .iter()
            .map(|p| p.length().min(1.0).asin())
            .fold(0.0, f64::max);

        Ok(Self {
            id,
            flags: ElementFlags::FREE,
            mat_id,
            group: 0,
            q,
            w: Point3D::ZERO,
            v: Point3D::ZERO,
            shape: Polygon { vertices: local },
            area,
            i,
            sbb_rmin,
            gh,
            h_main: 0.0,
            m: 0.0,
            inertia: 0.0,
            stress: Stress::default(),
        })
    }

    /// Zentrum auf der Einheitskugel (global)
    pub fn center(&self) -> Point3D {
        loc_to_glob(&self.q, NORTH)
    }

    /// (lat, lon) des Zentrums in Radiant
    pub fn lat_lon(&self) -> (f64, f64) {
        lat_lon_of(self.center())
    }

    /// Vertices global auf der Einheitskugel
    pub fn global_vertices(&self) -> Vec<Point3D> {
        self.shape
            .vertices
            .iter()
            .map(|&p| loc_to_glob(&self.q, lift_to_sphere(p)))
            .collect()
    }

    pub fn is_free(&self) -> bool {
        self.flags.contains(ElementFlags::FREE)
    }

    pub fn is_steady(&self) -> bool {
        self.flags.contains(ElementFlags::STEADY)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(ElementFlags::STATIC)
    }

    pub fn is_errored(&self) -> bool {
        self.flags.contains(ElementFlags::ERRORED)
    }

    pub fn is_monitored(&self) -> bool {
        self.flags.contains(ElementFlags::MONITORED)
    }

    /// Nimmt an Kontakterkennung und Dynamik teil
    pub fn is_active(&self) -> bool {
        !self.is_static() && !self.is_errored()
    }

    /// Setzt Oberflächengeschwindigkeit aus Ost/Nord (m/s, global am Zentrum).
    /// Die Winkelgeschwindigkeit wird passend gesetzt, `w.z` bleibt erhalten.
    pub fn set_surface_velocity(&mut self, global_velocity: Point3D, planet: &Planet) {
        let local = glob_to_loc(&self.q, global_velocity);
        self.w.x = -local.y * planet.r_rec;
        self.w.y = local.x * planet.r_rec;
        self.refresh_velocity(planet);
    }

    /// V = R·(W.y, −W.x, 0)
    pub fn refresh_velocity(&mut self, planet: &Planet) {
        self.v = Point3D::new(self.w.y, -self.w.x, 0.0) * planet.r;
    }

    /// Masse und Trägheitsmoment aus Fläche, Dickenverteilung und Material
    pub fn update_mass(&mut self, material: &Material, planet: &Planet) {
        self.m = self.area * material.areal_density(&self.gh) * planet.r2;
        self.inertia = self.m * self.i * planet.r2;
        self.h_main = material.dominant_thickness(&self.gh);
    }

    /// Physikalische Fläche (m²)
    pub fn physical_area(&self, planet: &Planet) -> f64 {
        self.area * planet.r2
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.length_squared() + 0.5 * self.inertia * self.w.z * self.w.z
    }

    pub fn is_finite(&self) -> bool {
        self.q.is_finite() && self.v.is_finite() && self.w.is_finite()
    }
}

/// Ebener Punkt der Tangentialebene → Punkt auf der Einheitskugel (lokal)
pub fn lift_to_sphere(p: Point2D) -> Point3D {
    Point3D::new(p.x, p.y, (1.0 - p.length_squared()).max(0.0).sqrt())
}

fn localize(q: &Quaternion, unit: &[Point3D]) -> MathResult<Vec<Point2D>> {
    unit.iter()
        .map(|&v| {
            let l = glob_to_loc(q, v);
            if l.z <= 0.0 {
                return Err(MathError::GeometricFailure {
                    operation: "vertex lies beyond the element's hemisphere".to_string(),
                });
            }
            Ok(Point2D::new(l.x, l.y))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::math::geometry::sphere::GeographicCoordinates;
    use approx::assert_abs_diff_eq;

    /// Quadrat mit Kantenlänge `side_deg` um (lon, lat)
    pub(crate) fn square_element(id: usize, lon: f64, lat: f64, side_deg: f64) -> Element {
        let h = side_deg * 0.5;
        let verts: Vec<Point3D> = [(-h, -h), (h, -h), (h, h), (-h, h)]
            .iter()
            .map(|&(dx, dy)| GeographicCoordinates::new(lon + dx, lat + dy).to_cartesian())
            .collect();
        Element::from_global_vertices(id, &verts, 0, vec![0.0, 1.0, 0.0]).unwrap()
    }

    /// Globaler Einheitsvektor nach Osten am Zentrum
    pub(crate) fn east_at(e: &Element) -> Point3D {
        let (lat, lon) = e.lat_lon();
        crate::math::geometry::sphere::geo_to_cart_surf_velo(lat, lon, 1.0, 0.0)
    }

    /// Lokaler Vektor als globale Komponente nach Osten
    pub(crate) fn eastward(e: &Element, local: Point3D) -> f64 {
        loc_to_glob(&e.q, Point3D::new(local.x, local.y, 0.0)).dot(east_at(e))
    }

    #[test]
    fn test_construction_centers_element() {
        let e = square_element(0, 10.0, 0.0, 1.0);
        let (lat, lon) = e.lat_lon();
        assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, 10f64.to_radians(), epsilon = 1e-9);

        assert!(e.area > 0.0);
        // 1° x 1° am Äquator
        let expected = 1f64.to_radians().powi(2);
        assert_abs_diff_eq!(e.area, expected, epsilon = expected * 1e-3);
        assert!(e.shape.centroid().length() < 1e-8);
        // Quadrat: i = a²/6
        assert_abs_diff_eq!(e.i, expected / 6.0, epsilon = expected * 1e-3);
        // halbe Diagonale
        assert_abs_diff_eq!(
            e.sbb_rmin,
            0.5f64.to_radians() * 2f64.sqrt(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_global_vertices_round_trip() {
        let raw = [(0.0, 80.0), (40.0, 81.0), (10.0, 84.0)];
        let verts: Vec<Point3D> = raw
            .iter()
            .map(|&(lon, lat)| GeographicCoordinates::new(lon, lat).to_cartesian())
            .collect();
        let e = Element::from_global_vertices(3, &verts, 0, vec![1.0]).unwrap();
        for (a, b) in e.global_vertices().iter().zip(&verts) {
            assert_abs_diff_eq!((*a - *b).length(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_clockwise_input_rejected() {
        let verts: Vec<Point3D> = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
            .iter()
            .map(|&(lon, lat)| GeographicCoordinates::new(lon, lat).to_cartesian())
            .collect();
        let err = Element::from_global_vertices(0, &verts, 0, vec![]).unwrap_err();
        assert_eq!(err, MathError::ClockwiseWinding);
    }

    #[test]
    fn test_mass_properties() {
        let planet = Planet::default();
        let mut e = square_element(0, 0.0, 45.0, 0.5);
        let ice = Material::sea_ice();
        e.update_mass(&ice, &planet);

        let expected_m = e.area * planet.r2 * 1.5 * 917.0;
        assert_abs_diff_eq!(e.m, expected_m, epsilon = expected_m * 1e-12);
        assert_abs_diff_eq!(e.inertia, e.m * e.i * planet.r2, epsilon = e.inertia * 1e-12);
        assert_eq!(e.h_main, 1.5);
    }

    #[test]
    fn test_velocity_from_surface_velocity() {
        let planet = Planet::default();
        let mut e = square_element(0, 30.0, 20.0, 0.5);
        let (lat, lon) = e.lat_lon();
        let east = crate::math::geometry::sphere::geo_to_cart_surf_velo(lat, lon, 0.3, -0.4);
        e.set_surface_velocity(east, &planet);

        assert_abs_diff_eq!(e.v.length(), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!((loc_to_glob(&e.q, e.v) - east).length(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flags() {
        let mut flags = ElementFlags::FREE | ElementFlags::MONITORED;
        flags.set_motion(ElementFlags::STATIC);
        assert!(flags.contains(ElementFlags::STATIC));
        assert!(!flags.contains(ElementFlags::FREE));
        assert!(flags.contains(ElementFlags::MONITORED));
        flags.remove(ElementFlags::MONITORED);
        assert_eq!(flags, ElementFlags::STATIC);
        assert_eq!(format!("{}", flags), "0x04");
    }

    #[test]
    fn test_flags_serialize_as_bits() {
        let flags = ElementFlags::STEADY | ElementFlags::MONITORED;
        assert_eq!(serde_json::to_string(&flags).unwrap(), "18");
        let back: ElementFlags = serde_json::from_str("132").unwrap();
        assert_eq!(back, ElementFlags::STATIC | ElementFlags::ERRORED);
        assert_eq!(ElementFlags::MOVE_MASK.bits(), 0x7);
    }
}
