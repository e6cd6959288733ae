// src/physics/sim/init/scenario.rs
//
// Szenario-Datei: Parameter, Materialtabelle, Anfangspolygone und Links.
// Eingabegeometrie wird hier geprüft, der Kern prüft sie nicht erneut.

use crate::math::geometry::sphere::{GeographicCoordinates, geo_to_cart_surf_velo};
use crate::math::types::Point3D;
use crate::physics::error::{SimError, SimResult};
use crate::physics::forcing::{FieldSpec, UniformField};
use crate::physics::ice::{Element, ElementFlags, Link, Material};
use crate::physics::sim::resources::{Planet, SimulationParameters};
use crate::physics::sim::world::World;
use bevy::log::{info, warn};
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bewegungszustand beim Laden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    #[default]
    Free,
    Steady,
    Static,
}

impl From<Motion> for ElementFlags {
    fn from(motion: Motion) -> Self {
        match motion {
            Motion::Free => ElementFlags::FREE,
            Motion::Steady => ElementFlags::STEADY,
            Motion::Static => ElementFlags::STATIC,
        }
    }
}

/// Beschreibung eines Elements in der Szenario-Datei
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    /// (lon, lat) in Grad, gegen den Uhrzeigersinn
    pub vertices: Vec<[f64; 2]>,
    pub material: usize,
    /// Flächenanteile je Dickenintervall; leer = alles im ersten Intervall
    pub gh: Vec<f64>,
    /// Anfangsgeschwindigkeit [Ost, Nord] in m/s
    pub velocity: [f64; 2],
    /// Drehrate um die lokale Normale (rad/s)
    pub spin: f64,
    pub motion: Motion,
    pub monitored: bool,
    pub group: usize,
}

impl ElementSpec {
    /// Achsparalleles Quadrat in Grad um (lon, lat)
    pub fn square(lon: f64, lat: f64, side_deg: f64) -> Self {
        let h = side_deg * 0.5;
        Self {
            vertices: vec![
                [lon - h, lat - h],
                [lon + h, lat - h],
                [lon + h, lat + h],
                [lon - h, lat + h],
            ],
            ..Default::default()
        }
    }

    fn gh_for(&self, material: &Material) -> Vec<f64> {
        if !self.gh.is_empty() {
            return self.gh.clone();
        }
        let mut gh = vec![0.0; material.layers.len()];
        if let Some(first) = gh.first_mut() {
            *first = 1.0;
        }
        gh
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub params: SimulationParameters,
    pub materials: Vec<Material>,
    pub elements: Vec<ElementSpec>,
    pub links: Vec<Link>,
    /// Gleichverteilte Störung der Anfangsgeschwindigkeit (m/s je Komponente)
    pub velocity_jitter: f64,
    pub seed: u64,
    /// Restart-Abzug, der Elemente, Kontakte und Modellzeit ersetzt
    pub restart_from: Option<PathBuf>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            params: SimulationParameters::default(),
            materials: vec![Material::sea_ice()],
            elements: Vec::new(),
            links: Vec::new(),
            velocity_jitter: 0.0,
            seed: 0,
            restart_from: None,
        }
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_json_str(&text)?;
        info!(
            "Scenario '{}' loaded: {} elements, {} materials, {} links",
            path.display(),
            scenario.elements.len(),
            scenario.materials.len(),
            scenario.links.len()
        );
        Ok(scenario)
    }

    /// Eingebautes Szenario: zwei aufeinander zutreibende Schollen und ein
    /// verbundenes Paar unter Ostwind.
    pub fn demo() -> Self {
        let mut params = SimulationParameters {
            total_steps: 500,
            diagnostics_every: 50,
            ..Default::default()
        };
        params.forcing.wind = FieldSpec::Uniform(UniformField { east: 5.0, north: 0.0 });

        let mut left = ElementSpec::square(-1.0, 75.0, 0.8);
        left.velocity = [0.3, 0.0];
        left.monitored = true;
        let mut right = ElementSpec::square(1.0, 75.2, 0.8);
        right.velocity = [-0.2, 0.0];

        let mut linked_a = ElementSpec::square(-1.0, 73.0, 0.8);
        linked_a.group = 1;
        let mut linked_b = ElementSpec::square(-0.2, 73.0, 0.8);
        linked_b.group = 1;

        Self {
            params,
            elements: vec![left, right, linked_a, linked_b],
            links: vec![Link::new(2, 3)],
            ..Default::default()
        }
    }

    /// Prüft alles, was ohne Geometrie prüfbar ist
    pub fn validate(&self) -> SimResult<()> {
        let p = &self.params;
        if !(p.dt_seconds > 0.0 && p.dt_seconds.is_finite()) {
            return Err(reject(format!("dt_seconds must be positive, got {}", p.dt_seconds)));
        }
        if !(p.planet_radius_m > 0.0) {
            return Err(reject(format!("planet_radius_m must be positive, got {}", p.planet_radius_m)));
        }
        p.forcing.wind.validate()?;
        p.forcing.current.validate()?;

        if self.materials.is_empty() {
            return Err(reject("material table is empty"));
        }
        for (idx, material) in self.materials.iter().enumerate() {
            if material.layers.is_empty() {
                return Err(reject(format!("material {} ('{}') has no layers", idx, material.name)));
            }
        }

        for (idx, spec) in self.elements.iter().enumerate() {
            if spec.vertices.len() < 3 {
                return Err(reject(format!("element {} has {} vertices", idx, spec.vertices.len())));
            }
            let Some(material) = self.materials.get(spec.material) else {
                return Err(reject(format!("element {} references missing material {}", idx, spec.material)));
            };
            let gh = spec.gh_for(material);
            if gh.len() != material.layers.len() {
                return Err(reject(format!(
                    "element {}: gh has {} entries, material '{}' has {} layers",
                    idx,
                    gh.len(),
                    material.name,
                    material.layers.len()
                )));
            }
            if gh.iter().any(|g| !(*g >= 0.0)) {
                return Err(reject(format!("element {}: gh entries must be non-negative", idx)));
            }
            // Masse und Trägheit werden aus der Flächendichte abgeleitet
            let density = material.areal_density(&gh);
            if !(density > 0.0 && density.is_finite()) {
                return Err(reject(format!(
                    "element {}: areal density of material '{}' must be positive, got {}",
                    idx, material.name, density
                )));
            }
        }

        let n = self.elements.len();
        for link in &self.links {
            if link.is_degenerate() {
                return Err(reject(format!("link ({}, {}) joins an element with itself", link.i1(), link.i2())));
            }
            if link.i2() >= n {
                return Err(reject(format!(
                    "link ({}, {}) references a missing element ({} loaded)",
                    link.i1(),
                    link.i2(),
                    n
                )));
            }
        }
        Ok(())
    }

    /// Baut die Elemente; Geometriefehler brechen mit Index im Log ab
    pub fn build_elements(&self, planet: &Planet) -> SimResult<Vec<Element>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut elements = Vec::with_capacity(self.elements.len());

        for (idx, spec) in self.elements.iter().enumerate() {
            let material = self
                .materials
                .get(spec.material)
                .ok_or_else(|| reject(format!("element {} references missing material {}", idx, spec.material)))?;
            let vertices: Vec<Point3D> = spec
                .vertices
                .iter()
                .map(|&[lon, lat]| GeographicCoordinates::new(lon, lat).to_cartesian())
                .collect();

            let mut element = Element::from_global_vertices(idx, &vertices, spec.material, spec.gh_for(material))
                .map_err(|err| {
                    warn!("Element {} rejected: {}", idx, err);
                    SimError::from(err)
                })?;
            element.flags = ElementFlags::from(spec.motion);
            if spec.monitored {
                element.flags.insert(ElementFlags::MONITORED);
            }
            element.group = spec.group;

            let [mut east, mut north] = spec.velocity;
            if self.velocity_jitter > 0.0 && spec.motion == Motion::Free {
                east += rng.random_range(-self.velocity_jitter..=self.velocity_jitter);
                north += rng.random_range(-self.velocity_jitter..=self.velocity_jitter);
            }
            let (lat, lon) = element.lat_lon();
            element.set_surface_velocity(geo_to_cart_surf_velo(lat, lon, east, north), planet);
            element.w.z = spec.spin;

            elements.push(element);
        }
        Ok(elements)
    }

    /// Setzt einen gespeicherten Lauf fort. Aus dem Szenario kommen nur
    /// `total_steps` und `freeze_at_step`.
    fn restart_world(&self, path: &Path) -> SimResult<World> {
        if !self.elements.is_empty() || !self.links.is_empty() {
            warn!(
                "Restarting from '{}': {} scenario elements and {} links are ignored",
                path.display(),
                self.elements.len(),
                self.links.len()
            );
        }
        let mut world = World::load(path)?;
        if self.params.total_steps < world.time.n {
            return Err(reject(format!(
                "total_steps {} lies before the restart step {}",
                self.params.total_steps, world.time.n
            )));
        }
        world.time.total_steps = self.params.total_steps;
        world.freeze_at_step = self.params.freeze_at_step;
        Ok(world)
    }

    pub fn into_world(self) -> SimResult<World> {
        if let Some(path) = &self.restart_from {
            return self.restart_world(path);
        }
        self.validate()?;
        let elements = self.build_elements(&self.params.planet())?;
        World::new(elements, self.materials, self.links, &self.params)
    }
}

fn reject(message: impl Into<String>) -> SimError {
    let message = message.into();
    warn!("Scenario rejected: {}", message);
    SimError::scenario(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::contact::ContactKind;
    use crate::physics::ice::element::tests::east_at;
    use crate::math::MathError;
    use approx::assert_abs_diff_eq;

    fn two_squares() -> Scenario {
        Scenario {
            elements: vec![ElementSpec::square(0.0, 0.0, 1.0), ElementSpec::square(3.0, 0.0, 1.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_demo_builds_and_links() {
        let world = Scenario::demo().into_world().unwrap();
        assert_eq!(world.elements.len(), 4);
        assert!(world.elements[0].is_monitored());
        assert_eq!(world.elements[2].group, 1);
        assert_eq!(world.links, vec![Link::new(2, 3)]);
    }

    #[test]
    fn test_json_with_defaults() {
        let json = r#"{
            "params": {"dt_seconds": 60.0, "total_steps": 5},
            "elements": [
                {"vertices": [[0,0],[1,0],[1,1],[0,1]], "velocity": [0.5, 0.0], "monitored": true},
                {"vertices": [[2,0],[3,0],[3,1],[2,1]], "motion": "static"}
            ],
            "links": [[1, 0]]
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.materials.len(), 1);
        assert_eq!(scenario.links[0], Link::new(0, 1));
        assert_eq!(scenario.elements[1].motion, Motion::Static);

        let world = scenario.into_world().unwrap();
        assert_eq!(world.time.dt, 60.0);
        assert!(world.elements[1].is_static());
        assert_eq!(world.elements[0].gh, vec![1.0, 0.0, 0.0]);

        let e = &world.elements[0];
        let global_v = crate::math::geometry::sphere::loc_to_glob(&e.q, e.v);
        assert_abs_diff_eq!(global_v.dot(east_at(e)), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_clockwise_polygon() {
        let mut scenario = two_squares();
        scenario.elements[0].vertices.reverse();
        let err = scenario.into_world().unwrap_err();
        assert!(matches!(err, SimError::Geometry(MathError::ClockwiseWinding)));
    }

    #[test]
    fn test_rejects_non_convex_polygon() {
        let mut scenario = two_squares();
        scenario.elements[0].vertices = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [1.0, 0.5], [0.0, 2.0]];
        let err = scenario.into_world().unwrap_err();
        assert!(matches!(err, SimError::Geometry(MathError::NonConvexPolygon { .. })));
    }

    #[test]
    fn test_rejects_bad_references() {
        let mut scenario = two_squares();
        scenario.elements[1].material = 4;
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));

        let mut scenario = two_squares();
        scenario.elements[0].gh = vec![1.0];
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));

        let mut scenario = two_squares();
        scenario.links = vec![Link::new(0, 2)];
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));

        let mut scenario = two_squares();
        scenario.links = vec![Link::new(1, 1)];
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));

        let mut scenario = two_squares();
        scenario.elements[0].vertices.truncate(2);
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));

        let mut scenario = two_squares();
        scenario.params.dt_seconds = 0.0;
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));
    }

    #[test]
    fn test_rejects_massless_elements() {
        // Alle Dickenanteile null
        let mut scenario = two_squares();
        scenario.elements[0].gh = vec![0.0; scenario.materials[0].layers.len()];
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));
        assert!(scenario.into_world().is_err());

        // Dichte null in allen Schichten
        let mut scenario = two_squares();
        for layer in &mut scenario.materials[0].layers {
            layer.rho = 0.0;
        }
        assert!(matches!(scenario.validate(), Err(SimError::Scenario { .. })));

        // Ein einzelner besetzter Anteil reicht
        let mut scenario = two_squares();
        let mut gh = vec![0.0; scenario.materials[0].layers.len()];
        gh[1] = 0.5;
        scenario.elements[0].gh = gh;
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_restart_from_saved_world() {
        let mut world = two_squares().into_world().unwrap();
        world.initialize().unwrap();
        world.step().unwrap();
        world.step().unwrap();
        let dir = std::env::temp_dir().join(format!("floe_scenario_restart_{}", std::process::id()));
        let path = crate::debug::write_restart(&world, &dir).unwrap();

        let json = format!(
            r#"{{"params": {{"total_steps": 5}}, "restart_from": {}}}"#,
            serde_json::to_string(&path).unwrap()
        );
        let scenario = Scenario::from_json_str(&json).unwrap();
        let restarted = scenario.clone().into_world().unwrap();
        assert_eq!(restarted.time.n, 2);
        assert_eq!(restarted.time.total_steps, 5);
        assert_eq!(restarted.elements.len(), 2);
        assert_eq!(restarted.time.dt, world.time.dt);

        // Ende vor dem gespeicherten Schritt
        let mut early = scenario;
        early.params.total_steps = 1;
        assert!(matches!(early.into_world(), Err(SimError::Scenario { .. })));
        std::fs::remove_dir_all(&dir).unwrap();

        let missing = Scenario {
            restart_from: Some(dir.join("restart_000009.json")),
            ..Default::default()
        };
        assert!(matches!(missing.into_world(), Err(SimError::Io(_))));
    }

    #[test]
    fn test_jitter_is_seeded() {
        let mut scenario = two_squares();
        scenario.velocity_jitter = 0.1;
        scenario.seed = 7;
        let planet = scenario.params.planet();
        let a = scenario.build_elements(&planet).unwrap();
        let b = scenario.build_elements(&planet).unwrap();
        assert_eq!(a[0].w, b[0].w);
        assert!(a[0].v.length() > 0.0);
        assert!(a[0].v.length() <= 0.1 * 2.0_f64.sqrt() + 1e-9);
    }

    #[test]
    fn test_linked_pair_becomes_joint() {
        let mut scenario = two_squares();
        scenario.links = vec![Link::new(0, 1)];
        let mut world = scenario.into_world().unwrap();
        world.initialize().unwrap();
        assert_eq!(world.contacts.count(ContactKind::Joint), 1);
    }
}
