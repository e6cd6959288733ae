// src/physics/ice/material.rs
use serde::{Deserialize, Serialize};

/// Dickenintervall eines Materials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Obere Dickengrenze des Intervalls (m)
    pub thickness: f64,
    /// Dichte (kg/m³)
    pub rho: f64,
    /// Scherfestigkeit (Pa)
    #[serde(default)]
    pub sigma_c: f64,
    /// Zugfestigkeit (Pa)
    #[serde(default)]
    pub sigma_t: f64,
}

/// Eintrag der Materialtabelle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub layers: Vec<Layer>,
    /// Elastizitätsmodul (Pa)
    #[serde(rename = "E")]
    pub e: f64,
    /// Querkontraktionszahl
    #[serde(default = "default_nu")]
    pub nu: f64,
}

fn default_nu() -> f64 {
    0.3
}

impl Material {
    /// Masse pro Flächeneinheit (kg/m²) für eine Dickenverteilung `gh`
    pub fn areal_density(&self, gh: &[f64]) -> f64 {
        self.layers
            .iter()
            .zip(gh)
            .map(|(layer, fraction)| layer.thickness * layer.rho * fraction)
            .sum()
    }

    /// Dicke des am stärksten besetzten Intervalls
    pub fn dominant_thickness(&self, gh: &[f64]) -> f64 {
        gh.iter()
            .zip(&self.layers)
            .fold((f64::NEG_INFINITY, 0.0), |(best, h), (&fraction, layer)| {
                if fraction > best {
                    (fraction, layer.thickness)
                } else {
                    (best, h)
                }
            })
            .1
    }

    /// Standard-Meereis mit drei Dickenintervallen
    pub fn sea_ice() -> Self {
        Self {
            name: "ice".to_string(),
            layers: vec![
                Layer { thickness: 0.5, rho: 917.0, sigma_c: 2.0e6, sigma_t: 5.0e5 },
                Layer { thickness: 1.5, rho: 917.0, sigma_c: 2.0e6, sigma_t: 5.0e5 },
                Layer { thickness: 3.0, rho: 917.0, sigma_c: 2.0e6, sigma_t: 5.0e5 },
            ],
            e: 9.0e9,
            nu: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_areal_density() {
        let ice = Material::sea_ice();
        // komplett im mittleren Intervall: 1.5 m * 917 kg/m³
        assert_relative_eq!(ice.areal_density(&[0.0, 1.0, 0.0]), 1375.5);
        assert_relative_eq!(
            ice.areal_density(&[0.5, 0.5, 0.0]),
            0.5 * 0.5 * 917.0 + 0.5 * 1.5 * 917.0
        );
    }

    #[test]
    fn test_dominant_thickness() {
        let ice = Material::sea_ice();
        assert_eq!(ice.dominant_thickness(&[0.1, 0.2, 0.7]), 3.0);
        assert_eq!(ice.dominant_thickness(&[0.6, 0.4, 0.0]), 0.5);
        assert_eq!(ice.dominant_thickness(&[]), 0.0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"name":"thin","layers":[{"thickness":0.3,"rho":900.0}],"E":1e9}"#;
        let m: Material = serde_json::from_str(json).unwrap();
        assert_eq!(m.nu, 0.3);
        assert_eq!(m.layers[0].sigma_c, 0.0);
    }
}
