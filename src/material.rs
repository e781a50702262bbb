// src/material.rs - per-phase thermal material properties

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SetupError};

/// Thermal properties of one rock phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    pub density_kg_m3: f64,
    pub specific_heat_capacity_j_per_kg_k: f64,
    pub thermal_conductivity_w_m_k: f64,
    /// Volumetric radiogenic heat production (W/m³)
    #[serde(default)]
    pub radiogenic_heat_w_m3: f64,
}

impl MaterialProfile {
    /// Builds a profile from heat production per unit mass (W/kg), the unit
    /// radiogenic heating is usually tabulated in.
    pub fn with_mass_heating(density_kg_m3: f64, specific_heat: f64, conductivity: f64, heat_w_per_kg: f64) -> Self {
        Self {
            density_kg_m3,
            specific_heat_capacity_j_per_kg_k: specific_heat,
            thermal_conductivity_w_m_k: conductivity,
            radiogenic_heat_w_m3: heat_w_per_kg * density_kg_m3,
        }
    }

    /// Volumetric heat capacity ρCp (J/m³/K)
    pub fn rho_cp(&self) -> f64 {
        self.density_kg_m3 * self.specific_heat_capacity_j_per_kg_k
    }
}

/// Property columns for a sequence of phase labels, one entry per label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialColumns {
    pub density: Vec<f64>,
    pub heat_capacity: Vec<f64>,
    pub conductivity: Vec<f64>,
    pub radiogenic_heat: Vec<f64>,
}

impl MaterialColumns {
    pub fn len(&self) -> usize {
        self.density.len()
    }

    pub fn is_empty(&self) -> bool {
        self.density.is_empty()
    }

    pub fn rho_cp(&self) -> Vec<f64> {
        self.density
            .iter()
            .zip(&self.heat_capacity)
            .map(|(rho, cp)| rho * cp)
            .collect()
    }
}

/// Source of material properties keyed by phase label.
///
/// The lithospheric profile solver only sees this interface; any property
/// database can stand behind it.
pub trait MaterialProvider {
    fn properties(&self, phases: &[i32]) -> Result<MaterialColumns>;
}

/// Lookup table from phase label to [`MaterialProfile`].
///
/// Serialized as `{"phases": [{"phase": 0, "density_kg_m3": ..., ...}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaterialTableDocument", into = "MaterialTableDocument")]
pub struct MaterialTable {
    profiles: BTreeMap<i32, MaterialProfile>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Three-layer continental lithosphere: upper crust (0), lower crust (1)
    /// and mantle (2).
    pub fn crust_mantle() -> Self {
        Self::new()
            .with_phase(0, MaterialProfile::with_mass_heating(2700.0, 1000.0, 3.0, 617.0e-12))
            .with_phase(1, MaterialProfile::with_mass_heating(2900.0, 1000.0, 2.0, 43.0e-12))
            .with_phase(2, MaterialProfile::with_mass_heating(3000.0, 1000.0, 2.3, 0.0))
    }

    pub fn with_phase(mut self, phase: i32, profile: MaterialProfile) -> Self {
        self.insert(phase, profile);
        self
    }

    pub fn insert(&mut self, phase: i32, profile: MaterialProfile) -> Option<MaterialProfile> {
        self.profiles.insert(phase, profile)
    }

    pub fn get(&self, phase: i32) -> Option<&MaterialProfile> {
        self.profiles.get(&phase)
    }

    pub fn phases(&self) -> impl Iterator<Item = i32> + '_ {
        self.profiles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SetupError::Parse(format!("material table: {e}")))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SetupError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SetupError::Parse(e.to_string()))
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::crust_mantle()
    }
}

impl MaterialProvider for MaterialTable {
    fn properties(&self, phases: &[i32]) -> Result<MaterialColumns> {
        let mut columns = MaterialColumns {
            density: Vec::with_capacity(phases.len()),
            heat_capacity: Vec::with_capacity(phases.len()),
            conductivity: Vec::with_capacity(phases.len()),
            radiogenic_heat: Vec::with_capacity(phases.len()),
        };
        for &phase in phases {
            let profile = self.get(phase).ok_or(SetupError::MissingMaterial { phase })?;
            columns.density.push(profile.density_kg_m3);
            columns.heat_capacity.push(profile.specific_heat_capacity_j_per_kg_k);
            columns.conductivity.push(profile.thermal_conductivity_w_m_k);
            columns.radiogenic_heat.push(profile.radiogenic_heat_w_m3);
        }
        Ok(columns)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MaterialTableDocument {
    phases: Vec<PhaseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhaseEntry {
    phase: i32,
    #[serde(flatten)]
    profile: MaterialProfile,
}

impl TryFrom<MaterialTableDocument> for MaterialTable {
    type Error = SetupError;

    fn try_from(doc: MaterialTableDocument) -> Result<Self> {
        let mut table = MaterialTable::new();
        for entry in doc.phases {
            if table.insert(entry.phase, entry.profile).is_some() {
                return Err(SetupError::config(format!(
                    "phase {} is listed more than once in the material table",
                    entry.phase
                )));
            }
        }
        Ok(table)
    }
}

impl From<MaterialTable> for MaterialTableDocument {
    fn from(table: MaterialTable) -> Self {
        MaterialTableDocument {
            phases: table
                .profiles
                .into_iter()
                .map(|(phase, profile)| PhaseEntry { phase, profile })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_crust_mantle_defaults() {
        let table = MaterialTable::crust_mantle();
        assert_eq!(table.len(), 3);

        let upper = table.get(0).unwrap();
        assert_eq!(upper.density_kg_m3, 2700.0);
        assert_abs_diff_eq!(upper.radiogenic_heat_w_m3, 617.0e-12 * 2700.0, epsilon = 1e-18);

        let mantle = table.get(2).unwrap();
        assert_eq!(mantle.radiogenic_heat_w_m3, 0.0);
        assert_eq!(mantle.rho_cp(), 3.0e6);
    }

    #[test]
    fn test_properties_follow_phase_order() {
        let table = MaterialTable::crust_mantle();
        let columns = table.properties(&[2, 0, 0, 1]).unwrap();
        assert_eq!(columns.len(), 4);
        assert_eq!(columns.density, vec![3000.0, 2700.0, 2700.0, 2900.0]);
        assert_eq!(columns.conductivity, vec![2.3, 3.0, 3.0, 2.0]);
        assert_eq!(columns.rho_cp()[3], 2.9e6);
    }

    #[test]
    fn test_missing_phase_is_reported() {
        let table = MaterialTable::crust_mantle();
        let result = table.properties(&[0, 7]);
        assert_eq!(result, Err(SetupError::MissingMaterial { phase: 7 }));
    }

    #[test]
    fn test_table_from_json() {
        let json_str = r#"{
            "phases": [
                {
                    "phase": 4,
                    "density_kg_m3": 3300.0,
                    "specific_heat_capacity_j_per_kg_k": 1200.0,
                    "thermal_conductivity_w_m_k": 3.2
                },
                {
                    "phase": 5,
                    "density_kg_m3": 2800.0,
                    "specific_heat_capacity_j_per_kg_k": 1000.0,
                    "thermal_conductivity_w_m_k": 2.5,
                    "radiogenic_heat_w_m3": 1.0e-6
                }
            ]
        }"#;

        let table = MaterialTable::from_json_str(json_str).unwrap();
        assert_eq!(table.phases().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(table.get(4).unwrap().radiogenic_heat_w_m3, 0.0);
        assert_eq!(table.get(5).unwrap().radiogenic_heat_w_m3, 1.0e-6);

        let reparsed = MaterialTable::from_json_str(&table.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            MaterialTable::from_json_str(r#"{"phases": [{"phase": 1}"#),
            Err(SetupError::Parse(_))
        ));

        let duplicated = r#"{"phases": [
            {"phase": 1, "density_kg_m3": 1.0, "specific_heat_capacity_j_per_kg_k": 1.0, "thermal_conductivity_w_m_k": 1.0},
            {"phase": 1, "density_kg_m3": 2.0, "specific_heat_capacity_j_per_kg_k": 1.0, "thermal_conductivity_w_m_k": 1.0}
        ]}"#;
        assert!(MaterialTable::from_json_str(duplicated).is_err());

        let missing = MaterialTable::from_json_file("/path/that/does/not/exist.json");
        assert!(matches!(missing, Err(SetupError::Io { .. })));
    }
}
