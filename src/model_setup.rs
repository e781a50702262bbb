//! Model descriptions: an ordered list of solids with their phase and
//! thermal policies, readable from JSON.
//!
//! ```json
//! {
//!   "placements": [
//!     {
//!       "solid": {"type": "layer", "zlim": [-100.0, 0.0]},
//!       "phase": {"type": "lithospheric", "layers": [20.0, 15.0], "phases": [0, 1, 2], "tlab": 1250.0},
//!       "thermal": {"type": "halfspace_cooling", "age_myr": 80.0}
//!     },
//!     {
//!       "solid": {"type": "sphere", "center": [50.0, 50.0, -40.0], "radius": 10.0},
//!       "phase": {"type": "constant", "phase": 3},
//!       "thermal": {"type": "constant", "temperature": 1400.0}
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::{Result, SetupError};
use crate::geometry::Solid;
use crate::grid::Grid;
use crate::phase::PhasePolicy;
use crate::thermal::{ThermalPolicy, ThermalStructure};

/// One solid painted with a phase policy and, optionally, a thermal policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub solid: Solid,
    #[serde(default)]
    pub phase: PhasePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalPolicy>,
}

impl Placement {
    pub fn new(solid: impl Into<Solid>, phase: impl Into<PhasePolicy>) -> Self {
        Self {
            solid: solid.into(),
            phase: phase.into(),
            thermal: None,
        }
    }

    pub fn with_thermal(mut self, thermal: impl Into<ThermalPolicy>) -> Self {
        self.thermal = Some(thermal.into());
        self
    }

    pub fn apply(&self, grid: &Grid, phase: &mut [i32], temp: &mut [f64]) -> Result<usize> {
        let thermal = self.thermal.as_ref().map(|t| t as &dyn ThermalStructure);
        self.solid.place(phase, temp, grid, &self.phase, thermal)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSetup {
    pub placements: Vec<Placement>,
}

impl ModelSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placements.push(placement);
        self
    }

    /// Applies the placements in order and returns the number of nodes
    /// written, counting a node once per placement that touched it.
    ///
    /// Stops at the first failing placement. Earlier placements stay applied;
    /// the failing one leaves the fields as they were.
    #[instrument(skip_all, fields(placements = self.placements.len(), nodes = grid.len()))]
    pub fn apply(&self, grid: &Grid, phase: &mut [i32], temp: &mut [f64]) -> Result<usize> {
        grid.check_fields(phase.len(), temp.len())?;
        let mut total = 0;
        for placement in &self.placements {
            total += placement.apply(grid, phase, temp)?;
        }
        info!(total, "model setup applied");
        Ok(total)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(SetupError::from_json)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SetupError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SetupError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LayerSolid, SphereSolid};
    use crate::phase::ConstantPhase;
    use crate::thermal::ConstantTemp;

    #[test]
    fn test_placement_defaults_to_constant_phase() {
        let json = r#"{"placements": [{"solid": {"type": "sphere", "center": [0, 0, 0], "radius": 1}}]}"#;
        let setup = ModelSetup::from_json_str(json).unwrap();
        assert_eq!(setup.placements[0].phase, PhasePolicy::default());
        assert!(setup.placements[0].thermal.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let setup = ModelSetup::new()
            .with_placement(
                Placement::new(LayerSolid::between((-10.0, 0.0)), ConstantPhase::new(1))
                    .with_thermal(ConstantTemp { temperature: 20.0 }),
            )
            .with_placement(Placement::new(SphereSolid::new([0.0; 3], 2.0), ConstantPhase::new(2)));
        let json = setup.to_json_string().unwrap();
        assert_eq!(ModelSetup::from_json_str(&json).unwrap(), setup);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(ModelSetup::from_json_str("{"), Err(SetupError::Parse(_))));
        let unknown = r#"{"placements": [{"solid": {"type": "torus"}}]}"#;
        assert!(matches!(ModelSetup::from_json_str(unknown), Err(SetupError::Parse(_))));
        assert!(matches!(
            ModelSetup::from_json_file("/nonexistent/setup.json"),
            Err(SetupError::Io { .. })
        ));
    }

    #[test]
    fn test_unknown_names_are_configuration_errors() {
        let side = r#"{"placements": [{
            "solid": {"type": "layer", "zlim": [-10.0, 0.0]},
            "thermal": {"type": "spreading_ridge", "ridge_side": "north"}
        }]}"#;
        match ModelSetup::from_json_str(side) {
            Err(SetupError::Configuration(msg)) => assert!(msg.contains("north"), "got: {msg}"),
            other => panic!("expected a configuration error, got {other:?}"),
        }

        let boundary = r#"{"placements": [{
            "solid": {"type": "layer", "zlim": [-10.0, 0.0]},
            "thermal": {"type": "lithospheric", "lbound": "open"}
        }]}"#;
        assert!(matches!(
            ModelSetup::from_json_str(boundary),
            Err(SetupError::Configuration(_))
        ));
    }
}
