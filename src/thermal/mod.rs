//! Thermal structures evaluated on the points selected by a geometry call.
//!
//! Temperatures are in °C and coordinates in km, depth growing towards
//! negative z.

pub mod closed_form;
pub mod lithospheric;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::phase::PointSet;

pub use closed_form::{
    ConstantTemp, HalfspaceCoolingTemp, LinearTemp, RidgeSide, SpreadingRateTemp, halfspace_temperature,
};
pub use lithospheric::{BoundaryKind, LithosphereColumn, LithosphericTemp};

/// Capability to fill in temperatures at selected points.
///
/// `temp` and `phase` hold the current values at the selected points and
/// `points` their coordinates; implementations overwrite `temp`.
pub trait ThermalStructure {
    /// Whether `evaluate` reads `phase`, in which case the caller assigns
    /// phases before evaluating.
    fn requires_phase(&self) -> bool {
        false
    }

    fn evaluate(&self, temp: &mut [f64], phase: &[i32], points: PointSet<'_>) -> Result<()>;
}

/// The built-in thermal structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThermalPolicy {
    Constant(ConstantTemp),
    Linear(LinearTemp),
    HalfspaceCooling(HalfspaceCoolingTemp),
    SpreadingRidge(SpreadingRateTemp),
    Lithospheric(LithosphericTemp),
}

impl ThermalPolicy {
    fn structure(&self) -> &dyn ThermalStructure {
        match self {
            ThermalPolicy::Constant(t) => t,
            ThermalPolicy::Linear(t) => t,
            ThermalPolicy::HalfspaceCooling(t) => t,
            ThermalPolicy::SpreadingRidge(t) => t,
            ThermalPolicy::Lithospheric(t) => t,
        }
    }
}

impl ThermalStructure for ThermalPolicy {
    fn requires_phase(&self) -> bool {
        self.structure().requires_phase()
    }

    fn evaluate(&self, temp: &mut [f64], phase: &[i32], points: PointSet<'_>) -> Result<()> {
        self.structure().evaluate(temp, phase, points)
    }
}

impl From<ConstantTemp> for ThermalPolicy {
    fn from(value: ConstantTemp) -> Self {
        ThermalPolicy::Constant(value)
    }
}

impl From<LinearTemp> for ThermalPolicy {
    fn from(value: LinearTemp) -> Self {
        ThermalPolicy::Linear(value)
    }
}

impl From<HalfspaceCoolingTemp> for ThermalPolicy {
    fn from(value: HalfspaceCoolingTemp) -> Self {
        ThermalPolicy::HalfspaceCooling(value)
    }
}

impl From<SpreadingRateTemp> for ThermalPolicy {
    fn from(value: SpreadingRateTemp) -> Self {
        ThermalPolicy::SpreadingRidge(value)
    }
}

impl From<LithosphericTemp> for ThermalPolicy {
    fn from(value: LithosphericTemp) -> Self {
        ThermalPolicy::Lithospheric(value)
    }
}

/// Evaluates a thermal structure directly on coordinate arrays, outside any
/// geometry call.
pub fn compute_thermal_structure(
    structure: &dyn ThermalStructure,
    temp: &mut [f64],
    phase: &[i32],
    points: PointSet<'_>,
) -> Result<()> {
    structure.evaluate(temp, phase, points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_lithospheric_requires_phase() {
        assert!(!ThermalPolicy::from(ConstantTemp::default()).requires_phase());
        assert!(!ThermalPolicy::from(LinearTemp::default()).requires_phase());
        assert!(!ThermalPolicy::from(HalfspaceCoolingTemp::default()).requires_phase());
        assert!(!ThermalPolicy::from(SpreadingRateTemp::default()).requires_phase());
        assert!(ThermalPolicy::from(LithosphericTemp::default()).requires_phase());
    }

    #[test]
    fn test_policy_json_shape() {
        let json = r#"{"type": "spreading_ridge", "ridge_side": "right", "spreading_velocity_cm_yr": 5.0}"#;
        let policy: ThermalPolicy = serde_json::from_str(json).unwrap();
        match policy {
            ThermalPolicy::SpreadingRidge(ridge) => {
                assert_eq!(ridge.ridge_side, RidgeSide::Right);
                assert_eq!(ridge.spreading_velocity_cm_yr, 5.0);
                assert_eq!(ridge.tmantle, 1350.0);
            }
            other => panic!("unexpected policy {other:?}"),
        }

        let bad = r#"{"type": "spreading_ridge", "ridge_side": "north"}"#;
        assert!(serde_json::from_str::<ThermalPolicy>(bad).is_err());
    }
}
