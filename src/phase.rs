//! Phase assignment policies.
//!
//! A policy sees only the points selected by a geometry call, as local
//! arrays, and writes labels into the local phase slice.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

/// Coordinates of the selected points.
///
/// For rotated solids the coordinates are in the solid's local frame.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
}

impl<'a> PointSet<'a> {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

/// Capability to label selected points.
///
/// Implemented by the built-in [`PhasePolicy`] variants; callers may provide
/// their own.
pub trait PhaseStructure {
    fn assign(&self, phase: &mut [i32], temp: &[f64], points: PointSet<'_>) -> Result<()>;
}

/// Every selected point gets the same label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantPhase {
    pub phase: i32,
}

impl ConstantPhase {
    pub fn new(phase: i32) -> Self {
        Self { phase }
    }
}

impl Default for ConstantPhase {
    fn default() -> Self {
        Self { phase: 1 }
    }
}

impl PhaseStructure for ConstantPhase {
    fn assign(&self, phase: &mut [i32], _temp: &[f64], _points: PointSet<'_>) -> Result<()> {
        phase.fill(self.phase);
        Ok(())
    }
}

/// Layered lithosphere, labelled from `ztop` downwards.
///
/// `layers[i]` is the thickness of the layer carrying `phases[i]`. Labels
/// without a thickness are background; the last label is the mantle, used
/// below all layers and wherever the temperature exceeds `tlab`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LithosphericPhases {
    pub layers: Vec<f64>,
    pub phases: Vec<i32>,
    #[serde(default)]
    pub tlab: Option<f64>,
    #[serde(default)]
    pub ztop: f64,
}

impl Default for LithosphericPhases {
    fn default() -> Self {
        Self {
            layers: vec![10.0, 20.0, 15.0],
            phases: vec![1, 2, 3, 4],
            tlab: None,
            ztop: 0.0,
        }
    }
}

impl LithosphericPhases {
    pub fn new(layers: Vec<f64>, phases: Vec<i32>) -> Self {
        Self {
            layers,
            phases,
            tlab: None,
            ztop: 0.0,
        }
    }

    pub fn with_tlab(mut self, tlab: f64) -> Self {
        self.tlab = Some(tlab);
        self
    }

    pub fn with_ztop(mut self, ztop: f64) -> Self {
        self.ztop = ztop;
        self
    }

    fn mantle_phase(&self) -> Result<i32> {
        self.phases
            .last()
            .copied()
            .ok_or_else(|| SetupError::config("layered phases need at least one label"))
    }

    pub fn validate(&self) -> Result<()> {
        self.mantle_phase()?;
        if let Some(bad) = self.layers.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(SetupError::config(format!("layer thickness {bad} must be finite and non-negative")));
        }
        Ok(())
    }
}

impl PhaseStructure for LithosphericPhases {
    fn assign(&self, phase: &mut [i32], temp: &[f64], points: PointSet<'_>) -> Result<()> {
        self.validate()?;
        let mantle = self.mantle_phase()?;
        phase.fill(mantle);

        let mut ztop = self.ztop;
        for (&thickness, &label) in self.layers.iter().zip(&self.phases) {
            let zbot = ztop - thickness;
            for (p, &z) in phase.iter_mut().zip(points.z) {
                if z >= zbot && z <= ztop {
                    *p = label;
                }
            }
            ztop = zbot;
        }

        if let Some(tlab) = self.tlab {
            for (p, &t) in phase.iter_mut().zip(temp) {
                if t > tlab {
                    *p = mantle;
                }
            }
        }
        Ok(())
    }
}

/// The built-in phase policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhasePolicy {
    Constant(ConstantPhase),
    Lithospheric(LithosphericPhases),
}

impl Default for PhasePolicy {
    fn default() -> Self {
        PhasePolicy::Constant(ConstantPhase::default())
    }
}

impl From<ConstantPhase> for PhasePolicy {
    fn from(value: ConstantPhase) -> Self {
        PhasePolicy::Constant(value)
    }
}

impl From<LithosphericPhases> for PhasePolicy {
    fn from(value: LithosphericPhases) -> Self {
        PhasePolicy::Lithospheric(value)
    }
}

impl PhaseStructure for PhasePolicy {
    fn assign(&self, phase: &mut [i32], temp: &[f64], points: PointSet<'_>) -> Result<()> {
        match self {
            PhasePolicy::Constant(p) => p.assign(phase, temp, points),
            PhasePolicy::Lithospheric(p) => p.assign(phase, temp, points),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(z: &[f64]) -> (Vec<f64>, Vec<f64>) {
        (vec![0.0; z.len()], vec![0.0; z.len()])
    }

    #[test]
    fn test_constant_phase_is_idempotent() {
        let z = [-1.0, -2.0, -3.0];
        let (x, y) = column(&z);
        let points = PointSet { x: &x, y: &y, z: &z };
        let temp = [0.0; 3];
        let policy = ConstantPhase::new(5);

        let mut once = vec![0, 1, 2];
        policy.assign(&mut once, &temp, points).unwrap();
        let mut twice = once.clone();
        policy.assign(&mut twice, &temp, points).unwrap();

        assert_eq!(once, vec![5, 5, 5]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_layered_phases_with_thermal_cutoff() {
        // layers span [-10, 0] and [-30, -10]
        let z = [-5.0, -5.0, -25.0, -35.0, -10.0];
        let temp = [500.0, 700.0, 500.0, 500.0, 500.0];
        let (x, y) = column(&z);
        let points = PointSet { x: &x, y: &y, z: &z };
        let policy = LithosphericPhases::new(vec![10.0, 20.0], vec![1, 2, 3]).with_tlab(600.0);

        let mut phase = vec![0; 5];
        policy.assign(&mut phase, &temp, points).unwrap();

        assert_eq!(phase[0], 1);
        assert_eq!(phase[1], 3);
        assert_eq!(phase[2], 2);
        assert_eq!(phase[3], 3);
        // a shared boundary belongs to the deeper layer
        assert_eq!(phase[4], 2);
    }

    #[test]
    fn test_layered_phases_respect_ztop() {
        let z = [4.0, 1.0, -2.0];
        let (x, y) = column(&z);
        let points = PointSet { x: &x, y: &y, z: &z };
        let policy = LithosphericPhases::new(vec![2.0], vec![7, 9]).with_ztop(3.0);

        let mut phase = vec![0; 3];
        policy.assign(&mut phase, &[0.0; 3], points).unwrap();
        // above ztop is not part of any layer
        assert_eq!(phase, vec![9, 7, 9]);
    }

    #[test]
    fn test_layered_phases_validation() {
        let z = [0.0];
        let (x, y) = column(&z);
        let points = PointSet { x: &x, y: &y, z: &z };
        let mut phase = vec![3];

        let empty = LithosphericPhases::new(vec![], vec![]);
        assert!(matches!(empty.assign(&mut phase, &[0.0], points), Err(SetupError::Configuration(_))));

        let negative = LithosphericPhases::new(vec![-1.0], vec![1, 2]);
        assert!(negative.assign(&mut phase, &[0.0], points).is_err());
        assert_eq!(phase, vec![3]);
    }

    #[test]
    fn test_policy_json_shape() {
        let json = r#"{"type": "lithospheric", "layers": [10.0, 20.0], "phases": [1, 2, 3], "tlab": 1250.0}"#;
        let policy: PhasePolicy = serde_json::from_str(json).unwrap();
        assert_eq!(
            policy,
            PhasePolicy::Lithospheric(LithosphericPhases::new(vec![10.0, 20.0], vec![1, 2, 3]).with_tlab(1250.0))
        );

        let constant: PhasePolicy = serde_json::from_str(r#"{"type": "constant", "phase": 4}"#).unwrap();
        assert_eq!(constant, PhasePolicy::Constant(ConstantPhase::new(4)));
    }
}
