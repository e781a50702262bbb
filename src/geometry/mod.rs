//! Painting phases and temperatures into grid fields, one solid at a time.
//!
//! Every `add_*` call selects the nodes inside its solid, runs the phase and
//! thermal policies on local copies of those nodes, and writes the copies
//! back only when every step succeeded. On error the caller's fields are
//! unchanged.
//!
//! # Example
//! ```
//! use geo_setup_rust::geometry::{add_box, BoxSolid};
//! use geo_setup_rust::grid::Grid;
//! use geo_setup_rust::phase::ConstantPhase;
//! use geo_setup_rust::thermal::LinearTemp;
//!
//! let grid = Grid::uniform((0.0, 100.0), (0.0, 100.0), (-50.0, 0.0), [11, 11, 11]).unwrap();
//! let mut phase = vec![0; grid.len()];
//! let mut temp = vec![1350.0; grid.len()];
//!
//! let slab = BoxSolid::new((20.0, 60.0), (0.0, 100.0), (-30.0, 0.0)).with_strike_dip(0.0, 30.0);
//! let linear = LinearTemp { ttop: 0.0, tbot: 1300.0 };
//! let changed = add_box(&mut phase, &mut temp, &grid, &slab, &ConstantPhase::new(2), Some(&linear)).unwrap();
//! assert!(changed > 0);
//! assert_eq!(phase.iter().filter(|&&p| p == 2).count(), changed);
//! ```

pub mod predicates;
pub mod solids;

use tracing::{info, instrument};

use crate::error::Result;
use crate::grid::Grid;
use crate::phase::PhaseStructure;
use crate::thermal::ThermalStructure;

pub use predicates::{Selection, select_box, select_cylinder, select_ellipsoid, select_layer, select_sphere};
pub use solids::{BoxSolid, CylinderSolid, EllipsoidSolid, LayerSolid, Solid, SphereSolid};

/// Runs the policies on `selection` and scatters the result into the
/// fields. Returns the number of nodes written.
fn paint(
    phase: &mut [i32],
    temp: &mut [f64],
    selection: &Selection,
    phase_policy: &dyn PhaseStructure,
    thermal: Option<&dyn ThermalStructure>,
) -> Result<usize> {
    if selection.is_empty() {
        return Ok(0);
    }
    let points = selection.points();
    let mut local_phase: Vec<i32> = selection.indices.iter().map(|&i| phase[i]).collect();
    let mut local_temp: Vec<f64> = selection.indices.iter().map(|&i| temp[i]).collect();

    if let Some(thermal) = thermal {
        // material lookups in the thermal step are keyed by phase
        if thermal.requires_phase() {
            phase_policy.assign(&mut local_phase, &local_temp, points)?;
        }
        thermal.evaluate(&mut local_temp, &local_phase, points)?;
    }
    // second pass so temperature-dependent labels see the new temperature
    phase_policy.assign(&mut local_phase, &local_temp, points)?;

    for ((&i, &p), &t) in selection.indices.iter().zip(&local_phase).zip(&local_temp) {
        phase[i] = p;
        temp[i] = t;
    }
    Ok(selection.len())
}

#[instrument(skip(phase, temp, grid, phase_policy, thermal))]
pub fn add_box(
    phase: &mut [i32],
    temp: &mut [f64],
    grid: &Grid,
    solid: &BoxSolid,
    phase_policy: &dyn PhaseStructure,
    thermal: Option<&dyn ThermalStructure>,
) -> Result<usize> {
    grid.check_fields(phase.len(), temp.len())?;
    let selection = select_box(grid, solid)?;
    let changed = paint(phase, temp, &selection, phase_policy, thermal)?;
    info!(changed, "placed box");
    Ok(changed)
}

/// Axis-aligned layer; coordinates passed to the policies are world
/// coordinates.
#[instrument(skip(phase, temp, grid, phase_policy, thermal))]
pub fn add_layer(
    phase: &mut [i32],
    temp: &mut [f64],
    grid: &Grid,
    solid: &LayerSolid,
    phase_policy: &dyn PhaseStructure,
    thermal: Option<&dyn ThermalStructure>,
) -> Result<usize> {
    grid.check_fields(phase.len(), temp.len())?;
    let selection = select_layer(grid, solid)?;
    let changed = paint(phase, temp, &selection, phase_policy, thermal)?;
    info!(changed, "placed layer");
    Ok(changed)
}

#[instrument(skip(phase, temp, grid, phase_policy, thermal))]
pub fn add_sphere(
    phase: &mut [i32],
    temp: &mut [f64],
    grid: &Grid,
    solid: &SphereSolid,
    phase_policy: &dyn PhaseStructure,
    thermal: Option<&dyn ThermalStructure>,
) -> Result<usize> {
    grid.check_fields(phase.len(), temp.len())?;
    let selection = select_sphere(grid, solid)?;
    let changed = paint(phase, temp, &selection, phase_policy, thermal)?;
    info!(changed, "placed sphere");
    Ok(changed)
}

#[instrument(skip(phase, temp, grid, phase_policy, thermal))]
pub fn add_ellipsoid(
    phase: &mut [i32],
    temp: &mut [f64],
    grid: &Grid,
    solid: &EllipsoidSolid,
    phase_policy: &dyn PhaseStructure,
    thermal: Option<&dyn ThermalStructure>,
) -> Result<usize> {
    grid.check_fields(phase.len(), temp.len())?;
    let selection = select_ellipsoid(grid, solid)?;
    let changed = paint(phase, temp, &selection, phase_policy, thermal)?;
    info!(changed, "placed ellipsoid");
    Ok(changed)
}

#[instrument(skip(phase, temp, grid, phase_policy, thermal))]
pub fn add_cylinder(
    phase: &mut [i32],
    temp: &mut [f64],
    grid: &Grid,
    solid: &CylinderSolid,
    phase_policy: &dyn PhaseStructure,
    thermal: Option<&dyn ThermalStructure>,
) -> Result<usize> {
    grid.check_fields(phase.len(), temp.len())?;
    let selection = select_cylinder(grid, solid)?;
    let changed = paint(phase, temp, &selection, phase_policy, thermal)?;
    info!(changed, "placed cylinder");
    Ok(changed)
}

impl Solid {
    /// Nodes of `grid` inside this solid.
    pub fn select(&self, grid: &Grid) -> Result<Selection> {
        match self {
            Solid::Box(s) => select_box(grid, s),
            Solid::Layer(s) => select_layer(grid, s),
            Solid::Sphere(s) => select_sphere(grid, s),
            Solid::Ellipsoid(s) => select_ellipsoid(grid, s),
            Solid::Cylinder(s) => select_cylinder(grid, s),
        }
    }

    /// Dispatches to the matching `add_*` entry point.
    pub fn place(
        &self,
        phase: &mut [i32],
        temp: &mut [f64],
        grid: &Grid,
        phase_policy: &dyn PhaseStructure,
        thermal: Option<&dyn ThermalStructure>,
    ) -> Result<usize> {
        match self {
            Solid::Box(s) => add_box(phase, temp, grid, s, phase_policy, thermal),
            Solid::Layer(s) => add_layer(phase, temp, grid, s, phase_policy, thermal),
            Solid::Sphere(s) => add_sphere(phase, temp, grid, s, phase_policy, thermal),
            Solid::Ellipsoid(s) => add_ellipsoid(phase, temp, grid, s, phase_policy, thermal),
            Solid::Cylinder(s) => add_cylinder(phase, temp, grid, s, phase_policy, thermal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;
    use crate::phase::{ConstantPhase, LithosphericPhases};
    use crate::thermal::{ConstantTemp, HalfspaceCoolingTemp, LinearTemp, LithosphericTemp};

    fn setup() -> (Grid, Vec<i32>, Vec<f64>) {
        let grid = Grid::uniform((0.0, 10.0), (0.0, 10.0), (-10.0, 0.0), [11, 11, 11]).unwrap();
        let n = grid.len();
        (grid, vec![0; n], vec![100.0; n])
    }

    #[test]
    fn test_phase_only_placement_keeps_temperature() {
        let (grid, mut phase, mut temp) = setup();
        let sphere = SphereSolid::new([5.0, 5.0, -5.0], 2.5);
        let changed = add_sphere(&mut phase, &mut temp, &grid, &sphere, &ConstantPhase::new(4), None).unwrap();

        assert_eq!(phase.iter().filter(|&&p| p == 4).count(), changed);
        assert!(temp.iter().all(|&t| t == 100.0));
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let (grid, mut phase, mut temp) = setup();
        let far = SphereSolid::new([100.0, 100.0, 100.0], 1.0);
        let changed = add_sphere(&mut phase, &mut temp, &grid, &far, &ConstantPhase::new(4), None).unwrap();
        assert_eq!(changed, 0);
        assert!(phase.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_failed_thermal_step_leaves_fields_untouched() {
        let (grid, mut phase, mut temp) = setup();
        // a single horizontal slice has no vertical span for a linear profile
        let flat = LayerSolid::between((-5.0, -5.0));
        let result = add_layer(
            &mut phase,
            &mut temp,
            &grid,
            &flat,
            &ConstantPhase::new(3),
            Some(&LinearTemp::default()),
        );
        assert!(matches!(result, Err(SetupError::NumericDegeneracy(_))));
        assert!(phase.iter().all(|&p| p == 0));
        assert!(temp.iter().all(|&t| t == 100.0));
    }

    #[test]
    fn test_field_length_mismatch() {
        let (grid, mut phase, _) = setup();
        let mut short = vec![0.0; 3];
        let result = add_box(
            &mut phase,
            &mut short,
            &grid,
            &BoxSolid::new((0.0, 1.0), (0.0, 1.0), (-1.0, 0.0)),
            &ConstantPhase::default(),
            None,
        );
        assert!(matches!(result, Err(SetupError::Configuration(_))));
    }

    #[test]
    fn test_later_placements_override_earlier_ones() {
        let (grid, mut phase, mut temp) = setup();
        let everything = LayerSolid::between((-10.0, 0.0));
        add_layer(&mut phase, &mut temp, &grid, &everything, &ConstantPhase::new(1), Some(&ConstantTemp { temperature: 10.0 })).unwrap();
        let cyl = CylinderSolid::new([5.0, 5.0, -10.0], [5.0, 5.0, 0.0], 1.0);
        add_cylinder(&mut phase, &mut temp, &grid, &cyl, &ConstantPhase::new(2), Some(&ConstantTemp { temperature: 20.0 })).unwrap();

        let axis = grid.index(5, 5, 3);
        let away = grid.index(0, 0, 3);
        assert_eq!((phase[axis], temp[axis]), (2, 20.0));
        assert_eq!((phase[away], temp[away]), (1, 10.0));
    }

    #[test]
    fn test_layered_phases_follow_new_temperature() {
        let (grid, mut phase, mut temp) = setup();
        let everything = LayerSolid::between((-10.0, 0.0));
        let layered = LithosphericPhases::new(vec![4.0], vec![1, 2]).with_tlab(500.0);
        let hot = HalfspaceCoolingTemp {
            age_myr: 0.01,
            ..Default::default()
        };
        add_layer(&mut phase, &mut temp, &grid, &everything, &layered, Some(&hot)).unwrap();

        // the young plate is at mantle temperature just below the surface
        assert_eq!(phase[grid.index(0, 0, 10)], 1);
        assert_eq!(phase[grid.index(0, 0, 8)], 2);
    }

    #[test]
    fn test_lithospheric_profile_uses_assigned_phases() {
        let (grid, mut phase, mut temp) = setup();
        let everything = LayerSolid::between((-10.0, 0.0));
        // the default material table has no phase 9
        let layered = LithosphericPhases::new(vec![5.0], vec![9, 2]);
        let profile = LithosphericTemp {
            nz: 11,
            age_myr: 1.0,
            ..Default::default()
        };
        let result = add_layer(&mut phase, &mut temp, &grid, &everything, &layered, Some(&profile));
        assert_eq!(result, Err(SetupError::MissingMaterial { phase: 9 }));
        assert!(temp.iter().all(|&t| t == 100.0));

        let layered = LithosphericPhases::new(vec![5.0], vec![0, 2]);
        let changed = add_layer(&mut phase, &mut temp, &grid, &everything, &layered, Some(&profile)).unwrap();
        assert_eq!(changed, grid.len());
        assert_eq!(temp[grid.index(0, 0, 10)], 0.0);
    }

    #[test]
    fn test_solid_dispatch() {
        let (grid, mut phase, mut temp) = setup();
        let solid = Solid::from(EllipsoidSolid::new([5.0, 5.0, -5.0], [3.0, 2.0, 1.0]));
        let selected = solid.select(&grid).unwrap().len();
        let changed = solid
            .place(&mut phase, &mut temp, &grid, &ConstantPhase::new(6), None)
            .unwrap();
        assert_eq!(selected, changed);
    }
}
