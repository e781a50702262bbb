//! Aged lithosphere from an explicit 1D conduction solve.
//!
//! The selected points are collapsed onto one vertical column. The column is
//! labelled with the phases present in the selection, cooled for the plate
//! age with a finite-difference scheme, and the resulting profile is
//! interpolated back onto the points by depth.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::ThermalStructure;
use crate::constants::{
    DEFAULT_ADIABAT_K_PER_KM, DEFAULT_DT_SAFETY_FACTOR, DEFAULT_LITHOSPHERE_AGE_MYR, DEFAULT_LOWER_FLUX_W_M2,
    DEFAULT_MANTLE_TEMP_C, DEFAULT_PROFILE_SAMPLES, DEFAULT_SURFACE_TEMP_C, DEFAULT_UPPER_FLUX_W_M2, KM_TO_M,
    LARGE_ITERATION_COUNT,
};
use crate::error::{Result, SetupError};
use crate::material::{MaterialProvider, MaterialTable};
use crate::math_utils::{harmonic_mean, interp_linear, lerp, min_max};
use crate::phase::PointSet;
use crate::temp_utils::{celsius_to_kelvin, kelvin_to_celsius, myr_to_seconds};

/// Boundary condition at either end of the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BoundaryKind {
    /// Fixed temperature, held at the initial value.
    Const,
    /// Prescribed heat flux.
    Flux,
}

impl BoundaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::Const => "const",
            BoundaryKind::Flux => "flux",
        }
    }
}

impl FromStr for BoundaryKind {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "const" => Ok(BoundaryKind::Const),
            "flux" => Ok(BoundaryKind::Flux),
            other => Err(SetupError::config(format!(
                "unknown boundary kind '{other}', expected const or flux"
            ))),
        }
    }
}

impl TryFrom<String> for BoundaryKind {
    type Error = SetupError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<BoundaryKind> for String {
    fn from(kind: BoundaryKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Lithospheric temperature from 1D diffusion with radiogenic heating.
///
/// Temperatures are in °C, `dtadi` in K/km, fluxes in W/m² and the age in
/// Myr. `materials` supplies properties for every phase label that occurs in
/// the selection; [`evaluate_with`](Self::evaluate_with) accepts any other
/// [`MaterialProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LithosphericTemp {
    pub tsurface: f64,
    /// Mantle potential temperature
    pub tpot: f64,
    /// Adiabatic gradient
    pub dtadi: f64,
    pub ubound: BoundaryKind,
    pub lbound: BoundaryKind,
    /// Upper boundary flux
    pub utbf: f64,
    /// Lower boundary flux
    pub ltbf: f64,
    pub age_myr: f64,
    /// Fraction of the explicit stability limit used as time step
    pub dtfac: f64,
    /// Samples in the 1D column
    pub nz: usize,
    pub materials: MaterialTable,
}

impl Default for LithosphericTemp {
    fn default() -> Self {
        Self {
            tsurface: DEFAULT_SURFACE_TEMP_C,
            tpot: DEFAULT_MANTLE_TEMP_C,
            dtadi: DEFAULT_ADIABAT_K_PER_KM,
            ubound: BoundaryKind::Const,
            lbound: BoundaryKind::Const,
            utbf: DEFAULT_UPPER_FLUX_W_M2,
            ltbf: DEFAULT_LOWER_FLUX_W_M2,
            age_myr: DEFAULT_LITHOSPHERE_AGE_MYR,
            dtfac: DEFAULT_DT_SAFETY_FACTOR,
            nz: DEFAULT_PROFILE_SAMPLES,
            materials: MaterialTable::crust_mantle(),
        }
    }
}

impl LithosphericTemp {
    pub fn validate(&self) -> Result<()> {
        if self.nz < 2 {
            return Err(SetupError::config(format!("profile needs at least 2 samples, got {}", self.nz)));
        }
        check_dtfac(self.dtfac)?;
        if !(self.age_myr.is_finite() && self.age_myr >= 0.0) {
            return Err(SetupError::config(format!("lithosphere age must be non-negative, got {}", self.age_myr)));
        }
        Ok(())
    }

    /// Runs the column solve with properties from `provider` and writes the
    /// interpolated temperatures into `temp`.
    ///
    /// `temp` is only written once the solve has succeeded.
    #[instrument(skip_all, fields(points = points.len(), nz = self.nz, age_myr = self.age_myr))]
    pub fn evaluate_with(
        &self,
        provider: &dyn MaterialProvider,
        temp: &mut [f64],
        phase: &[i32],
        points: PointSet<'_>,
    ) -> Result<()> {
        self.validate()?;
        if points.is_empty() {
            return Ok(());
        }

        let mut column = LithosphereColumn::build(self, phase, points, provider)?;
        column.solve(myr_to_seconds(self.age_myr), self.dtfac)?;

        for (t, &z) in temp.iter_mut().zip(points.z) {
            *t = column.temperature_at(z);
        }
        Ok(())
    }
}

impl ThermalStructure for LithosphericTemp {
    fn requires_phase(&self) -> bool {
        true
    }

    fn evaluate(&self, temp: &mut [f64], phase: &[i32], points: PointSet<'_>) -> Result<()> {
        self.evaluate_with(&self.materials, temp, phase, points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Boundary {
    kind: BoundaryKind,
    flux: f64,
}

/// Working state of one column solve.
///
/// Sample 0 is the top of the column; depth (`z_m`) decreases with the
/// sample index. Temperatures are in Kelvin.
#[derive(Debug, Clone)]
pub struct LithosphereColumn {
    z_m: Vec<f64>,
    phase: Vec<i32>,
    temperature_k: Vec<f64>,
    initial_k: Vec<f64>,
    density: Vec<f64>,
    heat_capacity: Vec<f64>,
    conductivity: Vec<f64>,
    rho_cp: Vec<f64>,
    radiogenic_heat: Vec<f64>,
    dz: f64,
    upper: Boundary,
    lower: Boundary,
}

impl LithosphereColumn {
    /// Lays out the column over the vertical range of `points`, labels it
    /// from `phase` and sets the initial adiabatic profile.
    pub fn build(
        params: &LithosphericTemp,
        phase: &[i32],
        points: PointSet<'_>,
        provider: &dyn MaterialProvider,
    ) -> Result<Self> {
        params.validate()?;
        let (zmin, zmax) =
            min_max(points.z).ok_or_else(|| SetupError::config("lithospheric profile needs selected points"))?;
        let dz = (zmax - zmin) * KM_TO_M / (params.nz - 1) as f64;
        if !(dz.is_finite() && dz > 0.0) {
            return Err(SetupError::degenerate(format!(
                "lithospheric profile needs a vertical extent, got [{zmin}, {zmax}] km"
            )));
        }

        let last = (params.nz - 1) as f64;
        let z_km: Vec<f64> = (0..params.nz).map(|i| lerp(zmax, zmin, i as f64 / last)).collect();
        let column_phase = label_column(&z_km, phase, points.z)?;

        let mut initial_k: Vec<f64> = z_km
            .iter()
            .map(|z| celsius_to_kelvin(params.tpot) + z.abs() * params.dtadi)
            .collect();
        initial_k[0] = celsius_to_kelvin(params.tsurface);

        let props = provider.properties(&column_phase)?;
        if props.len() != column_phase.len() {
            return Err(SetupError::config(format!(
                "material provider returned {} entries for {} samples",
                props.len(),
                column_phase.len()
            )));
        }
        let rho_cp = props.rho_cp();

        Ok(Self {
            z_m: z_km.iter().map(|z| z * KM_TO_M).collect(),
            phase: column_phase,
            temperature_k: initial_k.clone(),
            initial_k,
            density: props.density,
            heat_capacity: props.heat_capacity,
            conductivity: props.conductivity,
            rho_cp,
            radiogenic_heat: props.radiogenic_heat,
            dz,
            upper: Boundary {
                kind: params.ubound,
                flux: params.utbf,
            },
            lower: Boundary {
                kind: params.lbound,
                flux: params.ltbf,
            },
        })
    }

    pub fn len(&self) -> usize {
        self.z_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_m.is_empty()
    }

    pub fn z_m(&self) -> &[f64] {
        &self.z_m
    }

    pub fn phase(&self) -> &[i32] {
        &self.phase
    }

    pub fn temperature_k(&self) -> &[f64] {
        &self.temperature_k
    }

    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Column-wide diffusivity bound `max(k) / min(ρ) / min(Cp)` in m²/s.
    pub fn diffusivity(&self) -> Result<f64> {
        let (_, k_max) = min_max(&self.conductivity).unwrap_or((0.0, 0.0));
        let (rho_min, _) = min_max(&self.density).unwrap_or((0.0, 0.0));
        let (cp_min, _) = min_max(&self.heat_capacity).unwrap_or((0.0, 0.0));
        if rho_min <= 0.0 || cp_min <= 0.0 {
            return Err(SetupError::degenerate(format!(
                "density ({rho_min}) and heat capacity ({cp_min}) must be positive"
            )));
        }
        let kappa = k_max / rho_min / cp_min;
        if !(kappa.is_finite() && kappa > 0.0) {
            return Err(SetupError::degenerate(format!("thermal diffusivity {kappa} must be positive")));
        }
        Ok(kappa)
    }

    /// Explicit time step, `dtfac` times the stability limit.
    pub fn time_step(&self, dtfac: f64) -> Result<f64> {
        check_dtfac(dtfac)?;
        let kappa = self.diffusivity()?;
        let dt = dtfac * self.dz * self.dz / (2.0 * kappa);
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SetupError::degenerate(format!("time step {dt} must be positive")));
        }
        Ok(dt)
    }

    /// One explicit update of `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let mut next = self.temperature_k.clone();
        self.step_into(&mut next, dt);
        self.temperature_k = next;
    }

    fn step_into(&self, next: &mut [f64], dt: f64) {
        let t = &self.temperature_k;
        let k = &self.conductivity;
        let n = t.len();
        let dz2 = self.dz * self.dz;

        for i in 1..n - 1 {
            let k_up = harmonic_mean(k[i - 1], k[i]);
            let k_down = harmonic_mean(k[i], k[i + 1]);
            let conduction = k_down * (t[i + 1] - t[i]) - k_up * (t[i] - t[i - 1]);
            next[i] = t[i] + dt * (conduction / dz2 + self.radiogenic_heat[i]) / self.rho_cp[i];
        }

        next[0] = match self.upper.kind {
            BoundaryKind::Const => self.initial_k[0],
            BoundaryKind::Flux => {
                let a = dt * (k[0] + harmonic_mean(k[0], k[1])) / (dz2 * self.rho_cp[0]);
                t[0] + a * (t[1] - t[0])
                    + dt * self.radiogenic_heat[0] / self.rho_cp[0]
                    + 2.0 * dt * self.upper.flux / (self.dz * self.rho_cp[0])
            }
        };

        let b = n - 1;
        next[b] = match self.lower.kind {
            BoundaryKind::Const => self.initial_k[b],
            BoundaryKind::Flux => {
                let a = dt * (k[b] + harmonic_mean(k[b], k[b - 1])) / (dz2 * self.rho_cp[b]);
                t[b] + a * (t[b - 1] - t[b]) + dt * self.radiogenic_heat[b] / self.rho_cp[b]
                    - 2.0 * dt * self.lower.flux / (self.dz * self.rho_cp[b])
            }
        };
    }

    /// Integrates the column for `age_s` seconds. Returns the number of
    /// iterations taken.
    #[instrument(skip(self), fields(nz = self.len()))]
    pub fn solve(&mut self, age_s: f64, dtfac: f64) -> Result<usize> {
        let kappa = self.diffusivity()?;
        let dt = self.time_step(dtfac)?;
        let iterations = (age_s / dt).ceil().max(0.0) as usize;
        debug!(kappa, dt, iterations, dz = self.dz, "solving lithospheric column");
        if iterations > LARGE_ITERATION_COUNT {
            warn!(iterations, "lithospheric column needs a very large number of iterations");
        }

        let mut next = self.temperature_k.clone();
        for _ in 0..iterations {
            self.step_into(&mut next, dt);
            std::mem::swap(&mut self.temperature_k, &mut next);
        }
        Ok(iterations)
    }

    /// Profile temperature in °C at `z_km`, clamped to the column ends.
    pub fn temperature_at(&self, z_km: f64) -> f64 {
        kelvin_to_celsius(interp_linear(&self.z_m, &self.temperature_k, z_km * KM_TO_M))
    }
}

/// Phase label per column sample.
///
/// Each phase present in the selection covers the vertical range of its
/// points; phases are applied in order of first appearance, so a later one
/// wins where ranges overlap. Samples left uncovered copy the nearest
/// labelled sample above, or below when there is none above.
fn label_column(z_km: &[f64], phase: &[i32], points_z: &[f64]) -> Result<Vec<i32>> {
    let mut extents: Vec<(i32, f64, f64)> = Vec::new();
    for (&p, &z) in phase.iter().zip(points_z) {
        match extents.iter_mut().find(|(label, _, _)| *label == p) {
            Some((_, lo, hi)) => {
                *lo = lo.min(z);
                *hi = hi.max(z);
            }
            None => extents.push((p, z, z)),
        }
    }

    let mut labels: Vec<Option<i32>> = vec![None; z_km.len()];
    for &(label, lo, hi) in &extents {
        for (slot, &z) in labels.iter_mut().zip(z_km) {
            if z >= lo && z <= hi {
                *slot = Some(label);
            }
        }
    }

    let mut filled = Vec::with_capacity(labels.len());
    for i in 0..labels.len() {
        let above = labels[..=i].iter().rev().find_map(|l| *l);
        let label = above
            .or_else(|| labels[i..].iter().find_map(|l| *l))
            .ok_or_else(|| SetupError::config("no phase labels available for the lithospheric column"))?;
        filled.push(label);
    }
    Ok(filled)
}

/// The explicit update is only stable for `0 < dtfac <= 1`.
fn check_dtfac(dtfac: f64) -> Result<()> {
    if !(dtfac.is_finite() && dtfac > 0.0) {
        return Err(SetupError::config(format!("time step factor must be positive, got {dtfac}")));
    }
    if dtfac > 1.0 {
        return Err(SetupError::config(format!(
            "time step factor {dtfac} exceeds the explicit stability limit of 1"
        )));
    }
    Ok(())
}
