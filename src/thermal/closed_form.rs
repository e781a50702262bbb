//! Closed-form thermal structures: constant, linear and the erfc half-space
//! cooling family.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::str::FromStr;

use super::ThermalStructure;
use crate::constants::{
    DEFAULT_MANTLE_TEMP_C, DEFAULT_PLATE_AGE_MYR, DEFAULT_SPREADING_VELOCITY_CM_YR, DEFAULT_SURFACE_TEMP_C,
    HALFSPACE_DIFFUSIVITY_M2_S, KM_TO_CM, KM_TO_M, MIO,
};
use crate::error::{Result, SetupError};
use crate::math_utils::min_max;
use crate::phase::PointSet;
use crate::temp_utils::{myr_to_seconds, years_to_seconds};

/// Uniform temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantTemp {
    pub temperature: f64,
}

impl Default for ConstantTemp {
    fn default() -> Self {
        Self { temperature: 1000.0 }
    }
}

impl ThermalStructure for ConstantTemp {
    fn evaluate(&self, temp: &mut [f64], _phase: &[i32], _points: PointSet<'_>) -> Result<()> {
        temp.fill(self.temperature);
        Ok(())
    }
}

/// Temperature growing with the fraction `|z| / (zmax - zmin)` of the
/// selection's vertical span.
///
/// The absolute value makes the field symmetric about z = 0, so the profile
/// is only meaningful for solids lying entirely below (or above) zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearTemp {
    pub ttop: f64,
    pub tbot: f64,
}

impl Default for LinearTemp {
    fn default() -> Self {
        Self { ttop: 0.0, tbot: 1000.0 }
    }
}

impl ThermalStructure for LinearTemp {
    fn evaluate(&self, temp: &mut [f64], _phase: &[i32], points: PointSet<'_>) -> Result<()> {
        let Some((zmin, zmax)) = min_max(points.z) else {
            return Ok(());
        };
        let span = zmax - zmin;
        if span == 0.0 {
            return Err(SetupError::degenerate("linear temperature needs a selection with vertical extent"));
        }

        let dt = self.tbot - self.ttop;
        for (t, &z) in temp.iter_mut().zip(points.z) {
            *t = (z / span).abs() * dt + self.ttop;
        }
        Ok(())
    }
}

/// Half-space cooling temperature at `depth_km` below the surface for a
/// plate of the given thermal age, plus the mantle adiabat.
///
/// A zero age is the limit of a freshly formed plate: surface temperature at
/// the surface, adiabatic mantle everywhere below.
pub fn halfspace_temperature(tsurface: f64, tmantle: f64, adiabat_k_per_km: f64, depth_km: f64, age_s: f64) -> f64 {
    let depth_km = depth_km.abs();
    let mantle = tmantle + adiabat_k_per_km * depth_km;
    if age_s <= 0.0 {
        return if depth_km == 0.0 { tsurface } else { mantle };
    }
    let arg = depth_km * KM_TO_M / (2.0 * (HALFSPACE_DIFFUSIVITY_M2_S * age_s).sqrt());
    (tsurface - tmantle) * erfc(arg) + mantle
}

/// Half-space cooling of a plate of uniform age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalfspaceCoolingTemp {
    pub tsurface: f64,
    pub tmantle: f64,
    pub age_myr: f64,
    /// Mantle adiabatic gradient (K/km)
    pub adiabat: f64,
}

impl Default for HalfspaceCoolingTemp {
    fn default() -> Self {
        Self {
            tsurface: DEFAULT_SURFACE_TEMP_C,
            tmantle: DEFAULT_MANTLE_TEMP_C,
            age_myr: DEFAULT_PLATE_AGE_MYR,
            adiabat: 0.0,
        }
    }
}

impl ThermalStructure for HalfspaceCoolingTemp {
    fn evaluate(&self, temp: &mut [f64], _phase: &[i32], points: PointSet<'_>) -> Result<()> {
        if !(self.age_myr.is_finite() && self.age_myr > 0.0) {
            return Err(SetupError::degenerate(format!(
                "half-space cooling needs a positive plate age, got {} Myr",
                self.age_myr
            )));
        }
        let age_s = myr_to_seconds(self.age_myr);
        for (t, &z) in temp.iter_mut().zip(points.z) {
            *t = halfspace_temperature(self.tsurface, self.tmantle, self.adiabat, z, age_s);
        }
        Ok(())
    }
}

/// Side of the selected region the spreading ridge sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RidgeSide {
    Left,
    Right,
    Front,
    Back,
}

impl RidgeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            RidgeSide::Left => "left",
            RidgeSide::Right => "right",
            RidgeSide::Front => "front",
            RidgeSide::Back => "back",
        }
    }
}

impl FromStr for RidgeSide {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(RidgeSide::Left),
            "right" => Ok(RidgeSide::Right),
            "front" => Ok(RidgeSide::Front),
            "back" => Ok(RidgeSide::Back),
            other => Err(SetupError::config(format!(
                "unknown ridge side '{other}', expected left, right, front or back"
            ))),
        }
    }
}

impl TryFrom<String> for RidgeSide {
    type Error = SetupError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RidgeSide> for String {
    fn from(side: RidgeSide) -> Self {
        side.as_str().to_string()
    }
}

/// Half-space cooling with a plate age that grows away from a spreading
/// ridge.
///
/// The thermal age of a point is its horizontal distance from the ridge side
/// of the selection divided by the spreading velocity, plus the age of the
/// ridge itself, capped at `max_age_myr`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadingRateTemp {
    pub tsurface: f64,
    pub tmantle: f64,
    pub adiabat: f64,
    pub ridge_side: RidgeSide,
    pub spreading_velocity_cm_yr: f64,
    pub ridge_age_myr: f64,
    pub max_age_myr: f64,
}

impl Default for SpreadingRateTemp {
    fn default() -> Self {
        Self {
            tsurface: DEFAULT_SURFACE_TEMP_C,
            tmantle: DEFAULT_MANTLE_TEMP_C,
            adiabat: 0.0,
            ridge_side: RidgeSide::Left,
            spreading_velocity_cm_yr: DEFAULT_SPREADING_VELOCITY_CM_YR,
            ridge_age_myr: 0.0,
            max_age_myr: DEFAULT_PLATE_AGE_MYR,
        }
    }
}

impl SpreadingRateTemp {
    /// Thermal age in years of a point `distance_km` away from the ridge.
    pub fn thermal_age_years(&self, distance_km: f64) -> f64 {
        let age = distance_km.abs() * KM_TO_CM / self.spreading_velocity_cm_yr + self.ridge_age_myr * MIO;
        age.min(self.max_age_myr * MIO)
    }

    fn distances(&self, points: PointSet<'_>) -> Vec<f64> {
        let axis = match self.ridge_side {
            RidgeSide::Left | RidgeSide::Right => points.x,
            RidgeSide::Front | RidgeSide::Back => points.y,
        };
        let Some((lo, hi)) = min_max(axis) else {
            return Vec::new();
        };
        match self.ridge_side {
            RidgeSide::Left | RidgeSide::Front => axis.iter().map(|v| v - lo).collect(),
            RidgeSide::Right | RidgeSide::Back => axis.iter().map(|v| hi - v).collect(),
        }
    }
}

impl ThermalStructure for SpreadingRateTemp {
    fn evaluate(&self, temp: &mut [f64], _phase: &[i32], points: PointSet<'_>) -> Result<()> {
        if !(self.spreading_velocity_cm_yr.is_finite() && self.spreading_velocity_cm_yr > 0.0) {
            return Err(SetupError::degenerate(format!(
                "spreading velocity must be positive, got {} cm/yr",
                self.spreading_velocity_cm_yr
            )));
        }
        let distances = self.distances(points);
        for ((t, &z), &d) in temp.iter_mut().zip(points.z).zip(&distances) {
            let age_s = years_to_seconds(self.thermal_age_years(d));
            *t = halfspace_temperature(self.tsurface, self.tmantle, self.adiabat, z, age_s);
        }
        Ok(())
    }
}
