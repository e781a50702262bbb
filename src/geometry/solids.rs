//! Descriptors of the primitive solids a model is painted with.
//!
//! Coordinates are in km. Limits are `(min, max)` pairs; rotation angles are
//! in degrees.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

/// Rotatable box.
///
/// Points are shifted by `origin` and rotated by strike and dip before being
/// tested against the limits, which are shifted by the same origin. The
/// default origin is the top corner `(xlim.0, ylim.0, zlim.1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSolid {
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
    pub zlim: (f64, f64),
    #[serde(default)]
    pub origin: Option<[f64; 3]>,
    #[serde(default)]
    pub strike: f64,
    #[serde(default)]
    pub dip: f64,
}

impl BoxSolid {
    pub fn new(xlim: (f64, f64), ylim: (f64, f64), zlim: (f64, f64)) -> Self {
        Self {
            xlim,
            ylim,
            zlim,
            origin: None,
            strike: 0.0,
            dip: 0.0,
        }
    }

    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_strike_dip(mut self, strike: f64, dip: f64) -> Self {
        self.strike = strike;
        self.dip = dip;
        self
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin.unwrap_or([self.xlim.0, self.ylim.0, self.zlim.1])
    }

    pub fn validate(&self) -> Result<()> {
        check_limits("box x", self.xlim)?;
        check_limits("box y", self.ylim)?;
        check_limits("box z", self.zlim)?;
        check_point("box origin", self.origin())
    }
}

/// Axis-aligned slab. Omitted limits cover the whole grid on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSolid {
    #[serde(default)]
    pub xlim: Option<(f64, f64)>,
    #[serde(default)]
    pub ylim: Option<(f64, f64)>,
    #[serde(default)]
    pub zlim: Option<(f64, f64)>,
}

impl LayerSolid {
    /// Horizontal layer between two depths.
    pub fn between(zlim: (f64, f64)) -> Self {
        Self {
            zlim: Some(zlim),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.xlim.is_none() && self.ylim.is_none() && self.zlim.is_none() {
            return Err(SetupError::config("a layer needs at least one of xlim, ylim or zlim"));
        }
        for (axis, lim) in [("layer x", self.xlim), ("layer y", self.ylim), ("layer z", self.zlim)] {
            if let Some(lim) = lim {
                check_limits(axis, lim)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereSolid {
    pub center: [f64; 3],
    pub radius: f64,
}

impl SphereSolid {
    pub fn new(center: [f64; 3], radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn validate(&self) -> Result<()> {
        check_point("sphere center", self.center)?;
        check_positive("sphere radius", self.radius)
    }
}

/// Rotatable ellipsoid with semi-axes `axes`.
///
/// Rotation happens about `origin`, which defaults to the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidSolid {
    pub center: [f64; 3],
    pub axes: [f64; 3],
    #[serde(default)]
    pub origin: Option<[f64; 3]>,
    #[serde(default)]
    pub strike: f64,
    #[serde(default)]
    pub dip: f64,
}

impl EllipsoidSolid {
    pub fn new(center: [f64; 3], axes: [f64; 3]) -> Self {
        Self {
            center,
            axes,
            origin: None,
            strike: 0.0,
            dip: 0.0,
        }
    }

    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_strike_dip(mut self, strike: f64, dip: f64) -> Self {
        self.strike = strike;
        self.dip = dip;
        self
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin.unwrap_or(self.center)
    }

    pub fn validate(&self) -> Result<()> {
        check_point("ellipsoid center", self.center)?;
        check_point("ellipsoid origin", self.origin())?;
        for axis in self.axes {
            check_positive("ellipsoid semi-axis", axis)?;
        }
        Ok(())
    }
}

/// Cylinder with flat caps between `base` and `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderSolid {
    pub base: [f64; 3],
    pub cap: [f64; 3],
    pub radius: f64,
}

impl CylinderSolid {
    pub fn new(base: [f64; 3], cap: [f64; 3], radius: f64) -> Self {
        Self { base, cap, radius }
    }

    pub fn validate(&self) -> Result<()> {
        check_point("cylinder base", self.base)?;
        check_point("cylinder cap", self.cap)?;
        check_positive("cylinder radius", self.radius)?;
        if self.base == self.cap {
            return Err(SetupError::degenerate("cylinder base and cap coincide"));
        }
        Ok(())
    }
}

/// Any of the primitive solids, tagged by `"type"` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Solid {
    Box(BoxSolid),
    Layer(LayerSolid),
    Sphere(SphereSolid),
    Ellipsoid(EllipsoidSolid),
    Cylinder(CylinderSolid),
}

impl Solid {
    pub fn name(&self) -> &'static str {
        match self {
            Solid::Box(_) => "box",
            Solid::Layer(_) => "layer",
            Solid::Sphere(_) => "sphere",
            Solid::Ellipsoid(_) => "ellipsoid",
            Solid::Cylinder(_) => "cylinder",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Solid::Box(s) => s.validate(),
            Solid::Layer(s) => s.validate(),
            Solid::Sphere(s) => s.validate(),
            Solid::Ellipsoid(s) => s.validate(),
            Solid::Cylinder(s) => s.validate(),
        }
    }
}

impl From<BoxSolid> for Solid {
    fn from(value: BoxSolid) -> Self {
        Solid::Box(value)
    }
}

impl From<LayerSolid> for Solid {
    fn from(value: LayerSolid) -> Self {
        Solid::Layer(value)
    }
}

impl From<SphereSolid> for Solid {
    fn from(value: SphereSolid) -> Self {
        Solid::Sphere(value)
    }
}

impl From<EllipsoidSolid> for Solid {
    fn from(value: EllipsoidSolid) -> Self {
        Solid::Ellipsoid(value)
    }
}

impl From<CylinderSolid> for Solid {
    fn from(value: CylinderSolid) -> Self {
        Solid::Cylinder(value)
    }
}

fn check_limits(what: &str, lim: (f64, f64)) -> Result<()> {
    if !(lim.0.is_finite() && lim.1.is_finite()) || lim.0 > lim.1 {
        return Err(SetupError::config(format!(
            "{what} limits ({}, {}) must be finite and ordered",
            lim.0, lim.1
        )));
    }
    Ok(())
}

fn check_point(what: &str, p: [f64; 3]) -> Result<()> {
    if p.iter().any(|v| !v.is_finite()) {
        return Err(SetupError::config(format!("{what} {p:?} must be finite")));
    }
    Ok(())
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(SetupError::degenerate(format!("{what} must be positive, got {value}")));
    }
    Ok(())
}
