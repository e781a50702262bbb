//! Conical volcano topography on a surface grid.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, SetupError};
use crate::grid::SurfaceGrid;

/// A truncated cone with an optional flat crater floor.
///
/// Elevation rises linearly from `base` at `radius` to `height` at `crater`
/// and stays at `height` inside the crater radius. Lengths in km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolcanoCone {
    pub center: [f64; 2],
    pub height: f64,
    pub radius: f64,
    #[serde(default)]
    pub crater: f64,
    #[serde(default)]
    pub base: f64,
}

impl VolcanoCone {
    pub fn new(center: [f64; 2], height: f64, radius: f64) -> Self {
        Self {
            center,
            height,
            radius,
            crater: 0.0,
            base: 0.0,
        }
    }

    pub fn with_crater(mut self, crater: f64) -> Self {
        self.crater = crater;
        self
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.crater.is_finite()) || self.radius <= self.crater {
            return Err(SetupError::degenerate(format!(
                "volcano radius ({}) must exceed the crater radius ({})",
                self.radius, self.crater
            )));
        }
        Ok(())
    }

    /// Position on the flank, 0 at the outer radius and 1 at the crater rim.
    pub fn flank_position(&self, x: f64, y: f64) -> f64 {
        let r = (x - self.center[0]).hypot(y - self.center[1]);
        1.0 - (r - self.crater) / (self.radius - self.crater)
    }

    /// Cone elevation at `(x, y)`, or `None` outside the outer radius.
    pub fn elevation(&self, x: f64, y: f64) -> Option<f64> {
        let pos = self.flank_position(x, y);
        if pos >= 1.0 {
            Some(self.height)
        } else if pos >= 0.0 {
            Some(pos * (self.height - self.base) + self.base)
        } else {
            None
        }
    }
}

/// Elevation `z` on the nodes of a surface grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topography {
    pub nx: usize,
    pub ny: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Topography {
    /// Stamps another cone into the current elevation, which serves as its
    /// background.
    pub fn add_cone(&mut self, cone: &VolcanoCone) -> Result<()> {
        cone.validate()?;
        stamp(cone, &self.x, &self.y, &mut self.z);
        Ok(())
    }
}

fn stamp(cone: &VolcanoCone, x: &[f64], y: &[f64], z: &mut [f64]) {
    for ((zi, &xi), &yi) in z.iter_mut().zip(x).zip(y) {
        if let Some(h) = cone.elevation(xi, yi) {
            *zi = h;
        }
    }
}

/// Builds the topography of a single cone.
///
/// Nodes within the outer radius take the cone elevation. The others keep
/// the background, or the cone's base when there is none.
#[instrument(skip(surface, background), fields(nx = surface.nx, ny = surface.ny))]
pub fn make_volcano_topography(
    surface: &SurfaceGrid,
    cone: &VolcanoCone,
    background: Option<&[f64]>,
) -> Result<Topography> {
    let n = surface.nx * surface.ny;
    if surface.x.len() != n || surface.y.len() != n {
        return Err(SetupError::config(format!(
            "surface grid of {}x{} nodes holds {} x and {} y coordinates",
            surface.nx,
            surface.ny,
            surface.x.len(),
            surface.y.len()
        )));
    }
    cone.validate()?;

    let mut z = match background {
        Some(bg) if bg.len() != n => {
            return Err(SetupError::config(format!(
                "background has {} values, surface grid has {n} nodes",
                bg.len()
            )));
        }
        Some(bg) => bg.to_vec(),
        None => vec![cone.base; n],
    };
    stamp(cone, &surface.x, &surface.y, &mut z);
    debug!(max_elevation = cone.height, "built volcano topography");

    Ok(Topography {
        nx: surface.nx,
        ny: surface.ny,
        x: surface.x.clone(),
        y: surface.y.clone(),
        z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn surface() -> SurfaceGrid {
        SurfaceGrid::uniform((-20.0, 20.0), (-20.0, 20.0), 41, 41).unwrap()
    }

    fn at(topo: &Topography, x: usize, y: usize) -> f64 {
        topo.z[x + topo.nx * y]
    }

    #[test]
    fn test_cone_profile() {
        let cone = VolcanoCone::new([0.0, 0.0], 5.0, 10.0).with_crater(2.0).with_base(-1.0);
        let topo = make_volcano_topography(&surface(), &cone, None).unwrap();

        // center and rim sit at full height
        assert_abs_diff_eq!(at(&topo, 20, 20), 5.0);
        assert_abs_diff_eq!(at(&topo, 22, 20), 5.0);
        // halfway down the flank
        assert_abs_diff_eq!(at(&topo, 26, 20), 2.0, epsilon = 1e-12);
        // outer radius and beyond are at the base
        assert_abs_diff_eq!(at(&topo, 30, 20), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(at(&topo, 40, 40), -1.0);
    }

    #[test]
    fn test_cone_overwrites_background() {
        let surface = surface();
        let background = vec![3.0; surface.len()];
        let cone = VolcanoCone::new([0.0, 0.0], 5.0, 10.0);
        let topo = make_volcano_topography(&surface, &cone, Some(background.as_slice())).unwrap();

        assert_abs_diff_eq!(at(&topo, 20, 20), 5.0);
        // the outer flank sits below the background and still replaces it
        assert_abs_diff_eq!(at(&topo, 28, 20), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(at(&topo, 30, 20), 0.0, epsilon = 1e-12);
        // outside the cone the background is kept
        assert_abs_diff_eq!(at(&topo, 31, 20), 3.0);
        assert_abs_diff_eq!(at(&topo, 0, 0), 3.0);
    }

    #[test]
    fn test_stacked_cones() {
        let wide = VolcanoCone::new([0.0, 0.0], 2.0, 15.0);
        let narrow = VolcanoCone::new([0.0, 0.0], 4.0, 5.0);
        let mut topo = make_volcano_topography(&surface(), &wide, None).unwrap();
        topo.add_cone(&narrow).unwrap();

        assert_abs_diff_eq!(at(&topo, 20, 20), 4.0);
        // outside the narrow cone the wide one shows through
        assert_abs_diff_eq!(at(&topo, 26, 20), 2.0 * (1.0 - 6.0 / 15.0), epsilon = 1e-12);

        // a later, lower cone replaces what it covers
        let low = VolcanoCone::new([0.0, 0.0], 1.0, 3.0);
        topo.add_cone(&low).unwrap();
        assert_abs_diff_eq!(at(&topo, 20, 20), 1.0);
        assert_abs_diff_eq!(at(&topo, 24, 20), 4.0 * (1.0 - 4.0 / 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let surface = surface();
        let cone = VolcanoCone::new([0.0, 0.0], 5.0, 2.0).with_crater(2.0);
        assert!(matches!(
            make_volcano_topography(&surface, &cone, None),
            Err(SetupError::NumericDegeneracy(_))
        ));

        let cone = VolcanoCone::new([0.0, 0.0], 5.0, 10.0);
        assert!(matches!(
            make_volcano_topography(&surface, &cone, Some(&[0.0; 4][..])),
            Err(SetupError::Configuration(_))
        ));
    }
}
