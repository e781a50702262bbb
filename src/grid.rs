//! Structured grids as flat coordinate arrays.
//!
//! Node `(i, j, k)` of an `[nx, ny, nz]` grid is stored at flat index
//! `i + nx * (j + ny * k)`; x varies fastest. Phase and temperature fields
//! are plain slices using the same ordering.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};
use crate::math_utils::min_max;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    shape: [usize; 3],
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

/// Axis-aligned bounds of a grid, one `(min, max)` pair per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

impl Grid {
    /// Tensor-product grid of three 1D axes.
    pub fn from_axes(xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Self> {
        if xs.is_empty() || ys.is_empty() || zs.is_empty() {
            return Err(SetupError::config("grid axes must each hold at least one node"));
        }
        let shape = [xs.len(), ys.len(), zs.len()];
        let count = shape.iter().product();
        let mut x = Vec::with_capacity(count);
        let mut y = Vec::with_capacity(count);
        let mut z = Vec::with_capacity(count);
        for &zk in zs {
            for &yj in ys {
                for &xi in xs {
                    x.push(xi);
                    y.push(yj);
                    z.push(zk);
                }
            }
        }
        Ok(Self { shape, x, y, z })
    }

    /// Evenly spaced grid spanning the given limits, inclusive of both ends.
    pub fn uniform(xlim: (f64, f64), ylim: (f64, f64), zlim: (f64, f64), shape: [usize; 3]) -> Result<Self> {
        let xs = linspace(xlim, shape[0], "x")?;
        let ys = linspace(ylim, shape[1], "y")?;
        let zs = linspace(zlim, shape[2], "z")?;
        Self::from_axes(&xs, &ys, &zs)
    }

    /// Wraps coordinate arrays that were produced elsewhere, e.g. by a grid
    /// reader for an external code.
    pub fn from_coordinates(shape: [usize; 3], x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        let count: usize = shape.iter().product();
        if count == 0 {
            return Err(SetupError::config("grid shape must not contain a zero dimension"));
        }
        if x.len() != count || y.len() != count || z.len() != count {
            return Err(SetupError::config(format!(
                "coordinate arrays ({}, {}, {}) do not match grid shape {:?}",
                x.len(),
                y.len(),
                z.len(),
                shape
            )));
        }
        Ok(Self { shape, x, y, z })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.shape[0] * (j + self.shape[1] * k)
    }

    pub fn point(&self, index: usize) -> [f64; 3] {
        [self.x[index], self.y[index], self.z[index]]
    }

    pub fn extent(&self) -> Extent {
        // a grid always holds at least one node
        let axis = |v: &[f64]| min_max(v).unwrap_or((0.0, 0.0));
        Extent {
            x: axis(&self.x),
            y: axis(&self.y),
            z: axis(&self.z),
        }
    }

    /// The bottom node layer (`k = 0`) as a 2D surface grid, the node set
    /// topography is built on.
    pub fn surface(&self) -> SurfaceGrid {
        let n = self.shape[0] * self.shape[1];
        SurfaceGrid {
            nx: self.shape[0],
            ny: self.shape[1],
            x: self.x[..n].to_vec(),
            y: self.y[..n].to_vec(),
        }
    }

    /// Checks that a phase and temperature field can be painted on this grid.
    pub fn check_fields(&self, phase_len: usize, temp_len: usize) -> Result<()> {
        if phase_len != self.len() || temp_len != self.len() {
            return Err(SetupError::config(format!(
                "field lengths (phase {}, temperature {}) do not match grid of {} nodes",
                phase_len,
                temp_len,
                self.len()
            )));
        }
        Ok(())
    }
}

/// A single layer of nodes in the horizontal plane, `x` varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub nx: usize,
    pub ny: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl SurfaceGrid {
    pub fn uniform(xlim: (f64, f64), ylim: (f64, f64), nx: usize, ny: usize) -> Result<Self> {
        let grid = Grid::uniform(xlim, ylim, (0.0, 0.0), [nx, ny, 1])?;
        Ok(grid.surface())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn linspace(lim: (f64, f64), n: usize, axis: &str) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(SetupError::config(format!("{axis} axis needs at least one node")));
    }
    if !(lim.0.is_finite() && lim.1.is_finite()) || lim.1 < lim.0 {
        return Err(SetupError::config(format!(
            "{axis} limits ({}, {}) must be finite and ordered",
            lim.0, lim.1
        )));
    }
    if n == 1 {
        return Ok(vec![lim.0]);
    }
    // scale before dividing so integer spacings come out exact
    let last = (n - 1) as f64;
    let span = lim.1 - lim.0;
    Ok((0..n).map(|i| lim.0 + span * i as f64 / last).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uniform_grid_layout() {
        let grid = Grid::uniform((0.0, 2.0), (0.0, 1.0), (-1.0, 0.0), [3, 2, 2]).unwrap();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.point(grid.index(2, 1, 1)), [2.0, 1.0, 0.0]);
        assert_eq!(grid.point(grid.index(1, 0, 0)), [1.0, 0.0, -1.0]);

        let extent = grid.extent();
        assert_eq!(extent.x, (0.0, 2.0));
        assert_eq!(extent.z, (-1.0, 0.0));
    }

    #[test]
    fn test_surface_is_bottom_layer() {
        let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), (-5.0, 5.0), [2, 3, 4]).unwrap();
        let surface = grid.surface();
        assert_eq!((surface.nx, surface.ny), (2, 3));
        assert_eq!(surface.len(), 6);
        assert_abs_diff_eq!(surface.y[5], 1.0);
    }

    #[test]
    fn test_invalid_grids_are_rejected() {
        assert!(Grid::uniform((1.0, 0.0), (0.0, 1.0), (0.0, 1.0), [2, 2, 2]).is_err());
        assert!(Grid::uniform((0.0, 1.0), (0.0, 1.0), (0.0, 1.0), [0, 2, 2]).is_err());
        assert!(Grid::from_coordinates([2, 1, 1], vec![0.0], vec![0.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_check_fields() {
        let grid = Grid::uniform((0.0, 1.0), (0.0, 1.0), (0.0, 1.0), [2, 2, 2]).unwrap();
        assert!(grid.check_fields(8, 8).is_ok());
        assert!(matches!(grid.check_fields(7, 8), Err(SetupError::Configuration(_))));
    }
}
