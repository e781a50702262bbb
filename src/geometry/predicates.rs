//! Membership tests selecting grid nodes inside a solid.

use glam::DVec3;

use super::solids::{BoxSolid, CylinderSolid, EllipsoidSolid, LayerSolid, SphereSolid};
use crate::error::Result;
use crate::grid::Grid;
use crate::phase::PointSet;
use crate::transform::{rotate_point, to_local_frame};

/// Grid nodes inside a solid, in ascending index order, with the coordinates
/// thermal and phase policies see for them.
///
/// Boxes and ellipsoids report coordinates in their rotated local frame;
/// the other solids report world coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub indices: Vec<usize>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Selection {
    fn gather(indices: Vec<usize>, x: &[f64], y: &[f64], z: &[f64]) -> Self {
        Self {
            x: indices.iter().map(|&i| x[i]).collect(),
            y: indices.iter().map(|&i| y[i]).collect(),
            z: indices.iter().map(|&i| z[i]).collect(),
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn points(&self) -> PointSet<'_> {
        PointSet {
            x: &self.x,
            y: &self.y,
            z: &self.z,
        }
    }
}

fn within(v: f64, lim: (f64, f64)) -> bool {
    v >= lim.0 && v <= lim.1
}

fn shifted(lim: (f64, f64), by: f64) -> (f64, f64) {
    (lim.0 - by, lim.1 - by)
}

pub fn select_box(grid: &Grid, solid: &BoxSolid) -> Result<Selection> {
    solid.validate()?;
    let [ox, oy, oz] = solid.origin();
    let (xr, yr, zr) = to_local_frame(
        grid.x(),
        grid.y(),
        grid.z(),
        DVec3::new(ox, oy, oz),
        solid.strike,
        solid.dip,
    );
    let (xlim, ylim, zlim) = (shifted(solid.xlim, ox), shifted(solid.ylim, oy), shifted(solid.zlim, oz));

    let indices = (0..grid.len())
        .filter(|&i| within(xr[i], xlim) && within(yr[i], ylim) && within(zr[i], zlim))
        .collect();
    Ok(Selection::gather(indices, &xr, &yr, &zr))
}

pub fn select_layer(grid: &Grid, solid: &LayerSolid) -> Result<Selection> {
    solid.validate()?;
    let extent = grid.extent();
    let xlim = solid.xlim.unwrap_or(extent.x);
    let ylim = solid.ylim.unwrap_or(extent.y);
    let zlim = solid.zlim.unwrap_or(extent.z);
    let (x, y, z) = (grid.x(), grid.y(), grid.z());

    let indices = (0..grid.len())
        .filter(|&i| within(x[i], xlim) && within(y[i], ylim) && within(z[i], zlim))
        .collect();
    Ok(Selection::gather(indices, x, y, z))
}

/// Nodes strictly closer to the center than the radius.
pub fn select_sphere(grid: &Grid, solid: &SphereSolid) -> Result<Selection> {
    solid.validate()?;
    let center = DVec3::from_array(solid.center);
    let (x, y, z) = (grid.x(), grid.y(), grid.z());

    let indices = (0..grid.len())
        .filter(|&i| DVec3::new(x[i], y[i], z[i]).distance(center) < solid.radius)
        .collect();
    Ok(Selection::gather(indices, x, y, z))
}

/// Nodes where the normalized quadratic form about the rotated center is at
/// most one.
pub fn select_ellipsoid(grid: &Grid, solid: &EllipsoidSolid) -> Result<Selection> {
    solid.validate()?;
    let origin = DVec3::from_array(solid.origin());
    let center = rotate_point(DVec3::from_array(solid.center) - origin, solid.strike, solid.dip);
    let axes = DVec3::from_array(solid.axes);
    let (xr, yr, zr) = to_local_frame(grid.x(), grid.y(), grid.z(), origin, solid.strike, solid.dip);

    let indices = (0..grid.len())
        .filter(|&i| {
            let q = (DVec3::new(xr[i], yr[i], zr[i]) - center) / axes;
            q.length_squared() <= 1.0
        })
        .collect();
    Ok(Selection::gather(indices, &xr, &yr, &zr))
}

/// Nodes whose projection onto the axis falls between base and cap and
/// whose distance from the axis is at most the radius.
pub fn select_cylinder(grid: &Grid, solid: &CylinderSolid) -> Result<Selection> {
    solid.validate()?;
    let base = DVec3::from_array(solid.base);
    let axis = DVec3::from_array(solid.cap) - base;
    let axis_len2 = axis.length_squared();
    let (x, y, z) = (grid.x(), grid.y(), grid.z());

    let indices = (0..grid.len())
        .filter(|&i| {
            let rel = DVec3::new(x[i], y[i], z[i]) - base;
            let t = rel.dot(axis) / axis_len2;
            let dist = (rel - axis * t).length();
            (0.0..=1.0).contains(&t) && dist <= solid.radius
        })
        .collect();
    Ok(Selection::gather(indices, x, y, z))
}
