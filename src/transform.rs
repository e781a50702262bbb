//! Strike/dip rigid rotation used to orient boxes and ellipsoids.
//!
//! The rotation is active: strike first turns the solid about the vertical
//! axis, then the negated dip tilts it about the y axis.

use glam::{DMat3, DVec3};

/// Combined rotation `Ry(-dip) * Rz(strike)`, angles in degrees.
pub fn rotation_matrix(strike_deg: f64, dip_deg: f64) -> DMat3 {
    let strike = DMat3::from_rotation_z(strike_deg.to_radians());
    let dip = DMat3::from_rotation_y((-dip_deg).to_radians());
    dip * strike
}

pub fn rotate_point(point: DVec3, strike_deg: f64, dip_deg: f64) -> DVec3 {
    rotation_matrix(strike_deg, dip_deg) * point
}

/// Rotates every `(x[i], y[i], z[i])` about the origin in place.
pub fn rotate_points(x: &mut [f64], y: &mut [f64], z: &mut [f64], strike_deg: f64, dip_deg: f64) {
    let rot = rotation_matrix(strike_deg, dip_deg);
    for ((xi, yi), zi) in x.iter_mut().zip(y.iter_mut()).zip(z.iter_mut()) {
        let p = rot * DVec3::new(*xi, *yi, *zi);
        *xi = p.x;
        *yi = p.y;
        *zi = p.z;
    }
}

/// Shifts points so `origin` becomes (0, 0, 0), then rotates them.
///
/// Returns the local coordinates as three new arrays; the inputs are not
/// touched.
pub fn to_local_frame(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    origin: DVec3,
    strike_deg: f64,
    dip_deg: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut xr: Vec<f64> = x.iter().map(|v| v - origin.x).collect();
    let mut yr: Vec<f64> = y.iter().map(|v| v - origin.y).collect();
    let mut zr: Vec<f64> = z.iter().map(|v| v - origin.z).collect();
    rotate_points(&mut xr, &mut yr, &mut zr, strike_deg, dip_deg);
    (xr, yr, zr)
}
