use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Degree, Radian, OBLIQUITY_J2000_DEG, RADEG};

/// Reference frame of a Cartesian position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefFrame {
    /// Ecliptic and mean equinox of J2000 (the engine's working frame).
    EclipticJ2000,
    /// Equator and mean equinox of J2000.
    EquatorialJ2000,
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes (X, Y, or Z).
///
/// This function builds a [`nalgebra::Matrix3`] representing an **active rotation**
/// of a 3D vector by an angle `alpha` around the chosen axis, counter-clockwise when
/// looking down the axis toward the origin.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**.
/// * `k` - Index of the axis of rotation: `0` → X, `1` → Y, `2` → Z.
///
/// # Panics
///
/// * If `k` is not 0, 1 or 2.
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotation taking equatorial coordinates to ecliptic ones for a given obliquity (degrees).
///
/// The ecliptic is the equator tilted by `+ε` about the shared X axis (vernal equinox),
/// so vectors rotate by `−ε`.
pub fn equatorial_to_ecliptic(obliquity: Degree) -> Matrix3<f64> {
    rotmt(-obliquity * RADEG, 0)
}

/// Inverse of [`equatorial_to_ecliptic`].
pub fn ecliptic_to_equatorial(obliquity: Degree) -> Matrix3<f64> {
    rotmt(obliquity * RADEG, 0)
}

/// Express `position` (given in `frame`) in the J2000 ecliptic frame, using the fixed
/// J2000 obliquity.
pub fn to_ecliptic_j2000(position: &Vector3<f64>, frame: RefFrame) -> Vector3<f64> {
    match frame {
        RefFrame::EclipticJ2000 => *position,
        RefFrame::EquatorialJ2000 => equatorial_to_ecliptic(OBLIQUITY_J2000_DEG) * position,
    }
}
