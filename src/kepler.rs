//! # Two-body Kepler solver
//!
//! Turns J2000 [`OrbitalElements`] and a date into a 3D position in the ecliptic frame of the
//! primary (heliocentric for planets, parent-relative for satellites).
//!
//! ## Algorithm
//!
//! 1. Mean motion `n = K·m / a^1.5` with `K ≈ 0.9856 °/day` and `m` the mass multiplier.
//! 2. Mean anomaly at date `M(t) = M₀ + n·Δt`, normalized to `[0, 360)`.
//! 3. Kepler's equation `M = E − e·sin E` solved by Newton–Raphson from `E₀ = M`.
//! 4. Perifocal coordinates `(x_v, y_v)`, converted to true anomaly `v` and radius `r`.
//! 5. Rotation through ω, i and Ω into ecliptic Cartesian coordinates.
//!
//! Non-convergence within the iteration cap is not an error: the last estimate is accepted
//! and flagged through [`KeplerSolution::converged`].

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::{
    constants::{Degree, Radian, DPI, MJD, RADEG},
    orbital_elements::OrbitalElements,
    time::days_since_j2000,
};

/// Return the principal value of an angle in radians, in `[0, 2π)`.
#[inline]
pub fn principal_angle(a: Radian) -> Radian {
    a.rem_euclid(DPI)
}

/// Return the principal value of an angle in degrees, in `[0, 360)`.
#[inline]
pub fn normalize_degrees(a: Degree) -> Degree {
    let r = a.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Return the principal difference between two angles in radians, in `[-π, π]`.
pub fn angle_diff(a: Radian, b: Radian) -> Radian {
    let mut diff = principal_angle(a) - principal_angle(b);

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}

/// Iteration controls for [`solve_kepler_equation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolverParams {
    /// Maximum Newton–Raphson iterations before the estimate is accepted as is.
    pub max_iter: usize,
    /// Convergence threshold on `|ΔE|` (radians).
    pub tolerance: f64,
}

impl Default for KeplerSolverParams {
    fn default() -> Self {
        KeplerSolverParams {
            max_iter: 100,
            tolerance: 1e-6,
        }
    }
}

/// Outcome of a Kepler equation solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (radians).
    pub eccentric_anomaly: Radian,
    /// Number of Newton steps taken.
    pub iterations: usize,
    /// Whether `|ΔE|` dropped below the tolerance within the cap.
    pub converged: bool,
}

/// Solve Kepler's equation `M = E − e·sin(E)` for the eccentric anomaly.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly in radians.
/// * `eccentricity`: `0 ≤ e < 1`.
/// * `params`: iteration cap and tolerance.
///
/// Return
/// ------
/// * A [`KeplerSolution`]; when the cap is reached the last iterate is returned with
///   `converged = false`.
pub fn solve_kepler_equation(
    mean_anomaly: Radian,
    eccentricity: f64,
    params: &KeplerSolverParams,
) -> KeplerSolution {
    let mut ecc_anomaly = mean_anomaly;

    for it in 1..=params.max_iter {
        let delta = (ecc_anomaly - eccentricity * ecc_anomaly.sin() - mean_anomaly)
            / (1.0 - eccentricity * ecc_anomaly.cos());
        ecc_anomaly -= delta;

        if delta.abs() < params.tolerance {
            return KeplerSolution {
                eccentric_anomaly: ecc_anomaly,
                iterations: it,
                converged: true,
            };
        }
    }

    tracing::trace!(
        mean_anomaly,
        eccentricity,
        max_iter = params.max_iter,
        "Kepler solver hit its iteration cap, keeping last estimate"
    );

    KeplerSolution {
        eccentric_anomaly: ecc_anomaly,
        iterations: params.max_iter,
        converged: false,
    }
}

/// Mean anomaly at `mjd`, in degrees within `[0, 360)`.
pub fn mean_anomaly_at(elements: &OrbitalElements, mjd: MJD, mass_multiplier: f64) -> Degree {
    let n = elements.mean_motion(mass_multiplier);
    normalize_degrees(elements.mean_anomaly + n * days_since_j2000(mjd))
}

/// Rotate an in-plane position `(r, v)` through ω, i and Ω into ecliptic coordinates.
///
/// `true_anomaly` is in radians; the element angles are read in degrees.
pub fn orbital_plane_to_ecliptic(
    elements: &OrbitalElements,
    radius: f64,
    true_anomaly: Radian,
) -> Vector3<f64> {
    let node = elements.ascending_node_longitude * RADEG;
    let incl = elements.inclination * RADEG;
    let arg_lat = true_anomaly + elements.periapsis_argument * RADEG;

    let (sin_n, cos_n) = node.sin_cos();
    let (sin_u, cos_u) = arg_lat.sin_cos();
    let (sin_i, cos_i) = incl.sin_cos();

    Vector3::new(
        radius * (cos_n * cos_u - sin_n * sin_u * cos_i),
        radius * (sin_n * cos_u + cos_n * sin_u * cos_i),
        radius * sin_u * sin_i,
    )
}

/// Position of a body at `mjd`, in AU, relative to its primary.
///
/// Arguments
/// ---------
/// * `elements`: J2000 orbital elements.
/// * `mjd`: target date (MJD).
/// * `mass_multiplier`: scales the mean motion for primaries other than the Sun (`1.0` otherwise).
/// * `params`: Newton–Raphson controls.
///
/// Return
/// ------
/// * The ecliptic Cartesian position; the central star (`a = 0`) is always the origin.
pub fn position_from_elements(
    elements: &OrbitalElements,
    mjd: MJD,
    mass_multiplier: f64,
    params: &KeplerSolverParams,
) -> Vector3<f64> {
    if elements.is_central() {
        return Vector3::zeros();
    }

    let a = elements.semi_major_axis;
    let e = elements.eccentricity;
    let mean_anomaly = mean_anomaly_at(elements, mjd, mass_multiplier) * RADEG;

    let solution = solve_kepler_equation(mean_anomaly, e, params);
    let (sin_e, cos_e) = solution.eccentric_anomaly.sin_cos();

    let xv = a * (cos_e - e);
    let yv = a * (1.0 - e * e).sqrt() * sin_e;

    let true_anomaly = yv.atan2(xv);
    let radius = xv.hypot(yv);

    orbital_plane_to_ecliptic(elements, radius, true_anomaly)
}
