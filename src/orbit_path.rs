//! # Orbit path sampling
//!
//! Two ways to turn [`OrbitalElements`] into a polyline for static orbit rendering:
//!
//! * [`sample_orbit_geometric`] walks the ellipse uniformly in **eccentric anomaly**, so points
//!   are spread along the shape regardless of orbital speed. The perifocal basis `P`, `Q` is
//!   computed once from `(ω, i, Ω)`.
//! * [`sample_orbit_timed`] walks one orbital period uniformly in **time** through the
//!   Kepler solver, which bunches points near aphelion but matches the animated motion exactly.
//!
//! Both return `segments + 1` points, the last one closing the loop onto the first.

use nalgebra::Vector3;

use crate::{
    constants::{DPI, MJD, RADEG},
    kepler::{position_from_elements, KeplerSolverParams},
    orbital_elements::OrbitalElements,
};

/// Perifocal basis vectors `(P, Q)` in the ecliptic frame.
///
/// `P` points to periapsis, `Q` is 90° ahead in the direction of motion.
pub fn perifocal_basis(elements: &OrbitalElements) -> (Vector3<f64>, Vector3<f64>) {
    let (sin_w, cos_w) = (elements.periapsis_argument * RADEG).sin_cos();
    let (sin_n, cos_n) = (elements.ascending_node_longitude * RADEG).sin_cos();
    let (sin_i, cos_i) = (elements.inclination * RADEG).sin_cos();

    let p = Vector3::new(
        cos_w * cos_n - sin_w * sin_n * cos_i,
        cos_w * sin_n + sin_w * cos_n * cos_i,
        sin_w * sin_i,
    );
    let q = Vector3::new(
        -sin_w * cos_n - cos_w * sin_n * cos_i,
        -sin_w * sin_n + cos_w * cos_n * cos_i,
        cos_w * sin_i,
    );
    (p, q)
}

/// Sample the orbit ellipse uniformly in eccentric anomaly.
///
/// Arguments
/// ---------
/// * `elements`: orbital elements (the epoch and mean anomaly are ignored).
/// * `segments`: number of segments; `segments + 1` points are produced.
///
/// Return
/// ------
/// * Points in AU relative to the primary. Empty for the central star or `segments == 0`.
pub fn sample_orbit_geometric(elements: &OrbitalElements, segments: usize) -> Vec<Vector3<f64>> {
    if elements.is_central() || segments == 0 {
        return Vec::new();
    }

    let a = elements.semi_major_axis;
    let e = elements.eccentricity;
    let b = a * (1.0 - e * e).sqrt();
    let (p, q) = perifocal_basis(elements);

    (0..=segments)
        .map(|k| {
            let ecc_anomaly = DPI * k as f64 / segments as f64;
            let (sin_e, cos_e) = ecc_anomaly.sin_cos();
            p * (a * (cos_e - e)) + q * (b * sin_e)
        })
        .collect()
}

/// Sample one full orbital period (`365.25·a^1.5 / m` days) uniformly in time.
///
/// Arguments
/// ---------
/// * `elements`: orbital elements.
/// * `segments`: number of segments; `segments + 1` points are produced.
/// * `start`: first sample date (MJD).
/// * `mass_multiplier`: same multiplier used for the body's motion.
/// * `params`: Kepler solver controls.
pub fn sample_orbit_timed(
    elements: &OrbitalElements,
    segments: usize,
    start: MJD,
    mass_multiplier: f64,
    params: &KeplerSolverParams,
) -> Vec<Vector3<f64>> {
    if elements.is_central() || segments == 0 {
        return Vec::new();
    }

    let period = elements.nominal_period_days() / mass_multiplier;
    (0..=segments)
        .map(|k| {
            let t = start + period * k as f64 / segments as f64;
            position_from_elements(elements, t, mass_multiplier, params)
        })
        .collect()
}
