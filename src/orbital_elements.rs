//! # Orbital elements
//!
//! This module defines [`OrbitalElements`], the classical Keplerian element set
//! `(a, e, i, Ω, ω, M)` referred to the J2000 epoch, as read from the body catalog.
//!
//! ## Units
//!
//! - Lengths: **AU**
//! - Angles: **degrees** (catalog convention)
//! - Time: **days**, epoch fixed at J2000 (MJD 51544.5)
//!
//! A semi-major axis of `0.0` marks the central star, which sits at the origin and never
//! goes through the Kepler solver.
//!
//! ## See also
//!
//! - [`crate::kepler::position_from_elements`] – evaluates a position at a date.
//! - [`crate::orbit_path`] – samples the orbit shape for static rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    constants::{AstronomicalUnit, Days, Degree, DAYS_PER_YEAR, MEAN_MOTION_DEG_PER_DAY},
    orrery_errors::OrreryError,
};

/// Keplerian orbital elements at epoch J2000 (two-body, heliocentric or parent-relative).
///
/// Units
/// -----
/// * `semi_major_axis`: AU (`0.0` for the central star).
/// * `eccentricity`: unitless, `0 ≤ e < 1`.
/// * `inclination`: degrees.
/// * `ascending_node_longitude`: degrees (Ω, `N` in catalog files).
/// * `periapsis_argument`: degrees (ω, `w` in catalog files).
/// * `mean_anomaly`: degrees at J2000 (`M`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub ascending_node_longitude: Degree,
    pub periapsis_argument: Degree,
    pub mean_anomaly: Degree,
}

impl OrbitalElements {
    /// Build an element set from the catalog ordering `(a, e, i, N, w, M)`.
    pub fn new(a: f64, e: f64, i: Degree, node: Degree, w: Degree, m: Degree) -> Self {
        OrbitalElements {
            semi_major_axis: a,
            eccentricity: e,
            inclination: i,
            ascending_node_longitude: node,
            periapsis_argument: w,
            mean_anomaly: m,
        }
    }

    /// Elements of the central star: every field zero.
    pub fn central() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// `true` for the central star (`a = 0`), which is pinned to the origin.
    #[inline]
    pub fn is_central(&self) -> bool {
        self.semi_major_axis == 0.0
    }

    /// Check the element set is finite, with `a ≥ 0` and `0 ≤ e < 1`.
    ///
    /// The numerical path never calls this; it is meant for catalog building.
    pub fn validate(&self) -> Result<(), OrreryError> {
        let fields = [
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
            self.mean_anomaly,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(OrreryError::InvalidOrbitalElements(format!(
                "non-finite element in {self:?}"
            )));
        }
        if self.semi_major_axis < 0.0 {
            return Err(OrreryError::InvalidOrbitalElements(format!(
                "semi-major axis must be >= 0, got {}",
                self.semi_major_axis
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrreryError::InvalidOrbitalElements(format!(
                "eccentricity must be in [0, 1), got {}",
                self.eccentricity
            )));
        }
        Ok(())
    }

    /// Mean motion in degrees per day, `n = K·m / a^1.5`.
    ///
    /// `mass_multiplier` is `1.0` for bodies orbiting the Sun.
    #[inline]
    pub fn mean_motion(&self, mass_multiplier: f64) -> f64 {
        MEAN_MOTION_DEG_PER_DAY * mass_multiplier / self.semi_major_axis.powf(1.5)
    }

    /// Orbital period in days implied by [`Self::mean_motion`].
    pub fn period_days(&self, mass_multiplier: f64) -> Days {
        360.0 / self.mean_motion(mass_multiplier)
    }

    /// Period used for display sampling, `365.25·a^1.5` days.
    pub fn nominal_period_days(&self) -> Days {
        DAYS_PER_YEAR * self.semi_major_axis.powf(1.5)
    }
}

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orbital Elements @ J2000")?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.6} AU",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6}°",
            self.inclination
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6}°",
            self.ascending_node_longitude
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.6}°",
            self.periapsis_argument
        )?;
        writeln!(
            f,
            "  M   (mean anomaly)          = {:.6}°",
            self.mean_anomaly
        )
    }
}
