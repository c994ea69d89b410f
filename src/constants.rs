//! # Constants and type definitions for Orrery
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the `orrery` engine.
//!
//! ## Overview
//!
//! - Angular conversions (degrees ↔ radians)
//! - The J2000 reference epoch, in Modified Julian Date
//! - The mean-motion constant used by the Kepler solver
//! - The fixed J2000 obliquity used for equatorial → ecliptic rotations
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Days in a Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Mean motion of a body on a 1 AU orbit around a Sun-mass primary, in degrees per day.
///
/// Equal to `360 / 365.256…`. Bodies orbiting another primary scale it with a mass multiplier.
pub const MEAN_MOTION_DEG_PER_DAY: f64 = 0.9856076686;

/// Mean obliquity of the ecliptic at J2000, in degrees.
pub const OBLIQUITY_J2000_DEG: f64 = 23.4392911;

/// Threshold below which a vector is treated as having zero length.
pub const ZERO_LENGTH_EPS: f64 = 1e-12;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Interval in days
pub type Days = f64;
