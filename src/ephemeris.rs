//! # Position providers
//!
//! Every consumer of body positions (event detection, the search scheduler, the clock) goes
//! through the [`PositionProvider`] trait, so the Kepler solver and any higher-fidelity
//! ephemeris are interchangeable.
//!
//! * [`KeplerEphemeris`] evaluates the catalog's two-body orbits.
//! * [`HighPrecisionSource`] is the seam for an external ephemeris (e.g. a JPL file reader).
//!   Its samples may be equatorial; they are rotated to the ecliptic with the fixed J2000
//!   obliquity.
//! * [`LayeredEphemeris`] asks the high-precision source first when
//!   [`PrecisionMode::HighPrecision`] is requested and transparently falls back to the
//!   Kepler solver for ids the source cannot resolve.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    bodies::BodyCatalog,
    constants::MJD,
    kepler::KeplerSolverParams,
    ref_system::{to_ecliptic_j2000, RefFrame},
};

/// Which position source a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrecisionMode {
    /// Two-body Kepler orbits from the catalog.
    #[default]
    Kepler,
    /// External high-precision ephemeris when available, Kepler otherwise.
    HighPrecision,
}

/// Heliocentric ecliptic J2000 positions (AU) of catalog bodies.
pub trait PositionProvider {
    /// Position of `body_id` at `mjd`, or `None` if the id is unknown.
    fn position(&self, body_id: &str, mjd: MJD, precision: PrecisionMode) -> Option<Vector3<f64>>;
}

impl<P: PositionProvider + ?Sized> PositionProvider for &P {
    fn position(&self, body_id: &str, mjd: MJD, precision: PrecisionMode) -> Option<Vector3<f64>> {
        (**self).position(body_id, mjd, precision)
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for Arc<P> {
    fn position(&self, body_id: &str, mjd: MJD, precision: PrecisionMode) -> Option<Vector3<f64>> {
        (**self).position(body_id, mjd, precision)
    }
}

/// Kepler-solver positions for the bodies of a [`BodyCatalog`].
#[derive(Debug, Clone)]
pub struct KeplerEphemeris {
    catalog: Arc<BodyCatalog>,
    params: KeplerSolverParams,
}

impl KeplerEphemeris {
    pub fn new(catalog: Arc<BodyCatalog>) -> Self {
        Self::with_params(catalog, KeplerSolverParams::default())
    }

    pub fn with_params(catalog: Arc<BodyCatalog>, params: KeplerSolverParams) -> Self {
        KeplerEphemeris { catalog, params }
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    pub fn params(&self) -> &KeplerSolverParams {
        &self.params
    }
}

impl PositionProvider for KeplerEphemeris {
    fn position(&self, body_id: &str, mjd: MJD, _precision: PrecisionMode) -> Option<Vector3<f64>> {
        let idx = self.catalog.index_of(body_id)?;
        Some(self.catalog.heliocentric_position(idx, mjd, &self.params))
    }
}

/// One position returned by a [`HighPrecisionSource`], tagged with its native frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisSample {
    /// Heliocentric position in AU.
    pub position: Vector3<f64>,
    pub frame: RefFrame,
}

/// External high-fidelity ephemeris.
pub trait HighPrecisionSource {
    /// Heliocentric position of `body_id` at `mjd`, or `None` if the source does not cover it.
    fn resolve(&self, body_id: &str, mjd: MJD) -> Option<EphemerisSample>;
}

/// High-precision source with Kepler fallback.
#[derive(Debug, Clone)]
pub struct LayeredEphemeris<S> {
    source: S,
    fallback: KeplerEphemeris,
}

impl<S: HighPrecisionSource> LayeredEphemeris<S> {
    pub fn new(source: S, fallback: KeplerEphemeris) -> Self {
        LayeredEphemeris { source, fallback }
    }

    pub fn fallback(&self) -> &KeplerEphemeris {
        &self.fallback
    }
}

impl<S: HighPrecisionSource> PositionProvider for LayeredEphemeris<S> {
    fn position(&self, body_id: &str, mjd: MJD, precision: PrecisionMode) -> Option<Vector3<f64>> {
        if precision == PrecisionMode::HighPrecision {
            if let Some(sample) = self.source.resolve(body_id, mjd) {
                return Some(to_ecliptic_j2000(&sample.position, sample.frame));
            }
        }
        self.fallback.position(body_id, mjd, precision)
    }
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use crate::{
        constants::{OBLIQUITY_J2000_DEG, T2000},
        ref_system::ecliptic_to_equatorial,
    };
    use approx::assert_relative_eq;

    /// Serves a fixed equatorial position for the Earth only.
    struct EarthOnly(Vector3<f64>);

    impl HighPrecisionSource for EarthOnly {
        fn resolve(&self, body_id: &str, _mjd: MJD) -> Option<EphemerisSample> {
            (body_id == "earth").then(|| EphemerisSample {
                position: self.0,
                frame: RefFrame::EquatorialJ2000,
            })
        }
    }

    fn kepler() -> KeplerEphemeris {
        KeplerEphemeris::new(Arc::new(BodyCatalog::solar_system()))
    }

    #[test]
    fn test_kepler_ephemeris() {
        let eph = kepler();
        assert_eq!(
            eph.position("sun", T2000, PrecisionMode::Kepler),
            Some(Vector3::zeros())
        );
        assert!(eph.position("vulcan", T2000, PrecisionMode::Kepler).is_none());
        let mars = eph.position("mars", T2000, PrecisionMode::Kepler).unwrap();
        assert!(mars.norm() > 1.38 && mars.norm() < 1.67);
    }

    #[test]
    fn test_layered_uses_source_then_falls_back() {
        let ecliptic = Vector3::new(-0.18, 0.97, 0.0);
        let equatorial = ecliptic_to_equatorial(OBLIQUITY_J2000_DEG) * ecliptic;
        let eph = LayeredEphemeris::new(EarthOnly(equatorial), kepler());

        let earth = eph
            .position("earth", T2000, PrecisionMode::HighPrecision)
            .unwrap();
        assert_relative_eq!(earth, ecliptic, epsilon = 1e-12);

        // Kepler mode never consults the source.
        let earth_kepler = eph.position("earth", T2000, PrecisionMode::Kepler).unwrap();
        assert_eq!(
            Some(earth_kepler),
            kepler().position("earth", T2000, PrecisionMode::Kepler)
        );

        // Unresolved ids fall back to the solver.
        let mars = eph.position("mars", T2000, PrecisionMode::HighPrecision);
        assert_eq!(mars, kepler().position("mars", T2000, PrecisionMode::Kepler));
    }
}
