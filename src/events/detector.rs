//! # Event detector
//!
//! Pure, stateless predicates evaluated at a single date, plus the scalar metrics the optimizer
//! minimizes. All geometry is geocentric: vectors go from the Earth to the Sun and to each
//! target.
//!
//! * **Transit** of a body: angle(Earth→Sun, Earth→body) ≤ threshold *and* the body is nearer
//!   to the Earth than the Sun. The threshold is the solar angular radius in strict mode and the
//!   user tolerance otherwise. Several targets transit together when each of them does.
//! * **Alignment**: geocentric ecliptic longitudes are sorted, the largest gap between
//!   neighbours (wraparound included) is found, and the bodies are aligned when
//!   `360° − max_gap ≤ tolerance`.
//!
//! Every function is independent of the order of its target ids. A body the provider cannot
//! resolve makes the predicate false and the metric infinite.

use itertools::Itertools;
use nalgebra::Vector3;

use crate::{
    constants::{Degree, MJD, RADEG, ZERO_LENGTH_EPS},
    ephemeris::{PositionProvider, PrecisionMode},
    events::{search::SearchConfig, EventKind, OBSERVER_ID, STAR_ID},
    kepler::normalize_degrees,
};

/// Angle between two vectors in degrees, `180°` if either is (nearly) zero-length.
pub fn angular_separation(a: &Vector3<f64>, b: &Vector3<f64>) -> Degree {
    let (na, nb) = (a.norm(), b.norm());
    if na < ZERO_LENGTH_EPS || nb < ZERO_LENGTH_EPS {
        return 180.0;
    }
    (a.dot(b) / (na * nb)).clamp(-1.0, 1.0).acos() / RADEG
}

/// Vector from the Earth to `body_id` at `mjd`.
pub fn geocentric<P: PositionProvider + ?Sized>(
    provider: &P,
    body_id: &str,
    mjd: MJD,
    precision: PrecisionMode,
) -> Option<Vector3<f64>> {
    let earth = provider.position(OBSERVER_ID, mjd, precision)?;
    let body = provider.position(body_id, mjd, precision)?;
    Some(body - earth)
}

/// Geocentric ecliptic longitude of `body_id`, in `[0, 360)`.
pub fn geocentric_longitude<P: PositionProvider + ?Sized>(
    provider: &P,
    body_id: &str,
    mjd: MJD,
    precision: PrecisionMode,
) -> Option<Degree> {
    let rel = geocentric(provider, body_id, mjd, precision)?;
    Some(normalize_degrees(rel.y.atan2(rel.x) / RADEG))
}

/// Angle between the Sun and `body_id` seen from the Earth, and whether the body is in front of
/// the Sun.
fn solar_elongation<P: PositionProvider + ?Sized>(
    provider: &P,
    body_id: &str,
    mjd: MJD,
    precision: PrecisionMode,
) -> Option<(Degree, bool)> {
    let to_sun = geocentric(provider, STAR_ID, mjd, precision)?;
    let to_body = geocentric(provider, body_id, mjd, precision)?;
    Some((
        angular_separation(&to_sun, &to_body),
        to_body.norm() < to_sun.norm(),
    ))
}

/// Whether `body_id` transits the Sun at `mjd`.
///
/// Arguments
/// ---------
/// * `provider`: position source.
/// * `body_id`: the candidate body.
/// * `mjd`: evaluation date.
/// * `config`: tolerance, solar angular radius, strictness and precision mode.
pub fn is_transit<P: PositionProvider + ?Sized>(
    provider: &P,
    body_id: &str,
    mjd: MJD,
    config: &SearchConfig,
) -> bool {
    solar_elongation(provider, body_id, mjd, config.precision)
        .is_some_and(|(angle, in_front)| in_front && angle <= config.transit_threshold())
}

/// `360° − largest gap` between the sorted geocentric longitudes of `target_ids`.
pub fn alignment_spread<P: PositionProvider + ?Sized>(
    provider: &P,
    mjd: MJD,
    target_ids: &[String],
    precision: PrecisionMode,
) -> Option<Degree> {
    if target_ids.is_empty() {
        return None;
    }
    let mut longitudes = target_ids
        .iter()
        .map(|id| geocentric_longitude(provider, id, mjd, precision))
        .collect::<Option<Vec<_>>>()?;
    longitudes.sort_by(f64::total_cmp);

    let wrap = longitudes[0] + 360.0 - longitudes[longitudes.len() - 1];
    let max_gap = longitudes
        .iter()
        .tuple_windows()
        .map(|(a, b)| b - a)
        .fold(wrap, f64::max);

    Some(360.0 - max_gap)
}

/// Whether the targets fit within `tolerance` degrees of geocentric longitude at `mjd`.
pub fn check_alignment<P: PositionProvider + ?Sized>(
    provider: &P,
    mjd: MJD,
    target_ids: &[String],
    tolerance: Degree,
    precision: PrecisionMode,
) -> bool {
    alignment_spread(provider, mjd, target_ids, precision).is_some_and(|s| s <= tolerance)
}

/// Largest pairwise angle among the Sun and the targets, seen from the Earth.
pub fn transit_spread<P: PositionProvider + ?Sized>(
    provider: &P,
    mjd: MJD,
    target_ids: &[String],
    precision: PrecisionMode,
) -> Option<Degree> {
    let directions = std::iter::once(STAR_ID)
        .chain(target_ids.iter().map(String::as_str))
        .map(|id| geocentric(provider, id, mjd, precision))
        .collect::<Option<Vec<_>>>()?;

    Some(
        directions
            .iter()
            .tuple_combinations()
            .map(|(a, b)| angular_separation(a, b))
            .fold(0.0, f64::max),
    )
}

/// Detection predicate for an event of `kind` over `target_ids`.
pub fn event_holds<P: PositionProvider + ?Sized>(
    provider: &P,
    kind: EventKind,
    mjd: MJD,
    target_ids: &[String],
    config: &SearchConfig,
) -> bool {
    match kind {
        EventKind::Transit => {
            !target_ids.is_empty()
                && target_ids
                    .iter()
                    .all(|id| is_transit(provider, id, mjd, config))
        }
        EventKind::Alignment => {
            check_alignment(provider, mjd, target_ids, config.tolerance, config.precision)
        }
    }
}

/// Metric minimized by the optimal-time search, `+∞` when a position is missing.
pub fn event_metric<P: PositionProvider + ?Sized>(
    provider: &P,
    kind: EventKind,
    mjd: MJD,
    target_ids: &[String],
    precision: PrecisionMode,
) -> f64 {
    let metric = match kind {
        EventKind::Transit => transit_spread(provider, mjd, target_ids, precision),
        EventKind::Alignment => alignment_spread(provider, mjd, target_ids, precision),
    };
    metric.unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod detector_test {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    /// Fixed heliocentric positions, independent of the date.
    struct Snapshot(HashMap<&'static str, Vector3<f64>>);

    impl PositionProvider for Snapshot {
        fn position(&self, id: &str, _mjd: MJD, _p: PrecisionMode) -> Option<Vector3<f64>> {
            self.0.get(id).copied()
        }
    }

    /// Earth at (1, 0, 0), bodies placed by geocentric longitude and distance.
    fn snapshot(bodies: &[(&'static str, Degree, f64)]) -> Snapshot {
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let mut map = HashMap::from([("sun", Vector3::zeros()), ("earth", earth)]);
        for &(id, lon, dist) in bodies {
            let (s, c) = (lon * RADEG).sin_cos();
            map.insert(id, earth + Vector3::new(c, s, 0.0) * dist);
        }
        Snapshot(map)
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn config(tolerance: Degree, strict: bool) -> SearchConfig {
        SearchConfig {
            tolerance,
            strict,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_angular_separation() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(angular_separation(&x, &y), 90.0, epsilon = 1e-12);
        assert_relative_eq!(angular_separation(&x, &(-x)), 180.0, epsilon = 1e-12);
        assert_eq!(angular_separation(&x, &x), 0.0);
        assert_eq!(angular_separation(&x, &Vector3::zeros()), 180.0);
    }

    #[test]
    fn test_transit_requires_body_in_front() {
        // The Sun is at geocentric longitude 180°, 1 AU away.
        let provider = snapshot(&[("near", 180.5, 0.3), ("far", 180.5, 1.5)]);
        let cfg = config(1.0, false);
        assert!(is_transit(&provider, "near", 0.0, &cfg));
        assert!(!is_transit(&provider, "far", 0.0, &cfg));
        assert!(!is_transit(&provider, "unknown", 0.0, &cfg));

        // Strict mode uses the solar radius instead of the tolerance.
        assert!(!is_transit(&provider, "near", 0.0, &config(1.0, true)));
    }

    #[test]
    fn test_transit_monotone_in_tolerance() {
        let provider = snapshot(&[("p", 182.0, 0.4)]);
        let mut previous = false;
        for k in 0..40 {
            let now = is_transit(&provider, "p", 0.0, &config(0.1 * k as f64, false));
            assert!(!previous || now);
            previous = now;
        }
        assert!(previous);
    }

    #[test]
    fn test_alignment_spread_wraps() {
        let provider = snapshot(&[("a", 355.0, 1.0), ("b", 3.0, 2.0), ("c", 10.0, 3.0)]);
        let targets = ids(&["a", "b", "c"]);
        let spread = alignment_spread(&provider, 0.0, &targets, PrecisionMode::Kepler).unwrap();
        assert_relative_eq!(spread, 15.0, epsilon = 1e-9);
        assert!(check_alignment(&provider, 0.0, &targets, 15.01, PrecisionMode::Kepler));
        assert!(!check_alignment(&provider, 0.0, &targets, 14.99, PrecisionMode::Kepler));
    }

    #[test]
    fn test_alignment_permutation_invariant() {
        let provider = snapshot(&[("a", 40.0, 1.0), ("b", 100.0, 2.0), ("c", 240.0, 3.0)]);
        let base = alignment_spread(&provider, 0.0, &ids(&["a", "b", "c"]), PrecisionMode::Kepler);
        for perm in [["a", "c", "b"], ["b", "a", "c"], ["c", "b", "a"]] {
            assert_eq!(
                alignment_spread(&provider, 0.0, &ids(&perm), PrecisionMode::Kepler),
                base
            );
        }
        // largest gap is the wraparound 240 → 400
        assert_relative_eq!(base.unwrap(), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transit_spread_and_metric() {
        let provider = snapshot(&[("p", 181.0, 0.5), ("q", 178.0, 0.4)]);
        let pair = ids(&["p", "q"]);
        let spread = transit_spread(&provider, 0.0, &pair, PrecisionMode::Kepler).unwrap();
        assert_relative_eq!(spread, 3.0, epsilon = 1e-9);

        let missing = ids(&["x"]);
        assert!(
            event_metric(&provider, EventKind::Transit, 0.0, &missing, PrecisionMode::Kepler)
                .is_infinite()
        );
        assert_relative_eq!(
            event_metric(&provider, EventKind::Alignment, 0.0, &pair, PrecisionMode::Kepler),
            3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_event_holds_multi_target() {
        let provider = snapshot(&[("p", 180.5, 0.5), ("q", 179.2, 0.4), ("r", 175.0, 0.4)]);
        let cfg = config(1.0, false);
        assert!(event_holds(&provider, EventKind::Transit, 0.0, &ids(&["p", "q"]), &cfg));
        assert!(!event_holds(&provider, EventKind::Transit, 0.0, &ids(&["p", "r"]), &cfg));
        assert!(!event_holds(&provider, EventKind::Transit, 0.0, &[], &cfg));
    }
}
