//! # Body catalog
//!
//! Read-only registry of the bodies the engine animates and searches over.
//!
//! The satellite/ring tree (a planet holding moons, a moon optionally tagged as a ring) is kept
//! in a **flat arena**: every [`CelestialBody`] lives in one `Vec`, addressed by a stable
//! [`BodyIndex`], with parent/children links stored as indices. Traversals use an explicit work
//! list instead of recursion.
//!
//! Loading the textual catalog is the job of an external collaborator; it feeds
//! [`BodySpec`] records into a [`BodyCatalogBuilder`]. A built-in J2000 solar system is
//! available through [`BodyCatalog::solar_system`].
//!
//! ## Positions
//!
//! * A body's own orbit is evaluated relative to its parent with the Kepler solver.
//! * Its mass multiplier is `√(parent mass ratio)` when the parent declares a mass ratio,
//!   `1.0` otherwise (Kepler's third law: `n ∝ √M`).
//! * A [`BodyKind::Ring`] has no orbit of its own and shares its parent's position.
//! * The heliocentric position is the sum along the parent chain.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    constants::MJD,
    kepler::{position_from_elements, KeplerSolverParams},
    orbital_elements::OrbitalElements,
    orrery_errors::OrreryError,
};

/// Stable index of a body inside a [`BodyCatalog`].
///
/// Indices are only issued by a catalog and stay valid for that catalog. Accessors taking a
/// `BodyIndex` panic when handed an index issued by a larger catalog; [`BodyCatalog::try_body`]
/// is the checked lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyIndex(usize);

impl BodyIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Display/physical category of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyCategory {
    Star,
    Planet,
    Dwarf,
    Comet,
    Satellite,
    Ring,
}

/// Node variant in the satellite tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// A body with its own orbit.
    Body,
    /// A ring attached to its parent; it has no orbit of its own.
    Ring,
}

/// A body as stored in the catalog arena.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub id: String,
    pub kind: BodyKind,
    pub category: BodyCategory,
    pub elements: OrbitalElements,
    /// Mass relative to the Sun, used as the primary mass for this body's satellites.
    pub mass_ratio: Option<f64>,
    pub parent: Option<BodyIndex>,
    pub children: Vec<BodyIndex>,
}

/// Input record for [`BodyCatalogBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub id: String,
    pub category: BodyCategory,
    pub elements: OrbitalElements,
    pub mass_ratio: Option<f64>,
    /// Id of the parent body, which must be added before this one.
    pub parent: Option<String>,
}

impl BodySpec {
    pub fn new(id: &str, category: BodyCategory, elements: OrbitalElements) -> Self {
        BodySpec {
            id: id.to_string(),
            category,
            elements,
            mass_ratio: None,
            parent: None,
        }
    }

    pub fn with_mass_ratio(mut self, ratio: f64) -> Self {
        self.mass_ratio = Some(ratio);
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }
}

/// Flat-arena catalog of bodies.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalog {
    bodies: Vec<CelestialBody>,
    index: HashMap<String, BodyIndex>,
}

/// Builder for [`BodyCatalog`], with validation.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalogBuilder {
    specs: Vec<BodySpec>,
}

impl BodyCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, spec: BodySpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn bodies<I: IntoIterator<Item = BodySpec>>(mut self, specs: I) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Finalize the catalog.
    ///
    /// Validation rules
    /// -----------------
    /// * ids are unique;
    /// * orbital elements pass [`OrbitalElements::validate`], except for rings (no orbit);
    /// * a parent, when named, was added earlier;
    /// * a ring always has a parent;
    /// * a mass ratio, when given, is finite and strictly positive.
    pub fn build(self) -> Result<BodyCatalog, OrreryError> {
        let mut catalog = BodyCatalog::default();

        for spec in self.specs {
            if catalog.index.contains_key(&spec.id) {
                return Err(OrreryError::DuplicateBody(spec.id));
            }

            let kind = if spec.category == BodyCategory::Ring {
                BodyKind::Ring
            } else {
                BodyKind::Body
            };

            if kind == BodyKind::Body {
                spec.elements.validate().map_err(|err| {
                    OrreryError::InvalidOrbitalElements(format!("{}: {err}", spec.id))
                })?;
            }

            if let Some(ratio) = spec.mass_ratio {
                if !(ratio.is_finite() && ratio > 0.0) {
                    return Err(OrreryError::InvalidOrbitalElements(format!(
                        "{}: mass ratio must be > 0, got {ratio}",
                        spec.id
                    )));
                }
            }

            let parent = match &spec.parent {
                Some(parent_id) => Some(catalog.index_of(parent_id).ok_or_else(|| {
                    OrreryError::InvalidParent(format!(
                        "{} references unknown parent {parent_id}",
                        spec.id
                    ))
                })?),
                None if kind == BodyKind::Ring => {
                    return Err(OrreryError::InvalidParent(format!(
                        "ring {} must have a parent",
                        spec.id
                    )))
                }
                None => None,
            };

            let idx = BodyIndex(catalog.bodies.len());
            if let Some(p) = parent {
                catalog.bodies[p.0].children.push(idx);
            }
            catalog.index.insert(spec.id.clone(), idx);
            catalog.bodies.push(CelestialBody {
                id: spec.id,
                kind,
                category: spec.category,
                elements: spec.elements,
                mass_ratio: spec.mass_ratio,
                parent,
                children: Vec::new(),
            });
        }

        Ok(catalog)
    }
}

impl BodyCatalog {
    pub fn builder() -> BodyCatalogBuilder {
        BodyCatalogBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<BodyIndex> {
        self.index.get(id).copied()
    }

    /// Body at `idx`.
    ///
    /// # Panics
    ///
    /// * If `idx` was issued by another catalog holding more bodies.
    pub fn body(&self, idx: BodyIndex) -> &CelestialBody {
        &self.bodies[idx.0]
    }

    /// Body at `idx`, `None` when the index does not belong to this catalog.
    pub fn try_body(&self, idx: BodyIndex) -> Option<&CelestialBody> {
        self.bodies.get(idx.0)
    }

    pub fn get(&self, id: &str) -> Option<&CelestialBody> {
        self.index_of(id).map(|idx| self.body(idx))
    }

    /// Look up a body, failing with [`OrreryError::UnknownBody`].
    pub fn require(&self, id: &str) -> Result<&CelestialBody, OrreryError> {
        self.get(id)
            .ok_or_else(|| OrreryError::UnknownBody(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.iter()
    }

    /// Bodies without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = BodyIndex> + '_ {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| BodyIndex(i))
    }

    /// Pre-order walk of the whole tree (parents before children, siblings in insertion order).
    pub fn depth_first(&self) -> Vec<BodyIndex> {
        let mut stack: Vec<BodyIndex> = self.roots().collect();
        stack.reverse();
        self.walk(stack)
    }

    /// Pre-order walk of the subtree below `idx`, `idx` excluded.
    pub fn descendants(&self, idx: BodyIndex) -> Vec<BodyIndex> {
        let stack = self.body(idx).children.iter().rev().copied().collect();
        self.walk(stack)
    }

    fn walk(&self, mut stack: Vec<BodyIndex>) -> Vec<BodyIndex> {
        let mut order = Vec::with_capacity(self.bodies.len());
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.body(idx).children.iter().rev().copied());
        }
        order
    }

    /// Top-level ancestor of a body (the body itself if it orbits the Sun directly).
    pub fn top_level(&self, idx: BodyIndex) -> BodyIndex {
        let mut current = idx;
        while let Some(parent) = self.body(current).parent {
            current = parent;
        }
        current
    }

    /// Mean-motion multiplier for a body: `√(parent mass ratio)`, or `1.0` around the Sun.
    pub fn mass_multiplier(&self, idx: BodyIndex) -> f64 {
        self.body(idx)
            .parent
            .and_then(|p| self.body(p).mass_ratio)
            .map_or(1.0, f64::sqrt)
    }

    /// Position of a body relative to its parent (or to the Sun for top-level bodies).
    pub fn relative_position(
        &self,
        idx: BodyIndex,
        mjd: MJD,
        params: &KeplerSolverParams,
    ) -> Vector3<f64> {
        let body = self.body(idx);
        match body.kind {
            BodyKind::Ring => Vector3::zeros(),
            BodyKind::Body => {
                position_from_elements(&body.elements, mjd, self.mass_multiplier(idx), params)
            }
        }
    }

    /// Heliocentric ecliptic position of a body, summing the parent chain.
    pub fn heliocentric_position(
        &self,
        idx: BodyIndex,
        mjd: MJD,
        params: &KeplerSolverParams,
    ) -> Vector3<f64> {
        let mut position = Vector3::zeros();
        let mut cursor = Some(idx);
        while let Some(current) = cursor {
            position += self.relative_position(current, mjd, params);
            cursor = self.body(current).parent;
        }
        position
    }

    /// The Sun, the eight planets, Pluto, the Moon and Saturn's rings at epoch J2000.
    ///
    /// Planetary elements are the J2000 mean elements of Standish (JPL, 1992); the Moon uses
    /// mean lunar elements relative to the Earth.
    pub fn solar_system() -> BodyCatalog {
        use BodyCategory::*;
        let el = OrbitalElements::new;

        let specs = vec![
            BodySpec::new("sun", Star, OrbitalElements::central()),
            BodySpec::new(
                "mercury",
                Planet,
                el(0.38709927, 0.20563593, 7.00497902, 48.33076593, 29.12703035, 174.79252722),
            ),
            BodySpec::new(
                "venus",
                Planet,
                el(0.72333566, 0.00677672, 3.39467605, 76.67984255, 54.92262463, 50.37663232),
            ),
            BodySpec::new(
                "earth",
                Planet,
                el(1.00000261, 0.01671123, 0.0, -11.26064, 114.20783, 357.51716),
            )
            .with_mass_ratio(3.003_489e-6),
            BodySpec::new(
                "moon",
                Satellite,
                el(0.002_569_555, 0.0549, 5.145, 125.08, 318.15, 135.27),
            )
            .with_parent("earth"),
            BodySpec::new(
                "mars",
                Planet,
                el(1.52371034, 0.09339410, 1.84969142, 49.55953891, 286.4968315, 19.39019754),
            ),
            BodySpec::new(
                "jupiter",
                Planet,
                el(5.20288700, 0.04838624, 1.30439695, 100.47390909, 274.25457074, 19.66796068),
            )
            .with_mass_ratio(9.547_919e-4),
            BodySpec::new(
                "saturn",
                Planet,
                el(9.53667594, 0.05386179, 2.48599187, 113.66242448, 338.93645383, 317.35536592),
            )
            .with_mass_ratio(2.858_860e-4),
            BodySpec::new("saturn-rings", Ring, OrbitalElements::central()).with_parent("saturn"),
            BodySpec::new(
                "uranus",
                Planet,
                el(19.18916464, 0.04725744, 0.77263783, 74.01692503, 96.93735127, 142.28382821),
            ),
            BodySpec::new(
                "neptune",
                Planet,
                el(30.06992276, 0.00859048, 1.77004347, 131.78422574, 273.18053653, 259.91520804),
            ),
            BodySpec::new(
                "pluto",
                Dwarf,
                el(39.48211675, 0.24882730, 17.14001206, 110.30393684, 113.76497945, 14.86012204),
            ),
        ];

        BodyCatalogBuilder::new()
            .bodies(specs)
            .build()
            .expect("bundled solar system catalog is valid")
    }
}

#[cfg(test)]
mod bodies_test {
    use super::*;
    use crate::constants::T2000;
    use approx::assert_relative_eq;

    #[test]
    fn test_solar_system_layout() {
        let catalog = BodyCatalog::solar_system();
        assert_eq!(catalog.len(), 12);

        let earth = catalog.index_of("earth").unwrap();
        let moon = catalog.index_of("moon").unwrap();
        assert_eq!(catalog.body(moon).parent, Some(earth));
        assert_eq!(catalog.body(earth).children, vec![moon]);
        assert_eq!(catalog.get("saturn-rings").unwrap().kind, BodyKind::Ring);
        assert_eq!(catalog.top_level(moon), earth);
        assert_eq!(catalog.top_level(earth), earth);
    }

    #[test]
    fn test_index_from_larger_catalog() {
        let catalog = BodyCatalog::solar_system();
        let last = BodyIndex(catalog.len() - 1);
        let foreign = BodyIndex(catalog.len());

        assert_eq!(catalog.try_body(last), Some(catalog.body(last)));
        assert_eq!(catalog.try_body(foreign), None);
    }

    #[test]
    #[should_panic]
    fn test_body_panics_on_foreign_index() {
        let catalog = BodyCatalog::solar_system();
        catalog.body(BodyIndex(catalog.len()));
    }

    #[test]
    fn test_depth_first_visits_parents_first() {
        let catalog = BodyCatalog::solar_system();
        let order: Vec<&str> = catalog
            .depth_first()
            .into_iter()
            .map(|i| catalog.body(i).id.as_str())
            .collect();
        assert_eq!(order.len(), catalog.len());
        let pos = |id: &str| order.iter().position(|x| *x == id).unwrap();
        assert_eq!(pos("moon"), pos("earth") + 1);
        assert_eq!(pos("saturn-rings"), pos("saturn") + 1);
        assert_eq!(order[0], "sun");

        let saturn = catalog.index_of("saturn").unwrap();
        assert_eq!(
            catalog.descendants(saturn),
            vec![catalog.index_of("saturn-rings").unwrap()]
        );
    }

    #[test]
    fn test_moon_period_from_mass_multiplier() {
        let catalog = BodyCatalog::solar_system();
        let moon = catalog.index_of("moon").unwrap();
        let period = catalog
            .body(moon)
            .elements
            .period_days(catalog.mass_multiplier(moon));
        // sidereal month ≈ 27.32 days
        assert!((period - 27.32).abs() < 0.3, "period = {period}");
    }

    #[test]
    fn test_satellite_and_ring_positions_follow_parent() {
        let catalog = BodyCatalog::solar_system();
        let params = KeplerSolverParams::default();
        let t = T2000 + 500.0;

        let earth = catalog.heliocentric_position(catalog.index_of("earth").unwrap(), t, &params);
        let moon = catalog.heliocentric_position(catalog.index_of("moon").unwrap(), t, &params);
        let dist = (moon - earth).norm();
        assert!(dist > 0.0024 && dist < 0.0028, "earth-moon = {dist}");

        let saturn = catalog.heliocentric_position(catalog.index_of("saturn").unwrap(), t, &params);
        let rings =
            catalog.heliocentric_position(catalog.index_of("saturn-rings").unwrap(), t, &params);
        assert_relative_eq!(saturn, rings);

        let sun = catalog.heliocentric_position(catalog.index_of("sun").unwrap(), t, &params);
        assert_eq!(sun, Vector3::zeros());
    }

    #[test]
    fn test_earth_at_j2000() {
        let catalog = BodyCatalog::solar_system();
        let earth = catalog.heliocentric_position(
            catalog.index_of("earth").unwrap(),
            T2000,
            &KeplerSolverParams::default(),
        );
        // JPL DE ephemeris: (-0.1771, 0.9672, 0.0) AU
        assert_relative_eq!(earth.x, -0.1771, epsilon = 2e-3);
        assert_relative_eq!(earth.y, 0.9672, epsilon = 2e-3);
    }

    #[test]
    fn test_builder_validation() {
        let dup = BodyCatalog::builder()
            .body(BodySpec::new("sun", BodyCategory::Star, OrbitalElements::central()))
            .body(BodySpec::new("sun", BodyCategory::Star, OrbitalElements::central()))
            .build();
        assert_eq!(dup.unwrap_err(), OrreryError::DuplicateBody("sun".into()));

        let orphan_ring = BodyCatalog::builder()
            .body(BodySpec::new("ring", BodyCategory::Ring, OrbitalElements::central()))
            .build();
        assert!(matches!(orphan_ring, Err(OrreryError::InvalidParent(_))));

        let unknown_parent = BodyCatalog::builder()
            .body(
                BodySpec::new(
                    "moon",
                    BodyCategory::Satellite,
                    OrbitalElements::new(0.0026, 0.05, 5.0, 0.0, 0.0, 0.0),
                )
                .with_parent("earth"),
            )
            .build();
        assert!(matches!(unknown_parent, Err(OrreryError::InvalidParent(_))));

        let bad_orbit = BodyCatalog::builder()
            .body(BodySpec::new(
                "comet",
                BodyCategory::Comet,
                OrbitalElements::new(10.0, 1.5, 0.0, 0.0, 0.0, 0.0),
            ))
            .build();
        assert!(matches!(bad_orbit, Err(OrreryError::InvalidOrbitalElements(_))));

        let bad_mass = BodyCatalog::builder()
            .body(
                BodySpec::new(
                    "x",
                    BodyCategory::Planet,
                    OrbitalElements::new(1.0, 0.1, 0.0, 0.0, 0.0, 0.0),
                )
                .with_mass_ratio(-1.0),
            )
            .build();
        assert!(bad_mass.is_err());

        assert!(matches!(
            BodyCatalog::solar_system().require("vulcan"),
            Err(OrreryError::UnknownBody(_))
        ));
    }
}
