//! Solar-system simulation engine: Kepler orbits, a 3D→2D projection with level-of-detail
//! opacity, and an incremental search for transits and planetary alignments seen from the
//! Earth.

pub mod bodies;
pub mod constants;
pub mod ephemeris;
pub mod events;
pub mod kepler;
pub mod orbit_path;
pub mod orbital_elements;
pub mod orrery_errors;
pub mod projection;
pub mod ref_system;
pub mod settings;
pub mod simulation;
pub mod time;
