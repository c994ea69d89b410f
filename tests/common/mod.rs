#![allow(dead_code)]

use std::sync::Arc;

use approx::assert_relative_eq;
use nalgebra::Vector3;
use orrery::{
    bodies::BodyCatalog,
    constants::MJD,
    ephemeris::KeplerEphemeris,
    events::{
        search::{SearchConfig, SearchEngine, SearchRequest, SearchState, TickOutcome},
        FoundEvent, SearchParams,
    },
};

pub fn solar_system() -> KeplerEphemeris {
    KeplerEphemeris::new(Arc::new(BodyCatalog::solar_system()))
}

pub fn ids(targets: &[&str]) -> Vec<String> {
    targets.iter().map(|t| t.to_string()).collect()
}

pub fn assert_vec_close(actual: &Vector3<f64>, expected: &Vector3<f64>, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
}

/// Tick a search until it stops producing `Advanced` outcomes, collecting every found event.
pub fn run_search(
    params: SearchParams,
    request: SearchRequest,
    config: SearchConfig,
    date: MJD,
) -> (Vec<FoundEvent>, TickOutcome) {
    let provider = solar_system();
    let engine = SearchEngine::new(params);
    let mut state = SearchState::new();
    engine
        .start(&mut state, &provider, request, config, date)
        .unwrap();

    let mut found = Vec::new();
    for _ in 0..100_000 {
        match engine.tick(&mut state, &provider) {
            TickOutcome::Advanced { .. } => {}
            TickOutcome::Found(event) => {
                found.push(event);
                if !state.is_active() {
                    return (found, TickOutcome::Inactive);
                }
            }
            other => return (found, other),
        }
    }
    panic!("search did not settle");
}
