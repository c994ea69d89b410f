use approx::assert_relative_eq;
use nalgebra::Vector3;
use orrery::{
    bodies::BodyCatalog,
    constants::T2000,
    kepler::KeplerSolverParams,
    projection::{
        camera::{project, CameraState, ProjectionSettings},
        lod::{body_lod_opacity, compose_opacity, LodQuality, LodThresholds, QualitySetting},
        DisplayMode,
    },
};

#[test]
fn test_pivot_projects_to_center() {
    let catalog = BodyCatalog::solar_system();
    let params = KeplerSolverParams::default();
    let earth = catalog.index_of("earth").unwrap();
    let earth_pos = catalog.heliocentric_position(earth, T2000, &params);

    let mut camera = CameraState::new();
    camera.set_pivot(earth_pos);
    camera.set_zoom(3.0);

    for (yaw, tilt) in [(0.0, 90.0), (45.0, 30.0), (300.0, -60.0)] {
        camera.set_yaw(yaw);
        camera.set_tilt(tilt);
        for perspective in [false, true] {
            let settings = ProjectionSettings {
                perspective,
                proximity: perspective,
                ..ProjectionSettings::default()
            };
            let p = project(
                &earth_pos,
                camera.display_mode.base_scale(),
                &camera,
                &settings,
                Some("earth"),
            );
            assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
            assert!(p.is_visible);
        }
    }
}

#[test]
fn test_top_down_view_keeps_ecliptic_axes() {
    let camera = CameraState::new();
    let settings = ProjectionSettings::default();
    let scale = DisplayMode::Schematic.base_scale();

    let p = project(&Vector3::new(1.0, 0.0, 0.0), scale, &camera, &settings, None);
    assert_relative_eq!(p.x, 160.0, epsilon = 1e-9);
    assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);

    // screen y grows downward
    let p = project(&Vector3::new(0.0, 1.0, 0.0), scale, &camera, &settings, None);
    assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(p.y, -160.0, epsilon = 1e-9);
}

#[test]
fn test_performance_quality_shows_everything() {
    let catalog = BodyCatalog::solar_system();
    let thresholds = LodThresholds::default();
    let quality = LodQuality::uniform(QualitySetting::Performance);

    for zoom in [1e-3, 0.1, 0.5, 1.0, 10.0] {
        for mode in [DisplayMode::Schematic, DisplayMode::TrueScale] {
            for idx in catalog.depth_first() {
                let lod = body_lod_opacity(&catalog, idx, zoom, mode, &thresholds, &quality);
                assert_eq!(lod, 1.0);
            }
        }
    }
}

#[test]
fn test_satellites_follow_their_planet() {
    let catalog = BodyCatalog::solar_system();
    let thresholds = LodThresholds::default();
    let quality = LodQuality::uniform(QualitySetting::Eco);
    let earth = catalog.index_of("earth").unwrap();
    let moon = catalog.index_of("moon").unwrap();
    let saturn = catalog.index_of("saturn").unwrap();
    let rings = catalog.index_of("saturn-rings").unwrap();

    for zoom in [0.1, 0.59, 0.61, 2.0] {
        let mode = DisplayMode::Schematic;
        assert_eq!(
            body_lod_opacity(&catalog, moon, zoom, mode, &thresholds, &quality),
            body_lod_opacity(&catalog, earth, zoom, mode, &thresholds, &quality)
        );
        assert_eq!(
            body_lod_opacity(&catalog, rings, zoom, mode, &thresholds, &quality),
            body_lod_opacity(&catalog, saturn, zoom, mode, &thresholds, &quality)
        );
    }

    // inner bodies disappear when zoomed out under eco quality
    let mode = DisplayMode::Schematic;
    assert_eq!(body_lod_opacity(&catalog, earth, 0.1, mode, &thresholds, &quality), 0.0);
    assert_eq!(body_lod_opacity(&catalog, earth, 2.0, mode, &thresholds, &quality), 1.0);
}

#[test]
fn test_composed_opacity_with_proximity_fade() {
    let settings = ProjectionSettings {
        perspective: true,
        proximity: true,
        ..ProjectionSettings::default()
    };
    let mut camera = CameraState::new();
    camera.set_zoom(1.0);

    // 60 AU camera distance: a body 59.8 AU toward the camera sits 0.2 AU from it
    let close = Vector3::new(0.0, 0.0, 59.8);
    let p = project(&close, 160.0, &camera, &settings, Some("mars"));
    assert_eq!(p.opacity, 0.0);
    let giant = project(&close, 160.0, &camera, &settings, Some("jupiter"));
    assert_eq!(giant.opacity, 1.0);

    let total = compose_opacity(giant.opacity, 0.5);
    assert_relative_eq!(total, 0.5);
}
