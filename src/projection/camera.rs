//! # Camera model
//!
//! Pipeline applied to each point by [`project`]:
//!
//! 1. translate into pivot-relative coordinates;
//! 2. rotate by **yaw** about the ecliptic pole;
//! 3. rotate by **tilt** and drop to 2D, with ecliptic north toward the top of the screen
//!    (screen `y` grows downward);
//! 4. optionally apply perspective, with hard culling behind the camera and a proximity
//!    fade for bodies the camera gets too close to.
//!
//! Tilt convention: `+90°` looks down from ecliptic north, `0°` is edge-on, `−90°` looks up
//! from the south.
//!
//! The function is pure. Projecting the pivot always yields `(0, 0)` at depth `0`.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{AstronomicalUnit, Degree, RADEG},
    kepler::normalize_degrees,
    projection::DisplayMode,
};

/// Smallest zoom factor a camera accepts.
pub const MIN_ZOOM: f64 = 1e-6;

/// Orientation, pivot and zoom of the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Rotation about the ecliptic pole, `[0, 360)` degrees.
    pub yaw: Degree,
    /// Elevation of the view above the ecliptic, `[−90, 90]` degrees.
    pub tilt: Degree,
    /// Center of rotation (AU).
    pub pivot: Vector3<f64>,
    pub zoom: f64,
    pub display_mode: DisplayMode,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState {
            yaw: 0.0,
            tilt: 90.0,
            pivot: Vector3::zeros(),
            zoom: 1.0,
            display_mode: DisplayMode::Schematic,
        }
    }
}

impl CameraState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_yaw(&mut self, yaw: Degree) {
        self.yaw = normalize_degrees(yaw);
    }

    pub fn set_tilt(&mut self, tilt: Degree) {
        self.tilt = tilt.clamp(-90.0, 90.0);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.max(MIN_ZOOM);
    }

    pub fn set_pivot(&mut self, pivot: Vector3<f64>) {
        self.pivot = pivot;
    }

    /// Rotate the pivot-relative `position` into camera axes `(right, up, toward viewer)`.
    pub fn to_view(&self, position: &Vector3<f64>) -> Vector3<f64> {
        let rel = position - self.pivot;

        let (sin_yaw, cos_yaw) = (self.yaw * RADEG).sin_cos();
        let x1 = rel.x * cos_yaw - rel.y * sin_yaw;
        let y1 = rel.x * sin_yaw + rel.y * cos_yaw;
        let z1 = rel.z;

        let (sin_tilt, cos_tilt) = (self.tilt * RADEG).sin_cos();
        Vector3::new(
            x1,
            y1 * sin_tilt + z1 * cos_tilt,
            z1 * sin_tilt - y1 * cos_tilt,
        )
    }
}

/// Fade-out parameters for bodies close to a perspective camera.
///
/// Distances are camera-to-body distances in AU. A body is fully transparent at `near_plane`
/// and fully opaque at `near_plane + fade_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityFadeParams {
    pub star_id: String,
    /// Bodies that never fade (gas giants).
    pub always_visible: Vec<String>,
    /// Innermost bodies, faded with the tighter `inner_*` window.
    pub inner_bodies: Vec<String>,
    pub near_plane: AstronomicalUnit,
    pub fade_range: AstronomicalUnit,
    pub inner_near_plane: AstronomicalUnit,
    pub inner_fade_range: AstronomicalUnit,
}

impl Default for ProximityFadeParams {
    fn default() -> Self {
        ProximityFadeParams {
            star_id: "sun".into(),
            always_visible: ["jupiter", "saturn", "uranus", "neptune"]
                .map(String::from)
                .to_vec(),
            inner_bodies: ["mercury", "venus"].map(String::from).to_vec(),
            near_plane: 0.3,
            fade_range: 0.7,
            inner_near_plane: 0.05,
            inner_fade_range: 0.15,
        }
    }
}

impl ProximityFadeParams {
    /// Opacity of `body_id` seen from `distance` AU away.
    pub fn opacity(&self, body_id: Option<&str>, distance: AstronomicalUnit) -> f64 {
        let (near, range) = match body_id {
            Some(id) if id == self.star_id => return 1.0,
            Some(id) if self.always_visible.iter().any(|b| b == id) => return 1.0,
            Some(id) if self.inner_bodies.iter().any(|b| b == id) => {
                (self.inner_near_plane, self.inner_fade_range)
            }
            _ => (self.near_plane, self.fade_range),
        };
        if range <= 0.0 {
            return if distance > near { 1.0 } else { 0.0 };
        }
        ((distance - near) / range).clamp(0.0, 1.0)
    }
}

/// Screen rectangle centered on the projection origin, in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Extra band around the rectangle still counted as on screen.
    pub margin: f64,
}

impl Viewport {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.width / 2.0 + self.margin && y.abs() <= self.height / 2.0 + self.margin
    }
}

/// Rendering switches for [`project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSettings {
    pub perspective: bool,
    /// Move the camera closer as the zoom grows (otherwise it sits at `infinite_distance`).
    pub proximity: bool,
    /// Camera distance (AU) at zoom 1 when `proximity` is on.
    pub proximity_distance: AstronomicalUnit,
    /// Camera distance (AU) emulating an orthographic view.
    pub infinite_distance: AstronomicalUnit,
    /// Opacity at or below which a point is reported invisible.
    pub visibility_epsilon: f64,
    pub viewport: Option<Viewport>,
    pub fade: ProximityFadeParams,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        ProjectionSettings {
            perspective: false,
            proximity: false,
            proximity_distance: 60.0,
            infinite_distance: 1.0e9,
            visibility_epsilon: 0.01,
            viewport: None,
            fade: ProximityFadeParams::default(),
        }
    }
}

impl ProjectionSettings {
    /// Effective camera distance (AU) for a zoom factor.
    pub fn camera_distance(&self, zoom: f64) -> AstronomicalUnit {
        if self.proximity {
            self.proximity_distance / zoom.max(MIN_ZOOM)
        } else {
            self.infinite_distance
        }
    }
}

/// A position after projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Screen coordinates relative to the view center (y down).
    pub x: f64,
    pub y: f64,
    /// Distance toward the viewer from the pivot plane (AU); larger is closer.
    pub depth: f64,
    pub scale_factor: f64,
    pub opacity: f64,
    pub is_visible: bool,
}

/// Project a heliocentric position to the screen.
///
/// Arguments
/// ---------
/// * `position`: ecliptic position (AU).
/// * `scale`: screen units per AU at zoom 1, usually `camera.display_mode.base_scale()`.
/// * `camera`: orientation, pivot, zoom.
/// * `settings`: perspective, proximity and fade switches.
/// * `body_id`: selects the proximity fade tier; `None` is treated as an ordinary body.
pub fn project(
    position: &Vector3<f64>,
    scale: f64,
    camera: &CameraState,
    settings: &ProjectionSettings,
    body_id: Option<&str>,
) -> ProjectedPoint {
    let view = camera.to_view(position);
    let depth = view.z;
    let pixels = scale * camera.zoom;

    let (scale_factor, opacity) = if settings.perspective {
        let camera_distance = settings.camera_distance(camera.zoom);
        let dist = camera_distance - depth;
        if dist <= 0.0 {
            return ProjectedPoint {
                x: 0.0,
                y: 0.0,
                depth,
                scale_factor: 0.0,
                opacity: 0.0,
                is_visible: false,
            };
        }
        (camera_distance / dist, settings.fade.opacity(body_id, dist))
    } else {
        (1.0, 1.0)
    };

    let x = view.x * pixels * scale_factor;
    let y = -view.y * pixels * scale_factor;

    let on_screen = settings.viewport.is_none_or(|vp| vp.contains(x, y));

    ProjectedPoint {
        x,
        y,
        depth,
        scale_factor,
        opacity,
        is_visible: on_screen && opacity > settings.visibility_epsilon,
    }
}

#[cfg(test)]
mod camera_test {
    use super::*;
    use approx::assert_relative_eq;

    fn perspective() -> ProjectionSettings {
        ProjectionSettings {
            perspective: true,
            proximity: true,
            proximity_distance: 10.0,
            ..ProjectionSettings::default()
        }
    }

    #[test]
    fn test_pivot_projects_to_origin() {
        let pivot = Vector3::new(1.3, -0.4, 0.2);
        for &(yaw, tilt) in &[(0.0, 90.0), (37.0, 12.0), (250.0, -80.0), (359.0, 0.0)] {
            let camera = CameraState {
                yaw,
                tilt,
                pivot,
                zoom: 3.0,
                display_mode: DisplayMode::TrueScale,
            };
            for settings in [ProjectionSettings::default(), perspective()] {
                let p = project(&pivot, 100.0, &camera, &settings, Some("earth"));
                assert_eq!(p.x, 0.0);
                assert_eq!(p.y, 0.0);
                assert_eq!(p.depth, 0.0);
            }
        }
    }

    #[test]
    fn test_top_down_view_puts_north_up() {
        let camera = CameraState::default();
        let settings = ProjectionSettings::default();

        // +y (ecliptic longitude 90°) is up on screen, i.e. negative screen y.
        let p = project(&Vector3::new(0.0, 1.0, 0.0), 100.0, &camera, &settings, None);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, -100.0, epsilon = 1e-12);

        // Above the ecliptic means toward a top-down viewer.
        let p = project(&Vector3::new(0.0, 0.0, 1.0), 100.0, &camera, &settings, None);
        assert_relative_eq!(p.depth, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_on_view_shows_pole_up() {
        let mut camera = CameraState::default();
        camera.set_tilt(0.0);
        let p = project(
            &Vector3::new(0.0, 0.0, 1.0),
            50.0,
            &camera,
            &ProjectionSettings::default(),
            None,
        );
        assert_relative_eq!(p.y, -50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_rotates_about_pole() {
        let mut camera = CameraState::default();
        camera.set_yaw(90.0);
        let p = project(
            &Vector3::new(1.0, 0.0, 0.0),
            10.0,
            &camera,
            &ProjectionSettings::default(),
            None,
        );
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, -10.0, epsilon = 1e-12);

        camera.set_yaw(-90.0);
        assert_eq!(camera.yaw, 270.0);
        camera.set_tilt(120.0);
        assert_eq!(camera.tilt, 90.0);
    }

    #[test]
    fn test_perspective_scale_and_cull() {
        let camera = CameraState::default();
        let settings = perspective();

        // Camera 10 AU above the pivot; a point 5 AU up is at half the distance.
        let p = project(&Vector3::new(1.0, 0.0, 5.0), 1.0, &camera, &settings, Some("mars"));
        assert_relative_eq!(p.scale_factor, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert!(p.is_visible);

        // Behind the camera: hard cull.
        let p = project(&Vector3::new(1.0, 0.0, 12.0), 1.0, &camera, &settings, Some("sun"));
        assert_eq!(p.scale_factor, 0.0);
        assert!(!p.is_visible);
    }

    #[test]
    fn test_zoom_moves_camera_closer() {
        let settings = perspective();
        assert_relative_eq!(settings.camera_distance(1.0), 10.0);
        assert_relative_eq!(settings.camera_distance(4.0), 2.5);
        assert_eq!(
            ProjectionSettings::default().camera_distance(4.0),
            ProjectionSettings::default().infinite_distance
        );
    }

    #[test]
    fn test_proximity_fade_tiers() {
        let mut camera = CameraState::default();
        camera.set_zoom(10.0); // camera 1 AU above the pivot
        let settings = perspective();
        let close = Vector3::new(0.0, 0.0, 0.8); // 0.2 AU from the camera

        let earth = project(&close, 1.0, &camera, &settings, Some("earth"));
        assert_eq!(earth.opacity, 0.0);
        assert!(!earth.is_visible);

        let venus = project(&close, 1.0, &camera, &settings, Some("venus"));
        assert_relative_eq!(venus.opacity, 1.0, epsilon = 1e-12);

        let jupiter = project(&close, 1.0, &camera, &settings, Some("jupiter"));
        assert_eq!(jupiter.opacity, 1.0);

        let sun = project(&close, 1.0, &camera, &settings, Some("sun"));
        assert_eq!(sun.opacity, 1.0);

        let fade = &settings.fade;
        assert_relative_eq!(fade.opacity(Some("mars"), 0.65), 0.5, epsilon = 1e-12);
        assert_relative_eq!(fade.opacity(Some("mercury"), 0.125), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_viewport_visibility() {
        let settings = ProjectionSettings {
            viewport: Some(Viewport {
                width: 200.0,
                height: 100.0,
                margin: 10.0,
            }),
            ..ProjectionSettings::default()
        };
        let camera = CameraState::default();
        let inside = project(&Vector3::new(1.0, 0.0, 0.0), 100.0, &camera, &settings, None);
        assert!(inside.is_visible);
        let outside = project(&Vector3::new(0.0, 1.0, 0.0), 100.0, &camera, &settings, None);
        assert!(!outside.is_visible);
    }

    #[test]
    fn test_projection_is_pure() {
        let camera = CameraState {
            yaw: 12.0,
            tilt: 33.0,
            pivot: Vector3::new(0.1, 0.2, 0.0),
            zoom: 2.0,
            display_mode: DisplayMode::Schematic,
        };
        let settings = perspective();
        let pos = Vector3::new(-2.0, 0.7, 0.05);
        let a = project(&pos, 160.0, &camera, &settings, Some("mars"));
        let b = project(&pos, 160.0, &camera, &settings, Some("mars"));
        assert_eq!(a, b);
    }
}
