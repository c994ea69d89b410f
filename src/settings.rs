//! # Settings snapshot
//!
//! Immutable bundle of display, camera and search preferences as the host persists them.
//! Loading and saving are the host's business; this type only fixes the shape (serde) and the
//! conversions into the engine's own value types.
//!
//! Every conversion copies values out of the snapshot, so editing the settings later never
//! reaches a search or a camera that was already set up from them.
//!
//! ```rust,no_run
//! use orrery::{events::search::SearchConfig, projection::camera::CameraState, settings::Settings};
//!
//! let settings = Settings::default();
//! let config = SearchConfig::from(&settings);
//! let camera = CameraState::from(&settings);
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::Degree,
    ephemeris::PrecisionMode,
    events::{
        search::{SearchConfig, SearchMode, SearchRequest, SOLAR_ANGULAR_RADIUS_DEG},
        EventKind, SearchSpeed,
    },
    kepler::normalize_degrees,
    orrery_errors::OrreryError,
    projection::{
        camera::{CameraState, ProjectionSettings, ProximityFadeParams, Viewport, MIN_ZOOM},
        lod::{LodQuality, LodThresholds, QualitySetting},
        DisplayMode,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub mode: DisplayMode,
    pub perspective: bool,
    pub proximity: bool,
    pub inner_quality: QualitySetting,
    pub outer_quality: QualitySetting,
    pub viewport: Option<Viewport>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            mode: DisplayMode::Schematic,
            perspective: false,
            proximity: false,
            inner_quality: QualitySetting::Standard,
            outer_quality: QualitySetting::Standard,
            viewport: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub yaw: Degree,
    pub tilt: Degree,
    pub zoom: f64,
    /// Center of rotation (AU, ecliptic).
    pub pivot: [f64; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            yaw: 0.0,
            tilt: 90.0,
            zoom: 1.0,
            pivot: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub tolerance: Degree,
    pub solar_angular_radius: Degree,
    pub strict: bool,
    pub precision: PrecisionMode,
    pub speed: SearchSpeed,
    pub continuous: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            tolerance: 1.0,
            solar_angular_radius: SOLAR_ANGULAR_RADIUS_DEG,
            strict: false,
            precision: PrecisionMode::Kepler,
            speed: SearchSpeed::Medium,
            continuous: false,
        }
    }
}

/// Everything the host hands the engine in one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub camera: CameraSettings,
    pub search: SearchSettings,
    pub lod: LodThresholds,
    pub fade: ProximityFadeParams,
}

impl Settings {
    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), OrreryError> {
        SearchConfig::from(self).validate()?;
        let camera_ok = [self.camera.yaw, self.camera.tilt, self.camera.zoom]
            .iter()
            .chain(self.camera.pivot.iter())
            .all(|v| v.is_finite());
        if !camera_ok || self.camera.zoom <= 0.0 {
            return Err(OrreryError::InvalidSettings(
                "camera values must be finite with zoom > 0".into(),
            ));
        }
        Ok(())
    }

    /// Request for a search of `kind` over `targets`, using the speed and continuous flag of
    /// these settings.
    pub fn search_request<I, S>(&self, kind: EventKind, targets: I) -> SearchRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchRequest::new(kind, targets)
            .with_mode(SearchMode::Searching(self.search.speed))
            .continuous(self.search.continuous)
    }
}

impl From<&Settings> for SearchConfig {
    fn from(settings: &Settings) -> Self {
        SearchConfig {
            tolerance: settings.search.tolerance,
            solar_angular_radius: settings.search.solar_angular_radius,
            strict: settings.search.strict,
            precision: settings.search.precision,
        }
    }
}

impl From<&Settings> for CameraState {
    fn from(settings: &Settings) -> Self {
        let [x, y, z] = settings.camera.pivot;
        CameraState {
            yaw: normalize_degrees(settings.camera.yaw),
            tilt: settings.camera.tilt.clamp(-90.0, 90.0),
            pivot: Vector3::new(x, y, z),
            zoom: settings.camera.zoom.max(MIN_ZOOM),
            display_mode: settings.display.mode,
        }
    }
}

impl From<&Settings> for ProjectionSettings {
    fn from(settings: &Settings) -> Self {
        ProjectionSettings {
            perspective: settings.display.perspective,
            proximity: settings.display.proximity,
            viewport: settings.display.viewport,
            fade: settings.fade.clone(),
            ..ProjectionSettings::default()
        }
    }
}

impl From<&Settings> for LodQuality {
    fn from(settings: &Settings) -> Self {
        LodQuality {
            inner: settings.display.inner_quality,
            outer: settings.display.outer_quality,
        }
    }
}
