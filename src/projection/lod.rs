//! # Level of detail
//!
//! Zoom-driven opacity for whole regions of the system, independent of the camera's proximity
//! fade:
//!
//! * **Inner** bodies (`a ≤ inner_semi_major_axis`) are shown only once the view is zoomed in
//!   past `inner_zoom`;
//! * **Outer** bodies (`a ≥ outer_semi_major_axis`) are shown only while the view is zoomed out
//!   below `outer_zoom`;
//! * **Mid** bodies are always opaque.
//!
//! Thresholds are given for [`DisplayMode::Schematic`] and scaled by
//! [`DisplayMode::zoom_ratio`] so that transitions land on the same screen scale in every mode.
//!
//! The transition itself depends on a [`QualitySetting`]: a smoothstep across
//! `threshold·(1 ± transition_width)` in `Standard`, a hard step in `Eco`, and no LOD at all in
//! `Performance`.

use serde::{Deserialize, Serialize};

use crate::{
    bodies::{BodyCatalog, BodyIndex},
    constants::AstronomicalUnit,
    projection::DisplayMode,
};

/// Rendering quality, per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualitySetting {
    /// LOD disabled, everything opaque.
    Performance,
    /// Hard threshold.
    Eco,
    /// Smooth transition.
    #[default]
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LodRegion {
    Inner,
    Mid,
    Outer,
}

/// Region boundaries and zoom thresholds (schematic mode).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LodThresholds {
    pub inner_semi_major_axis: AstronomicalUnit,
    pub outer_semi_major_axis: AstronomicalUnit,
    pub inner_zoom: f64,
    pub outer_zoom: f64,
    /// Half-width of the smooth transition, as a fraction of the threshold.
    pub transition_width: f64,
}

impl Default for LodThresholds {
    fn default() -> Self {
        LodThresholds {
            inner_semi_major_axis: 2.0,
            outer_semi_major_axis: 35.0,
            inner_zoom: 0.6,
            outer_zoom: 0.25,
            transition_width: 0.1,
        }
    }
}

impl LodThresholds {
    /// Region of an orbit with semi-major axis `a` (AU). The central star (`a = 0`) is `Mid`.
    pub fn region_for(&self, a: AstronomicalUnit) -> LodRegion {
        if a <= 0.0 {
            LodRegion::Mid
        } else if a <= self.inner_semi_major_axis {
            LodRegion::Inner
        } else if a >= self.outer_semi_major_axis {
            LodRegion::Outer
        } else {
            LodRegion::Mid
        }
    }

    /// Zoom threshold for a region in a display mode, `None` for `Mid`.
    pub fn zoom_threshold(&self, region: LodRegion, mode: DisplayMode) -> Option<f64> {
        let base = match region {
            LodRegion::Inner => self.inner_zoom,
            LodRegion::Outer => self.outer_zoom,
            LodRegion::Mid => return None,
        };
        Some(base * mode.zoom_ratio())
    }
}

/// Quality per LOD region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LodQuality {
    pub inner: QualitySetting,
    pub outer: QualitySetting,
}

impl LodQuality {
    pub fn uniform(quality: QualitySetting) -> Self {
        LodQuality {
            inner: quality,
            outer: quality,
        }
    }

    fn for_region(&self, region: LodRegion) -> QualitySetting {
        match region {
            LodRegion::Inner => self.inner,
            LodRegion::Outer => self.outer,
            LodRegion::Mid => QualitySetting::Performance,
        }
    }
}

/// Cubic Hermite step on `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// LOD opacity of a region at zoom `zoom`.
///
/// Arguments
/// ---------
/// * `region`: which region the body belongs to.
/// * `zoom`: current camera zoom.
/// * `mode`: display mode, scales the threshold.
/// * `thresholds`: region boundaries and schematic thresholds.
/// * `quality`: quality of that region.
///
/// Return
/// ------
/// * Opacity in `[0, 1]`.
pub fn region_opacity(
    region: LodRegion,
    zoom: f64,
    mode: DisplayMode,
    thresholds: &LodThresholds,
    quality: QualitySetting,
) -> f64 {
    let Some(threshold) = thresholds.zoom_threshold(region, mode) else {
        return 1.0;
    };

    // Inner regions appear when zooming in, outer regions disappear.
    let shown = |k: f64| match region {
        LodRegion::Inner => k >= threshold,
        _ => k <= threshold,
    };

    match quality {
        QualitySetting::Performance => 1.0,
        QualitySetting::Eco => {
            if shown(zoom) {
                1.0
            } else {
                0.0
            }
        }
        QualitySetting::Standard => {
            let lo = threshold * (1.0 - thresholds.transition_width);
            let hi = threshold * (1.0 + thresholds.transition_width);
            if hi <= lo {
                return if shown(zoom) { 1.0 } else { 0.0 };
            }
            let rising = smoothstep((zoom - lo) / (hi - lo));
            match region {
                LodRegion::Inner => rising,
                _ => 1.0 - rising,
            }
        }
    }
}

/// LOD opacity of an orbit with semi-major axis `a`.
pub fn lod_opacity(
    semi_major_axis: AstronomicalUnit,
    zoom: f64,
    mode: DisplayMode,
    thresholds: &LodThresholds,
    quality: &LodQuality,
) -> f64 {
    let region = thresholds.region_for(semi_major_axis);
    region_opacity(region, zoom, mode, thresholds, quality.for_region(region))
}

/// Region of a catalog body. Satellites and rings inherit their top-level ancestor's region.
pub fn body_region(catalog: &BodyCatalog, idx: BodyIndex, thresholds: &LodThresholds) -> LodRegion {
    let root = catalog.body(catalog.top_level(idx));
    thresholds.region_for(root.elements.semi_major_axis)
}

/// LOD opacity of a catalog body.
pub fn body_lod_opacity(
    catalog: &BodyCatalog,
    idx: BodyIndex,
    zoom: f64,
    mode: DisplayMode,
    thresholds: &LodThresholds,
    quality: &LodQuality,
) -> f64 {
    let region = body_region(catalog, idx, thresholds);
    region_opacity(region, zoom, mode, thresholds, quality.for_region(region))
}

/// Final opacity shown to the user: proximity fade times LOD.
pub fn compose_opacity(proximity: f64, lod: f64) -> f64 {
    (proximity * lod).clamp(0.0, 1.0)
}
