//! # Projection
//!
//! Screen-space side of the engine: turning heliocentric positions into 2D points for an
//! external renderer.
//!
//! * [`camera`] – yaw/tilt/pivot camera, optional perspective, hard culling and proximity fade.
//! * [`lod`] – zoom-driven level-of-detail opacity per orbital region and quality setting.
//!
//! The two opacities are independent; a renderer multiplies them with
//! [`lod::compose_opacity`].

use serde::{Deserialize, Serialize};

pub mod camera;
pub mod lod;

/// Screen units per AU at zoom 1 in schematic mode.
pub const SCHEMATIC_BASE_SCALE: f64 = 160.0;

/// Screen units per AU at zoom 1 in true-scale mode.
pub const TRUE_SCALE_BASE_SCALE: f64 = 40.0;

/// Display scale convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Distances exaggerated for visual clarity.
    #[default]
    Schematic,
    /// Physically proportional distances.
    TrueScale,
}

impl DisplayMode {
    /// Screen units per AU at zoom 1.
    pub fn base_scale(self) -> f64 {
        match self {
            DisplayMode::Schematic => SCHEMATIC_BASE_SCALE,
            DisplayMode::TrueScale => TRUE_SCALE_BASE_SCALE,
        }
    }

    /// Factor converting a schematic-mode zoom threshold into this mode, so that a transition
    /// happens at the same on-screen scale in both modes.
    pub fn zoom_ratio(self) -> f64 {
        SCHEMATIC_BASE_SCALE / self.base_scale()
    }
}
