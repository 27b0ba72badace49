use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Runtime tuning for one engine instance.
///
/// Every field defaults to the matching value in [`crate::constants`], so
/// hosts can deserialize a partial object and override only what they need.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub sphere_radius: f32,
    pub min_anchors: usize,
    pub tile_fill: f32,

    pub fovy_radians: f32,
    pub zoom_fov_per_speed: f32,
    pub zoom_fov_max_extra: f32,

    pub drag_sensitivity: f32,
    pub tap_slop_px: f32,
    pub inertia_retain_per_sec: f32,
    pub settle_epsilon: f32,
    pub max_angular_speed: f32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            sphere_radius: SPHERE_RADIUS,
            min_anchors: MIN_ANCHORS,
            tile_fill: TILE_FILL,
            fovy_radians: FOVY_RADIANS,
            zoom_fov_per_speed: ZOOM_FOV_PER_SPEED,
            zoom_fov_max_extra: ZOOM_FOV_MAX_EXTRA,
            drag_sensitivity: DRAG_SENSITIVITY,
            tap_slop_px: TAP_SLOP_PX,
            inertia_retain_per_sec: INERTIA_RETAIN_PER_SEC,
            settle_epsilon: SETTLE_EPSILON,
            max_angular_speed: MAX_ANGULAR_SPEED,
        }
    }
}

impl MenuConfig {
    /// Clamp values that would break the physics or the layout.
    /// Non-finite values fall back to their defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.sphere_radius = finite_or(self.sphere_radius, d.sphere_radius).max(ZNEAR * 4.0);
        self.min_anchors = self.min_anchors.min(MAX_MIN_ANCHORS);
        self.tile_fill = finite_or(self.tile_fill, d.tile_fill).clamp(0.1, 1.0);
        self.fovy_radians = finite_or(self.fovy_radians, d.fovy_radians).clamp(0.2, 2.6);
        self.zoom_fov_per_speed = finite_or(self.zoom_fov_per_speed, d.zoom_fov_per_speed).max(0.0);
        self.zoom_fov_max_extra = finite_or(self.zoom_fov_max_extra, d.zoom_fov_max_extra).max(0.0);
        self.drag_sensitivity = finite_or(self.drag_sensitivity, d.drag_sensitivity).max(0.0);
        self.tap_slop_px = finite_or(self.tap_slop_px, d.tap_slop_px).max(0.0);
        // Must stay strictly inside (0, 1) for decay to converge.
        self.inertia_retain_per_sec =
            finite_or(self.inertia_retain_per_sec, d.inertia_retain_per_sec).clamp(1e-4, 0.99);
        self.settle_epsilon = finite_or(self.settle_epsilon, d.settle_epsilon).max(1e-5);
        self.max_angular_speed =
            finite_or(self.max_angular_speed, d.max_angular_speed).max(self.settle_epsilon);
        self
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
