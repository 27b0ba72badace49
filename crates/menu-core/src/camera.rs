//! Camera at the centre of the sphere, looking outward.
//!
//! The camera never translates; only its orientation changes. Right-handed,
//! looking down local -Z with +Y up, matching `glam`'s `perspective_rh`.

use glam::{Mat4, Quat, Vec3};

/// Local axis the camera looks along before rotation.
pub const REFERENCE_FORWARD: Vec3 = Vec3::NEG_Z;

/// Drawing-surface size in CSS pixels plus device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }

    /// Backing-store size in physical pixels, or `None` when either side
    /// would be empty.
    pub fn physical_size(&self) -> Option<(u32, u32)> {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        let w = (self.css_width * dpr).floor();
        let h = (self.css_height * dpr).floor();
        if !(w >= 1.0 && h >= 1.0) {
            return None;
        }
        Some((w as u32, h as u32))
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub orientation: Quat,
    pub aspect: f32,
    pub base_fovy: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(fovy_radians: f32) -> Self {
        Self {
            orientation: Quat::IDENTITY,
            aspect: 1.0,
            base_fovy: fovy_radians,
            fovy_radians,
            znear: crate::constants::ZNEAR,
            zfar: crate::constants::ZFAR,
        }
    }

    /// World-space direction the camera looks along.
    pub fn forward(&self) -> Vec3 {
        self.orientation * REFERENCE_FORWARD
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// World to view: the inverse of the camera's rotation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.conjugate())
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio from a physical size. Returns false (and
    /// leaves the camera untouched) for an empty size.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    /// Widen the field of view with angular speed and ease back at rest.
    pub fn update_zoom(&mut self, angular_speed: f32, per_speed: f32, max_extra: f32, dt_sec: f32) {
        let target = self.base_fovy + (angular_speed * per_speed).min(max_extra);
        let alpha = 1.0 - (-dt_sec / crate::constants::ZOOM_TAU_SEC).exp();
        self.fovy_radians += (target - self.fovy_radians) * alpha;
    }

    /// Half-angle of the cone that contains the whole view frustum.
    pub fn half_diagonal_fov(&self) -> f32 {
        let tan_half_v = (self.fovy_radians * 0.5).tan();
        let tan_half_diag = tan_half_v * (1.0 + self.aspect * self.aspect).sqrt();
        tan_half_diag.atan()
    }

    /// Minimum `anchor · forward` for a tile of angular half-size
    /// `tile_half_angle` to touch the frustum.
    pub fn cull_dot(&self, tile_half_angle: f32) -> f32 {
        let angle = (self.half_diagonal_fov() + tile_half_angle * std::f32::consts::SQRT_2)
            .min(std::f32::consts::PI);
        angle.cos()
    }
}
