//! Pointer-driven rotation with inertia.
//!
//! Pointer positions are CSS pixels. While dragging, accumulated pointer
//! travel is turned into a rotation about an axis in the camera's basis,
//! so the orientation after a drag depends only on the deltas and the
//! sensitivity, not on how they were split across frames. After release
//! the angular velocity decays by a fixed fraction per second.

use crate::config::MenuConfig;
use crate::constants::RELEASE_VELOCITY_TAU_SEC;
use glam::{Quat, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Inertial,
}

/// Outcome of a pointer release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Travel stayed within the tap slop; no rotation, no inertia.
    Tap,
    /// Released with enough angular velocity to keep spinning.
    Fling,
    /// Released while (nearly) still.
    Settle,
    /// No drag was in progress.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct InteractionController {
    phase: DragPhase,
    /// World-space axis scaled by speed, rad/s.
    angular_velocity: Vec3,
    last_pointer: Option<Vec2>,
    pending_delta: Vec2,
    travel: f32,
    engaged: bool,

    sensitivity: f32,
    tap_slop: f32,
    retain_per_sec: f32,
    epsilon: f32,
    max_speed: f32,
}

impl InteractionController {
    pub fn new(config: &MenuConfig) -> Self {
        Self {
            phase: DragPhase::Idle,
            angular_velocity: Vec3::ZERO,
            last_pointer: None,
            pending_delta: Vec2::ZERO,
            travel: 0.0,
            engaged: false,
            sensitivity: config.drag_sensitivity,
            tap_slop: config.tap_slop_px,
            retain_per_sec: config.inertia_retain_per_sec,
            epsilon: config.settle_epsilon,
            max_speed: config.max_angular_speed,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn angular_speed(&self) -> f32 {
        self.angular_velocity.length()
    }

    pub fn last_pointer(&self) -> Option<Vec2> {
        self.last_pointer
    }

    /// Dragging or still spinning down.
    pub fn is_moving(&self) -> bool {
        self.phase != DragPhase::Idle
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        if self.phase == DragPhase::Inertial {
            log::debug!("[input] grab cancels inertia at {:.3} rad/s", self.angular_speed());
        }
        self.phase = DragPhase::Dragging;
        self.angular_velocity = Vec3::ZERO;
        self.last_pointer = Some(pos);
        self.pending_delta = Vec2::ZERO;
        self.travel = 0.0;
        self.engaged = false;
    }

    /// Returns true if the move belongs to an active drag.
    pub fn pointer_move(&mut self, pos: Vec2) -> bool {
        if self.phase != DragPhase::Dragging {
            return false;
        }
        if let Some(last) = self.last_pointer {
            let delta = pos - last;
            self.pending_delta += delta;
            self.travel += delta.length();
            if !self.engaged && self.travel > self.tap_slop {
                self.engaged = true;
                log::info!("[input] drag engaged after {:.1}px", self.travel);
            }
        }
        self.last_pointer = Some(pos);
        true
    }

    pub fn pointer_up(&mut self, pos: Vec2) -> Release {
        if self.phase != DragPhase::Dragging {
            return Release::Ignored;
        }
        self.pointer_move(pos);
        self.last_pointer = None;
        if !self.engaged {
            self.pending_delta = Vec2::ZERO;
            self.angular_velocity = Vec3::ZERO;
            self.phase = DragPhase::Idle;
            return Release::Tap;
        }
        self.finish_drag()
    }

    /// End a drag without ever reporting a tap (pointer lost, focus lost).
    pub fn pointer_cancel(&mut self) {
        if self.phase != DragPhase::Dragging {
            return;
        }
        self.last_pointer = None;
        if !self.engaged {
            self.pending_delta = Vec2::ZERO;
            self.angular_velocity = Vec3::ZERO;
            self.phase = DragPhase::Idle;
            return;
        }
        self.finish_drag();
    }

    /// Start spinning as if released with `angular_velocity` (rad/s, world space).
    pub fn start_inertia(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity.clamp_length_max(self.max_speed);
        self.last_pointer = None;
        self.pending_delta = Vec2::ZERO;
        self.phase = if self.angular_velocity.length() >= self.epsilon {
            DragPhase::Inertial
        } else {
            self.angular_velocity = Vec3::ZERO;
            DragPhase::Idle
        };
    }

    fn finish_drag(&mut self) -> Release {
        if self.angular_velocity.length() >= self.epsilon {
            self.phase = DragPhase::Inertial;
            log::info!("[input] fling at {:.3} rad/s", self.angular_speed());
            Release::Fling
        } else {
            self.angular_velocity = Vec3::ZERO;
            self.phase = DragPhase::Idle;
            Release::Settle
        }
    }

    /// Advance by `dt_sec`, rotating `orientation` in place. Returns true if
    /// the orientation changed.
    pub fn update(&mut self, dt_sec: f32, orientation: &mut Quat) -> bool {
        let dt = dt_sec.max(0.0);
        let mut changed = false;

        // Pointer travel not yet applied; may also arrive just before release.
        let drag_rotation = self.apply_pending(orientation);
        changed |= drag_rotation.is_some();

        match self.phase {
            DragPhase::Idle => {}
            DragPhase::Dragging => {
                if dt > 0.0 {
                    let instantaneous = drag_rotation
                        .map(|(axis, angle)| axis * (angle / dt))
                        .unwrap_or(Vec3::ZERO);
                    let alpha = 1.0 - (-dt / RELEASE_VELOCITY_TAU_SEC).exp();
                    self.angular_velocity += (instantaneous - self.angular_velocity) * alpha;
                    self.angular_velocity = self.angular_velocity.clamp_length_max(self.max_speed);
                }
            }
            DragPhase::Inertial => {
                if dt > 0.0 {
                    // Exact integral of w0 * r^t over the frame, so the total
                    // rotation does not depend on the frame rate.
                    let ln_r = self.retain_per_sec.ln();
                    let decay = self.retain_per_sec.powf(dt);
                    let swept = self.angular_velocity * ((decay - 1.0) / ln_r);
                    if swept.length_squared() > 0.0 {
                        *orientation = (Quat::from_scaled_axis(swept) * *orientation).normalize();
                        changed = true;
                    }
                    self.angular_velocity *= decay;
                }
                if self.angular_velocity.length() < self.epsilon {
                    self.angular_velocity = Vec3::ZERO;
                    self.phase = DragPhase::Idle;
                    log::info!("[input] settled");
                }
            }
        }
        changed
    }

    /// Rotate by the pointer travel accumulated since the last frame.
    /// Returns the world axis and angle applied.
    fn apply_pending(&mut self, orientation: &mut Quat) -> Option<(Vec3, f32)> {
        if !self.engaged || self.pending_delta == Vec2::ZERO {
            return None;
        }
        let delta = std::mem::take(&mut self.pending_delta);
        let angle = delta.length() * self.sensitivity;
        if angle <= 0.0 {
            return None;
        }
        // Screen +x yaws about camera up, screen +y (down) pitches about camera right.
        let local_axis = Vec3::new(delta.y, delta.x, 0.0).normalize();
        let world_axis = *orientation * local_axis;
        *orientation = (*orientation * Quat::from_axis_angle(local_axis, angle)).normalize();
        Some((world_axis, angle))
    }
}
