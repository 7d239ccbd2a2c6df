// Orbit camera around the tree.
//
// Camera model:
//   - Looks at a fixed target on the tree's vertical axis
//   - Yaw drifts slowly in TREE mode; otherwise it follows the hand's x
//   - Pitch follows the hand's y within a small band
//   - Mouse wheel zooms by adjusting distance along the look vector
//   - Hand steering is eased so landmark jitter never reaches the view

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};
use super::input::InputState;
use crate::app_state::Mode;

pub struct OrbitCamera {
    /// Point the camera orbits and looks at.
    pub target: Vec3,

    /// Distance from target along the look direction.
    /// Private: always clamped to [min_distance, max_distance] in update(). Use distance() to read.
    distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    /// Elevation in radians (0 = level, positive = looking down on the tree).
    pitch: f32,
    pub base_pitch: f32,
    /// How far the hand can tilt the view up or down, radians.
    pub pitch_range: f32,

    /// Horizontal rotation in radians (0 = camera on +Z looking toward -Z).
    yaw: f32,
    /// Auto-rotation accumulator, synced to the hand-steered yaw outside TREE.
    drift_yaw: f32,
    /// How far the hand can swing the view left or right, radians.
    pub yaw_range: f32,
    /// Auto-rotation in TREE mode, radians per second.
    pub drift_speed: f32,
    /// Smoothing rate for hand steering (1/s).
    pub follow_rate: f32,

    pub fov: f32,
    pub near: f32,
    pub far: f32,

    /// Zoom change (in distance units) per scroll line.
    pub zoom_speed: f32,

    /// How far in front of the eye a zoomed photo settles.
    pub focus_distance: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 28.0,
            min_distance: 14.0,
            max_distance: 48.0,
            pitch: 8.0_f32.to_radians(),
            base_pitch: 8.0_f32.to_radians(),
            pitch_range: 20.0_f32.to_radians(),
            yaw: 0.0,
            drift_yaw: 0.0,
            yaw_range: 60.0_f32.to_radians(),
            drift_speed: 0.15,
            follow_rate: 2.5,
            fov: 45.0_f32.to_radians(),
            near: 0.1,
            far: 200.0,
            zoom_speed: 2.0,
            focus_distance: 16.0,
        }
    }

    /// Update camera position for this frame. `hand` is the hand position in
    /// `[-1, 1]²`, already relaxed toward the centre when no hand is visible.
    pub fn update(&mut self, input: &InputState, mode: Mode, hand: Vec2, dt: f32) {
        let k = 1.0 - (-self.follow_rate * dt.max(0.0)).exp();

        let yaw_goal = match mode {
            Mode::Tree => {
                self.drift_yaw = wrap_angle(self.drift_yaw + self.drift_speed * dt);
                self.drift_yaw
            }
            // Returning to TREE resumes drifting from the current view.
            _ => {
                self.drift_yaw = self.yaw;
                hand.x.clamp(-1.0, 1.0) * self.yaw_range
            }
        };
        let rate = if mode == Mode::Tree { 1.0 } else { k };
        self.yaw = wrap_angle(self.yaw + wrap_angle(yaw_goal - self.yaw) * rate);

        let pitch_goal = self.base_pitch - hand.y.clamp(-1.0, 1.0) * self.pitch_range;
        self.pitch += (pitch_goal - self.pitch) * k;

        // Zoom: scroll up (positive delta) zooms in (decreases distance)
        self.distance -= input.scroll_delta * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// World-space position of the camera eye.
    pub fn eye(&self) -> Vec3 {
        self.target + self.eye_offset()
    }

    /// Unit vector from the eye toward the target.
    pub fn forward(&self) -> Vec3 {
        -self.eye_offset().normalize_or_zero()
    }

    /// Where the focused photo should sit: on the view axis, in front of the eye.
    pub fn zoom_point(&self) -> Vec3 {
        let d = self.focus_distance.min(self.distance * 0.8);
        self.eye() + self.forward() * d
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn distance(&self) -> f32 { self.distance }
    pub fn yaw(&self) -> f32 { self.yaw }
    pub fn pitch(&self) -> f32 { self.pitch }

    // Offset from target to camera eye based on pitch, yaw, and distance.
    fn eye_offset(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos() * self.distance,
            self.pitch.sin() * self.distance,
            self.yaw.cos() * self.pitch.cos() * self.distance,
        )
    }
}

/// Wrap an angle into `[-π, π)`.
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}
