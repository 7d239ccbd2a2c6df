// Input state tracking for keyboard and mouse
// Abstracts winit events into a queryable per-frame snapshot, and doubles as
// the gesture simulator when no landmark model is running.

use std::collections::HashSet;
use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use crate::gesture::{GesturePose, GestureReading};

/// Held keys that stand in for hand poses in the simulator.
pub const SIM_FIST_KEY: KeyCode = KeyCode::KeyF;
pub const SIM_OPEN_KEY: KeyCode = KeyCode::KeyO;

pub struct InputState {
    // Keyboard
    keys_held: HashSet<KeyCode>,
    // Pressed this frame (not repeats), cleared in end_frame()
    keys_pressed: HashSet<KeyCode>,

    // Mouse
    pub mouse_position: (f32, f32),
    pub cursor_inside: bool,

    // Scroll: accumulated vertical scroll this frame, reset in end_frame()
    pub scroll_delta: f32,

    pub window_size: (u32, u32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            mouse_position: (0.0, 0.0),
            cursor_inside: false,
            scroll_delta: 0.0,
            window_size: (0, 0),
        }
    }

    /// Feed a winit WindowEvent into the input state.
    /// Call this once per event before the app's own event handling.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !event.repeat {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_held.insert(key);
                        }
                        ElementState::Released => { self.keys_held.remove(&key); }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = (position.x as f32, position.y as f32);
                self.cursor_inside = true;
            }
            WindowEvent::CursorEntered { .. } => self.cursor_inside = true,
            WindowEvent::CursorLeft { .. } => self.cursor_inside = false,
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.scroll_delta += y;
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                // Releases are not delivered to an unfocused window.
                self.keys_held.clear();
            }
            _ => {}
        }
    }

    /// Call once per frame after update() and render() have consumed input.
    /// Resets per-frame accumulators.
    pub fn end_frame(&mut self) {
        self.scroll_delta = 0.0;
        self.keys_pressed.clear();
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Mouse position mapped to `[-1, 1]²`, +x right and +y up.
    pub fn mouse_normalized(&self) -> Vec2 {
        let (w, h) = (self.window_size.0 as f32, self.window_size.1 as f32);
        if w <= 0.0 || h <= 0.0 {
            return Vec2::ZERO;
        }
        let (mx, my) = self.mouse_position;
        Vec2::new(mx / w * 2.0 - 1.0, 1.0 - my / h * 2.0).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
    }

    /// Gesture reading synthesized from keyboard and mouse.
    ///
    /// The "hand" is in frame while the cursor is over the window; its position
    /// is the cursor. Hold F for a fist, O for an open hand, nothing for neutral.
    pub fn simulated_reading(&self) -> Option<GestureReading> {
        if !self.cursor_inside {
            return None;
        }
        let pose = if self.is_key_held(SIM_FIST_KEY) {
            GesturePose::Fist
        } else if self.is_key_held(SIM_OPEN_KEY) {
            GesturePose::Open
        } else {
            GesturePose::Neutral
        };
        Some(GestureReading::from_pose(pose, self.mouse_normalized()))
    }

    #[cfg(test)]
    pub(crate) fn press(&mut self, key: KeyCode) {
        self.keys_held.insert(key);
        self.keys_pressed.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hand_while_cursor_outside() {
        let input = InputState::new();
        assert!(input.simulated_reading().is_none());
    }

    #[test]
    fn keys_select_pose() {
        let mut input = InputState::new();
        input.cursor_inside = true;
        input.window_size = (800, 600);
        input.mouse_position = (400.0, 300.0);

        let neutral = input.simulated_reading().unwrap();
        assert_eq!(neutral.pose(), GesturePose::Neutral);
        assert_eq!(neutral.position(), Vec2::ZERO);

        input.press(SIM_FIST_KEY);
        assert_eq!(input.simulated_reading().unwrap().pose(), GesturePose::Fist);
    }

    #[test]
    fn mouse_maps_to_unit_square() {
        let mut input = InputState::new();
        input.window_size = (200, 100);
        input.mouse_position = (200.0, 0.0);
        assert_eq!(input.mouse_normalized(), Vec2::new(1.0, 1.0));
        input.mouse_position = (0.0, 100.0);
        assert_eq!(input.mouse_normalized(), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn presses_last_one_frame() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyR);
        assert!(input.just_pressed(KeyCode::KeyR));
        input.end_frame();
        assert!(!input.just_pressed(KeyCode::KeyR));
        assert!(input.is_key_held(KeyCode::KeyR));
    }
}
