// Application state machine: three display modes driven by debounced gestures,
// plus swipe-driven photo focus cycling.
//
//   fist    → Tree
//   neutral → Scattered
//   open    → Zoom (only when at least one photo exists, otherwise Scattered)
//
// A pose acts once, when it is committed. Holding it keeps the mode; keyboard
// overrides stick until the next different pose is committed.

use crate::gesture::{GestureConfig, GesturePose, GestureReading, Swipe, SwipeDetector};
use glam::Vec2;

/// How quickly the remembered hand position relaxes to the centre once the
/// hand leaves the frame (1/s).
const HAND_DECAY_RATE: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Tree,
    Scattered,
    Zoom,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "TREE",
            Self::Scattered => "SCATTERED",
            Self::Zoom => "ZOOM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    ModeChanged { from: Mode, to: Mode },
    FocusChanged { index: usize },
    PoseCommitted(GesturePose),
}

pub struct AppState {
    mode: Mode,
    focus: usize,
    photo_count: usize,

    /// Candidate pose and how many consecutive frames it has been seen.
    pending: Option<(GesturePose, u32)>,
    committed: Option<GesturePose>,
    debounce_frames: u32,

    swipe: SwipeDetector,
    last_reading: Option<GestureReading>,
    hand: Vec2,
    last_time: Option<f32>,
}

impl AppState {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            mode: Mode::Tree,
            focus: 0,
            photo_count: 0,
            pending: None,
            committed: None,
            debounce_frames: config.debounce_frames.max(1),
            swipe: SwipeDetector::new(config),
            last_reading: None,
            hand: Vec2::ZERO,
            last_time: None,
        }
    }

    pub fn mode(&self) -> Mode { self.mode }
    pub fn focus(&self) -> usize { self.focus }
    pub fn photo_count(&self) -> usize { self.photo_count }
    pub fn last_reading(&self) -> Option<GestureReading> { self.last_reading }

    /// Last seen hand position, relaxing toward the centre while no hand is visible.
    pub fn hand(&self) -> Vec2 { self.hand }

    /// Feed one gesture frame. `reading` is `None` when no hand was detected.
    /// `now` is monotonic seconds since startup.
    pub fn update(&mut self, reading: Option<GestureReading>, now: f32) -> Vec<AppEvent> {
        let dt = self.last_time.map_or(0.0, |t| (now - t).max(0.0));
        self.last_time = Some(now);

        let mut events = Vec::new();
        self.last_reading = reading;

        let Some(reading) = reading else {
            self.pending = None;
            self.swipe.update(now, None);
            self.hand *= (-HAND_DECAY_RATE * dt).exp();
            return events;
        };

        self.hand = reading.position();

        // ── Debounce ────────────────────────────────────────────────────────
        let pose = reading.pose();
        let seen = match self.pending {
            Some((p, n)) if p == pose => n.saturating_add(1),
            _ => 1,
        };
        self.pending = Some((pose, seen));

        if seen >= self.debounce_frames && self.committed != Some(pose) {
            self.committed = Some(pose);
            log::debug!("pose committed: {}", pose.as_str());
            events.push(AppEvent::PoseCommitted(pose));
            let target = self.mode_for(pose);
            events.extend(self.set_mode(target));
        }

        // ── Swipe ───────────────────────────────────────────────────────────
        if let Some(swipe) = self.swipe.update(now, Some(reading.x)) {
            if self.mode == Mode::Zoom && self.photo_count > 0 {
                log::debug!("swipe {:?}", swipe);
                let step = match swipe {
                    Swipe::Next => 1,
                    Swipe::Previous => -1,
                };
                events.extend(self.cycle_focus(step));
            }
        }

        events
    }

    /// Switch mode directly (keyboard override). Zoom still needs photos.
    pub fn force_mode(&mut self, mode: Mode) -> Option<AppEvent> {
        let mode = if mode == Mode::Zoom && self.photo_count == 0 {
            Mode::Scattered
        } else {
            mode
        };
        self.set_mode(mode)
    }

    /// Move focus by `step` photos, wrapping at both ends.
    pub fn cycle_focus(&mut self, step: i32) -> Option<AppEvent> {
        if self.photo_count == 0 {
            return None;
        }
        let n = self.photo_count as i64;
        let next = (self.focus as i64 + step as i64).rem_euclid(n) as usize;
        if next == self.focus {
            return None;
        }
        self.focus = next;
        Some(AppEvent::FocusChanged { index: next })
    }

    /// Photo library size changed (upload or clear).
    pub fn photos_changed(&mut self, count: usize) -> Vec<AppEvent> {
        self.photo_count = count;
        let mut events = Vec::new();
        if count == 0 {
            if self.focus != 0 {
                self.focus = 0;
                events.push(AppEvent::FocusChanged { index: 0 });
            }
            if self.mode == Mode::Zoom {
                events.extend(self.set_mode(Mode::Scattered));
            }
        } else if self.focus >= count {
            self.focus = count - 1;
            events.push(AppEvent::FocusChanged { index: self.focus });
        }
        events
    }

    /// Back to the initial tree. Photo count is left to `photos_changed`.
    pub fn reset(&mut self) -> Vec<AppEvent> {
        self.pending = None;
        self.committed = None;
        self.swipe.reset();
        let mut events = Vec::new();
        if self.focus != 0 {
            self.focus = 0;
            events.push(AppEvent::FocusChanged { index: 0 });
        }
        events.extend(self.set_mode(Mode::Tree));
        events
    }

    fn mode_for(&self, pose: GesturePose) -> Mode {
        match pose {
            GesturePose::Fist => Mode::Tree,
            GesturePose::Neutral => Mode::Scattered,
            GesturePose::Open if self.photo_count > 0 => Mode::Zoom,
            GesturePose::Open => Mode::Scattered,
        }
    }

    fn set_mode(&mut self, to: Mode) -> Option<AppEvent> {
        if self.mode == to {
            return None;
        }
        let from = self.mode;
        self.mode = to;
        Some(AppEvent::ModeChanged { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(pose: GesturePose, x: f32) -> Option<GestureReading> {
        Some(GestureReading::from_pose(pose, Vec2::new(x, 0.0)))
    }

    /// Feed the same pose `frames` times, 1/30 s apart, starting at `t`.
    fn hold(state: &mut AppState, pose: GesturePose, frames: u32, t: &mut f32) -> Vec<AppEvent> {
        let mut all = Vec::new();
        for _ in 0..frames {
            *t += 1.0 / 30.0;
            all.extend(state.update(reading(pose, 0.0), *t));
        }
        all
    }

    fn mode_changes(events: &[AppEvent]) -> Vec<Mode> {
        events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ModeChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_in_tree() {
        let state = AppState::new(&GestureConfig::default());
        assert_eq!(state.mode(), Mode::Tree);
        assert_eq!(state.focus(), 0);
    }

    #[test]
    fn pose_needs_debounce_frames() {
        let mut state = AppState::new(&GestureConfig::default());
        let mut t = 0.0;
        assert!(mode_changes(&hold(&mut state, GesturePose::Neutral, 4, &mut t)).is_empty());
        assert_eq!(state.mode(), Mode::Tree);
        let events = hold(&mut state, GesturePose::Neutral, 1, &mut t);
        assert_eq!(mode_changes(&events), vec![Mode::Scattered]);
    }

    #[test]
    fn flicker_resets_candidate() {
        let mut state = AppState::new(&GestureConfig::default());
        let mut t = 0.0;
        for _ in 0..10 {
            hold(&mut state, GesturePose::Neutral, 3, &mut t);
            hold(&mut state, GesturePose::Fist, 1, &mut t);
        }
        assert_eq!(state.mode(), Mode::Tree);
        // A lost hand also breaks the run.
        hold(&mut state, GesturePose::Neutral, 3, &mut t);
        state.update(None, t + 0.01);
        t += 0.01;
        hold(&mut state, GesturePose::Neutral, 3, &mut t);
        assert_eq!(state.mode(), Mode::Tree);
    }

    #[test]
    fn open_hand_zooms_only_with_photos() {
        let mut state = AppState::new(&GestureConfig::default());
        let mut t = 0.0;
        hold(&mut state, GesturePose::Open, 5, &mut t);
        assert_eq!(state.mode(), Mode::Scattered);

        state.photos_changed(2);
        hold(&mut state, GesturePose::Fist, 5, &mut t);
        assert_eq!(state.mode(), Mode::Tree);
        hold(&mut state, GesturePose::Open, 5, &mut t);
        assert_eq!(state.mode(), Mode::Zoom);
    }

    #[test]
    fn clearing_photos_leaves_zoom() {
        let mut state = AppState::new(&GestureConfig::default());
        state.photos_changed(3);
        assert!(state.force_mode(Mode::Zoom).is_some());
        state.cycle_focus(2);
        let events = state.photos_changed(0);
        assert_eq!(state.mode(), Mode::Scattered);
        assert_eq!(state.focus(), 0);
        assert!(events.contains(&AppEvent::FocusChanged { index: 0 }));
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut state = AppState::new(&GestureConfig::default());
        assert_eq!(state.cycle_focus(1), None);
        state.photos_changed(3);
        assert_eq!(state.cycle_focus(-1), Some(AppEvent::FocusChanged { index: 2 }));
        assert_eq!(state.cycle_focus(1), Some(AppEvent::FocusChanged { index: 0 }));
        assert_eq!(state.cycle_focus(4), Some(AppEvent::FocusChanged { index: 1 }));
    }

    #[test]
    fn shrinking_library_clamps_focus() {
        let mut state = AppState::new(&GestureConfig::default());
        state.photos_changed(5);
        state.cycle_focus(4);
        state.photos_changed(2);
        assert_eq!(state.focus(), 1);
    }

    #[test]
    fn swipe_cycles_only_in_zoom() {
        let mut state = AppState::new(&GestureConfig::default());
        state.photos_changed(3);
        let mut t = 0.0;
        hold(&mut state, GesturePose::Open, 5, &mut t);
        assert_eq!(state.mode(), Mode::Zoom);

        // Fast move right from the centre.
        let mut events = Vec::new();
        for x in [0.2, 0.4, 0.6] {
            t += 1.0 / 30.0;
            events.extend(state.update(reading(GesturePose::Open, x), t));
        }
        assert!(events.contains(&AppEvent::FocusChanged { index: 1 }));

        // Same motion in Scattered mode does nothing.
        state.force_mode(Mode::Scattered);
        t += 2.0;
        for x in [0.6, 0.3, 0.0, -0.3] {
            t += 1.0 / 30.0;
            state.update(reading(GesturePose::Open, x), t);
        }
        assert_eq!(state.focus(), 1);
    }

    #[test]
    fn reset_returns_to_tree() {
        let mut state = AppState::new(&GestureConfig::default());
        state.photos_changed(2);
        state.force_mode(Mode::Zoom);
        state.cycle_focus(1);
        let events = state.reset();
        assert_eq!(state.mode(), Mode::Tree);
        assert_eq!(state.focus(), 0);
        assert_eq!(mode_changes(&events), vec![Mode::Tree]);
    }

    #[test]
    fn hand_relaxes_when_lost() {
        let mut state = AppState::new(&GestureConfig::default());
        state.update(reading(GesturePose::Neutral, 0.8), 0.0);
        assert!((state.hand().x - 0.8).abs() < 1e-6);
        state.update(None, 1.0);
        state.update(None, 2.0);
        assert!(state.hand().x < 0.8 * 0.1);
    }

    #[test]
    fn forced_zoom_without_photos_scatters() {
        let mut state = AppState::new(&GestureConfig::default());
        assert_eq!(
            state.force_mode(Mode::Zoom),
            Some(AppEvent::ModeChanged { from: Mode::Tree, to: Mode::Scattered })
        );
        assert_eq!(state.mode(), Mode::Scattered);
        assert_eq!(state.force_mode(Mode::Zoom), None);
    }

    #[test]
    fn keyboard_override_sticks_while_pose_held() {
        let mut state = AppState::new(&GestureConfig::default());
        let mut t = 0.0;
        hold(&mut state, GesturePose::Neutral, 5, &mut t);
        assert_eq!(state.mode(), Mode::Scattered);

        state.force_mode(Mode::Tree);
        let events = hold(&mut state, GesturePose::Neutral, 30, &mut t);
        assert!(mode_changes(&events).is_empty());
        assert_eq!(state.mode(), Mode::Tree);

        // A different pose committed afterwards takes over again.
        hold(&mut state, GesturePose::Fist, 5, &mut t);
        hold(&mut state, GesturePose::Neutral, 5, &mut t);
        assert_eq!(state.mode(), Mode::Scattered);
    }
}
