// Hand-gesture classification from landmark-model keypoints.
//
// The landmark model (external) hands us 21 normalized keypoints per detected
// hand in the MediaPipe hand topology. From those we derive:
//
// * a discrete pose (fist, open hand or neutral) by counting extended fingers;
// * a normalized 2D hand position in `[-1, 1]²`, mirrored for a selfie camera;
// * horizontal swipes, via `SwipeDetector` over a short time window.

use glam::{Vec2, Vec3};
use serde::Deserialize;
use std::collections::VecDeque;

// ============================================================================
// LANDMARK TOPOLOGY
// ============================================================================

/// Number of keypoints per hand produced by the landmark model.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// (pip, tip) pairs for the four non-thumb fingers.
const FINGERS: [(usize, usize); 4] = [
    (INDEX_PIP, INDEX_TIP),
    (MIDDLE_PIP, MIDDLE_TIP),
    (RING_PIP, RING_TIP),
    (PINKY_PIP, PINKY_TIP),
];

/// One detected hand. `x`/`y` are image coordinates in `[0, 1]` (origin top-left),
/// `z` is relative depth as reported by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice. Returns `None` unless it holds exactly 21 points.
    pub fn from_slice(points: &[Vec3]) -> Option<Self> {
        let points: [Vec3; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self::new(points))
    }

    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index]
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Thresholds for pose classification, debouncing and swipe detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A finger is extended when its tip is this many times farther from the
    /// reference joint than its middle joint is.
    pub extension_ratio: f32,
    /// At most this many extended fingers reads as a fist.
    pub fist_max_fingers: u8,
    /// At least this many extended fingers reads as an open hand.
    pub open_min_fingers: u8,
    /// Consecutive identical readings required before a pose is committed.
    pub debounce_frames: u32,
    /// Length of the swipe observation window, seconds.
    pub swipe_window: f32,
    /// Horizontal travel across the window (normalized units) that counts as a swipe.
    pub swipe_distance: f32,
    /// Quiet period after a swipe, seconds.
    pub swipe_cooldown: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            extension_ratio: 1.1,
            fist_max_fingers: 1,
            open_min_fingers: 4,
            debounce_frames: 5,
            swipe_window: 0.3,
            swipe_distance: 0.5,
            swipe_cooldown: 0.8,
        }
    }
}

// ============================================================================
// READINGS
// ============================================================================

/// Discrete hand pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePose {
    Fist,
    Open,
    Neutral,
}

impl GesturePose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::Open => "open",
            Self::Neutral => "neutral",
        }
    }
}

/// Per-frame gesture reading. Overwritten on every detected frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    pub is_fist: bool,
    pub is_open: bool,
    /// Hand position, mirrored so that moving your hand right moves `x` right. `[-1, 1]`.
    pub x: f32,
    /// Hand position, up is positive. `[-1, 1]`.
    pub y: f32,
    /// Extended-finger count the flags were derived from.
    pub fingers: u8,
}

impl GestureReading {
    /// Reading for a given pose at a given position (used by the simulator).
    pub fn from_pose(pose: GesturePose, position: Vec2) -> Self {
        let fingers = match pose {
            GesturePose::Fist => 0,
            GesturePose::Neutral => 2,
            GesturePose::Open => 5,
        };
        Self {
            is_fist: pose == GesturePose::Fist,
            is_open: pose == GesturePose::Open,
            x: position.x.clamp(-1.0, 1.0),
            y: position.y.clamp(-1.0, 1.0),
            fingers,
        }
    }

    pub fn pose(&self) -> GesturePose {
        if self.is_fist {
            GesturePose::Fist
        } else if self.is_open {
            GesturePose::Open
        } else {
            GesturePose::Neutral
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Number of extended fingers (0–5).
///
/// Distances are measured in the image plane only; the model's `z` is too noisy
/// to help here.
pub fn count_extended(hand: &HandLandmarks, ratio: f32) -> u8 {
    let flat = |i: usize| hand.point(i).truncate();
    let wrist = flat(WRIST);

    let mut count = FINGERS
        .iter()
        .filter(|&&(pip, tip)| flat(tip).distance(wrist) > flat(pip).distance(wrist) * ratio)
        .count() as u8;

    // Thumb folds sideways across the palm, so measure against the pinky knuckle.
    let pinky_mcp = flat(PINKY_MCP);
    if flat(THUMB_TIP).distance(pinky_mcp) > flat(THUMB_IP).distance(pinky_mcp) * ratio {
        count += 1;
    }
    count
}

/// Classify one hand into a [`GestureReading`].
pub fn classify(hand: &HandLandmarks, config: &GestureConfig) -> GestureReading {
    let fingers = count_extended(hand, config.extension_ratio);
    let is_fist = fingers <= config.fist_max_fingers;
    let is_open = !is_fist && fingers >= config.open_min_fingers;

    let anchor = hand.point(MIDDLE_MCP);
    GestureReading {
        is_fist,
        is_open,
        x: ((0.5 - anchor.x) * 2.0).clamp(-1.0, 1.0),
        y: ((0.5 - anchor.y) * 2.0).clamp(-1.0, 1.0),
        fingers,
    }
}

// ============================================================================
// SWIPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Hand moved right.
    Next,
    /// Hand moved left.
    Previous,
}

/// Detects fast horizontal hand travel over a sliding time window.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    samples: VecDeque<(f32, f32)>, // (time, x)
    cooldown_until: f32,
    window: f32,
    distance: f32,
    cooldown: f32,
}

impl SwipeDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(32),
            cooldown_until: f32::NEG_INFINITY,
            window: config.swipe_window,
            distance: config.swipe_distance,
            cooldown: config.swipe_cooldown,
        }
    }

    /// Feed one frame. `x` is `None` when no hand was seen; that breaks the window.
    pub fn update(&mut self, now: f32, x: Option<f32>) -> Option<Swipe> {
        let Some(x) = x else {
            self.samples.clear();
            return None;
        };

        self.samples.push_back((now, x));
        while let Some(&(t, _)) = self.samples.front() {
            if now - t > self.window {
                self.samples.pop_front();
            } else {
                break;
            }
        }

        if now < self.cooldown_until {
            return None;
        }

        let &(_, first) = self.samples.front()?;
        let travel = x - first;
        if travel.abs() < self.distance {
            return None;
        }

        self.samples.clear();
        self.cooldown_until = now + self.cooldown;
        Some(if travel > 0.0 { Swipe::Next } else { Swipe::Previous })
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Synthetic upright right hand, palm toward the camera.
    /// `extended[0]` is the thumb, then index..pinky.
    pub(crate) fn synthetic_hand(extended: [bool; 5], center: Vec2) -> HandLandmarks {
        let mut pts = [Vec3::ZERO; LANDMARK_COUNT];
        let o = Vec3::new(center.x, center.y, 0.0);
        // Wrist below the palm (image y grows downward).
        pts[WRIST] = o + Vec3::new(0.0, 0.15, 0.0);

        // Thumb chain goes out to the side.
        pts[1] = o + Vec3::new(-0.04, 0.10, 0.0);
        pts[2] = o + Vec3::new(-0.07, 0.07, 0.0);
        pts[THUMB_IP] = o + Vec3::new(-0.09, 0.05, 0.0);
        pts[THUMB_TIP] = if extended[0] {
            o + Vec3::new(-0.13, 0.02, 0.0)
        } else {
            o + Vec3::new(0.02, 0.03, 0.0)
        };

        let columns = [-0.03f32, 0.0, 0.03, 0.06];
        for (f, &cx) in columns.iter().enumerate() {
            let base = 5 + f * 4;
            pts[base] = o + Vec3::new(cx, 0.0, 0.0); // mcp
            pts[base + 1] = o + Vec3::new(cx, -0.05, 0.0); // pip
            pts[base + 2] = o + Vec3::new(cx, -0.08, 0.0); // dip
            pts[base + 3] = if extended[f + 1] {
                o + Vec3::new(cx, -0.11, 0.0)
            } else {
                // Curled: tip folds back toward the palm.
                o + Vec3::new(cx, 0.02, 0.0)
            };
        }
        HandLandmarks::new(pts)
    }

    #[test]
    fn counts_extended_fingers() {
        let c = Vec2::splat(0.5);
        assert_eq!(count_extended(&synthetic_hand([true; 5], c), 1.1), 5);
        assert_eq!(count_extended(&synthetic_hand([false; 5], c), 1.1), 0);
        assert_eq!(
            count_extended(&synthetic_hand([false, true, true, false, false], c), 1.1),
            2
        );
    }

    #[test]
    fn classifies_fist_open_neutral() {
        let cfg = GestureConfig::default();
        let c = Vec2::splat(0.5);

        let fist = classify(&synthetic_hand([false; 5], c), &cfg);
        assert!(fist.is_fist && !fist.is_open);
        assert_eq!(fist.pose(), GesturePose::Fist);

        // One finger is still a fist with the default threshold.
        let pointing = classify(&synthetic_hand([false, true, false, false, false], c), &cfg);
        assert_eq!(pointing.pose(), GesturePose::Fist);

        let open = classify(&synthetic_hand([true; 5], c), &cfg);
        assert_eq!(open.pose(), GesturePose::Open);

        let four = classify(&synthetic_hand([false, true, true, true, true], c), &cfg);
        assert_eq!(four.pose(), GesturePose::Open);

        let peace = classify(&synthetic_hand([false, true, true, false, false], c), &cfg);
        assert_eq!(peace.pose(), GesturePose::Neutral);
        assert_eq!(peace.fingers, 2);
    }

    #[test]
    fn thresholds_come_from_config() {
        let cfg = GestureConfig { open_min_fingers: 3, ..Default::default() };
        let three = classify(
            &synthetic_hand([false, true, true, true, false], Vec2::splat(0.5)),
            &cfg,
        );
        assert_eq!(three.pose(), GesturePose::Open);
    }

    #[test]
    fn position_is_mirrored_and_centered() {
        let cfg = GestureConfig::default();
        let centered = classify(&synthetic_hand([true; 5], Vec2::splat(0.5)), &cfg);
        assert!(centered.x.abs() < 1e-5 && centered.y.abs() < 1e-5);

        // Hand on the image's left edge = user's right in a selfie view.
        let left_of_image = classify(&synthetic_hand([true; 5], Vec2::new(0.1, 0.2)), &cfg);
        assert!(left_of_image.x > 0.7);
        assert!(left_of_image.y > 0.5);
    }

    #[test]
    fn from_slice_requires_21_points() {
        assert!(HandLandmarks::from_slice(&[Vec3::ZERO; 20]).is_none());
        assert!(HandLandmarks::from_slice(&[Vec3::ZERO; 21]).is_some());
    }

    #[test]
    fn swipe_fires_once_then_cools_down() {
        let mut d = SwipeDetector::new(&GestureConfig::default());
        assert_eq!(d.update(0.0, Some(-0.4)), None);
        assert_eq!(d.update(0.1, Some(0.0)), None);
        assert_eq!(d.update(0.2, Some(0.3)), Some(Swipe::Next));
        // Still moving, but inside the cooldown.
        assert_eq!(d.update(0.3, Some(-0.5)), None);
        assert_eq!(d.update(0.4, Some(0.5)), None);
    }

    #[test]
    fn slow_drift_is_not_a_swipe() {
        let mut d = SwipeDetector::new(&GestureConfig::default());
        let mut fired = false;
        for i in 0..100 {
            let t = i as f32 * 0.05;
            fired |= d.update(t, Some(-0.9 + t * 0.3)).is_some();
        }
        assert!(!fired);
    }

    #[test]
    fn swipe_left_and_lost_hand_breaks_window() {
        let mut d = SwipeDetector::new(&GestureConfig::default());
        d.update(0.0, Some(0.5));
        d.update(0.05, None);
        assert_eq!(d.update(0.1, Some(-0.2)), None);
        assert_eq!(d.update(0.2, Some(-0.75)), Some(Swipe::Previous));
    }
}
