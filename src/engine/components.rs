// Core ECS components and resources for the memory-tree scene.
// Entities are plain records; all behaviour lives in systems.rs.

use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use crate::app_state::Mode;

/// Placement of an entity in world space.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale:    Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale:    Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// RGB colour for rendering. `emissive` in [0, 1] blends from lit to self-lit.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub emissive: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, emissive: 0.0 }
    }

    pub const fn glowing(r: f32, g: f32, b: f32, emissive: f32) -> Self {
        Self { r, g, b, emissive }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.emissive]
    }
}

/// Velocity of an entity in 3D space (units per second)
#[derive(Component, Debug, Clone, Copy)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self { linear }
    }
}

/// Seconds left before the entity is despawned.
#[derive(Component, Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
    pub total:     f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds, total: seconds }
    }

    /// 1.0 at spawn, 0.0 at expiry.
    pub fn fraction(&self) -> f32 {
        if self.total > 0.0 { (self.remaining / self.total).clamp(0.0, 1.0) } else { 0.0 }
    }
}

/// Self-rotation about the local Y axis, radians per second.
#[derive(Component, Debug, Clone, Copy)]
pub struct Spin {
    pub rate: f32,
}

/// Which procedural mesh an instanced entity is drawn with.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Bauble,
    Gift,
    Star,
    /// Small octahedron used by lights, snow and sparkles.
    Spark,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [ShapeKind::Bauble, ShapeKind::Gift, ShapeKind::Star, ShapeKind::Spark];

    pub fn index(&self) -> usize {
        match self {
            ShapeKind::Bauble => 0,
            ShapeKind::Gift   => 1,
            ShapeKind::Star   => 2,
            ShapeKind::Spark  => 3,
        }
    }
}

/// The three candidate positions a decoration or light moves between.
#[derive(Component, Debug, Clone, Copy)]
pub struct Formation {
    pub tree:    Vec3,
    pub heart:   Vec3,
    pub scatter: Vec3,
    /// Uniform scale in tree mode. Other modes scale relative to this.
    pub base_scale: f32,
}

impl Formation {
    pub fn position(&self, mode: Mode) -> Vec3 {
        match mode {
            Mode::Tree      => self.tree,
            Mode::Scattered => self.scatter,
            Mode::Zoom      => self.heart,
        }
    }

    pub fn scale(&self, mode: Mode) -> f32 {
        match mode {
            Mode::Tree      => self.base_scale,
            Mode::Scattered => self.base_scale * 1.15,
            Mode::Zoom      => self.base_scale * 0.8,
        }
    }
}

/// Where an entity is heading and how fast it eases there.
/// Target systems write it; `tween_system` consumes it.
#[derive(Component, Debug, Clone, Copy)]
pub struct Tween {
    pub position: Vec3,
    pub scale:    Vec3,
    /// Exponential smoothing rate (1/s). Higher is snappier.
    pub rate:     f32,
}

/// Brightness oscillation for tree lights.
#[derive(Component, Debug, Clone, Copy)]
pub struct Twinkle {
    pub phase: f32,
    pub speed: f32,
    pub base:  Color,
}

/// Ambient falling snow.
#[derive(Component, Debug, Clone, Copy)]
pub struct Snowflake;

/// One-shot burst particle spawned on mode changes.
#[derive(Component, Debug, Clone, Copy)]
pub struct Sparkle {
    pub base: Color,
}

/// A photo plane. `slot` indexes the renderer's texture list and the photo library.
#[derive(Component, Debug, Clone, Copy)]
pub struct PhotoCard {
    pub slot:    usize,
    pub aspect:  f32,
    pub tree:    Vec3,
    pub scatter: Vec3,
}

impl PhotoCard {
    /// Plane half-extents at unit scale: height 1, width follows the aspect ratio.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.aspect.max(0.05), 1.0, 1.0)
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Frame timing, written once per frame before systems run.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneClock {
    pub elapsed: f32,
    pub dt:      f32,
}

/// Mode snapshot the target systems read.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneState {
    pub mode:        Mode,
    pub focus:       usize,
    pub photo_count: usize,
}

/// Camera-relative anchor for the zoomed photo.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ViewAnchor {
    /// Point in front of the camera where the focused photo settles.
    pub zoom_point: Vec3,
    /// Camera eye, used for billboarding.
    pub eye:        Vec3,
}

impl Default for ViewAnchor {
    fn default() -> Self {
        Self { zoom_point: Vec3::new(0.0, 0.0, 8.0), eye: Vec3::new(0.0, 0.0, 28.0) }
    }
}

/// Axis-aligned box snow wraps inside: x/z in `[-half, half]`, y in `[floor, ceiling]`.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SnowBounds {
    pub half_extent: f32,
    pub floor:       f32,
    pub ceiling:     f32,
}
