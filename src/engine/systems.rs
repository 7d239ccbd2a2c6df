// ECS systems for updating the scene each frame.
// All systems are exclusive (`fn(&mut World)`) and run in a fixed chain:
// targets first, then motion, then cosmetic effects.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use super::components::*;
use crate::app_state::Mode;

/// Photo scale (half-height in world units) per situation.
pub const PHOTO_SCALE_TREE:    f32 = 0.7;
pub const PHOTO_SCALE_SCATTER: f32 = 1.2;
pub const PHOTO_SCALE_FOCUSED: f32 = 3.2;
pub const PHOTO_SCALE_ASIDE:   f32 = 0.9;
/// Unfocused photos move this much farther out while zoomed.
const ZOOM_PUSH_OUT: f32 = 1.5;

/// Build the per-frame schedule.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            formation_system,
            photo_target_system,
            tween_system,
            movement_system,
            bounds_system,
            spin_system,
            billboard_system,
            twinkle_system,
            sparkle_system,
            lifetime_system,
        )
            .chain(),
    );
    schedule
}

/// Frame-rate independent exponential ease of `current` toward `target`.
pub fn ease(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let k = 1.0 - (-rate.max(0.0) * dt.max(0.0)).exp();
    current + (target - current) * k
}

/// Point decorations and lights at their formation for the current mode.
pub fn formation_system(world: &mut World) {
    let mode = world.resource::<SceneState>().mode;
    let mut query = world.query::<(&Formation, &mut Tween)>();
    for (formation, mut tween) in query.iter_mut(world) {
        tween.position = formation.position(mode);
        tween.scale = Vec3::splat(formation.scale(mode));
    }
}

/// Where a photo should be and how big, given the mode.
pub fn photo_target(card: &PhotoCard, state: &SceneState, anchor: &ViewAnchor) -> (Vec3, f32) {
    match state.mode {
        Mode::Tree      => (card.tree, PHOTO_SCALE_TREE),
        Mode::Scattered => (card.scatter, PHOTO_SCALE_SCATTER),
        Mode::Zoom if card.slot == state.focus => (anchor.zoom_point, PHOTO_SCALE_FOCUSED),
        Mode::Zoom      => (card.scatter * ZOOM_PUSH_OUT, PHOTO_SCALE_ASIDE),
    }
}

pub fn photo_target_system(world: &mut World) {
    let state = *world.resource::<SceneState>();
    let anchor = *world.resource::<ViewAnchor>();
    let mut query = world.query::<(&PhotoCard, &mut Tween)>();
    for (card, mut tween) in query.iter_mut(world) {
        let (position, scale) = photo_target(card, &state, &anchor);
        tween.position = position;
        tween.scale = card.extent() * scale;
    }
}

/// Ease every tweened entity toward its target.
pub fn tween_system(world: &mut World) {
    let dt = world.resource::<SceneClock>().dt;
    let mut query = world.query::<(&mut Transform, &Tween)>();
    for (mut transform, tween) in query.iter_mut(world) {
        transform.position = ease(transform.position, tween.position, tween.rate, dt);
        transform.scale = ease(transform.scale, tween.scale, tween.rate, dt);
    }
}

/// Update entity positions based on velocity
pub fn movement_system(world: &mut World) {
    let dt = world.resource::<SceneClock>().dt;
    let mut query = world.query::<(&mut Transform, &Velocity)>();
    for (mut transform, velocity) in query.iter_mut(world) {
        transform.position += velocity.linear * dt;
    }
}

/// Keep snow inside its box: wrap on X/Z, respawn at the ceiling when it hits the floor.
pub fn bounds_system(world: &mut World) {
    let Some(bounds) = world.get_resource::<SnowBounds>().copied() else {
        return;
    };
    let half = bounds.half_extent;
    let mut query = world.query_filtered::<&mut Transform, With<Snowflake>>();
    for mut transform in query.iter_mut(world) {
        let p = &mut transform.position;

        if p.x > half {
            p.x = -half;
        } else if p.x < -half {
            p.x = half;
        }

        if p.z > half {
            p.z = -half;
        } else if p.z < -half {
            p.z = half;
        }

        if p.y < bounds.floor {
            p.y = bounds.ceiling;
        } else if p.y > bounds.ceiling {
            p.y = bounds.floor;
        }
    }
}

pub fn spin_system(world: &mut World) {
    let dt = world.resource::<SceneClock>().dt;
    let mut query = world.query::<(&mut Transform, &Spin)>();
    for (mut transform, spin) in query.iter_mut(world) {
        transform.rotation = (transform.rotation * Quat::from_rotation_y(spin.rate * dt)).normalize();
    }
}

/// Turn photos about Y so their front (+Z) faces the camera.
pub fn billboard_system(world: &mut World) {
    let eye = world.resource::<ViewAnchor>().eye;
    let mut query = world.query_filtered::<&mut Transform, With<PhotoCard>>();
    for mut transform in query.iter_mut(world) {
        let to_eye = eye - transform.position;
        if to_eye.x.abs() + to_eye.z.abs() > 1e-4 {
            transform.rotation = Quat::from_rotation_y(to_eye.x.atan2(to_eye.z));
        }
    }
}

pub fn twinkle_system(world: &mut World) {
    let t = world.resource::<SceneClock>().elapsed;
    let mut query = world.query::<(&mut Color, &Twinkle)>();
    for (mut color, twinkle) in query.iter_mut(world) {
        let wave = 0.6 + 0.4 * (t * twinkle.speed + twinkle.phase).sin();
        *color = Color { emissive: twinkle.base.emissive * wave, ..twinkle.base };
    }
}

/// Fade and shrink burst particles as they age.
pub fn sparkle_system(world: &mut World) {
    let mut query = world.query::<(&mut Color, &mut Transform, &Sparkle, &Lifetime)>();
    for (mut color, mut transform, sparkle, lifetime) in query.iter_mut(world) {
        let f = lifetime.fraction();
        *color = Color {
            r: sparkle.base.r * f,
            g: sparkle.base.g * f,
            b: sparkle.base.b * f,
            emissive: sparkle.base.emissive,
        };
        transform.scale = Vec3::splat(0.12 * (0.3 + 0.7 * f));
    }
}

/// Decrease lifetime and despawn entities when lifetime expires
pub fn lifetime_system(world: &mut World) {
    let dt = world.resource::<SceneClock>().dt;
    let mut expired = Vec::new();
    let mut query = world.query::<(Entity, &mut Lifetime)>();
    for (entity, mut lifetime) in query.iter_mut(world) {
        lifetime.remaining -= dt;
        if lifetime.remaining <= 0.0 {
            expired.push(entity);
        }
    }
    for entity in expired {
        world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(mode: Mode, dt: f32) -> World {
        let mut world = World::new();
        world.insert_resource(SceneClock { elapsed: 0.0, dt });
        world.insert_resource(SceneState { mode, focus: 0, photo_count: 0 });
        world.insert_resource(ViewAnchor::default());
        world
    }

    #[test]
    fn ease_never_overshoots_and_converges() {
        let target = Vec3::new(3.0, -2.0, 1.0);
        let mut p = Vec3::ZERO;
        let mut prev = p.distance(target);
        for _ in 0..600 {
            p = ease(p, target, 3.5, 1.0 / 60.0);
            let d = p.distance(target);
            assert!(d <= prev + 1e-6);
            prev = d;
        }
        assert!(prev < 1e-3);

        // Huge dt lands on (but never past) the target.
        let jump = ease(Vec3::ZERO, target, 3.5, 100.0);
        assert!(jump.distance(target) < 1e-4);
    }

    #[test]
    fn ease_is_frame_rate_independent() {
        let target = Vec3::X * 10.0;
        let mut fine = Vec3::ZERO;
        for _ in 0..120 {
            fine = ease(fine, target, 2.0, 1.0 / 120.0);
        }
        let mut coarse = Vec3::ZERO;
        for _ in 0..30 {
            coarse = ease(coarse, target, 2.0, 1.0 / 30.0);
        }
        assert!((fine.x - coarse.x).abs() < 1e-3);
    }

    #[test]
    fn decorations_follow_mode() {
        let mut world = world_with(Mode::Scattered, 1.0 / 60.0);
        let formation = Formation {
            tree: Vec3::new(1.0, 0.0, 0.0),
            heart: Vec3::new(0.0, 1.0, 0.0),
            scatter: Vec3::new(0.0, 0.0, 9.0),
            base_scale: 0.3,
        };
        let e = world
            .spawn((
                Transform::from_position(formation.tree),
                formation,
                Tween { position: formation.tree, scale: Vec3::ONE, rate: 3.5 },
            ))
            .id();

        formation_system(&mut world);
        assert_eq!(world.get::<Tween>(e).unwrap().position, formation.scatter);

        for _ in 0..300 {
            tween_system(&mut world);
        }
        let t = world.get::<Transform>(e).unwrap();
        assert!(t.position.distance(formation.scatter) < 0.01);

        world.resource_mut::<SceneState>().mode = Mode::Zoom;
        formation_system(&mut world);
        assert_eq!(world.get::<Tween>(e).unwrap().position, formation.heart);
    }

    #[test]
    fn focused_photo_goes_to_anchor() {
        let anchor = ViewAnchor::default();
        let focused = PhotoCard { slot: 1, aspect: 1.5, tree: Vec3::X, scatter: Vec3::Z * 10.0 };
        let other = PhotoCard { slot: 0, ..focused };
        let state = SceneState { mode: Mode::Zoom, focus: 1, photo_count: 2 };

        let (pos, scale) = photo_target(&focused, &state, &anchor);
        assert_eq!(pos, anchor.zoom_point);
        assert_eq!(scale, PHOTO_SCALE_FOCUSED);

        let (pos, _) = photo_target(&other, &state, &anchor);
        assert!(pos.length() > other.scatter.length());

        let tree = SceneState { mode: Mode::Tree, ..state };
        assert_eq!(photo_target(&focused, &tree, &anchor).0, focused.tree);
    }

    #[test]
    fn snow_wraps_inside_bounds() {
        let mut world = world_with(Mode::Tree, 1.0);
        world.insert_resource(SnowBounds { half_extent: 10.0, floor: -8.0, ceiling: 12.0 });
        let flake = world
            .spawn((
                Transform::from_position(Vec3::new(9.5, -7.5, 0.0)),
                Velocity::new(Vec3::new(1.0, -1.0, 0.0)),
                Snowflake,
            ))
            .id();
        movement_system(&mut world);
        bounds_system(&mut world);
        let p = world.get::<Transform>(flake).unwrap().position;
        assert_eq!(p.x, -10.0);
        assert_eq!(p.y, 12.0);
    }

    #[test]
    fn expired_particles_are_despawned() {
        let mut world = world_with(Mode::Tree, 0.5);
        let short = world.spawn(Lifetime::new(0.4)).id();
        let long = world.spawn(Lifetime::new(2.0)).id();
        lifetime_system(&mut world);
        assert!(world.get::<Lifetime>(short).is_none());
        assert!(world.get::<Lifetime>(long).is_some());
    }

    #[test]
    fn photos_face_the_camera() {
        let mut world = world_with(Mode::Tree, 0.0);
        world.insert_resource(ViewAnchor { zoom_point: Vec3::ZERO, eye: Vec3::new(10.0, 0.0, 0.0) });
        let card = PhotoCard { slot: 0, aspect: 1.0, tree: Vec3::ZERO, scatter: Vec3::ZERO };
        let e = world.spawn((Transform::default(), card)).id();
        billboard_system(&mut world);
        let forward = world.get::<Transform>(e).unwrap().rotation * Vec3::Z;
        assert!(forward.distance(Vec3::X) < 1e-4);
    }

    #[test]
    fn schedule_runs_on_a_populated_world() {
        let mut world = world_with(Mode::Tree, 1.0 / 60.0);
        world.insert_resource(SnowBounds { half_extent: 10.0, floor: -8.0, ceiling: 12.0 });
        world.spawn((Transform::default(), Lifetime::new(0.01), Color::rgb(1.0, 1.0, 1.0),
            Sparkle { base: Color::glowing(1.0, 1.0, 1.0, 1.0) }));
        let mut schedule = build_schedule();
        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(world.query::<&Lifetime>().iter(&world).count(), 0);
    }
}
