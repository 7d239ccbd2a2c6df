// Scene composition: spawns every entity the renderer draws.
//
// Decorations and lights are created once at startup with all three formation
// targets precomputed; systems.rs only has to pick one per mode. Photos come and
// go with uploads. Snow and bursts are pure ambience.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::SceneConfig;
use crate::engine::*;
use crate::positions::{
    cone_position, cone_surface, heart_fill_position, heart_position, shell_position,
    sphere_position, GOLDEN_ANGLE,
};

// ============================================================================
// PALETTE
// ============================================================================

pub const ORNAMENT_COLORS: [Color; 6] = [
    Color::rgb(0.78, 0.08, 0.12), // cranberry
    Color::rgb(0.95, 0.72, 0.20), // gold
    Color::rgb(0.10, 0.45, 0.22), // pine
    Color::rgb(0.85, 0.85, 0.90), // silver
    Color::rgb(0.15, 0.30, 0.75), // midnight
    Color::rgb(0.90, 0.40, 0.55), // rose
];

pub const LIGHT_COLORS: [Color; 5] = [
    Color::glowing(1.00, 0.85, 0.55, 0.95), // warm white
    Color::glowing(1.00, 0.70, 0.20, 0.95), // amber
    Color::glowing(1.00, 0.25, 0.25, 0.90),
    Color::glowing(0.30, 1.00, 0.45, 0.90),
    Color::glowing(0.40, 0.60, 1.00, 0.90),
];

pub const TOPPER_COLOR: Color = Color::glowing(1.0, 0.84, 0.35, 0.85);
pub const SNOW_COLOR: Color = Color::glowing(0.92, 0.95, 1.0, 0.6);
pub const SPARKLE_COLOR: Color = Color::glowing(1.0, 0.9, 0.6, 1.0);

const LIGHT_SCALE: f32 = 0.07;
const SNOW_SCALE: f32 = 0.05;

/// Snow fills this box around the tree.
pub const SNOW_BOUNDS: SnowBounds = SnowBounds { half_extent: 18.0, floor: -10.0, ceiling: 14.0 };

// ============================================================================
// STARTUP
// ============================================================================

/// Insert scene resources and spawn decorations, the topper, lights and snow.
pub fn populate(world: &mut World, config: &SceneConfig) {
    world.insert_resource(SceneClock::default());
    world.insert_resource(SceneState::default());
    world.insert_resource(ViewAnchor::default());
    world.insert_resource(SNOW_BOUNDS);

    let mut rng = StdRng::seed_from_u64(config.seed);
    spawn_decorations(world, &mut rng, config);
    spawn_topper(world, config);
    spawn_lights(world, &mut rng, config);
    spawn_snow(world, &mut rng, config.snow);

    log::info!(
        "scene populated: {} decorations, {} lights, {} snowflakes",
        config.decorations,
        config.lights,
        config.snow
    );
}

fn spawn_decorations(world: &mut World, rng: &mut StdRng, config: &SceneConfig) {
    let n = config.decorations;
    for i in 0..n {
        let (shape, scale) = match rng.gen_range(0..100) {
            0..=59  => (ShapeKind::Bauble, rng.gen_range(0.22..0.34)),
            60..=84 => (ShapeKind::Gift, rng.gen_range(0.18..0.26)),
            _       => (ShapeKind::Star, rng.gen_range(0.24..0.32)),
        };
        let color = ORNAMENT_COLORS[rng.gen_range(0..ORNAMENT_COLORS.len())];

        let formation = Formation {
            tree:    cone_position(i, n, config.tree_height, config.tree_radius),
            heart:   heart_fill_position(rng, config.heart_scale, 1.5),
            scatter: sphere_position(rng, config.scatter_radius),
            base_scale: scale,
        };

        let mut transform = Transform::from_position(formation.tree).with_scale(scale);
        transform.rotation = glam::Quat::from_rotation_y(rng.gen_range(0.0..TAU));

        world.spawn((
            transform,
            formation,
            Tween {
                position: formation.tree,
                scale: Vec3::splat(scale),
                rate: config.decoration_rate * rng.gen_range(0.8f32..1.2),
            },
            shape,
            color,
            Spin { rate: rng.gen_range(-0.8..0.8) },
        ));
    }
}

fn spawn_topper(world: &mut World, config: &SceneConfig) {
    let formation = Formation {
        tree:    Vec3::new(0.0, config.tree_height * 0.5 + 0.5, 0.0),
        heart:   heart_position(0.0, config.heart_scale, 0.0) + Vec3::Y * 0.8,
        scatter: Vec3::new(0.0, config.scatter_radius * 0.6, 0.0),
        base_scale: 0.8,
    };
    world.spawn((
        Transform::from_position(formation.tree).with_scale(formation.base_scale),
        formation,
        Tween {
            position: formation.tree,
            scale: Vec3::splat(formation.base_scale),
            rate: config.decoration_rate,
        },
        ShapeKind::Star,
        TOPPER_COLOR,
        Spin { rate: 0.6 },
    ));
}

fn spawn_lights(world: &mut World, rng: &mut StdRng, config: &SceneConfig) {
    let n = config.lights;
    for i in 0..n {
        let t = i as f32 / n.max(1) as f32 * TAU;
        let formation = Formation {
            // Slightly outside the ornaments so lights are not hidden inside them.
            tree:    cone_position(i, n, config.tree_height, config.tree_radius * 1.08),
            heart:   heart_position(t, config.heart_scale * 1.08, rng.gen_range(-0.3..0.3)),
            scatter: sphere_position(rng, config.scatter_radius * 1.1),
            base_scale: LIGHT_SCALE,
        };
        let base = LIGHT_COLORS[rng.gen_range(0..LIGHT_COLORS.len())];

        world.spawn((
            Transform::from_position(formation.tree).with_scale(LIGHT_SCALE),
            formation,
            Tween {
                position: formation.tree,
                scale: Vec3::splat(LIGHT_SCALE),
                rate: config.decoration_rate * rng.gen_range(0.7f32..1.3),
            },
            ShapeKind::Spark,
            base,
            Twinkle {
                phase: rng.gen_range(0.0..TAU),
                speed: rng.gen_range(1.5..5.0),
                base,
            },
        ));
    }
}

fn spawn_snow(world: &mut World, rng: &mut StdRng, count: usize) {
    let b = SNOW_BOUNDS;
    for _ in 0..count {
        let position = Vec3::new(
            rng.gen_range(-b.half_extent..b.half_extent),
            rng.gen_range(b.floor..b.ceiling),
            rng.gen_range(-b.half_extent..b.half_extent),
        );
        let velocity = Vec3::new(
            rng.gen_range(-0.2..0.2),
            rng.gen_range(-1.4..-0.6),
            rng.gen_range(-0.2..0.2),
        );
        world.spawn((
            Transform::from_position(position).with_scale(SNOW_SCALE),
            Velocity::new(velocity),
            ShapeKind::Spark,
            SNOW_COLOR,
            Snowflake,
        ));
    }
}

// ============================================================================
// PHOTOS
// ============================================================================

/// Spawn the plane for library `slot`. Placement is deterministic per (seed, slot).
pub fn spawn_photo(world: &mut World, slot: usize, aspect: f32, config: &SceneConfig) -> Entity {
    let mut rng = StdRng::seed_from_u64(config.seed ^ (slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

    // Spread photos over the lower two thirds of the cone, never at the apex.
    let height_t = 0.1 + 0.55 * ((slot as f32 * 0.618_034).fract());
    let angle = slot as f32 * GOLDEN_ANGLE * 3.0;
    let tree = cone_surface(height_t, angle, config.tree_height, config.tree_radius, 0.9);
    let scatter = shell_position(&mut rng, config.scatter_radius * 0.55, config.scatter_radius * 0.9);

    let card = PhotoCard { slot, aspect, tree, scatter };
    world
        .spawn((
            Transform { scale: Vec3::splat(0.01), ..Transform::from_position(Vec3::ZERO) },
            card,
            Tween { position: tree, scale: card.extent(), rate: config.photo_rate },
        ))
        .id()
}

/// Despawn every photo plane. Returns how many were removed.
pub fn clear_photos(world: &mut World) -> usize {
    let photos: Vec<Entity> = world
        .query_filtered::<Entity, With<PhotoCard>>()
        .iter(world)
        .collect();
    for &entity in &photos {
        world.despawn(entity);
    }
    photos.len()
}

// ============================================================================
// EFFECTS
// ============================================================================

/// Short-lived sparkles flying out from `origin`.
pub fn spawn_burst<R: Rng + ?Sized>(world: &mut World, rng: &mut R, origin: Vec3, count: usize) {
    for _ in 0..count {
        let dir = crate::positions::unit_direction(rng);
        let speed: f32 = rng.gen_range(3.0..7.0);
        world.spawn((
            Transform::from_position(origin).with_scale(0.12),
            Velocity::new(dir * speed),
            Lifetime::new(rng.gen_range(0.8..1.6)),
            ShapeKind::Spark,
            SPARKLE_COLOR,
            Sparkle { base: SPARKLE_COLOR },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::Mode;

    fn small_config() -> SceneConfig {
        SceneConfig { decorations: 30, lights: 40, snow: 10, ..Default::default() }
    }

    #[test]
    fn populate_spawns_everything() {
        let mut world = World::new();
        let cfg = small_config();
        populate(&mut world, &cfg);

        // Decorations + topper + lights all have formations.
        let formations = world.query::<&Formation>().iter(&world).count();
        assert_eq!(formations, 30 + 1 + 40);
        assert_eq!(world.query::<&Snowflake>().iter(&world).count(), 10);
        assert_eq!(world.query::<&Twinkle>().iter(&world).count(), 40);
        assert!(world.get_resource::<SceneState>().is_some());
    }

    #[test]
    fn formations_are_distinct_per_mode() {
        let mut world = World::new();
        populate(&mut world, &small_config());
        let mut q = world.query_filtered::<&Formation, Without<Twinkle>>();
        for f in q.iter(&world) {
            assert_ne!(f.position(Mode::Tree), f.position(Mode::Scattered));
            assert!(f.position(Mode::Scattered).length() <= 14.0 * 1.0001);
        }
    }

    #[test]
    fn same_seed_same_tree() {
        let snapshot = |seed| {
            let mut world = World::new();
            populate(&mut world, &SceneConfig { seed, ..small_config() });
            let mut v: Vec<[f32; 3]> = world
                .query::<&Formation>()
                .iter(&world)
                .map(|f| f.scatter.to_array())
                .collect();
            v.sort_by(|a, b| a.partial_cmp(b).unwrap());
            v
        };
        assert_eq!(snapshot(5), snapshot(5));
        assert_ne!(snapshot(5), snapshot(6));
    }

    #[test]
    fn photos_spawn_outside_tree_and_clear() {
        let mut world = World::new();
        let cfg = small_config();
        populate(&mut world, &cfg);
        for slot in 0..5 {
            let e = spawn_photo(&mut world, slot, 1.5, &cfg);
            let card = *world.get::<PhotoCard>(e).unwrap();
            assert_eq!(card.slot, slot);
            assert!(card.scatter.length() >= cfg.scatter_radius * 0.55 - 1e-3);
            // Hung outside the cone surface at its height.
            let t = (card.tree.y + cfg.tree_height * 0.5) / cfg.tree_height;
            let radius = (card.tree.x * card.tree.x + card.tree.z * card.tree.z).sqrt();
            assert!(radius > cfg.tree_radius * (1.0 - t));
        }
        assert_eq!(clear_photos(&mut world), 5);
        assert_eq!(world.query::<&PhotoCard>().iter(&world).count(), 0);
        assert_eq!(clear_photos(&mut world), 0);
    }

    #[test]
    fn burst_particles_are_mortal() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1);
        spawn_burst(&mut world, &mut rng, Vec3::ZERO, 12);
        let mut q = world.query::<(&Lifetime, &Velocity)>();
        assert_eq!(q.iter(&world).count(), 12);
        assert!(q.iter(&world).all(|(l, v)| l.remaining > 0.0 && v.linear.length() >= 3.0 - 1e-3));
    }
}
