// Position generators for every formation the scene can take.
// Pure functions: index/seed in, Vec3 out. No ECS, no GPU.
//
// Formations:
//   cone    — golden-angle spiral wrapped around a cone (the tree)
//   heart   — classic parametric heart curve, optionally filled
//   sphere  — uniform sample inside a ball (the scattered cloud)
//   shell   — uniform sample between two radii (photo scatter slots)

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Angle between successive spiral points. Avoids visible radial "arms".
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Raw heart curve spans roughly x ∈ [-16, 16], y ∈ [-17, 12].
/// Multiply `scale` by this to get world units per curve unit.
pub const HEART_UNIT: f32 = 1.0 / 16.0;

// ============================================================================
// CONE
// ============================================================================

/// Point `index` of `count` on a spiral wrapped around an upright cone.
///
/// The cone is centred on the origin: `y` runs from `-height / 2` (base, full
/// `base_radius`) to `+height / 2` (apex, radius 0). Radius shrinks linearly
/// with `index`, so it strictly decreases for every `index < count`.
pub fn cone_position(index: usize, count: usize, height: f32, base_radius: f32) -> Vec3 {
    let count = count.max(1);
    let t = index as f32 / count as f32;
    let radius = cone_radius(t, base_radius);
    let angle = index as f32 * GOLDEN_ANGLE;
    Vec3::new(
        angle.cos() * radius,
        t * height - height * 0.5,
        angle.sin() * radius,
    )
}

/// Cone radius at normalized height `t` (0 = base, 1 = apex).
pub fn cone_radius(t: f32, base_radius: f32) -> f32 {
    base_radius * (1.0 - t.clamp(0.0, 1.0))
}

/// Point on the cone surface at normalized height `t` and azimuth `angle`,
/// pushed `offset` units outward. Used to hang photos on the outside of the tree.
pub fn cone_surface(t: f32, angle: f32, height: f32, base_radius: f32, offset: f32) -> Vec3 {
    let radius = cone_radius(t, base_radius) + offset;
    Vec3::new(
        angle.cos() * radius,
        t.clamp(0.0, 1.0) * height - height * 0.5,
        angle.sin() * radius,
    )
}

// ============================================================================
// HEART
// ============================================================================

/// Parametric heart at parameter `t` (radians), lying in the XY plane at `z = depth`.
///
///   x = 16 sin³t
///   y = 13 cos t − 5 cos 2t − 2 cos 3t − cos 4t
///
/// `scale` is the half-width of the heart in world units.
pub fn heart_position(t: f32, scale: f32, depth: f32) -> Vec3 {
    let s = t.sin();
    let x = 16.0 * s * s * s;
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    let k = scale * HEART_UNIT;
    // Shift up so the heart's visual centre (not the curve origin) sits on y=0.
    Vec3::new(x * k, (y + 2.5) * k, depth)
}

/// Random point inside the heart, with z jitter in `[-thickness / 2, thickness / 2]`.
///
/// Shrinking a boundary point toward the centre by `sqrt(u)` gives an
/// area-uniform fill for star-shaped regions.
pub fn heart_fill_position<R: Rng + ?Sized>(rng: &mut R, scale: f32, thickness: f32) -> Vec3 {
    let t = rng.gen_range(0.0..TAU);
    let edge = heart_position(t, scale, 0.0);
    let shrink = rng.gen_range(0.0f32..1.0).sqrt();
    let half = thickness * 0.5;
    let z = if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 };
    Vec3::new(edge.x * shrink, edge.y * shrink, z)
}

// ============================================================================
// SPHERE / SHELL
// ============================================================================

/// Uniform random unit vector (Archimedes: uniform z, uniform azimuth).
pub fn unit_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..1.0);
    let phi = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform random point inside a ball of radius `scale`. Norm is always `<= scale`.
pub fn sphere_position<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> Vec3 {
    let u: f32 = rng.gen_range(0.0..1.0);
    unit_direction(rng) * (scale * u.cbrt())
}

/// Uniform random point in the shell `inner <= |p| <= outer`.
/// If the radii are swapped they are reordered.
pub fn shell_position<R: Rng + ?Sized>(rng: &mut R, inner: f32, outer: f32) -> Vec3 {
    let (lo, hi) = if inner <= outer { (inner, outer) } else { (outer, inner) };
    let lo3 = lo * lo * lo;
    let hi3 = hi * hi * hi;
    let u: f32 = rng.gen_range(0.0..=1.0);
    let radius = (lo3 + u * (hi3 - lo3)).cbrt();
    unit_direction(rng) * radius.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn xz_norm(v: Vec3) -> f32 {
        (v.x * v.x + v.z * v.z).sqrt()
    }

    #[test]
    fn cone_spans_full_height() {
        let base = cone_position(0, 100, 10.0, 4.0);
        assert!((base.y + 5.0).abs() < 1e-5);
        assert!((xz_norm(base) - 4.0).abs() < 1e-4);

        let near_top = cone_position(99, 100, 10.0, 4.0);
        assert!(near_top.y > 4.8);
        assert!(xz_norm(near_top) < 0.1);
    }

    #[test]
    fn cone_handles_zero_count() {
        let p = cone_position(0, 0, 10.0, 4.0);
        assert!(p.is_finite());
    }

    #[test]
    fn heart_matches_curve_at_quarter_turn() {
        // t = π/2: raw curve point (16, 4), lifted by 2.5 and scaled by 2 / 16.
        let p = heart_position(PI / 2.0, 2.0, 0.7);
        assert!((p.x - 2.0).abs() < 1e-4);
        assert!((p.y - 0.8125).abs() < 1e-4);
        assert_eq!(p.z, 0.7);
    }

    #[test]
    fn heart_apex_and_lobes() {
        // t = 0 is the notch at the top centre, t = π the bottom tip.
        let notch = heart_position(0.0, 16.0, 0.0);
        let tip = heart_position(PI, 16.0, 0.0);
        assert!(notch.x.abs() < 1e-4);
        assert!(tip.x.abs() < 1e-3);
        assert!(tip.y < notch.y);
    }

    #[test]
    fn shell_respects_radii() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = shell_position(&mut rng, 6.0, 9.0);
            let n = p.length();
            assert!(n >= 6.0 - 1e-3 && n <= 9.0 + 1e-3, "norm {n}");
        }
    }

    #[test]
    fn heart_fill_stays_in_slab() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let p = heart_fill_position(&mut rng, 5.0, 1.0);
            assert!(p.z.abs() <= 0.5);
            assert!(p.x.abs() <= 5.0 + 1e-3);
        }
    }

    proptest! {
        #[test]
        fn cone_radius_strictly_decreases(count in 2usize..2000, height in 1.0f32..50.0, radius in 0.5f32..20.0) {
            let mut prev = f32::INFINITY;
            for i in 0..count {
                let r = xz_norm(cone_position(i, count, height, radius));
                prop_assert!(r < prev, "index {} radius {} prev {}", i, r, prev);
                prev = r;
            }
        }

        #[test]
        fn sphere_norm_bounded(seed in any::<u64>(), scale in 0.01f32..100.0) {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..64 {
                let p = sphere_position(&mut rng, scale);
                prop_assert!(p.length() <= scale * (1.0 + 1e-5));
            }
        }

        #[test]
        fn heart_is_mirror_symmetric(t in -10.0f32..10.0, scale in 0.1f32..20.0) {
            let a = heart_position(t, scale, 0.0);
            let b = heart_position(-t, scale, 0.0);
            prop_assert!((a.x + b.x).abs() < 1e-3 * scale.max(1.0));
            prop_assert!((a.y - b.y).abs() < 1e-3 * scale.max(1.0));
        }
    }
}
