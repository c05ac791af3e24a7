//! Random initialization helpers.
//!
//! Every random draw in the crate (initial scatter, palette picks, glyph depth
//! jitter) goes through a [`SmallRng`] created by [`seeded_rng`], so passing a
//! seed makes a whole run reproducible.

use crate::visuals::Palette;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Create the crate's random source.
///
/// With `Some(seed)` the sequence is fixed. With `None` the seed is derived
/// from the system clock, so each program execution differs.
pub fn seeded_rng(seed: Option<u64>) -> SmallRng {
    let seed = seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    });
    SmallRng::seed_from_u64(seed)
}

/// Spawn helper used when a particle field is created or reset.
///
/// ```ignore
/// let mut ctx = SpawnContext::new(Some(7), 10.0);
/// let p = ctx.random_in_bounds();
/// let c = ctx.pick_color(&Palette::Birthday);
/// ```
pub struct SpawnContext {
    /// Half-size of the spawn cube (cube from -bounds to +bounds).
    pub bounds: f32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context over a cube of the given half-size.
    pub fn new(seed: Option<u64>, bounds: f32) -> Self {
        Self {
            bounds: bounds.abs(),
            rng: seeded_rng(seed),
        }
    }

    /// Random point inside a cube of given half-size, centered at origin.
    ///
    /// A zero half-size yields the origin.
    pub fn random_in_cube(&mut self, half_size: f32) -> Vec3 {
        if half_size <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(
            self.rng.gen_range(-half_size..half_size),
            self.rng.gen_range(-half_size..half_size),
            self.rng.gen_range(-half_size..half_size),
        )
    }

    /// Random point within the spawn bounds.
    ///
    /// Equivalent to `random_in_cube(ctx.bounds)`.
    pub fn random_in_bounds(&mut self) -> Vec3 {
        self.random_in_cube(self.bounds)
    }

    /// Uniformly pick one color from a palette.
    pub fn pick_color(&mut self, palette: &Palette) -> Vec3 {
        let colors = palette.colors();
        if colors.is_empty() {
            return Vec3::ONE;
        }
        colors[self.rng.gen_range(0..colors.len())]
    }
}
