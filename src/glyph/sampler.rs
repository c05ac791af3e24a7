//! Alpha-mask sampling into world-space target points.

use super::{AlphaMask, GlyphRasterizer, LayoutConfig};
use crate::spawn::seeded_rng;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;

/// Bounding box of the sampled ink pixels, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl InkBounds {
    /// Box width, never less than 1.
    #[inline]
    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(1) as f32
    }

    /// Box height, never less than 1.
    #[inline]
    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(1) as f32
    }

    /// Point the samples are centered on.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.min_x as f32 + self.width() / 2.0,
            self.min_y as f32 + self.height() / 2.0,
        )
    }
}

/// Row-major walk over the sampling grid.
fn grid(mask: &AlphaMask, step: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
    let step = step.max(1) as usize;
    (0..mask.height())
        .step_by(step)
        .flat_map(move |y| (0..mask.width()).step_by(step).map(move |x| (x, y)))
}

/// Bounding box of grid pixels whose alpha exceeds `threshold`.
///
/// Returns `None` when no pixel qualifies.
pub fn ink_bounds(mask: &AlphaMask, step: u32, threshold: u8) -> Option<InkBounds> {
    grid(mask, step)
        .filter(|&(x, y)| mask.alpha(x, y) > threshold)
        .fold(None, |acc: Option<InkBounds>, (x, y)| {
            Some(match acc {
                None => InkBounds {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(b) => InkBounds {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            })
        })
}

/// Turn every ink pixel on the sampling grid into a target point.
///
/// `x`/`y` are centered on the ink box and scaled by `world_scale`, with `y`
/// flipped so up is positive. `z` is uniform in `[-depth_jitter/2, depth_jitter/2)`.
/// Points come out in raster order: top to bottom, left to right.
pub fn sample_mask<R: Rng + ?Sized>(
    mask: &AlphaMask,
    config: &LayoutConfig,
    rng: &mut R,
) -> Vec<Vec3> {
    let step = config.sample_step.max(1);
    let threshold = config.alpha_threshold;

    let Some(bounds) = ink_bounds(mask, step, threshold) else {
        log::debug!("no pixel above alpha {}; no targets", threshold);
        return Vec::new();
    };
    let center = bounds.center();
    let scale = config.world_scale;

    let points: Vec<Vec3> = grid(mask, step)
        .filter(|&(x, y)| mask.alpha(x, y) > threshold)
        .map(|(x, y)| {
            let z = (rng.gen::<f32>() - 0.5) * config.depth_jitter;
            Vec3::new(
                (x as f32 - center.x) * scale,
                -(y as f32 - center.y) * scale,
                z,
            )
        })
        .collect();

    log::debug!(
        "sampled {} targets from {}x{} ink box (step {})",
        points.len(),
        bounds.width(),
        bounds.height(),
        step
    );
    points
}

/// Rasterizes text and samples it into target points.
pub struct GlyphSampler<G> {
    rasterizer: G,
    rng: SmallRng,
}

impl<G: GlyphRasterizer> GlyphSampler<G> {
    /// Sampler with clock-seeded depth jitter.
    pub fn new(rasterizer: G) -> Self {
        Self {
            rasterizer,
            rng: seeded_rng(None),
        }
    }

    /// Fix the depth-jitter seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = seeded_rng(Some(seed));
        self
    }

    pub fn rasterizer(&self) -> &G {
        &self.rasterizer
    }

    /// Draw `text` onto a surface laid out per `config`.
    ///
    /// The surface is owned by the caller; nothing is cached between calls.
    pub fn rasterize(&self, text: &str, config: &LayoutConfig) -> AlphaMask {
        self.rasterizer.render_text_to_alpha_mask(text, &config.sanitized())
    }

    /// Rasterize and sample `text` in one go.
    pub fn sample(&mut self, text: &str, config: &LayoutConfig) -> Vec<Vec3> {
        let config = config.sanitized();
        let mask = self.rasterizer.render_text_to_alpha_mask(text, &config);
        sample_mask(&mask, &config, &mut self.rng)
    }
}
