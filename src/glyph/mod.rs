//! Text to point cloud conversion.
//!
//! Text is drawn onto an off-screen 8-bit alpha surface by a
//! [`GlyphRasterizer`], then the surface is scanned on a regular pixel grid and
//! every "ink" pixel becomes one target point, centered on the ink bounding
//! box and scaled to world units.
//!
//! Two rasterizers ship with the crate:
//! - [`BitmapFont`] - built-in 8x8 bitmap glyphs, integer scaled. Needs no font
//!   file and is identical on every platform.
//! - [`OutlineFont`] - TrueType/OpenType outlines with anti-aliased coverage,
//!   loaded from a file or resolved from the installed system fonts by family
//!   and weight.
//!
//! # Example
//!
//! ```ignore
//! use glyphfield::glyph::{BitmapFont, GlyphSampler, LayoutConfig};
//!
//! let mut sampler = GlyphSampler::new(BitmapFont).with_seed(7);
//! let targets = sampler.sample("HELLO\nWORLD", &LayoutConfig::default());
//! ```

mod bitmap;
mod mask;
mod outline;
mod sampler;

pub use bitmap::BitmapFont;
pub use mask::AlphaMask;
pub use outline::OutlineFont;
pub use sampler::{ink_bounds, sample_mask, GlyphSampler, InkBounds};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Font family, weight and pixel size.
///
/// Parses from a CSS-like descriptor:
///
/// ```ignore
/// let spec: FontSpec = "900 180px Arial".parse()?;
/// assert_eq!(spec.weight, 900);
/// assert_eq!(spec.size_px, 180.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// Family name, or a generic family (`serif`, `sans-serif`, `monospace`).
    /// `builtin` selects the 8x8 bitmap font.
    pub family: String,
    /// Weight from 100 to 900. Weights heavier than the face that draws
    /// them are synthesized by dilating the rendered mask.
    pub weight: u16,
    /// Em size in pixels.
    pub size_px: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".into(),
            weight: 700,
            size_px: 240.0,
        }
    }
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: u16, size_px: f32) -> Self {
        Self {
            family: family.into(),
            weight: weight.clamp(100, 900),
            size_px,
        }
    }

    /// Family name that selects the built-in bitmap font.
    pub const BUILTIN: &'static str = "builtin";

    pub fn is_builtin(&self) -> bool {
        self.family.eq_ignore_ascii_case(Self::BUILTIN)
    }

    /// Dilation radius in pixels that brings a face of weight `face_weight`
    /// up to the requested weight. Zero when the face is already as heavy.
    pub fn embolden_radius(&self, face_weight: u16) -> u32 {
        let base = face_weight.clamp(100, 900);
        if self.weight <= base || !self.size_px.is_finite() {
            return 0;
        }
        let extra = (self.weight.min(900) - base) as f32 / 500.0;
        (self.size_px.max(0.0) * 0.03 * extra).round() as u32
    }
}

impl FromStr for FontSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = FontSpec {
            family: String::new(),
            weight: 400,
            size_px: 240.0,
        };
        let mut family = Vec::new();

        for token in s.split_whitespace() {
            let lower = token.to_ascii_lowercase();
            if let Some(size) = lower.strip_suffix("px") {
                spec.size_px = size
                    .parse::<f32>()
                    .map_err(|_| format!("invalid font size '{}'", token))?;
                continue;
            }
            match lower.as_str() {
                "normal" => spec.weight = 400,
                "bold" => spec.weight = 700,
                "bolder" => spec.weight = 900,
                "lighter" => spec.weight = 300,
                _ => match lower.parse::<u16>() {
                    Ok(w) if (100..=900).contains(&w) => spec.weight = w,
                    Ok(w) => return Err(format!("font weight {} out of range 100-900", w)),
                    Err(_) => family.push(token),
                },
            }
        }

        if !(spec.size_px.is_finite() && spec.size_px > 0.0) {
            return Err(format!("font size must be positive, got {}", spec.size_px));
        }
        spec.family = if family.is_empty() {
            "sans-serif".into()
        } else {
            family.join(" ")
        };
        Ok(spec)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}px {}", self.weight, self.size_px, self.family)
    }
}

/// Layout and sampling options for turning text into target points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub font: FontSpec,
    /// Multiplier (>= 1.0) on the natural line height between baselines.
    pub line_spacing: f32,
    /// Rasterization surface width in pixels. Text outside it is clipped.
    pub canvas_width: u32,
    /// Rasterization surface height in pixels.
    pub canvas_height: u32,
    /// Pixel stride of the sampling grid, in both axes (>= 1).
    pub sample_step: u32,
    /// A pixel is ink when its alpha is strictly greater than this.
    pub alpha_threshold: u8,
    /// World units per pixel.
    pub world_scale: f32,
    /// Total span of the uniform random z offset given to each point.
    pub depth_jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            line_spacing: 1.1,
            canvas_width: 2000,
            canvas_height: 900,
            sample_step: 5,
            alpha_threshold: 40,
            world_scale: 0.0065,
            depth_jitter: 0.02,
        }
    }
}

impl LayoutConfig {
    /// Settings sized for several short lines of large, heavy text.
    pub fn poster() -> Self {
        Self {
            font: FontSpec::new("Arial", 900, 180.0),
            line_spacing: 1.12,
            canvas_width: 2400,
            canvas_height: 1500,
            sample_step: 6,
            alpha_threshold: 28,
            world_scale: 0.0072,
            depth_jitter: 0.02,
        }
    }

    /// A copy with out-of-range values clamped to safe minimums.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();

        if out.sample_step == 0 {
            log::warn!("sample_step 0 clamped to 1");
            out.sample_step = 1;
        }
        if out.canvas_width == 0 || out.canvas_height == 0 {
            log::warn!(
                "canvas {}x{} clamped to at least 1x1",
                out.canvas_width,
                out.canvas_height
            );
            out.canvas_width = out.canvas_width.max(1);
            out.canvas_height = out.canvas_height.max(1);
        }
        if !(out.line_spacing >= 1.0) {
            log::warn!("line_spacing {} clamped to 1.0", out.line_spacing);
            out.line_spacing = 1.0;
        }
        if !out.world_scale.is_finite() {
            log::warn!("non-finite world_scale replaced by {}", defaults.world_scale);
            out.world_scale = defaults.world_scale;
        }
        if !(out.depth_jitter.is_finite() && out.depth_jitter >= 0.0) {
            log::warn!("invalid depth_jitter replaced by {}", defaults.depth_jitter);
            out.depth_jitter = defaults.depth_jitter;
        }
        if !(out.font.size_px.is_finite() && out.font.size_px > 0.0) {
            log::warn!("invalid font size replaced by {}px", defaults.font.size_px);
            out.font.size_px = defaults.font.size_px;
        }
        out
    }
}

/// Draws text into an [`AlphaMask`].
///
/// Implementors only provide font metrics and single-line drawing; the
/// multi-line layout in [`render_text_to_alpha_mask`](Self::render_text_to_alpha_mask)
/// is shared.
pub trait GlyphRasterizer {
    /// Natural line height in pixels: the ink height of a capital `M`.
    fn line_height(&self, font: &FontSpec) -> f32;

    /// Advance width of a line in pixels.
    fn line_width(&self, line: &str, font: &FontSpec) -> f32;

    /// Draw one line horizontally and vertically centered on `center`.
    fn draw_line(&self, mask: &mut AlphaMask, line: &str, font: &FontSpec, center: Vec2);

    /// Weight the glyphs are drawn at before any synthetic emboldening.
    fn face_weight(&self) -> u16 {
        400
    }

    /// Rasterize possibly multi-line text onto a fresh surface.
    ///
    /// Lines are stacked `line_height * line_spacing` apart, each centered
    /// horizontally, with the whole block centered vertically. A requested
    /// weight above [`face_weight`](Self::face_weight) is made up by dilation.
    fn render_text_to_alpha_mask(&self, text: &str, config: &LayoutConfig) -> AlphaMask {
        let mut mask = AlphaMask::new(config.canvas_width, config.canvas_height);
        let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();

        let pitch = self.line_height(&config.font) * config.line_spacing.max(1.0);
        let total_height = pitch * lines.len() as f32;
        let center_x = mask.width() as f32 / 2.0;
        let center_y = mask.height() as f32 / 2.0;

        for (idx, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = center_y - total_height / 2.0 + (idx as f32 + 0.5) * pitch;
            self.draw_line(&mut mask, line, &config.font, Vec2::new(center_x, y));
        }

        mask.embolden(config.font.embolden_radius(self.face_weight()));
        mask
    }
}

/// Sample `text` into target points with the built-in bitmap font.
///
/// Depth jitter is seeded from the clock; use [`GlyphSampler::with_seed`] for
/// reproducible output.
pub fn sample(text: &str, config: &LayoutConfig) -> Vec<Vec3> {
    GlyphSampler::new(BitmapFont).sample(text, config)
}
