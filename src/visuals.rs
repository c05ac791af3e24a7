//! Visual configuration for particle rendering.
//!
//! Controls how the particle cloud is drawn: per-particle colors picked from
//! a [`Palette`], point size, opacity and blending.
//!
//! # Example
//!
//! ```ignore
//! Simulation::new()
//!     .with_text("HELLO")
//!     .with_visuals(|v| {
//!         v.blend_mode(BlendMode::Additive);
//!         v.point_size(0.05);
//!     })
//!     .run()?;
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const BIRTHDAY: [Vec3; 3] = [
    Vec3::new(1.0, 0.0, 0.0), // Red
    Vec3::new(1.0, 1.0, 0.0), // Yellow
    Vec3::new(0.0, 0.0, 1.0), // Blue
];

const NEON: [Vec3; 4] = [
    Vec3::new(1.0, 0.0, 0.5), // Pink
    Vec3::new(0.5, 0.0, 1.0), // Purple
    Vec3::new(0.0, 0.5, 1.0), // Blue
    Vec3::new(0.0, 1.0, 1.0), // Cyan
];

const FIRE: [Vec3; 4] = [
    Vec3::new(0.5, 0.0, 0.0), // Red
    Vec3::new(1.0, 0.3, 0.0), // Orange
    Vec3::new(1.0, 0.7, 0.0), // Yellow-orange
    Vec3::new(1.0, 1.0, 0.8), // White-yellow
];

const OCEAN: [Vec3; 4] = [
    Vec3::new(0.0, 0.2, 0.4), // Dark blue
    Vec3::new(0.0, 0.4, 0.6), // Blue
    Vec3::new(0.2, 0.6, 0.8), // Light blue
    Vec3::new(0.6, 0.9, 1.0), // Cyan
];

const GRAYSCALE: [Vec3; 3] = [
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(0.75, 0.75, 0.75),
    Vec3::new(1.0, 1.0, 1.0),
];

/// Fixed color palettes particles draw their color from.
///
/// Each particle picks one entry uniformly at creation and keeps it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Red, yellow and blue (default).
    #[default]
    Birthday,

    /// Vibrant cyberpunk colors (pink, purple, blue, cyan).
    Neon,

    /// Red through orange to white-yellow.
    Fire,

    /// Cool blues and teals.
    Ocean,

    /// Mid gray to white.
    Grayscale,

    /// User-supplied colors (RGB, 0.0-1.0). Empty means white.
    Custom(Vec<Vec3>),
}

impl Palette {
    /// The palette's color entries.
    pub fn colors(&self) -> &[Vec3] {
        match self {
            Palette::Birthday => &BIRTHDAY,
            Palette::Neon => &NEON,
            Palette::Fire => &FIRE,
            Palette::Ocean => &OCEAN,
            Palette::Grayscale => &GRAYSCALE,
            Palette::Custom(colors) => colors,
        }
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "birthday" => Ok(Palette::Birthday),
            "neon" => Ok(Palette::Neon),
            "fire" => Ok(Palette::Fire),
            "ocean" => Ok(Palette::Ocean),
            "grayscale" | "greyscale" => Ok(Palette::Grayscale),
            other => Err(format!(
                "unknown palette '{}' (expected birthday, neon, fire, ocean or grayscale)",
                other
            )),
        }
    }
}

/// Blend mode for particle rendering.
///
/// Controls how particle colors combine with the background and each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,

    /// Additive blending (default).
    ///
    /// Overlapping particles become brighter, which gives settled text its glow.
    #[default]
    Additive,
}

impl BlendMode {
    /// The wgpu blend state for this mode.
    pub fn to_blend_state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
        }
    }
}

/// Rendering options for the particle cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Blend mode for particle rendering.
    pub blend_mode: BlendMode,
    /// Point sprite diameter in world units.
    pub point_size: f32,
    /// Sprite opacity (0.0-1.0).
    pub opacity: f32,
    /// Background clear color (RGB, 0.0-1.0).
    pub background_color: Vec3,
    /// Rotation of the whole cloud around Y, in radians per frame.
    pub auto_rotate: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Additive,
            point_size: 0.035,
            opacity: 0.85,
            background_color: Vec3::ZERO,
            auto_rotate: 0.001,
        }
    }
}

impl VisualConfig {
    /// Set the blend mode.
    pub fn blend_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.blend_mode = mode;
        self
    }

    /// Set the sprite diameter in world units.
    pub fn point_size(&mut self, size: f32) -> &mut Self {
        self.point_size = size.max(0.0);
        self
    }

    /// Set sprite opacity, clamped to 0.0-1.0.
    pub fn opacity(&mut self, opacity: f32) -> &mut Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the background clear color.
    pub fn background(&mut self, color: Vec3) -> &mut Self {
        self.background_color = color;
        self
    }

    /// Set the per-frame Y rotation (0 disables it).
    pub fn auto_rotate(&mut self, radians_per_frame: f32) -> &mut Self {
        self.auto_rotate = radians_per_frame;
        self
    }
}
