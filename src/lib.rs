//! # glyphfield
//!
//! Particle clouds that fly in from a random scatter and settle into the
//! shape of a line of text.
//!
//! The crate has two halves:
//!
//! - [`glyph`] rasterizes text onto an off-screen alpha surface and samples it
//!   on a regular grid into world-space **target points**.
//! - [`field`] animates a fixed population of particles. The first
//!   `min(N, M)` particles are bound to a target by a damped spring with a
//!   small per-particle wobble; the rest drift on tiny idle orbits.
//!
//! A thin wgpu/winit viewer ([`Simulation::run`]) draws the particles as
//! additive point sprites under an orbit camera.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glyphfield::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     Simulation::new()
//!         .with_text("HAPPY\nBIRTHDAY")
//!         .with_layout(LayoutConfig::poster())
//!         .with_field(FieldConfig::default().with_particle_count(14_000))
//!         .run()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Without a window
//!
//! The core needs no GPU:
//!
//! ```ignore
//! let targets = glyphfield::glyph::sample("HI", &LayoutConfig::default());
//! let mut field = ParticleField::new(FieldConfig::default().with_seed(7), targets);
//! for _ in 0..300 {
//!     field.step(0.01);
//! }
//! println!("mean distance to text: {}", field.residual());
//! ```
//!
//! ## Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `parallel` | Per-particle updates in [`ParticleField::step`] run on rayon's pool |

pub mod config;
pub mod error;
pub mod field;
pub mod glyph;
mod gpu;
pub mod input;
mod shader;
mod simulation;
pub mod spawn;
pub mod time;
pub mod visuals;

pub use config::SceneConfig;
pub use error::{ConfigError, FontError, GpuError, SimulationError};
pub use field::{FieldConfig, IdleOrbit, JitterParams, ParticleField, ParticleMode, SpringParams};
pub use glam::{Vec2, Vec3};
pub use glyph::{
    AlphaMask, BitmapFont, FontSpec, GlyphRasterizer, GlyphSampler, LayoutConfig, OutlineFont,
};
pub use gpu::Camera;
pub use shader::{Uniforms, POINTS_SHADER};
pub use simulation::Simulation;
pub use spawn::SpawnContext;
pub use time::{Clock, ClockMode};
pub use visuals::{BlendMode, Palette, VisualConfig};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use glyphfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::field::{FieldConfig, ParticleField, ParticleMode};
    pub use crate::glyph::{BitmapFont, FontSpec, GlyphSampler, LayoutConfig, OutlineFont};
    pub use crate::simulation::Simulation;
    pub use crate::time::ClockMode;
    pub use crate::visuals::{BlendMode, Palette, VisualConfig};
    pub use crate::{Vec2, Vec3};
}
