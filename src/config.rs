//! Scene files.
//!
//! A [`SceneConfig`] bundles everything needed to reproduce a run: the text,
//! an optional font file, layout, field and visual settings, and the clock.
//! Every section is optional in JSON; missing fields take their defaults.
//!
//! ```json
//! {
//!   "text": "HAPPY\nBIRTHDAY",
//!   "layout": { "sample_step": 6, "alpha_threshold": 28 },
//!   "field": { "particle_count": 20000, "seed": 7 },
//!   "clock": { "fixed": { "step": 0.01 } }
//! }
//! ```

use crate::error::ConfigError;
use crate::field::FieldConfig;
use crate::glyph::LayoutConfig;
use crate::time::ClockMode;
use crate::visuals::VisualConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A complete, serializable description of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Text to form. Lines are separated by `\n`.
    pub text: String,
    /// TrueType/OpenType font. `None` uses the built-in bitmap font.
    pub font_file: Option<PathBuf>,
    pub layout: LayoutConfig,
    pub field: FieldConfig,
    pub visuals: VisualConfig,
    pub clock: ClockMode,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            text: "HELLO".to_string(),
            font_file: None,
            layout: LayoutConfig::default(),
            field: FieldConfig::default(),
            visuals: VisualConfig::default(),
            clock: ClockMode::default(),
        }
    }
}

impl SceneConfig {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let scene: Self = serde_json::from_str(&json)?;
        log::debug!("loaded scene from {}", path.display());
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::Palette;

    #[test]
    fn test_save_then_load_preserves_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        let mut scene = SceneConfig {
            text: "HAPPY\nBIRTHDAY".into(),
            layout: LayoutConfig::poster(),
            field: FieldConfig::default().with_seed(11).with_palette(Palette::Ocean),
            clock: ClockMode::RealTime { scale: 0.6 },
            ..Default::default()
        };
        scene.visuals.opacity(0.5);
        scene.save(&path).unwrap();

        assert_eq!(SceneConfig::load(&path).unwrap(), scene);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "text": "HI", "field": { "particle_count": 500 } }"#).unwrap();

        let scene = SceneConfig::load(&path).unwrap();
        assert_eq!(scene.text, "HI");
        assert_eq!(scene.field.particle_count, 500);
        assert_eq!(scene.field.spring, FieldConfig::default().spring);
        assert_eq!(scene.layout, LayoutConfig::default());
        assert_eq!(scene.clock, ClockMode::Fixed { step: 0.01 });
    }

    #[test]
    fn test_load_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(SceneConfig::load(&missing), Err(ConfigError::Io(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(SceneConfig::load(&bad), Err(ConfigError::Json(_))));
    }
}
