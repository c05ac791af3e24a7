//! TrueType/OpenType outline rasterizer.

use super::{AlphaMask, FontSpec, GlyphRasterizer};
use crate::error::FontError;
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use fontdb::{Database, Family, Query, Weight};
use glam::Vec2;
use std::path::Path;

/// Rasterizer for scalable outline fonts, backed by `ab_glyph`.
///
/// Glyph coverage becomes alpha, so edges are anti-aliased; the sampler's
/// alpha threshold decides how much of an edge counts as ink.
/// [`FontSpec::size_px`] is the em size, as in CSS. The family is whatever
/// face was loaded; the face's own weight is remembered so that only the
/// shortfall to the requested weight is synthesized.
pub struct OutlineFont {
    font: FontVec,
    weight: u16,
}

impl OutlineFont {
    /// Load a `.ttf`/`.otf` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Parse font data already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_font_data(bytes.clone());
        let weight = db.faces().next().map_or(Weight::NORMAL.0, |face| face.weight.0);
        let font = FontVec::try_from_vec(bytes)?;
        Ok(Self { font, weight })
    }

    /// Resolve `spec.family` and `spec.weight` against the installed fonts.
    pub fn from_system(spec: &FontSpec) -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("{} system font faces available", db.len());
        Self::from_database(&db, spec)
    }

    /// Pick the face in `db` that best matches `spec.family` and `spec.weight`.
    pub fn from_database(db: &Database, spec: &FontSpec) -> Result<Self, FontError> {
        let families = [family(&spec.family)];
        let query = Query {
            families: &families,
            weight: Weight(spec.weight),
            ..Query::default()
        };
        let not_found = || FontError::FamilyNotFound(spec.family.clone());

        let id = db.query(&query).ok_or_else(not_found)?;
        let face = db.face(id).ok_or_else(not_found)?;
        let weight = face.weight.0;
        log::info!(
            "font '{}' resolved to {} (weight {})",
            spec.family,
            face.post_script_name,
            weight
        );

        let font = db
            .with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index)
            })
            .ok_or_else(not_found)??;
        Ok(Self { font, weight })
    }

    /// Weight class of the loaded face.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Scale at which one em spans `size_px` pixels.
    ///
    /// `ab_glyph` scales by ascent minus descent, which is taller than the em
    /// box for most faces.
    fn scale(&self, size_px: f32) -> PxScale {
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(size_px * self.font.height_unscaled() / units_per_em)
            }
            _ => PxScale::from(size_px),
        }
    }

    fn advance(&self, line: &str, scale: PxScale) -> f32 {
        let scaled = self.font.as_scaled(scale);
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

/// Map CSS generic family keywords onto fontdb's generic families.
fn family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

impl GlyphRasterizer for OutlineFont {
    fn line_height(&self, font: &FontSpec) -> f32 {
        let scale = self.scale(font.size_px);
        let m = self.font.glyph_id('M').with_scale(scale);
        match self.font.outline_glyph(m) {
            Some(outlined) => outlined.px_bounds().height(),
            None => {
                let scaled = self.font.as_scaled(scale);
                scaled.ascent() - scaled.descent()
            }
        }
    }

    fn line_width(&self, line: &str, font: &FontSpec) -> f32 {
        self.advance(line, self.scale(font.size_px))
    }

    fn draw_line(&self, mask: &mut AlphaMask, line: &str, font: &FontSpec, center: Vec2) {
        let scale = self.scale(font.size_px);
        let scaled = self.font.as_scaled(scale);

        // Baseline that puts the middle of the ascent-descent box on `center.y`.
        let baseline = center.y + (scaled.ascent() + scaled.descent()) / 2.0;
        let mut caret = center.x - self.advance(line, scale) / 2.0;
        let mut previous: Option<GlyphId> = None;

        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    mask.blend(
                        bounds.min.x as i64 + gx as i64,
                        bounds.min.y as i64 + gy as i64,
                        alpha,
                    );
                });
            }
        }
    }

    fn face_weight(&self) -> u16 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{ink_bounds, LayoutConfig};

    // 1000 units/em, cap height 694, ascender 1058, descender -286, weight 400
    const CANTARELL: &[u8] = include_bytes!("../../tests/fonts/Cantarell-Regular.ttf");

    fn cantarell() -> OutlineFont {
        OutlineFont::from_bytes(CANTARELL.to_vec()).unwrap()
    }

    fn layout(weight: u16, size_px: f32) -> LayoutConfig {
        LayoutConfig {
            font: FontSpec::new("Cantarell", weight, size_px),
            canvas_width: 400,
            canvas_height: 300,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = OutlineFont::from_file("/definitely/not/here/font.ttf");
        assert!(matches!(result, Err(FontError::Io(_))));
    }

    #[test]
    fn test_garbage_bytes_are_invalid_font() {
        let result = OutlineFont::from_bytes(b"not a font at all".to_vec());
        assert!(matches!(result, Err(FontError::InvalidFont(_))));
    }

    #[test]
    fn test_face_weight_read_from_font() {
        assert_eq!(cantarell().weight(), 400);
        assert_eq!(cantarell().face_weight(), 400);
    }

    #[test]
    fn test_size_px_is_em_size() {
        let font = cantarell();
        let spec = FontSpec::new("Cantarell", 400, 100.0);

        // cap height of 'M' is 0.694 em
        let cap = font.line_height(&spec);
        assert!((cap - 69.4).abs() <= 2.0, "cap height {}", cap);

        let id = font.font.glyph_id('M');
        let expected = font.font.h_advance_unscaled(id) * 100.0 / 1000.0;
        assert!((font.line_width("M", &spec) - expected).abs() < 0.01);
    }

    #[test]
    fn test_draw_line_centers_ink() {
        let font = cantarell();
        let mask = font.render_text_to_alpha_mask("HI", &layout(400, 100.0));
        let bounds = ink_bounds(&mask, 1, 40).unwrap();

        assert!((bounds.height() - 69.4).abs() <= 3.0, "ink height {}", bounds.height());
        let center = bounds.center();
        assert!((center.x - 200.0).abs() <= 6.0, "center x {}", center.x);
        assert!((center.y - 150.0).abs() <= 20.0, "center y {}", center.y);
    }

    #[test]
    fn test_heavier_request_than_face_is_dilated() {
        let font = cantarell();
        let regular = font.render_text_to_alpha_mask("I", &layout(400, 100.0));
        let black = font.render_text_to_alpha_mask("I", &layout(900, 100.0));
        assert!(black.count_above(40) > regular.count_above(40));
    }

    #[test]
    fn test_heavy_face_is_not_dilated() {
        let font = OutlineFont {
            weight: 900,
            ..cantarell()
        };
        let regular = font.render_text_to_alpha_mask("I", &layout(400, 100.0));
        let black = font.render_text_to_alpha_mask("I", &layout(900, 100.0));
        assert_eq!(black.count_above(40), regular.count_above(40));
    }

    #[test]
    fn test_family_lookup_in_database() {
        let mut db = Database::new();
        db.load_font_data(CANTARELL.to_vec());

        let bold = FontSpec::new("Cantarell", 700, 64.0);
        let found = OutlineFont::from_database(&db, &bold).unwrap();
        assert_eq!(found.weight(), 400);

        let unknown = FontSpec::new("No Such Family", 400, 64.0);
        let missing = OutlineFont::from_database(&db, &unknown);
        assert!(matches!(missing, Err(FontError::FamilyNotFound(ref f)) if f == "No Such Family"));
    }

    #[test]
    fn test_generic_family_names() {
        assert_eq!(family("sans-serif"), Family::SansSerif);
        assert_eq!(family("Monospace"), Family::Monospace);
        assert_eq!(family("Cantarell"), Family::Name("Cantarell"));
    }
}
