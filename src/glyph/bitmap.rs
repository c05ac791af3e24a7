//! Built-in bitmap font rasterizer.

use super::{AlphaMask, FontSpec, GlyphRasterizer};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use glam::Vec2;

const CELL: u32 = 8;

/// Rasterizer using the public-domain 8x8 bitmap glyphs from `font8x8`.
///
/// Glyph cells are scaled by an integer factor of `size_px / 8`, so output is
/// blocky but bit-exact everywhere. Characters without a glyph advance as
/// blanks. The font family in [`FontSpec`] is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    fn scale(font: &FontSpec) -> u32 {
        (font.size_px / CELL as f32).round().max(1.0) as u32
    }

    fn glyph(ch: char) -> [u8; 8] {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .unwrap_or([0; 8])
    }
}

impl GlyphRasterizer for BitmapFont {
    fn line_height(&self, font: &FontSpec) -> f32 {
        let rows = Self::glyph('M').iter().filter(|row| **row != 0).count() as u32;
        (rows * Self::scale(font)) as f32
    }

    fn line_width(&self, line: &str, font: &FontSpec) -> f32 {
        (line.chars().count() as u32 * CELL * Self::scale(font)) as f32
    }

    fn draw_line(&self, mask: &mut AlphaMask, line: &str, font: &FontSpec, center: Vec2) {
        let scale = Self::scale(font);
        let width = self.line_width(line, font);
        let x0 = (center.x - width / 2.0).round() as i64;
        let y0 = (center.y - (CELL * scale) as f32 / 2.0).round() as i64;
        let s = scale as i64;

        for (ci, ch) in line.chars().enumerate() {
            let cell_x = x0 + ci as i64 * CELL as i64 * s;
            for (row, bits) in Self::glyph(ch).iter().enumerate() {
                for col in 0..CELL {
                    if bits & (1 << col) != 0 {
                        let x = cell_x + col as i64 * s;
                        let y = y0 + row as i64 * s;
                        mask.fill_rect(x, y, scale, scale, 255);
                    }
                }
            }
        }
    }
}
