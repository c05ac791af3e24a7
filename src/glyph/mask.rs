//! Off-screen alpha surface.

use image::{GrayImage, ImageResult, Luma};
use std::path::Path;

/// An 8-bit alpha raster text is drawn into.
///
/// Writes outside the surface are dropped, which is how clipped glyphs lose
/// their pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask {
    image: GrayImage,
}

impl AlphaMask {
    /// A fully transparent surface. Zero dimensions are clamped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width.max(1), height.max(1)),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Alpha at a pixel; 0 outside the surface.
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        if x < self.width() && y < self.height() {
            self.image.get_pixel(x, y).0[0]
        } else {
            0
        }
    }

    /// Combine `alpha` into a pixel, keeping the larger value.
    pub fn blend(&mut self, x: i64, y: i64, alpha: u8) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        px.0[0] = px.0[0].max(alpha);
    }

    /// Fill an axis-aligned rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, alpha: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i64).min(self.width() as i64);
        let y1 = (y + height as i64).min(self.height() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px as u32, py as u32, Luma([alpha]));
            }
        }
    }

    /// Number of pixels whose alpha exceeds `threshold`.
    pub fn count_above(&self, threshold: u8) -> usize {
        self.image.pixels().filter(|p| p.0[0] > threshold).count()
    }

    /// Grow ink outward by `radius` pixels (square max filter).
    pub fn embolden(&mut self, radius: u32) {
        if radius == 0 {
            return;
        }
        let (w, h) = (self.width() as usize, self.height() as usize);
        let r = radius as usize;
        let src = self.image.as_raw().clone();

        let mut horizontal = vec![0u8; w * h];
        for y in 0..h {
            let row = &src[y * w..(y + 1) * w];
            for x in 0..w {
                let lo = x.saturating_sub(r);
                let hi = (x + r).min(w - 1);
                horizontal[y * w + x] = row[lo..=hi].iter().copied().max().unwrap_or(0);
            }
        }

        let out: &mut [u8] = &mut self.image;
        for x in 0..w {
            for y in 0..h {
                let lo = y.saturating_sub(r);
                let hi = (y + r).min(h - 1);
                out[y * w + x] = (lo..=hi).map(|yy| horizontal[yy * w + x]).max().unwrap_or(0);
            }
        }
    }

    /// Write the surface as a grayscale PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_clamped() {
        let mask = AlphaMask::new(0, 0);
        assert_eq!((mask.width(), mask.height()), (1, 1));
    }

    #[test]
    fn test_out_of_bounds_writes_are_dropped() {
        let mut mask = AlphaMask::new(4, 4);
        mask.blend(-1, 0, 255);
        mask.blend(4, 4, 255);
        mask.fill_rect(-10, -10, 12, 12, 200);
        assert_eq!(mask.alpha(0, 0), 200);
        assert_eq!(mask.alpha(1, 1), 200);
        assert_eq!(mask.alpha(2, 2), 0);
        assert_eq!(mask.alpha(99, 99), 0);
    }

    #[test]
    fn test_blend_keeps_max() {
        let mut mask = AlphaMask::new(2, 2);
        mask.blend(0, 0, 100);
        mask.blend(0, 0, 50);
        assert_eq!(mask.alpha(0, 0), 100);
    }

    #[test]
    fn test_embolden_grows_single_pixel_to_square() {
        let mut mask = AlphaMask::new(9, 9);
        mask.blend(4, 4, 255);
        mask.embolden(2);
        assert_eq!(mask.count_above(0), 25);
        assert_eq!(mask.alpha(2, 2), 255);
        assert_eq!(mask.alpha(1, 4), 0);
    }

    #[test]
    fn test_save_png_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let mut mask = AlphaMask::new(6, 3);
        mask.fill_rect(1, 1, 2, 1, 255);
        mask.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (6, 3));
        assert_eq!(loaded.get_pixel(1, 1).0[0], 255);
    }
}
