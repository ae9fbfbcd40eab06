//! Police bitmap intégrée, sans fichier externe.
//!
//! Design grid of 16×32 units (ascent 24, descent 8), one unit per pixel at a
//! 32 px cell height. Each gradient glyph is a Bayer 4×4 ordered pattern
//! whose ink coverage follows the glyph's rank in [`RENDER_GRADIENT`]:
//! `$` is a solid block, space is empty. Characters outside the gradient
//! render blank.

use ap_core::charset::{GRADIENT_LEN, RENDER_GRADIENT};
use ap_core::error::CoreResult;
use ap_core::frame::GlyphBitmap;
use ap_core::traits::{GlyphBox, GlyphFont, HMetrics, VMetrics};

/// Matrice de Bayer 4x4. Normalisée sur 16 niveaux (0-15).
const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

const ASCENT: f32 = 24.0;
const DESCENT: f32 = -8.0;
const ADVANCE: f32 = 16.0;
/// Units left blank around each glyph so adjacent cells stay distinct.
const MARGIN: u32 = 1;
const UNITS_W: u32 = ADVANCE as u32;
const UNITS_H: u32 = (ASCENT - DESCENT) as u32;

/// Built-in gradient font.
///
/// # Example
/// ```
/// use ap_core::traits::GlyphFont;
/// use ap_export::builtin::BuiltinFont;
/// let scale = BuiltinFont.scale_for_pixel_height(32.0);
/// assert_eq!(scale, 1.0);
/// let solid = BuiltinFont.rasterize_glyph('$', scale).unwrap();
/// let blank = BuiltinFont.rasterize_glyph(' ', scale).unwrap();
/// assert!(solid.ink_count() > 0);
/// assert_eq!(blank.ink_count(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFont;

impl BuiltinFont {
    /// Ink level of `ch` in [0, 16]: number of Bayer cells inked per 4×4 tile.
    #[must_use]
    pub fn ink_level(ch: char) -> u8 {
        RENDER_GRADIENT
            .iter()
            .position(|c| *c == ch)
            .map_or(0, |idx| ((GRADIENT_LEN - 1 - idx) * 16 / (GRADIENT_LEN - 1)) as u8)
    }

    #[inline(always)]
    fn inked(level: u8, ux: u32, uy: u32) -> bool {
        let inside = (MARGIN..UNITS_W - MARGIN).contains(&ux)
            && (MARGIN..UNITS_H - MARGIN).contains(&uy);
        inside && BAYER_4X4[(uy % 4) as usize][(ux % 4) as usize] < level
    }
}

impl GlyphFont for BuiltinFont {
    fn scale_for_pixel_height(&self, px: f32) -> f32 {
        px / (ASCENT - DESCENT)
    }

    fn vertical_metrics(&self) -> VMetrics {
        VMetrics {
            ascent: ASCENT,
            descent: DESCENT,
            line_gap: 0.0,
        }
    }

    fn glyph_advance(&self, _ch: char) -> HMetrics {
        HMetrics {
            advance: ADVANCE,
            left_side_bearing: 0.0,
        }
    }

    fn glyph_bitmap_box(&self, _ch: char, scale: f32) -> GlyphBox {
        if scale <= 0.0 {
            return GlyphBox::default();
        }
        GlyphBox {
            x0: 0,
            y0: (-ASCENT * scale).floor() as i32,
            x1: (ADVANCE * scale).ceil() as i32,
            y1: (-DESCENT * scale).ceil() as i32,
        }
    }

    fn rasterize_glyph(&self, ch: char, scale: f32) -> CoreResult<GlyphBitmap> {
        let bbox = self.glyph_bitmap_box(ch, scale);
        let mut bitmap = GlyphBitmap::blank(bbox.width(), bbox.height())?;
        let level = Self::ink_level(ch);
        if level == 0 {
            return Ok(bitmap);
        }
        for y in 0..bitmap.height {
            let uy = (y as f32 / scale) as u32;
            for x in 0..bitmap.width {
                let ux = (x as f32 / scale) as u32;
                if Self::inked(level, ux, uy) {
                    bitmap.set_ink(x, y);
                }
            }
        }
        Ok(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_tiles_a_32px_cell_exactly() {
        let scale = BuiltinFont.scale_for_pixel_height(32.0);
        let bbox = BuiltinFont.glyph_bitmap_box('#', scale);
        assert_eq!(
            bbox,
            GlyphBox {
                x0: 0,
                y0: -24,
                x1: 16,
                y1: 8
            }
        );
        let line = BuiltinFont.vertical_metrics().line_advance() * scale;
        assert!((line - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ink_grows_with_gradient_rank() {
        let scale = 1.0;
        let counts: Vec<usize> = RENDER_GRADIENT
            .iter()
            .map(|c| BuiltinFont.rasterize_glyph(*c, scale).unwrap().ink_count())
            .collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]), "{counts:?}");
        assert_eq!(counts[GRADIENT_LEN - 1], 0);
        assert_eq!(counts[0], ((UNITS_W - 2 * MARGIN) * (UNITS_H - 2 * MARGIN)) as usize);
    }

    #[test]
    fn unknown_characters_are_blank() {
        assert_eq!(BuiltinFont::ink_level('x'), 0);
        assert_eq!(BuiltinFont.rasterize_glyph('x', 1.0).unwrap().ink_count(), 0);
    }

    #[test]
    fn margin_stays_blank() {
        let glyph = BuiltinFont.rasterize_glyph('$', 1.0).unwrap();
        for x in 0..glyph.width {
            assert_eq!(glyph.at(x, 0), 0);
            assert_eq!(glyph.at(x, glyph.height - 1), 0);
        }
        for y in 0..glyph.height {
            assert_eq!(glyph.at(0, y), 0);
            assert_eq!(glyph.at(glyph.width - 1, y), 0);
        }
    }

    #[test]
    fn half_scale_halves_the_box() {
        let bbox = BuiltinFont.glyph_bitmap_box('$', 0.5);
        assert_eq!((bbox.width(), bbox.height()), (8, 16));
    }
}
