use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, OutlinedGlyph, PxScale, point};
use ap_core::charset::RENDER_GRADIENT;
use ap_core::config::BUILTIN_FONT;
use ap_core::error::{CoreError, CoreResult};
use ap_core::frame::GlyphBitmap;
use ap_core::traits::{GlyphBox, GlyphFont, HMetrics, VMetrics};

use crate::builtin::BuiltinFont;

/// Coverage at or above which a rasterized pixel counts as ink.
pub const INK_THRESHOLD: f32 = 0.5;

/// TrueType/OpenType font rasterized with `ab_glyph`.
///
/// Coverage is thresholded at [`INK_THRESHOLD`]: masks are strictly binary.
pub struct AbGlyphFont {
    font: FontVec,
}

impl AbGlyphFont {
    /// Read and parse a font file.
    ///
    /// # Errors
    /// Returns [`CoreError::FontLoad`] if the file is unreadable or not a font.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| CoreError::FontLoad(format!("{}: {e}", path.display())))?;
        let font = Self::from_bytes(bytes)
            .map_err(|e| CoreError::FontLoad(format!("{}: {e}", path.display())))?;
        log::info!("Police chargée : {}", path.display());
        Ok(font)
    }

    /// Parse font bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::FontLoad`] if the bytes are not a valid font.
    pub fn from_bytes(bytes: Vec<u8>) -> CoreResult<Self> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| CoreError::FontLoad(e.to_string()))?;

        // glyph_id 0 = .notdef : the rendered cell would show a placeholder box.
        let missing: String = RENDER_GRADIENT
            .iter()
            .filter(|c| **c != ' ' && font.glyph_id(**c).0 == 0)
            .collect();
        if !missing.is_empty() {
            log::warn!("Glyphes absents de la police : {missing:?}");
        }
        Ok(Self { font })
    }

    fn px_scale(&self, scale: f32) -> PxScale {
        PxScale::from(scale * self.font.height_unscaled())
    }

    fn outline(&self, ch: char, scale: f32) -> Option<OutlinedGlyph> {
        let glyph = self
            .font
            .glyph_id(ch)
            .with_scale_and_position(self.px_scale(scale), point(0.0, 0.0));
        self.font.outline_glyph(glyph)
    }
}

impl GlyphFont for AbGlyphFont {
    fn scale_for_pixel_height(&self, px: f32) -> f32 {
        px / self.font.height_unscaled()
    }

    fn vertical_metrics(&self) -> VMetrics {
        VMetrics {
            ascent: self.font.ascent_unscaled(),
            descent: self.font.descent_unscaled(),
            line_gap: self.font.line_gap_unscaled(),
        }
    }

    fn glyph_advance(&self, ch: char) -> HMetrics {
        let id = self.font.glyph_id(ch);
        HMetrics {
            advance: self.font.h_advance_unscaled(id),
            left_side_bearing: self.font.h_side_bearing_unscaled(id),
        }
    }

    fn glyph_bitmap_box(&self, ch: char, scale: f32) -> GlyphBox {
        self.outline(ch, scale).map_or_else(GlyphBox::default, |outline| {
            let bounds = outline.px_bounds();
            GlyphBox {
                x0: bounds.min.x.floor() as i32,
                y0: bounds.min.y.floor() as i32,
                x1: bounds.max.x.ceil() as i32,
                y1: bounds.max.y.ceil() as i32,
            }
        })
    }

    fn rasterize_glyph(&self, ch: char, scale: f32) -> CoreResult<GlyphBitmap> {
        let bbox = self.glyph_bitmap_box(ch, scale);
        let mut bitmap = GlyphBitmap::blank(bbox.width(), bbox.height())?;
        if let Some(outline) = self.outline(ch, scale) {
            outline.draw(|x, y, coverage| {
                if coverage >= INK_THRESHOLD {
                    bitmap.set_ink(x as usize, y as usize);
                }
            });
        }
        Ok(bitmap)
    }
}

/// Resolve a font setting: `"builtin"` or a path to a TrueType/OpenType file.
///
/// # Errors
/// Returns [`CoreError::FontLoad`] if the file cannot be loaded.
///
/// # Example
/// ```
/// use ap_export::font::load_font;
/// let font = load_font("builtin").unwrap();
/// assert!(font.scale_for_pixel_height(32.0) > 0.0);
/// ```
pub fn load_font(spec: &str) -> CoreResult<Arc<dyn GlyphFont>> {
    if spec.eq_ignore_ascii_case(BUILTIN_FONT) {
        return Ok(Arc::new(BuiltinFont));
    }
    Ok(Arc::new(AbGlyphFont::load(Path::new(spec))?))
}
