use crate::error::CoreResult;
use crate::frame::GlyphBitmap;

/// Font-wide vertical metrics, in unscaled font units (y up, descent negative).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VMetrics {
    /// Distance from baseline to the top of the tallest glyph.
    pub ascent: f32,
    /// Distance from baseline to the bottom of the lowest glyph (negative).
    pub descent: f32,
    /// Extra spacing between lines.
    pub line_gap: f32,
}

impl VMetrics {
    /// Baseline-to-baseline distance, unscaled.
    #[must_use]
    pub fn line_advance(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}

/// Horizontal metrics of one glyph, in unscaled font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HMetrics {
    /// Pen advance after the glyph.
    pub advance: f32,
    /// Offset from the pen to the glyph's left edge.
    pub left_side_bearing: f32,
}

/// Pixel rectangle a glyph covers at a given scale, relative to the pen
/// position on the baseline. Y grows downward, so `y0` is usually negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBox {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl GlyphBox {
    /// Width in pixels, zero for inverted boxes.
    #[must_use]
    pub fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    /// Height in pixels, zero for inverted boxes.
    #[must_use]
    pub fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }
}

/// Glyph source for the compositor.
///
/// Implemented by : `AbGlyphFont` (TrueType/OpenType files), `BuiltinFont`.
///
/// # Example
/// ```
/// use ap_core::traits::{GlyphBox, GlyphFont, HMetrics, VMetrics};
/// use ap_core::frame::GlyphBitmap;
/// use ap_core::error::CoreResult;
///
/// struct Empty;
/// impl GlyphFont for Empty {
///     fn scale_for_pixel_height(&self, px: f32) -> f32 { px / 10.0 }
///     fn vertical_metrics(&self) -> VMetrics {
///         VMetrics { ascent: 8.0, descent: -2.0, line_gap: 0.0 }
///     }
///     fn glyph_advance(&self, _ch: char) -> HMetrics {
///         HMetrics { advance: 5.0, left_side_bearing: 0.0 }
///     }
///     fn glyph_bitmap_box(&self, _ch: char, _scale: f32) -> GlyphBox {
///         GlyphBox::default()
///     }
///     fn rasterize_glyph(&self, _ch: char, _scale: f32) -> CoreResult<GlyphBitmap> {
///         GlyphBitmap::blank(0, 0)
///     }
/// }
/// assert_eq!(Empty.vertical_metrics().line_advance(), 10.0);
/// ```
pub trait GlyphFont: Send + Sync {
    /// Scale factor mapping font units to pixels so that
    /// `ascent - descent` spans `px` pixels.
    fn scale_for_pixel_height(&self, px: f32) -> f32;

    /// Font-wide vertical metrics.
    fn vertical_metrics(&self) -> VMetrics;

    /// Advance width and left side bearing of `ch`.
    fn glyph_advance(&self, ch: char) -> HMetrics;

    /// Bitmap box of `ch` at `scale`.
    fn glyph_bitmap_box(&self, ch: char, scale: f32) -> GlyphBox;

    /// Binary mask of `ch` at `scale`, sized to [`GlyphFont::glyph_bitmap_box`].
    ///
    /// # Errors
    /// Returns [`crate::CoreError::Allocation`] if the mask cannot be allocated.
    fn rasterize_glyph(&self, ch: char, scale: f32) -> CoreResult<GlyphBitmap>;
}
