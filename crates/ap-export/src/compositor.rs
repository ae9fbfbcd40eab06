use std::sync::atomic::{AtomicBool, Ordering};

use ap_core::charset::RENDER_CHAR_MAP;
use ap_core::color::Rgb;
use ap_core::config::DEFAULT_CELL_HEIGHT;
use ap_core::error::{CoreError, CoreResult};
use ap_core::frame::{AsciiArt, BLANK, Canvas, ColorBuffer, GlyphBitmap, INK};
use ap_core::traits::GlyphFont;

/// Re-renders a sampled text grid as pixels.
///
/// Each character is translated to its render glyph, rasterized at the cell
/// height and composited onto a canvas pre-filled with the background:
/// ink pixels take the cell's sampled color, blank pixels inside the glyph
/// box are reset to the background. Rows grow downward from the top of the
/// canvas.
///
/// # Example
/// ```
/// use ap_core::color::Rgb;
/// use ap_core::frame::ColorBuffer;
/// use ap_export::{BuiltinFont, GlyphCompositor};
///
/// let compositor = GlyphCompositor::new(Rgb::BLACK, 32.0);
/// let colors = ColorBuffer::from(vec![Rgb(255, 0, 0); 2]);
/// let canvas = compositor.render("@ \n", 2, 1, &colors, &BuiltinFont).unwrap();
/// assert_eq!((canvas.width(), canvas.height()), (32, 32));
/// assert_eq!(canvas.pixel(8, 16), Rgb(255, 0, 0));
/// assert_eq!(canvas.pixel(24, 16), Rgb::BLACK);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GlyphCompositor {
    background: Rgb,
    cell_height: f32,
}

impl GlyphCompositor {
    /// Compositor for the given background and cell height (pixels).
    /// Cells are half as wide as they are tall.
    #[must_use]
    pub fn new(background: Rgb, cell_height: f32) -> Self {
        Self {
            background,
            cell_height,
        }
    }

    /// Cell width in pixels.
    #[must_use]
    pub fn cell_width(&self) -> f32 {
        self.cell_height / 2.0
    }

    /// Canvas size in pixels for an output grid.
    ///
    /// # Example
    /// ```
    /// use ap_export::GlyphCompositor;
    /// let c = GlyphCompositor::default();
    /// assert_eq!(c.canvas_size(10, 4), (160, 128));
    /// ```
    #[must_use]
    pub fn canvas_size(&self, output_width: u32, output_height: u32) -> (u32, u32) {
        (
            (output_width as f32 * self.cell_width()) as u32,
            (output_height as f32 * self.cell_height) as u32,
        )
    }

    /// Render the sampler's in-memory output.
    ///
    /// # Errors
    /// See [`GlyphCompositor::render`].
    pub fn render_art(
        &self,
        art: &AsciiArt,
        output_width: u32,
        output_height: u32,
        font: &dyn GlyphFont,
    ) -> CoreResult<Canvas> {
        self.render(&art.text, output_width, output_height, &art.colors, font)
    }

    /// Render `text` (artifact format) with the parallel `colors`.
    ///
    /// # Errors
    /// - [`CoreError::UnmappedCharacter`] if `text` holds a character outside
    ///   the sampling gradient.
    /// - [`CoreError::Allocation`] if the canvas or a glyph mask cannot be allocated.
    pub fn render(
        &self,
        text: &str,
        output_width: u32,
        output_height: u32,
        colors: &ColorBuffer,
        font: &dyn GlyphFont,
    ) -> CoreResult<Canvas> {
        self.render_with(
            text,
            output_width,
            output_height,
            colors,
            font,
            &AtomicBool::new(false),
        )
    }

    /// [`GlyphCompositor::render`] with a cooperative cancel flag, checked at
    /// every line break.
    ///
    /// # Errors
    /// Same as [`GlyphCompositor::render`], plus [`CoreError::Cancelled`].
    pub fn render_with(
        &self,
        text: &str,
        output_width: u32,
        output_height: u32,
        colors: &ColorBuffer,
        font: &dyn GlyphFont,
        cancel: &AtomicBool,
    ) -> CoreResult<Canvas> {
        let (width, height) = self.canvas_size(output_width, output_height);
        let mut canvas = Canvas::filled(width, height, self.background)?;

        let scale = font.scale_for_pixel_height(self.cell_height);
        let vmetrics = font.vertical_metrics();
        let line_advance = (vmetrics.line_advance() * scale) as i32;
        log::debug!(
            "Rendu {width}x{height} px, échelle {scale}, ascent {} descent {} line_gap {}",
            vmetrics.ascent,
            vmetrics.descent,
            vmetrics.line_gap
        );

        // Cells past the requested grid keep advancing the pen but take no color.
        let color_limit = (output_width as usize * output_height as usize).min(colors.len());

        let mut pen_x = 0i32;
        let mut pen_y = (vmetrics.ascent * scale) as i32;
        let mut cell = 0usize;

        for (position, ch) in text.chars().enumerate() {
            if ch == '\n' {
                if cancel.load(Ordering::Relaxed) {
                    log::info!("Rendu annulé après {cell} cellules");
                    return Err(CoreError::Cancelled);
                }
                pen_x = 0;
                pen_y += line_advance;
                continue;
            }

            let glyph_ch = RENDER_CHAR_MAP.map(ch, position)?;
            let hmetrics = font.glyph_advance(glyph_ch);

            if let Some(fg) = colors.get(cell).filter(|_| cell < color_limit) {
                let bbox = font.glyph_bitmap_box(glyph_ch, scale);
                let bitmap = font.rasterize_glyph(glyph_ch, scale)?;
                self.blit(&mut canvas, &bitmap, pen_x + bbox.x0, pen_y + bbox.y0, fg);
            }

            pen_x += (hmetrics.advance * scale) as i32;
            cell += 1;
        }

        if cell != color_limit {
            log::warn!(
                "{cell} cellules dans le texte, {color_limit} couleurs utilisables \
                 ({output_width}x{output_height})"
            );
        }
        log::info!("Rendu terminé : {cell} cellules, {width}x{height} px");
        Ok(canvas)
    }

    fn blit(
        &self,
        canvas: &mut Canvas,
        bitmap: &GlyphBitmap,
        origin_x: i32,
        origin_y: i32,
        fg: Rgb,
    ) {
        for dy in 0..bitmap.height {
            let y = origin_y + dy as i32;
            for dx in 0..bitmap.width {
                let x = origin_x + dx as i32;
                match bitmap.at(dx, dy) {
                    INK => canvas.put(x, y, fg),
                    BLANK => canvas.put(x, y, self.background),
                    _ => {}
                }
            }
        }
    }
}

impl Default for GlyphCompositor {
    fn default() -> Self {
        Self::new(Rgb::WHITE, DEFAULT_CELL_HEIGHT)
    }
}
