use rayon::prelude::*;

use crate::color::Rgb;
use crate::error::{CoreError, CoreResult};

/// Decoded source pixels, interleaved row-major.
///
/// Immutable once built; owned by one pipeline invocation.
///
/// # Example
/// ```
/// use ap_core::frame::SourceImage;
/// let img = SourceImage::new(vec![255; 2 * 2 * 3], 2, 2, 3).unwrap();
/// assert_eq!(img.channels(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct SourceImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl SourceImage {
    /// Wrap a raw buffer.
    ///
    /// # Errors
    /// - [`CoreError::InvalidChannels`] unless `channels` is 1, 3 or 4.
    /// - [`CoreError::InvalidDimensions`] if a side is zero or `data` has the wrong length.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> CoreResult<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(CoreError::InvalidChannels(channels));
        }
        let expected = width as usize * height as usize * usize::from(channels);
        if width == 0 || height == 0 || data.len() != expected {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel (1, 3 or 4).
    #[must_use]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Raw interleaved bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB triple of pixel (x, y). Gray images replicate their single channel.
    ///
    /// # Example
    /// ```
    /// use ap_core::frame::SourceImage;
    /// use ap_core::color::Rgb;
    /// let img = SourceImage::new(vec![0, 90], 2, 1, 1).unwrap();
    /// assert_eq!(img.rgb_at(1, 0), Rgb(90, 90, 90));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn rgb_at(&self, x: u32, y: u32) -> Rgb {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * usize::from(self.channels);
        if self.channels == 1 {
            let v = self.data[idx];
            Rgb(v, v, v)
        } else {
            Rgb(self.data[idx], self.data[idx + 1], self.data[idx + 2])
        }
    }
}

/// One sampled cell: its gradient character and source color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsciiCell {
    /// Gradient character.
    pub ch: char,
    /// Foreground color taken from the source pixel.
    pub fg: Rgb,
}

/// Colors of the sampled cells, in visiting order.
///
/// The index is the only link between a character of the text artifact
/// (newlines excluded) and its color.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorBuffer {
    colors: Vec<Rgb>,
}

/// Extra slots reserved on top of `columns * rows`.
const COLOR_MARGIN: usize = 16;

impl ColorBuffer {
    /// Empty buffer sized for `cells` entries.
    #[must_use]
    pub fn with_cells(cells: usize) -> Self {
        Self {
            colors: Vec::with_capacity(cells + COLOR_MARGIN),
        }
    }

    /// Append the color of the next cell.
    #[inline(always)]
    pub fn push(&mut self, color: Rgb) {
        self.colors.push(color);
    }

    /// Color of cell `index`, if any.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Number of stored colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when no color was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All colors, in visiting order.
    #[must_use]
    pub fn as_slice(&self) -> &[Rgb] {
        &self.colors
    }
}

impl From<Vec<Rgb>> for ColorBuffer {
    fn from(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }
}

/// Output of the sampler: the artifact text and the parallel color buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiArt {
    /// `rows` lines of `columns` characters, each terminated by `\n`.
    pub text: String,
    /// One color per non-newline character of `text`.
    pub colors: ColorBuffer,
    /// Characters per line.
    pub columns: u32,
    /// Number of lines.
    pub rows: u32,
}

impl AsciiArt {
    /// Iterate over cells in visiting order.
    pub fn cells(&self) -> impl Iterator<Item = AsciiCell> + '_ {
        self.text
            .chars()
            .filter(|c| *c != '\n')
            .zip(self.colors.as_slice().iter())
            .map(|(ch, fg)| AsciiCell { ch, fg: *fg })
    }
}

fn try_zeroed(what: &'static str, bytes: usize) -> CoreResult<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| CoreError::Allocation { what, bytes })?;
    data.resize(bytes, 0);
    Ok(data)
}

/// RGB8 pixel surface the compositor draws on, row 0 at the top.
///
/// # Example
/// ```
/// use ap_core::frame::Canvas;
/// use ap_core::color::Rgb;
/// let canvas = Canvas::filled(4, 2, Rgb(1, 2, 3)).unwrap();
/// assert_eq!(canvas.data().len(), 4 * 2 * 3);
/// assert_eq!(canvas.pixel(3, 1), Rgb(1, 2, 3));
/// ```
#[derive(Clone, Debug)]
pub struct Canvas {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Allocate a canvas and fill it with `background`.
    ///
    /// # Errors
    /// Returns [`CoreError::Allocation`] if the buffer cannot be reserved.
    pub fn filled(width: u32, height: u32, background: Rgb) -> CoreResult<Self> {
        let bytes = width as usize * height as usize * 3;
        let mut data = try_zeroed("canvas", bytes)?;
        let bg = background.to_array();
        data.par_chunks_exact_mut(3).for_each(|px| px.copy_from_slice(&bg));
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB8 bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the canvas and return its bytes.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Color at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Rgb(self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Write a pixel given signed coordinates. Out-of-bounds writes are dropped.
    #[inline(always)]
    pub fn put(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx..idx + 3].copy_from_slice(&color.to_array());
    }
}

/// Mask value of an ink pixel.
pub const INK: u8 = 255;
/// Mask value of a background pixel.
pub const BLANK: u8 = 0;

/// Binary mask of one rasterized glyph. Lives for one compositing step.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    /// Mask width in pixels.
    pub width: usize,
    /// Mask height in pixels.
    pub height: usize,
    /// Bytes per mask row.
    pub stride: usize,
    /// [`INK`] or [`BLANK`] per pixel.
    pub mask: Vec<u8>,
}

impl GlyphBitmap {
    /// Blank mask of the given size.
    ///
    /// # Errors
    /// Returns [`CoreError::Allocation`] if the mask cannot be reserved.
    pub fn blank(width: usize, height: usize) -> CoreResult<Self> {
        let mask = try_zeroed("glyph bitmap", width * height)?;
        Ok(Self {
            width,
            height,
            stride: width,
            mask,
        })
    }

    /// Mask value at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.mask[y * self.stride + x]
    }

    /// Mark (x, y) as ink.
    #[inline(always)]
    pub fn set_ink(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.mask[y * self.stride + x] = INK;
        }
    }

    /// Number of ink pixels.
    #[must_use]
    pub fn ink_count(&self) -> usize {
        self.mask.iter().filter(|v| **v == INK).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_image_rejects_bad_layouts() {
        assert!(matches!(
            SourceImage::new(vec![0; 8], 2, 2, 2),
            Err(CoreError::InvalidChannels(2))
        ));
        assert!(matches!(
            SourceImage::new(vec![0; 11], 2, 2, 3),
            Err(CoreError::InvalidDimensions { .. })
        ));
        assert!(SourceImage::new(Vec::new(), 0, 0, 3).is_err());
    }

    #[test]
    fn rgba_reads_ignore_alpha() {
        let img = SourceImage::new(vec![1, 2, 3, 4, 5, 6, 7, 8], 2, 1, 4).unwrap();
        assert_eq!(img.rgb_at(0, 0), Rgb(1, 2, 3));
        assert_eq!(img.rgb_at(1, 0), Rgb(5, 6, 7));
    }

    #[test]
    fn canvas_put_clips() {
        let mut canvas = Canvas::filled(2, 2, Rgb::WHITE).unwrap();
        canvas.put(-1, 0, Rgb::BLACK);
        canvas.put(0, 2, Rgb::BLACK);
        canvas.put(1, 1, Rgb(9, 9, 9));
        assert_eq!(canvas.pixel(0, 0), Rgb::WHITE);
        assert_eq!(canvas.pixel(1, 1), Rgb(9, 9, 9));
    }

    #[test]
    fn ascii_art_cells_skip_newlines() {
        let art = AsciiArt {
            text: "@ \n. \n".to_string(),
            colors: ColorBuffer::from(vec![Rgb(1, 1, 1), Rgb(2, 2, 2), Rgb(3, 3, 3), Rgb(4, 4, 4)]),
            columns: 2,
            rows: 2,
        };
        let cells: Vec<AsciiCell> = art.cells().collect();
        assert_eq!(cells.len(), 4);
        assert_eq!(
            cells[2],
            AsciiCell {
                ch: '.',
                fg: Rgb(3, 3, 3)
            }
        );
    }

    #[test]
    fn glyph_bitmap_counts_ink() {
        let mut glyph = GlyphBitmap::blank(3, 2).unwrap();
        glyph.set_ink(0, 0);
        glyph.set_ink(2, 1);
        glyph.set_ink(5, 5);
        assert_eq!(glyph.ink_count(), 2);
        assert_eq!(glyph.at(2, 1), INK);
        assert_eq!(glyph.at(1, 1), BLANK);
    }
}
