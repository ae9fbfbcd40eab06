use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use ap_core::charset::{GradientLut, SAMPLE_GRADIENT};
use ap_core::color::Rgb;
use ap_core::error::{CoreError, CoreResult};
use ap_core::frame::{AsciiArt, AsciiCell, ColorBuffer, SourceImage};
use ap_core::grid::SamplingGrid;

use crate::artifact::ArtifactWriter;

/// Row-level progress of a sampling pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleProgress {
    /// Rows completed so far (1-based).
    pub row: u32,
    /// Total rows of the grid.
    pub rows: u32,
}

impl SampleProgress {
    /// Completion in [0.0, 1.0].
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.rows == 0 {
            1.0
        } else {
            self.row as f32 / self.rows as f32
        }
    }
}

/// Walks a source image on a fixed-step grid and emits one gradient
/// character plus one color per visited cell.
///
/// Cells are visited in row-major order; the color buffer index is the
/// cell's rank in that order.
///
/// # Example
/// ```
/// use ap_ascii::sampler::AsciiSampler;
/// use ap_core::frame::SourceImage;
///
/// let img = SourceImage::new(vec![255; 4 * 4 * 3], 4, 4, 3).unwrap();
/// let art = AsciiSampler::new().sample(&img, 2, 2).unwrap();
/// assert_eq!(art.text, "  \n  \n");
/// assert_eq!(art.colors.len(), 4);
/// ```
pub struct AsciiSampler {
    lut: GradientLut,
}

impl AsciiSampler {
    /// Sampler over [`SAMPLE_GRADIENT`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            lut: GradientLut::new(&SAMPLE_GRADIENT),
        }
    }

    /// Sample `image` into an in-memory [`AsciiArt`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if a sampling step would be zero.
    pub fn sample(
        &self,
        image: &SourceImage,
        output_width: u32,
        output_height: u32,
    ) -> CoreResult<AsciiArt> {
        let grid = SamplingGrid::new(image.width(), image.height(), output_width, output_height)?;
        self.walk(image, grid, &AtomicBool::new(false), |_, _| Ok(()))
    }

    /// Sample with a per-row progress callback and a cooperative cancel flag,
    /// checked before every row.
    ///
    /// # Errors
    /// - [`CoreError::InvalidDimensions`] if a sampling step would be zero.
    /// - [`CoreError::Cancelled`] if `cancel` was raised.
    pub fn sample_with<F>(
        &self,
        image: &SourceImage,
        output_width: u32,
        output_height: u32,
        cancel: &AtomicBool,
        mut on_row: F,
    ) -> CoreResult<AsciiArt>
    where
        F: FnMut(SampleProgress),
    {
        let grid = SamplingGrid::new(image.width(), image.height(), output_width, output_height)?;
        self.walk(image, grid, cancel, |_, progress| {
            on_row(progress);
            Ok(())
        })
    }

    /// Sample and stream the text to an artifact at `path`.
    ///
    /// The artifact is opened before any pixel is read; if that fails no
    /// color buffer is produced. It only appears at `path` once every row
    /// has been written.
    ///
    /// # Errors
    /// - [`CoreError::InvalidDimensions`] if a sampling step would be zero.
    /// - [`CoreError::ArtifactWrite`] if the artifact cannot be written.
    /// - [`CoreError::Cancelled`] if `cancel` was raised.
    pub fn sample_to_file<F>(
        &self,
        image: &SourceImage,
        output_width: u32,
        output_height: u32,
        path: &Path,
        cancel: &AtomicBool,
        mut on_row: F,
    ) -> CoreResult<AsciiArt>
    where
        F: FnMut(SampleProgress),
    {
        let grid = SamplingGrid::new(image.width(), image.height(), output_width, output_height)?;
        let mut writer = ArtifactWriter::create(path)?;
        let art = self.walk(image, grid, cancel, |line, progress| {
            writer.write_row(line)?;
            on_row(progress);
            Ok(())
        })?;
        writer.commit()?;
        log::info!(
            "Conversion ASCII terminée : {} ({}x{})",
            path.display(),
            art.columns,
            art.rows
        );
        Ok(art)
    }

    /// Color and character of the cell sampled at pixel (x, y).
    ///
    /// An all-zero triple means "no color data" and is stored as explicit
    /// black; black pixels and missing pixels both render black. Only the full
    /// triple counts: a pixel with some zero channels, such as pure red, keeps
    /// its color.
    #[inline(always)]
    #[must_use]
    pub fn sample_cell(&self, image: &SourceImage, x: u32, y: u32) -> AsciiCell {
        let raw = image.rgb_at(x, y);
        let fg = if raw.is_zero() { Rgb::BLACK } else { raw };
        AsciiCell {
            ch: self.lut.map(fg.intensity()),
            fg,
        }
    }

    fn walk<F>(
        &self,
        image: &SourceImage,
        grid: SamplingGrid,
        cancel: &AtomicBool,
        mut emit_row: F,
    ) -> CoreResult<AsciiArt>
    where
        F: FnMut(&str, SampleProgress) -> CoreResult<()>,
    {
        let mut text = String::with_capacity((grid.columns as usize + 1) * grid.rows as usize);
        let mut colors = ColorBuffer::with_cells(grid.cells());
        let mut line = String::with_capacity(grid.columns as usize);

        let mut row = 0u32;
        for y in (0..image.height()).step_by(grid.h_step as usize) {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Échantillonnage annulé à la ligne {row}/{}", grid.rows);
                return Err(CoreError::Cancelled);
            }

            line.clear();
            for x in (0..image.width()).step_by(grid.w_step as usize) {
                let cell = self.sample_cell(image, x, y);
                line.push(cell.ch);
                colors.push(cell.fg);
            }

            row += 1;
            emit_row(&line, SampleProgress { row, rows: grid.rows })?;
            text.push_str(&line);
            text.push('\n');
        }

        debug_assert_eq!(colors.len(), grid.cells());
        Ok(AsciiArt {
            text,
            colors,
            columns: grid.columns,
            rows: grid.rows,
        })
    }
}

impl Default for AsciiSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ap_core::charset::{SAMPLE_GRADIENT, gradient_index};

    use super::*;

    fn uniform(width: u32, height: u32, channels: u8, value: u8) -> SourceImage {
        let len = width as usize * height as usize * usize::from(channels);
        SourceImage::new(vec![value; len], width, height, channels).unwrap()
    }

    fn gradient_image(width: u32, height: u32) -> SourceImage {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 7 + y) as u8, (x * 3) as u8, (y * 11) as u8]);
            }
        }
        SourceImage::new(data, width, height, 3).unwrap()
    }

    #[test]
    fn white_image_samples_to_lightest_char() {
        let art = AsciiSampler::new().sample(&uniform(8, 6, 3, 255), 4, 3).unwrap();
        let lightest = SAMPLE_GRADIENT[15];
        assert!(art.text.lines().all(|l| l.chars().all(|c| c == lightest)));
        assert!(art.colors.as_slice().iter().all(|c| *c == Rgb::WHITE));
    }

    #[test]
    fn black_image_samples_to_darkest_char() {
        let art = AsciiSampler::new().sample(&uniform(8, 6, 4, 0), 4, 3).unwrap();
        let darkest = SAMPLE_GRADIENT[0];
        assert!(art.text.lines().all(|l| l.chars().all(|c| c == darkest)));
        assert!(art.colors.as_slice().iter().all(|c| *c == Rgb::BLACK));
    }

    #[test]
    fn partly_zero_pixels_keep_their_color() {
        let img = SourceImage::new(vec![255, 0, 0, 0, 0, 0], 2, 1, 3).unwrap();
        let sampler = AsciiSampler::new();
        let red = sampler.sample_cell(&img, 0, 0);
        assert_eq!(red.fg, Rgb(255, 0, 0));
        assert_eq!(red.ch, SAMPLE_GRADIENT[gradient_index(85)]);
        assert_eq!(sampler.sample_cell(&img, 1, 0).fg, Rgb::BLACK);
    }

    #[test]
    fn line_and_buffer_counts_follow_effective_grid() {
        for (w, h, ow, oh) in [(13, 9, 4, 2), (10, 10, 3, 3), (7, 5, 7, 5), (33, 17, 8, 4)] {
            let art = AsciiSampler::new().sample(&gradient_image(w, h), ow, oh).unwrap();
            let grid = SamplingGrid::new(w, h, ow, oh).unwrap();
            let lines: Vec<&str> = art.text.lines().collect();
            assert_eq!(lines.len(), grid.rows as usize);
            assert!(lines.iter().all(|l| l.chars().count() == grid.columns as usize));
            assert!(art.text.ends_with('\n'));
            assert_eq!(art.colors.len(), grid.cells());
            assert_eq!((art.columns, art.rows), (grid.columns, grid.rows));
        }
    }

    #[test]
    fn cells_match_sampled_pixels() {
        let img = gradient_image(6, 4);
        let sampler = AsciiSampler::new();
        let art = sampler.sample(&img, 3, 2).unwrap();
        let expected: Vec<AsciiCell> = [(0, 0), (2, 0), (4, 0), (0, 2), (2, 2), (4, 2)]
            .iter()
            .map(|&(x, y)| sampler.sample_cell(&img, x, y))
            .collect();
        assert_eq!(art.cells().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn gray_images_use_replicated_channel() {
        let art = AsciiSampler::new().sample(&uniform(2, 2, 1, 128), 1, 1).unwrap();
        assert_eq!(art.text, "=\n");
        assert_eq!(art.colors.get(0), Some(Rgb(128, 128, 128)));
    }

    #[test]
    fn sampling_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = (dir.path().join("a.txt"), dir.path().join("b.txt"));
        let img = gradient_image(40, 30);
        let sampler = AsciiSampler::new();
        let never = AtomicBool::new(false);
        let art_a = sampler.sample_to_file(&img, 10, 6, &a, &never, |_| {}).unwrap();
        let art_b = sampler.sample_to_file(&img, 10, 6, &b, &never, |_| {}).unwrap();
        assert_eq!(art_a, art_b);
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
        assert_eq!(fs::read_to_string(&a).unwrap(), art_a.text);
    }

    #[test]
    fn zero_step_is_rejected_before_sampling() {
        let err = AsciiSampler::new().sample(&uniform(4, 4, 3, 9), 5, 2).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { .. }));
    }

    #[test]
    fn unwritable_artifact_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("art.txt");
        let mut rows_seen = 0;
        let result = AsciiSampler::new().sample_to_file(
            &uniform(4, 4, 3, 255),
            2,
            2,
            &path,
            &AtomicBool::new(false),
            |_| rows_seen += 1,
        );
        assert!(matches!(result, Err(CoreError::ArtifactWrite { .. })));
        assert_eq!(rows_seen, 0);
    }

    #[test]
    fn progress_reports_every_row() {
        let mut seen = Vec::new();
        AsciiSampler::new()
            .sample_with(&uniform(9, 9, 3, 40), 3, 3, &AtomicBool::new(false), |p| seen.push(p))
            .unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().map(SampleProgress::fraction), Some(1.0));
        assert!(seen.windows(2).all(|w| w[0].row < w[1].row));
    }

    #[test]
    fn cancelled_pass_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.txt");
        let cancel = AtomicBool::new(false);
        let result = AsciiSampler::new().sample_to_file(
            &uniform(8, 8, 3, 200),
            4,
            4,
            &path,
            &cancel,
            |p| {
                if p.row == 2 {
                    cancel.store(true, Ordering::Relaxed);
                }
            },
        );
        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert!(!path.exists());
    }
}
