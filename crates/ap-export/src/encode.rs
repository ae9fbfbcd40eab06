use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use ap_core::error::{CoreError, CoreResult};
use ap_core::frame::{Canvas, ColorBuffer};
use ap_core::traits::GlyphFont;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tempfile::NamedTempFile;

use crate::compositor::GlyphCompositor;

fn encode_error(path: &Path, reason: impl ToString) -> CoreError {
    CoreError::Encode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Write `canvas` as an 8-bit RGB PNG.
///
/// The image is encoded into a temporary file next to `path` and renamed into
/// place: a failed encode never leaves a partial file behind.
///
/// # Errors
/// Returns [`CoreError::Encode`] if the destination is not writable or
/// encoding fails.
pub fn save_png(canvas: &Canvas, path: &Path) -> CoreResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir).map_err(|e| encode_error(path, e))?;

    {
        let mut out = BufWriter::new(tmp.as_file());
        PngEncoder::new(&mut out)
            .write_image(
                canvas.data(),
                canvas.width(),
                canvas.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| encode_error(path, e))?;
        out.flush().map_err(|e| encode_error(path, e))?;
    }

    tmp.persist(path).map_err(|e| encode_error(path, e.error))?;
    log::info!(
        "PNG écrit : {} ({}x{})",
        path.display(),
        canvas.width(),
        canvas.height()
    );
    Ok(())
}

/// Render `text` and save it to `path` in one step.
///
/// # Errors
/// Any error from [`GlyphCompositor::render_with`] or [`save_png`].
#[allow(clippy::too_many_arguments)]
pub fn render_to_file(
    compositor: &GlyphCompositor,
    text: &str,
    output_width: u32,
    output_height: u32,
    colors: &ColorBuffer,
    font: &dyn GlyphFont,
    path: &Path,
    cancel: &AtomicBool,
) -> CoreResult<PathBuf> {
    let canvas =
        compositor.render_with(text, output_width, output_height, colors, font, cancel)?;
    save_png(&canvas, path)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use ap_core::color::Rgb;

    use super::*;
    use crate::builtin::BuiltinFont;

    #[test]
    fn png_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut canvas = Canvas::filled(5, 3, Rgb(10, 20, 30)).unwrap();
        canvas.put(4, 2, Rgb(200, 100, 50));
        save_png(&canvas, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(decoded.get_pixel(4, 2).0, [200, 100, 50]);
    }

    #[test]
    fn missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("out.png");
        let canvas = Canvas::filled(2, 2, Rgb::WHITE).unwrap();
        let err = save_png(&canvas, &path).unwrap_err();
        assert!(matches!(err, CoreError::Encode { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn render_to_file_writes_canvas_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.png");
        let colors = ColorBuffer::from(vec![Rgb(0, 0, 255); 3]);
        let written = render_to_file(
            &GlyphCompositor::new(Rgb::WHITE, 16.0),
            "@#.\n",
            3,
            1,
            &colors,
            &BuiltinFont,
            &path,
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(written, path);
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (24, 16));
    }
}
