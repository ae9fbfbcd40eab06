use std::path::Path;

use ::image::DynamicImage;
use ap_core::frame::SourceImage;
use anyhow::{Context, Result};

/// Load an image from disk into a [`SourceImage`].
///
/// Gray images keep a single channel, RGB and RGBA keep theirs; other layouts
/// (gray+alpha, 16-bit, float) are converted to 8-bit RGB or RGBA.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
///
/// # Example
/// ```no_run
/// use ap_source::image::load_image;
/// use std::path::Path;
/// let img = load_image(Path::new("photo.jpg")).unwrap();
/// println!("{}x{}", img.width(), img.height());
/// ```
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let img = ::image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let source = from_dynamic(img)?;
    log::debug!(
        "Image chargée : {} ({}x{}, {} canaux)",
        path.display(),
        source.width(),
        source.height(),
        source.channels()
    );
    Ok(source)
}

/// Decode an in-memory encoded image (PNG, JPEG, BMP, GIF).
///
/// # Errors
/// Returns an error if the bytes cannot be decoded.
pub fn load_image_from_memory(bytes: &[u8]) -> Result<SourceImage> {
    let img = ::image::load_from_memory(bytes).context("Image en mémoire illisible")?;
    from_dynamic(img)
}

/// Convert a decoded image into the pipeline's interleaved layout.
///
/// # Errors
/// Returns an error if the resulting buffer is rejected by [`SourceImage::new`].
///
/// # Example
/// ```
/// use ap_source::image::from_dynamic;
/// let img = image::DynamicImage::new_luma_a8(3, 2);
/// let source = from_dynamic(img).unwrap();
/// assert_eq!(source.channels(), 4);
/// ```
pub fn from_dynamic(img: DynamicImage) -> Result<SourceImage> {
    let (width, height) = (img.width(), img.height());
    let (data, channels) = match img {
        DynamicImage::ImageLuma8(buf) => (buf.into_raw(), 1),
        DynamicImage::ImageRgb8(buf) => (buf.into_raw(), 3),
        DynamicImage::ImageRgba8(buf) => (buf.into_raw(), 4),
        other if other.color().has_alpha() => (other.to_rgba8().into_raw(), 4),
        other if other.color().channel_count() == 1 => (other.to_luma8().into_raw(), 1),
        other => (other.to_rgb8().into_raw(), 3),
    };
    SourceImage::new(data, width, height, channels).context("Image source invalide")
}
