//! Résolution de la taille de sortie (en caractères) à partir de l'image source.
//!
//! Cells are twice as tall as wide, so percent sizing doubles the column count
//! to keep the aspect ratio of the source.

use ap_core::config::PipelineConfig;
use ap_core::error::{CoreError, CoreResult};

/// Lower bound of the recommended size range, in percent of the source.
pub const MIN_PERCENT: f32 = 1.0;
/// Upper bound of the recommended size range, in percent of the source.
pub const MAX_PERCENT: f32 = 3.0;

/// Output size in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSize {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

impl OutputSize {
    /// Size from a percentage of the source.
    ///
    /// `height = image_height * percent / 100`, `width = (image_width * percent / 100) * 2`,
    /// each clamped to `[1, image side]` so the sampling steps stay ≥ 1.
    ///
    /// # Example
    /// ```
    /// use ap_source::sizing::OutputSize;
    /// let size = OutputSize::from_percent(1000, 500, 2.0);
    /// assert_eq!((size.width, size.height), (40, 10));
    /// ```
    #[must_use]
    pub fn from_percent(image_width: u32, image_height: u32, percent: f32) -> Self {
        let rows = (image_height as f32 * percent / 100.0) as u32;
        let cols = (image_width as f32 * percent / 100.0) as u32 * 2;
        Self {
            width: cols.clamp(1, image_width.max(1)),
            height: rows.clamp(1, image_height.max(1)),
        }
    }

    /// Size from an explicit column count, rows following the source aspect ratio.
    #[must_use]
    pub fn from_width(image_width: u32, image_height: u32, width: u32) -> Self {
        let rows = (u64::from(width) * u64::from(image_height) / u64::from(image_width.max(1)) / 2)
            as u32;
        Self {
            width,
            height: rows.clamp(1, image_height.max(1)),
        }
    }

    /// Size from an explicit row count, columns following the source aspect ratio.
    #[must_use]
    pub fn from_height(image_width: u32, image_height: u32, height: u32) -> Self {
        let cols = (u64::from(height) * u64::from(image_width) * 2 / u64::from(image_height.max(1)))
            as u32;
        Self {
            width: cols.clamp(1, image_width.max(1)),
            height,
        }
    }
}

/// Recommended manual size range for an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeBounds {
    /// Smallest recommended size.
    pub min: OutputSize,
    /// Largest recommended size.
    pub max: OutputSize,
}

impl SizeBounds {
    /// Range spanning [`MIN_PERCENT`] to [`MAX_PERCENT`] of the image.
    ///
    /// # Example
    /// ```
    /// use ap_source::sizing::SizeBounds;
    /// let b = SizeBounds::for_image(1000, 1000);
    /// assert_eq!((b.min.width, b.min.height), (10, 10));
    /// assert_eq!((b.max.width, b.max.height), (60, 30));
    /// ```
    #[must_use]
    pub fn for_image(image_width: u32, image_height: u32) -> Self {
        let min = OutputSize {
            width: (image_width as f32 * MIN_PERCENT / 100.0) as u32,
            height: (image_height as f32 * MIN_PERCENT / 100.0) as u32,
        };
        let min = OutputSize {
            width: min.width.max(1),
            height: min.height.max(1),
        };
        let max = OutputSize::from_percent(image_width, image_height, MAX_PERCENT);
        Self {
            min,
            max: OutputSize {
                width: max.width.max(min.width),
                height: max.height.max(min.height),
            },
        }
    }

    /// True if `size` lies in the range.
    #[must_use]
    pub fn contains(&self, size: OutputSize) -> bool {
        (self.min.width..=self.max.width).contains(&size.width)
            && (self.min.height..=self.max.height).contains(&size.height)
    }
}

/// Resolve the output size for an image from the configuration.
///
/// Explicit width/height win over `percent`; a single explicit side derives
/// the other from the source aspect ratio.
///
/// # Errors
/// Returns [`CoreError::InvalidDimensions`] if an explicit side is zero or
/// exceeds the matching image side (sampling step would be zero).
///
/// # Example
/// ```
/// use ap_core::config::PipelineConfig;
/// use ap_source::sizing::resolve_output_size;
/// let config = PipelineConfig { width: Some(80), height: Some(40), ..Default::default() };
/// let size = resolve_output_size(&config, 800, 600).unwrap();
/// assert_eq!((size.width, size.height), (80, 40));
/// ```
pub fn resolve_output_size(
    config: &PipelineConfig,
    image_width: u32,
    image_height: u32,
) -> CoreResult<OutputSize> {
    let size = match (config.width, config.height) {
        (Some(width), Some(height)) => OutputSize { width, height },
        (Some(width), None) => OutputSize::from_width(image_width, image_height, width),
        (None, Some(height)) => OutputSize::from_height(image_width, image_height, height),
        (None, None) => OutputSize::from_percent(image_width, image_height, config.percent),
    };

    if size.width == 0 || size.height == 0 || size.width > image_width || size.height > image_height
    {
        return Err(CoreError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }

    let bounds = SizeBounds::for_image(image_width, image_height);
    if !bounds.contains(size) {
        log::warn!(
            "Taille {}x{} hors de la plage conseillée {}x{} .. {}x{}",
            size.width,
            size.height,
            bounds.min.width,
            bounds.min.height,
            bounds.max.width,
            bounds.max.height
        );
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_sizing_doubles_columns() {
        let size = OutputSize::from_percent(1920, 1080, 2.0);
        assert_eq!(
            size,
            OutputSize {
                width: 76,
                height: 21
            }
        );
    }

    #[test]
    fn percent_sizing_never_reaches_zero_or_overflows() {
        let tiny = OutputSize::from_percent(4, 4, 2.0);
        assert_eq!(tiny, OutputSize { width: 1, height: 1 });
        let huge = OutputSize::from_percent(10, 10, 100.0);
        assert_eq!(
            huge,
            OutputSize {
                width: 10,
                height: 10
            }
        );
    }

    #[test]
    fn single_side_follows_aspect_ratio() {
        let expected = OutputSize {
            width: 80,
            height: 30,
        };
        assert_eq!(OutputSize::from_width(800, 600, 80), expected);
        assert_eq!(OutputSize::from_height(800, 600, 30), expected);
    }

    #[test]
    fn explicit_size_larger_than_image_is_rejected() {
        let config = PipelineConfig {
            width: Some(50),
            height: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            resolve_output_size(&config, 40, 40),
            Err(CoreError::InvalidDimensions { width: 50, height: 10 })
        ));
    }

    #[test]
    fn bounds_contain_default_percent() {
        let bounds = SizeBounds::for_image(1200, 800);
        let size = OutputSize::from_percent(1200, 800, 2.0);
        assert!(bounds.contains(size));
        assert!(!bounds.contains(OutputSize { width: 1, height: 1 }));
    }
}
